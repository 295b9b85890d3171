//! JSON output formatting

use crate::engine::executor::{ExecutionResult, ResultData};
use serde_json::{json, Value};

pub fn format_json(result: &ExecutionResult) -> String {
    let data: Value = match &result.data {
        ResultData::Objects(info) => json!({ "objects": info }),
        ResultData::Object(info) => serde_json::to_value(info).unwrap_or(json!(null)),
        ResultData::Tree(info) => serde_json::to_value(info).unwrap_or(json!(null)),
        ResultData::Groups(info) => json!({ "groups": info }),
        ResultData::Scenes(info) => json!({ "scenes": info }),
        ResultData::ContextInfo(info) => serde_json::to_value(info).unwrap_or(json!(null)),
        ResultData::Count(info) => serde_json::to_value(info).unwrap_or(json!(null)),
        ResultData::Consistency(info) => serde_json::to_value(info).unwrap_or(json!(null)),
        ResultData::Explanation(s) => json!({ "explanation": s }),
        ResultData::Message(s) => json!({ "message": s, "modified": result.modified }),
    };

    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::executor::CountInfo;

    #[test]
    fn test_message_reports_modification() {
        let result = ExecutionResult {
            data: ResultData::Message("Created scene 'Level1'".to_string()),
            modified: true,
        };
        let value: Value = serde_json::from_str(&format_json(&result)).unwrap();
        assert_eq!(value["modified"], true);
    }

    #[test]
    fn test_count_shape() {
        let result = ExecutionResult {
            data: ResultData::Count(CountInfo {
                scope: "GLOBAL".to_string(),
                objects: 3,
            }),
            modified: false,
        };
        let value: Value = serde_json::from_str(&format_json(&result)).unwrap();
        assert_eq!(value, json!({ "scope": "GLOBAL", "objects": 3 }));
    }
}
