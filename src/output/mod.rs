//! Output formatting module
//!
//! Every [`ExecutionResult`] renders either as text for a terminal or as
//! pretty-printed JSON for other tools.

pub mod human;
pub mod json;

use crate::engine::executor::ExecutionResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

pub fn format_output(result: &ExecutionResult, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => human::format_human(result),
        OutputFormat::Json => json::format_json(result),
    }
}
