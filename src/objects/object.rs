//! Object definition
//!
//! An Object is identified by its name inside the container that owns it.
//! Its type tag selects behavior elsewhere in the engine; everything the
//! type needs is kept in an opaque JSON configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    name: String,
    #[serde(rename = "type")]
    object_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    tags: String,
    #[serde(flatten)]
    configuration: Map<String, Value>,
}

impl Object {
    /// Create an object with an empty configuration
    pub fn new(object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
            tags: String::new(),
            configuration: Map::new(),
        }
    }

    /// Create an object with a type-specific configuration
    pub fn with_configuration(
        object_type: impl Into<String>,
        name: impl Into<String>,
        configuration: Map<String, Value>,
    ) -> Self {
        Self {
            configuration,
            ..Self::new(object_type, name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renaming goes through the container so the name index stays valid.
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Comma separated tags, as edited in the object list
    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.tags = tags.into();
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn configuration(&self) -> &Map<String, Value> {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_new() {
        let object = Object::new("Sprite", "Player");
        assert_eq!(object.name(), "Player");
        assert_eq!(object.object_type(), "Sprite");
        assert!(object.configuration().is_empty());
    }

    #[test]
    fn test_tag_list_skips_blanks() {
        let mut object = Object::new("Sprite", "Player");
        object.set_tags("hero, ,  main,");
        assert_eq!(object.tag_list(), vec!["hero", "main"]);
    }

    #[test]
    fn test_configuration_is_flattened() {
        let mut config = Map::new();
        config.insert("text".to_string(), json!("Hello"));
        let object = Object::with_configuration("TextObject::Text", "Title", config);

        let value = serde_json::to_value(&object).unwrap();
        assert_eq!(value["name"], "Title");
        assert_eq!(value["type"], "TextObject::Text");
        assert_eq!(value["text"], "Hello");
        assert!(value.get("tags").is_none());

        let back: Object = serde_json::from_value(value).unwrap();
        assert_eq!(back, object);
    }
}
