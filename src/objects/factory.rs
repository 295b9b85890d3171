//! Object factories
//!
//! The scope owning a container (a project or a scene) knows which object
//! types exist. Containers call back into an [`ObjectFactory`] to build a
//! type-correct object before inserting it.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::object::Object;
use crate::error::{ObjTreeError, Result};

pub trait ObjectFactory {
    fn create_object(&self, object_type: &str, name: &str) -> Result<Object>;
}

/// Object types known to a project, with the configuration new objects start from
#[derive(Debug, Clone)]
pub struct ObjectTypeRegistry {
    types: BTreeMap<String, Map<String, Value>>,
    /// Reject types that were never registered instead of creating bare objects
    strict: bool,
}

impl ObjectTypeRegistry {
    /// Registry without any type
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
            strict: false,
        }
    }

    /// Registry with the built-in object types
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "Sprite",
            json!({ "updateIfNotVisible": false, "animations": [] }),
        );
        registry.register(
            "TextObject::Text",
            json!({ "text": "", "characterSize": 20, "font": "", "color": "0;0;0" }),
        );
        registry.register(
            "TiledSpriteObject::TiledSprite",
            json!({ "texture": "", "width": 128, "height": 128 }),
        );
        registry.register(
            "PanelSpriteObject::PanelSprite",
            json!({ "texture": "", "width": 128, "height": 128, "tiled": false }),
        );
        registry.register(
            "ParticleSystem::ParticleEmitter",
            json!({ "maxParticleNb": 300, "tank": -1, "flow": 45 }),
        );
        registry.register(
            "Scene3D::Model3DObject",
            json!({ "modelResourceName": "", "width": 100, "height": 100, "depth": 100 }),
        );
        registry.register(
            "Scene3D::Cube3DObject",
            json!({ "width": 100, "height": 100, "depth": 100 }),
        );
        registry
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register a type. Non-object defaults are stored as an empty configuration.
    pub fn register(&mut self, object_type: &str, defaults: Value) {
        let defaults = match defaults {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.types.insert(object_type.to_string(), defaults);
    }

    pub fn is_registered(&self, object_type: &str) -> bool {
        self.types.contains_key(object_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Default for ObjectTypeRegistry {
    fn default() -> Self {
        Self::with_builtin_types()
    }
}

impl ObjectFactory for ObjectTypeRegistry {
    fn create_object(&self, object_type: &str, name: &str) -> Result<Object> {
        match self.types.get(object_type) {
            Some(defaults) => Ok(Object::with_configuration(
                object_type,
                name,
                defaults.clone(),
            )),
            None if self.strict => Err(ObjTreeError::UnknownObjectType(object_type.to_string())),
            None => {
                log::warn!(
                    "Object type '{}' is not registered, creating '{}' without configuration",
                    object_type,
                    name
                );
                Ok(Object::new(object_type, name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_type_gets_defaults() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let object = registry.create_object("TextObject::Text", "Score").unwrap();
        assert_eq!(object.name(), "Score");
        assert_eq!(object.configuration()["characterSize"], 20);
    }

    #[test]
    fn test_unknown_type_is_lenient_by_default() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let object = registry.create_object("MyExtension::Thing", "Thing").unwrap();
        assert_eq!(object.object_type(), "MyExtension::Thing");
        assert!(object.configuration().is_empty());
    }

    #[test]
    fn test_unknown_type_rejected_when_strict() {
        let registry = ObjectTypeRegistry::with_builtin_types().strict(true);
        let result = registry.create_object("MyExtension::Thing", "Thing");
        assert!(matches!(result, Err(ObjTreeError::UnknownObjectType(_))));
    }
}
