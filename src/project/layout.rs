//! Scenes (layouts) and scope addressing

use serde::{Deserialize, Serialize};

use crate::objects::ObjectsContainer;

/// Which container of a project a command works on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    /// Objects shared by every scene
    #[default]
    Global,
    /// Objects of one scene
    Layout(String),
}

impl Scope {
    pub fn layout(name: impl Into<String>) -> Self {
        Scope::Layout(name.into())
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => write!(f, "GLOBAL"),
            Scope::Layout(name) => write!(f, "SCENE \"{}\"", name),
        }
    }
}

/// A scene and the objects it owns
#[derive(Debug, Serialize, Deserialize)]
pub struct Layout {
    name: String,
    #[serde(default)]
    objects: ObjectsContainer,
}

impl Layout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: ObjectsContainer::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objects(&self) -> &ObjectsContainer {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectsContainer {
        &mut self.objects
    }

    /// Tear the scene down, releasing its container explicitly
    pub fn dispose(self) {
        self.objects.dispose();
    }
}
