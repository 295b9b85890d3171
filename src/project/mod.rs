//! Projects: the scope owning every objects container
//!
//! A project holds the global objects plus one container per scene, and
//! the registry of object types used to create new objects. It is the unit
//! of persistence: the whole project is saved to and loaded from one JSON
//! file.

mod layout;

pub use layout::{Layout, Scope};

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ObjTreeError, Result};
use crate::objects::{
    transfer_node, ConsistencyError, NodeId, Object, ObjectFactory, ObjectTypeRegistry,
    ObjectsContainer,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    name: String,
    modified_at: DateTime<Utc>,
    /// Global objects, visible from every scene
    #[serde(default)]
    objects: ObjectsContainer,
    #[serde(default)]
    layouts: Vec<Layout>,
    #[serde(skip)]
    registry: ObjectTypeRegistry,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modified_at: Utc::now(),
            objects: ObjectsContainer::new(),
            layouts: Vec::new(),
            registry: ObjectTypeRegistry::with_builtin_types(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn registry(&self) -> &ObjectTypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObjectTypeRegistry {
        &mut self.registry
    }

    pub fn global_objects(&self) -> &ObjectsContainer {
        &self.objects
    }

    pub fn global_objects_mut(&mut self) -> &mut ObjectsContainer {
        &mut self.objects
    }

    /// Create an empty scene at the end of the scene list
    pub fn create_layout(&mut self, name: &str) -> Result<&mut Layout> {
        if self.has_layout(name) {
            return Err(ObjTreeError::SceneExists(name.to_string()));
        }
        self.layouts.push(Layout::new(name));
        log::debug!("Created scene '{}'", name);
        let index = self.layouts.len() - 1;
        Ok(&mut self.layouts[index])
    }

    /// Remove a scene and dispose of its objects
    pub fn remove_layout(&mut self, name: &str) -> Result<()> {
        let index = self
            .layout_index(name)
            .ok_or_else(|| ObjTreeError::SceneNotFound(name.to_string()))?;
        self.layouts.remove(index).dispose();
        log::debug!("Removed scene '{}'", name);
        Ok(())
    }

    pub fn has_layout(&self, name: &str) -> bool {
        self.layout_index(name).is_some()
    }

    pub fn layout(&self, name: &str) -> Result<&Layout> {
        self.layouts
            .iter()
            .find(|l| l.name() == name)
            .ok_or_else(|| ObjTreeError::SceneNotFound(name.to_string()))
    }

    pub fn layouts(&self) -> impl Iterator<Item = &Layout> {
        self.layouts.iter()
    }

    pub fn layouts_count(&self) -> usize {
        self.layouts.len()
    }

    pub fn container(&self, scope: &Scope) -> Result<&ObjectsContainer> {
        match scope {
            Scope::Global => Ok(&self.objects),
            Scope::Layout(name) => self.layout(name).map(Layout::objects),
        }
    }

    pub fn container_mut(&mut self, scope: &Scope) -> Result<&mut ObjectsContainer> {
        container_in(&mut self.objects, &mut self.layouts, scope)
    }

    /// Both containers at once, for moves between scopes
    pub fn containers_pair_mut(
        &mut self,
        first: &Scope,
        second: &Scope,
    ) -> Result<(&mut ObjectsContainer, &mut ObjectsContainer)> {
        if first == second {
            return Err(ObjTreeError::InvalidMove(format!(
                "{} is both the source and the destination",
                first
            )));
        }
        match (first, second) {
            (Scope::Global, Scope::Layout(name)) => {
                let layout = find_layout_mut(&mut self.layouts, name)?;
                Ok((&mut self.objects, layout.objects_mut()))
            }
            (Scope::Layout(name), Scope::Global) => {
                let layout = find_layout_mut(&mut self.layouts, name)?;
                Ok((layout.objects_mut(), &mut self.objects))
            }
            (Scope::Layout(a), Scope::Layout(b)) => {
                let i = self
                    .layout_index(a)
                    .ok_or_else(|| ObjTreeError::SceneNotFound(a.clone()))?;
                let j = self
                    .layout_index(b)
                    .ok_or_else(|| ObjTreeError::SceneNotFound(b.clone()))?;
                if i < j {
                    let (left, right) = self.layouts.split_at_mut(j);
                    Ok((left[i].objects_mut(), right[0].objects_mut()))
                } else {
                    let (left, right) = self.layouts.split_at_mut(i);
                    Ok((right[0].objects_mut(), left[j].objects_mut()))
                }
            }
            (Scope::Global, Scope::Global) => Err(ObjTreeError::InvalidMove(
                "GLOBAL is both the source and the destination".to_string(),
            )),
        }
    }

    /// Create an object in a scope, optionally inside a folder of that scope
    pub fn insert_new_object(
        &mut self,
        scope: &Scope,
        object_type: &str,
        name: &str,
        folder: Option<NodeId>,
        position: usize,
    ) -> Result<&mut Object> {
        let registry = &self.registry;
        let container = container_in(&mut self.objects, &mut self.layouts, scope)?;
        let folder = folder.unwrap_or_else(|| container.folders().root());
        container.insert_new_object_in_folder(registry, object_type, name, folder, position)
    }

    /// Remove an object from a scope.
    ///
    /// Scene groups may list global objects, so removing a global object
    /// also drops it from the groups of every scene that does not own an
    /// object of the same name.
    pub fn remove_object(&mut self, scope: &Scope, name: &str) -> Result<Object> {
        let object = self.container_mut(scope)?.remove_object(name)?;
        if *scope == Scope::Global {
            self.forget_global_object(name, None);
        }
        Ok(object)
    }

    /// Rename an object in a scope, carrying scene group memberships of
    /// global objects along
    pub fn rename_object(&mut self, scope: &Scope, old_name: &str, new_name: &str) -> Result<()> {
        self.container_mut(scope)?.rename_object(old_name, new_name)?;
        if *scope == Scope::Global && old_name != new_name {
            for layout in self.layouts.iter_mut() {
                let objects = layout.objects_mut();
                if !objects.has_object_named(old_name) {
                    objects
                        .object_groups_mut()
                        .rename_object_everywhere(old_name, new_name);
                }
            }
        }
        Ok(())
    }

    /// Move a node between two scopes of this project
    pub fn transfer(
        &mut self,
        from: &Scope,
        node: NodeId,
        to: &Scope,
        target_folder: Option<NodeId>,
        position: usize,
    ) -> Result<()> {
        let (source, target) = self.containers_pair_mut(from, to)?;
        let moved: Vec<String> = if *from == Scope::Global {
            source
                .folders()
                .objects_in_subtree(node)
                .into_iter()
                .filter_map(|id| source.object_by_id(id))
                .map(|o| o.name().to_string())
                .collect()
        } else {
            Vec::new()
        };

        let target_folder = target_folder.unwrap_or_else(|| target.folders().root());
        transfer_node(source, node, target, target_folder, position)?;

        // Objects leaving GLOBAL are no longer visible from other scenes
        for name in &moved {
            self.forget_global_object(name, Some(to));
        }
        Ok(())
    }

    /// Drop a global object name from scene groups, except in `keep`
    fn forget_global_object(&mut self, name: &str, keep: Option<&Scope>) {
        for layout in self.layouts.iter_mut() {
            if keep == Some(&Scope::layout(layout.name())) {
                continue;
            }
            let objects = layout.objects_mut();
            if !objects.has_object_named(name) {
                let removed = objects.object_groups_mut().remove_object_everywhere(name);
                if removed > 0 {
                    log::debug!(
                        "Dropped global object '{}' from {} group(s) of scene '{}'",
                        name,
                        removed,
                        layout.name()
                    );
                }
            }
        }
    }

    /// Validate every container, reporting the broken ones
    pub fn check(&self) -> Vec<(Scope, ConsistencyError)> {
        let mut broken = Vec::new();
        if let Err(e) = self.objects.check_consistency() {
            broken.push((Scope::Global, e));
        }
        for layout in &self.layouts {
            if let Err(e) = layout.objects().check_consistency() {
                broken.push((Scope::layout(layout.name()), e));
            }
        }
        broken
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a project file. Scene names must be unique, like on creation.
    pub fn from_json(json: &str) -> Result<Self> {
        let project: Self = serde_json::from_str(json)?;
        let duplicate = {
            let mut seen = HashSet::new();
            project
                .layouts
                .iter()
                .map(Layout::name)
                .find(|name| !seen.insert(*name))
                .map(str::to_string)
        };
        match duplicate {
            Some(name) => Err(ObjTreeError::SceneExists(name)),
            None => Ok(project),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let project = Self::from_json(&content)?;
        log::info!(
            "Loaded project '{}' from {} ({} scenes)",
            project.name,
            path.display(),
            project.layouts.len()
        );
        Ok(project)
    }

    /// Write the project, stamping the modification time
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.modified_at = Utc::now();
        fs::write(path, self.to_json()?)?;
        log::info!("Saved project '{}' to {}", self.name, path.display());
        Ok(())
    }

    fn layout_index(&self, name: &str) -> Option<usize> {
        self.layouts.iter().position(|l| l.name() == name)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Project")
    }
}

impl ObjectFactory for Project {
    fn create_object(&self, object_type: &str, name: &str) -> Result<Object> {
        self.registry.create_object(object_type, name)
    }
}

fn find_layout_mut<'a>(layouts: &'a mut [Layout], name: &str) -> Result<&'a mut Layout> {
    layouts
        .iter_mut()
        .find(|l| l.name() == name)
        .ok_or_else(|| ObjTreeError::SceneNotFound(name.to_string()))
}

fn container_in<'a>(
    objects: &'a mut ObjectsContainer,
    layouts: &'a mut [Layout],
    scope: &Scope,
) -> Result<&'a mut ObjectsContainer> {
    match scope {
        Scope::Global => Ok(objects),
        Scope::Layout(name) => find_layout_mut(layouts, name).map(Layout::objects_mut),
    }
}
