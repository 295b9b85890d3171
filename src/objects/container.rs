//! Objects container
//!
//! Owns the objects of one scope (the global objects of a project, or the
//! objects of a scene). Objects live in an arena keyed by [`ObjectId`] and
//! are indexed three ways:
//!
//! - the flat order, which decides iteration order for the rest of the engine
//! - the folder tree, which decides how objects are displayed
//! - a name index, names being unique within a container
//!
//! Flat order and folder order are independent. Every structural mutation
//! re-validates that the flat order and the tree leaves reference the same
//! objects; a divergence is a bug and panics.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::factory::ObjectFactory;
use super::folder::{DetachedSubtree, FolderTree, NodeRef};
use super::groups::ObjectGroupsContainer;
use super::ids::{ContainerId, NodeId, ObjectId};
use super::object::Object;
use super::transfer;
use crate::error::{ObjTreeError, Result};

/// A broken structural invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("root node is missing or not a folder")]
    BrokenRoot,
    #[error("node {0} is referenced but not stored")]
    DanglingNode(NodeId),
    #[error("node {0} is reachable twice")]
    NodeReachedTwice(NodeId),
    #[error("node {0} has a wrong parent link")]
    WrongParent(NodeId),
    #[error("{0} nodes are not reachable from the root")]
    UnreachableNodes(usize),
    #[error("object {0} has more than one leaf")]
    ObjectPlacedTwice(ObjectId),
    #[error("leaf index is stale for object {0}")]
    StaleLeafIndex(ObjectId),
    #[error("leaf index has {indexed} entries for {placed} placed objects")]
    LeafIndexSize { placed: usize, indexed: usize },
    #[error("flat order has {ordered} entries for {stored} stored objects")]
    OrderSize { ordered: usize, stored: usize },
    #[error("object {0} appears twice in the flat order")]
    DuplicateInOrder(ObjectId),
    #[error("object {0} is ordered but not stored")]
    MissingObject(ObjectId),
    #[error("name index is stale for '{0}'")]
    StaleNameIndex(String),
    #[error("name index has {indexed} entries for {stored} stored objects")]
    NameIndexSize { indexed: usize, stored: usize },
    #[error("object {0} has no folder leaf")]
    Unplaced(ObjectId),
    #[error("a leaf references object {0}, which is not stored")]
    PlacedButMissing(ObjectId),
}

#[derive(Debug)]
pub struct ObjectsContainer {
    id: ContainerId,
    objects: HashMap<ObjectId, Object>,
    order: Vec<ObjectId>,
    names: HashMap<String, ObjectId>,
    tree: FolderTree,
    groups: ObjectGroupsContainer,
}

impl ObjectsContainer {
    pub fn new() -> Self {
        Self {
            id: ContainerId::new(),
            objects: HashMap::new(),
            order: Vec::new(),
            names: HashMap::new(),
            tree: FolderTree::new(),
            groups: ObjectGroupsContainer::new(),
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Create an object with the scope's factory and place it at the root.
    ///
    /// `position` is a flat index, clamped to the append point.
    pub fn insert_new_object(
        &mut self,
        scope: &dyn ObjectFactory,
        object_type: &str,
        name: &str,
        position: usize,
    ) -> Result<&mut Object> {
        let root = self.tree.root();
        self.insert_new_object_in_folder(scope, object_type, name, root, position)
    }

    /// Create an object and place it as the last child of `folder`.
    ///
    /// `position` is a flat index, not a position among the folder's children.
    pub fn insert_new_object_in_folder(
        &mut self,
        scope: &dyn ObjectFactory,
        object_type: &str,
        name: &str,
        folder: NodeId,
        position: usize,
    ) -> Result<&mut Object> {
        if self.has_object_named(name) {
            return Err(ObjTreeError::NameCollision(name.to_string()));
        }
        self.tree.require_folder(folder)?;
        let mut object = scope.create_object(object_type, name)?;
        object.set_name(name);
        self.insert_object_in_folder(object, folder, position)
    }

    /// Insert an already built object at the root
    pub fn insert_object(&mut self, object: Object, position: usize) -> Result<&mut Object> {
        let root = self.tree.root();
        self.insert_object_in_folder(object, root, position)
    }

    pub fn insert_object_in_folder(
        &mut self,
        object: Object,
        folder: NodeId,
        position: usize,
    ) -> Result<&mut Object> {
        if self.has_object_named(object.name()) {
            return Err(ObjTreeError::NameCollision(object.name().to_string()));
        }
        self.tree.require_folder(folder)?;

        let id = ObjectId::new();
        self.tree.insert_leaf(folder, id)?;
        let position = position.min(self.order.len());
        self.order.insert(position, id);
        self.names.insert(object.name().to_string(), id);
        log::debug!(
            "Inserted object '{}' ({}) at position {} in container {}",
            object.name(),
            object.object_type(),
            position,
            self.id
        );
        let name = object.name().to_string();
        self.objects.insert(id, object);
        self.assert_consistent();

        self.objects
            .get_mut(&id)
            .ok_or(ObjTreeError::ObjectNotFound(name))
    }

    pub fn has_object_named(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn get_object(&self, name: &str) -> Result<&Object> {
        self.names
            .get(name)
            .and_then(|id| self.objects.get(id))
            .ok_or_else(|| ObjTreeError::ObjectNotFound(name.to_string()))
    }

    pub fn get_object_mut(&mut self, name: &str) -> Result<&mut Object> {
        match self.names.get(name) {
            Some(id) => self
                .objects
                .get_mut(id)
                .ok_or_else(|| ObjTreeError::ObjectNotFound(name.to_string())),
            None => Err(ObjTreeError::ObjectNotFound(name.to_string())),
        }
    }

    pub fn get_object_at(&self, position: usize) -> Result<&Object> {
        self.order
            .get(position)
            .and_then(|id| self.objects.get(id))
            .ok_or(ObjTreeError::IndexOutOfBounds {
                index: position,
                count: self.order.len(),
            })
    }

    /// Flat index of an object, `None` if no object has this name
    pub fn get_object_position(&self, name: &str) -> Option<usize> {
        let id = self.names.get(name)?;
        self.order.iter().position(|o| o == id)
    }

    /// Remove an object, its folder leaf and its group memberships
    pub fn remove_object(&mut self, name: &str) -> Result<Object> {
        let id = self
            .names
            .get(name)
            .copied()
            .ok_or_else(|| ObjTreeError::ObjectNotFound(name.to_string()))?;
        let object = self
            .take_object(id)
            .ok_or_else(|| ObjTreeError::ObjectNotFound(name.to_string()))?;
        self.assert_consistent();
        log::debug!("Removed object '{}' from container {}", name, self.id);
        Ok(object)
    }

    /// Rename an object. Group memberships follow; flat and folder positions do not change.
    pub fn rename_object(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if old_name == new_name {
            return self.get_object(old_name).map(|_| ());
        }
        if self.has_object_named(new_name) {
            return Err(ObjTreeError::NameCollision(new_name.to_string()));
        }
        let id = self
            .names
            .remove(old_name)
            .ok_or_else(|| ObjTreeError::ObjectNotFound(old_name.to_string()))?;
        self.names.insert(new_name.to_string(), id);
        if let Some(object) = self.objects.get_mut(&id) {
            object.set_name(new_name);
        }
        self.groups.rename_object_everywhere(old_name, new_name);
        self.assert_consistent();
        Ok(())
    }

    /// Reorder the flat sequence. Folder placement is untouched.
    pub fn move_object(&mut self, old_index: usize, new_index: usize) -> Result<()> {
        self.check_index(old_index)?;
        self.check_index(new_index)?;
        let id = self.order.remove(old_index);
        self.order.insert(new_index, id);
        Ok(())
    }

    pub fn swap_objects(&mut self, first: usize, second: usize) -> Result<()> {
        self.check_index(first)?;
        self.check_index(second)?;
        self.order.swap(first, second);
        Ok(())
    }

    /// Move an object, or a folder with everything under it, into another container.
    ///
    /// The node becomes the last child of `target_parent_folder`; the moved
    /// objects enter the target's flat order at `new_position` (clamped),
    /// keeping their relative order. Nothing changes on either side if any
    /// moved name already exists in the target.
    pub fn move_object_folder_or_object_to_another_container_in_folder(
        &mut self,
        node: NodeId,
        target: &mut ObjectsContainer,
        target_parent_folder: NodeId,
        new_position: usize,
    ) -> Result<()> {
        transfer::transfer_node(self, node, target, target_parent_folder, new_position)
    }

    /// Remove a folder and every object placed under it
    pub fn remove_folder(&mut self, folder: NodeId) -> Result<Vec<Object>> {
        self.tree.require_folder(folder)?;
        if self.tree.is_root(folder) {
            return Err(ObjTreeError::InvalidMove(
                "the root folder cannot be removed".to_string(),
            ));
        }
        let ids = self.ordered_subtree_objects(folder);
        self.tree.detach(folder)?;
        let removed: Vec<Object> = ids.into_iter().filter_map(|id| self.take_object(id)).collect();
        self.assert_consistent();
        log::debug!(
            "Removed folder {} and {} objects from container {}",
            folder,
            removed.len(),
            self.id
        );
        Ok(removed)
    }

    pub fn objects_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Objects in flat order
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.order.iter().filter_map(move |id| self.objects.get(id))
    }

    pub fn root_folder(&self) -> NodeRef<'_> {
        NodeRef::new(self, self.tree.root())
    }

    pub fn node(&self, node: NodeId) -> Option<NodeRef<'_>> {
        self.tree.contains(node).then(|| NodeRef::new(self, node))
    }

    /// Leaf placing the named object
    pub fn node_of(&self, name: &str) -> Option<NodeId> {
        let id = self.names.get(name)?;
        self.tree.leaf_of(*id)
    }

    pub fn folders(&self) -> &FolderTree {
        &self.tree
    }

    /// Tree shaping: folders can be added, renamed and moved, objects re-placed.
    pub fn folders_mut(&mut self) -> &mut FolderTree {
        &mut self.tree
    }

    pub fn object_groups(&self) -> &ObjectGroupsContainer {
        &self.groups
    }

    pub fn object_groups_mut(&mut self) -> &mut ObjectGroupsContainer {
        &mut self.groups
    }

    /// Release everything the container owns: groups first, then tree nodes, then objects.
    pub fn dispose(mut self) {
        log::debug!(
            "Disposing container {} ({} objects, {} groups)",
            self.id,
            self.order.len(),
            self.groups.count()
        );
        self.groups.clear();
        self.tree.clear();
        self.order.clear();
        self.names.clear();
        self.objects.clear();
    }

    /// Validate every structural invariant
    pub fn check_consistency(&self) -> std::result::Result<(), ConsistencyError> {
        if self.order.len() != self.objects.len() {
            return Err(ConsistencyError::OrderSize {
                ordered: self.order.len(),
                stored: self.objects.len(),
            });
        }
        if self.names.len() != self.objects.len() {
            return Err(ConsistencyError::NameIndexSize {
                indexed: self.names.len(),
                stored: self.objects.len(),
            });
        }

        let mut ordered = HashSet::with_capacity(self.order.len());
        for id in &self.order {
            if !ordered.insert(*id) {
                return Err(ConsistencyError::DuplicateInOrder(*id));
            }
            let object = self
                .objects
                .get(id)
                .ok_or(ConsistencyError::MissingObject(*id))?;
            if self.names.get(object.name()) != Some(id) {
                return Err(ConsistencyError::StaleNameIndex(object.name().to_string()));
            }
        }

        let placed = self.tree.check()?;
        if let Some(id) = ordered.iter().find(|id| !placed.contains(*id)) {
            return Err(ConsistencyError::Unplaced(*id));
        }
        if let Some(id) = placed.iter().find(|id| !ordered.contains(*id)) {
            return Err(ConsistencyError::PlacedButMissing(*id));
        }
        Ok(())
    }

    pub(crate) fn object_by_id(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    /// Cut a node out with its objects, objects listed in flat order
    pub(crate) fn extract_subtree(
        &mut self,
        node: NodeId,
    ) -> Result<(DetachedSubtree, Vec<(ObjectId, Object)>)> {
        let ids = self.ordered_subtree_objects(node);
        let subtree = self.tree.detach(node)?;
        let objects = ids
            .into_iter()
            .filter_map(|id| self.take_object(id).map(|o| (id, o)))
            .collect();
        self.assert_consistent();
        Ok((subtree, objects))
    }

    /// Graft a subtree extracted from another container.
    ///
    /// Callers validate names and the parent folder beforehand.
    pub(crate) fn graft_subtree(
        &mut self,
        subtree: DetachedSubtree,
        objects: Vec<(ObjectId, Object)>,
        parent: NodeId,
        position: usize,
    ) -> Result<()> {
        self.tree.attach(subtree, parent)?;
        let mut position = position.min(self.order.len());
        for (id, object) in objects {
            self.order.insert(position, id);
            self.names.insert(object.name().to_string(), id);
            self.objects.insert(id, object);
            position += 1;
        }
        self.assert_consistent();
        Ok(())
    }

    fn ordered_subtree_objects(&self, node: NodeId) -> Vec<ObjectId> {
        let in_subtree: HashSet<ObjectId> = self.tree.objects_in_subtree(node).into_iter().collect();
        self.order
            .iter()
            .copied()
            .filter(|id| in_subtree.contains(id))
            .collect()
    }

    /// Drop an object from every index. Leaves already detached are skipped.
    fn take_object(&mut self, id: ObjectId) -> Option<Object> {
        let object = self.objects.remove(&id)?;
        self.names.remove(object.name());
        self.order.retain(|o| *o != id);
        self.tree.remove_leaf(id);
        self.groups.remove_object_everywhere(object.name());
        Some(object)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.order.len() {
            return Err(ObjTreeError::IndexOutOfBounds {
                index,
                count: self.order.len(),
            });
        }
        Ok(())
    }

    fn assert_consistent(&self) {
        if let Err(e) = self.check_consistency() {
            panic!("objects container {} is corrupted: {}", self.id, e);
        }
    }
}

impl Default for ObjectsContainer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectTypeRegistry;

    fn names(container: &ObjectsContainer) -> Vec<String> {
        container.objects().map(|o| o.name().to_string()).collect()
    }

    fn leaf_names(container: &ObjectsContainer) -> Vec<String> {
        let mut names: Vec<String> = container
            .folders()
            .objects_in_subtree(container.folders().root())
            .into_iter()
            .filter_map(|id| container.object_by_id(id))
            .map(|o| o.name().to_string())
            .collect();
        names.sort();
        names
    }

    fn container_with(names: &[&str]) -> ObjectsContainer {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = ObjectsContainer::new();
        for (i, name) in names.iter().enumerate() {
            container.insert_new_object(&registry, "Sprite", name, i).unwrap();
        }
        container
    }

    #[test]
    fn test_insert_at_position() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = container_with(&["Player", "Enemy1"]);

        container
            .insert_new_object(&registry, "Sprite", "Enemy2", 1)
            .unwrap();

        assert_eq!(names(&container), vec!["Player", "Enemy2", "Enemy1"]);
        assert_eq!(container.get_object_position("Enemy2"), Some(1));
    }

    #[test]
    fn test_insert_in_root_folder() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = ObjectsContainer::new();
        let root = container.root_folder().id();

        container
            .insert_new_object_in_folder(&registry, "Sprite", "Hero", root, 0)
            .unwrap();

        let root = container.root_folder();
        assert_eq!(root.children_count(), 1);
        let leaf = root.child_at(0).unwrap();
        assert_eq!(leaf.object().map(|o| o.name()), Some("Hero"));
        assert_eq!(container.objects_count(), 1);
    }

    #[test]
    fn test_insert_position_is_clamped() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = container_with(&["A", "B"]);
        container.insert_new_object(&registry, "Sprite", "C", 42).unwrap();
        assert_eq!(names(&container), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_duplicate_insert_changes_nothing() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = container_with(&["Player", "Enemy"]);

        let result = container.insert_new_object(&registry, "TextObject::Text", "Enemy", 0);
        assert!(matches!(result, Err(ObjTreeError::NameCollision(ref n)) if n == "Enemy"));

        let result = container.insert_object(Object::new("Sprite", "Player"), 0);
        assert!(matches!(result, Err(ObjTreeError::NameCollision(_))));

        assert_eq!(names(&container), vec!["Player", "Enemy"]);
        assert_eq!(container.get_object("Enemy").unwrap().object_type(), "Sprite");
        assert_eq!(container.root_folder().children_count(), 2);
    }

    #[test]
    fn test_insert_in_folder_places_leaf() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = container_with(&["Player"]);
        let root = container.folders().root();
        let enemies = container.folders_mut().insert_new_folder(root, "Enemies", 0).unwrap();

        container
            .insert_new_object_in_folder(&registry, "Sprite", "Bat", enemies, 0)
            .unwrap();

        assert_eq!(names(&container), vec!["Bat", "Player"]);
        let leaf = container.node_of("Bat").unwrap();
        assert_eq!(container.folders().parent(leaf), Some(enemies));
        assert!(container.node(enemies).unwrap().has_object_named("Bat"));
        assert!(!container.node(enemies).unwrap().has_object_named("Player"));
    }

    #[test]
    fn test_insert_in_foreign_folder_fails() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = ObjectsContainer::new();
        let other = ObjectsContainer::new();

        let result = container.insert_new_object_in_folder(
            &registry,
            "Sprite",
            "Bat",
            other.folders().root(),
            0,
        );
        assert!(matches!(result, Err(ObjTreeError::InvalidFolderReference(_))));
        assert!(container.is_empty());
    }

    #[test]
    fn test_insert_in_leaf_fails() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = container_with(&["Player"]);
        let leaf = container.node_of("Player").unwrap();
        let result = container.insert_new_object_in_folder(&registry, "Sprite", "Bat", leaf, 0);
        assert!(matches!(result, Err(ObjTreeError::NotAFolder(_))));
        assert_eq!(container.objects_count(), 1);
    }

    #[test]
    fn test_position_then_lookup_round_trip() {
        let container = container_with(&["A", "B", "C", "D"]);
        for name in ["A", "B", "C", "D"] {
            let position = container.get_object_position(name).unwrap();
            assert_eq!(container.get_object_at(position).unwrap().name(), name);
        }
        assert_eq!(container.get_object_position("Nope"), None);
    }

    #[test]
    fn test_get_object_at_out_of_bounds() {
        let container = container_with(&["A"]);
        let err = container.get_object_at(1).unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, ObjTreeError::IndexOutOfBounds { index: 1, count: 1 }));
    }

    #[test]
    fn test_remove_cascades_to_leaf_and_groups() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = container_with(&["Player"]);
        let root = container.folders().root();
        let outer = container.folders_mut().insert_new_folder(root, "Outer", 0).unwrap();
        let inner = container.folders_mut().insert_new_folder(outer, "Inner", 0).unwrap();
        container
            .insert_new_object_in_folder(&registry, "Sprite", "Bat", inner, 1)
            .unwrap();
        container
            .object_groups_mut()
            .insert_new("Enemies", 0)
            .unwrap()
            .add_object("Bat");

        let removed = container.remove_object("Bat").unwrap();
        assert_eq!(removed.name(), "Bat");
        assert_eq!(names(&container), vec!["Player"]);
        assert_eq!(container.folders().children_count(inner), 0);
        assert!(container
            .object_groups()
            .get("Enemies")
            .unwrap()
            .object_names()
            .is_empty());
    }

    #[test]
    fn test_remove_missing_is_reported() {
        let mut container = container_with(&["A", "B"]);
        let err = container.remove_object("C").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(container.objects_count(), 2);
        container.check_consistency().unwrap();
    }

    #[test]
    fn test_move_round_trip() {
        let mut container = container_with(&["A", "B", "C", "D"]);
        let original = names(&container);

        container.move_object(0, 3).unwrap();
        assert_eq!(names(&container), vec!["B", "C", "D", "A"]);
        container.move_object(3, 0).unwrap();
        assert_eq!(names(&container), original);

        container.move_object(2, 1).unwrap();
        container.move_object(1, 2).unwrap();
        assert_eq!(names(&container), original);
    }

    #[test]
    fn test_move_does_not_clamp() {
        let mut container = container_with(&["A", "B"]);
        assert!(matches!(
            container.move_object(0, 2),
            Err(ObjTreeError::IndexOutOfBounds { index: 2, count: 2 })
        ));
        assert!(container.move_object(5, 0).is_err());
        assert_eq!(names(&container), vec!["A", "B"]);
    }

    #[test]
    fn test_move_keeps_folder_placement() {
        let mut container = container_with(&["A", "B", "C"]);
        let root = container.folders().root();
        let before: Vec<NodeId> = container.folders().children(root).to_vec();
        container.move_object(0, 2).unwrap();
        assert_eq!(container.folders().children(root), before.as_slice());
    }

    #[test]
    fn test_swap_objects() {
        let mut container = container_with(&["A", "B", "C"]);
        container.swap_objects(0, 2).unwrap();
        assert_eq!(names(&container), vec!["C", "B", "A"]);
        assert!(container.swap_objects(0, 3).is_err());
    }

    #[test]
    fn test_rename_object() {
        let mut container = container_with(&["Player", "Enemy"]);
        container
            .object_groups_mut()
            .insert_new("All", 0)
            .unwrap()
            .add_object("Enemy");

        assert!(matches!(
            container.rename_object("Enemy", "Player"),
            Err(ObjTreeError::NameCollision(_))
        ));
        assert!(container.rename_object("Ghost", "Spirit").unwrap_err().is_not_found());

        container.rename_object("Enemy", "Bat").unwrap();
        assert!(!container.has_object_named("Enemy"));
        assert_eq!(container.get_object_position("Bat"), Some(1));
        assert!(container.object_groups().get("All").unwrap().has_object("Bat"));
        assert_eq!(
            container.root_folder().child_at(1).and_then(|n| n.object()).map(|o| o.name()),
            Some("Bat")
        );
    }

    #[test]
    fn test_remove_folder_removes_objects() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = container_with(&["Player"]);
        let root = container.folders().root();
        let enemies = container.folders_mut().insert_new_folder(root, "Enemies", 0).unwrap();
        for name in ["Bat", "Owl"] {
            container
                .insert_new_object_in_folder(&registry, "Sprite", name, enemies, 0)
                .unwrap();
        }

        let removed = container.remove_folder(enemies).unwrap();
        let mut removed: Vec<&str> = removed.iter().map(|o| o.name()).collect();
        removed.sort();
        assert_eq!(removed, vec!["Bat", "Owl"]);
        assert_eq!(names(&container), vec!["Player"]);
        assert!(!container.folders().contains(enemies));
        assert!(matches!(
            container.remove_folder(root),
            Err(ObjTreeError::InvalidMove(_))
        ));
    }

    #[test]
    fn test_flat_and_tree_stay_in_sync() {
        let registry = ObjectTypeRegistry::with_builtin_types();
        let mut container = ObjectsContainer::new();
        let root = container.folders().root();
        let folder = container.folders_mut().insert_new_folder(root, "F", 0).unwrap();

        for i in 0..20 {
            let name = format!("Object{}", i);
            let target = if i % 3 == 0 { folder } else { root };
            container
                .insert_new_object_in_folder(&registry, "Sprite", &name, target, i * 7 % 5)
                .unwrap();
            if i % 4 == 3 {
                container.remove_object(&format!("Object{}", i - 1)).unwrap();
            }
            let mut flat = names(&container);
            flat.sort();
            assert_eq!(flat, leaf_names(&container));
        }
    }

    #[test]
    fn test_dispose_consumes_container() {
        let mut container = container_with(&["A", "B"]);
        container.object_groups_mut().insert_new("G", 0).unwrap();
        container.dispose();
    }
}
