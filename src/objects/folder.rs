//! Folder tree placing every object of a container
//!
//! Nodes live in an arena keyed by [`NodeId`]. A node is either a folder
//! with ordered children or a leaf referencing one [`ObjectId`]. The tree
//! only knows object ids; names and the flat order belong to the container.
//!
//! Leaf insertion and removal are crate-internal: the container is the only
//! place allowed to change which objects exist.

use std::collections::{HashMap, HashSet};

use super::container::{ConsistencyError, ObjectsContainer};
use super::ids::{NodeId, ObjectId};
use super::object::Object;
use crate::error::{ObjTreeError, Result};

/// Name given to the root folder in serialized trees
pub const ROOT_FOLDER_NAME: &str = "__ROOT";

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Folder { name: String, children: Vec<NodeId> },
    Object(ObjectId),
}

/// A subtree cut out of one tree, ready to be grafted into another
#[derive(Debug)]
pub(crate) struct DetachedSubtree {
    root: NodeId,
    nodes: Vec<(NodeId, Node)>,
}

#[derive(Debug)]
pub struct FolderTree {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
    /// Leaf node of every placed object
    leaves: HashMap<ObjectId, NodeId>,
}

impl FolderTree {
    pub fn new() -> Self {
        let root = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                parent: None,
                kind: NodeKind::Folder {
                    name: ROOT_FOLDER_NAME.to_string(),
                    children: Vec::new(),
                },
            },
        );
        Self {
            root,
            nodes,
            leaves: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn is_folder(&self, node: NodeId) -> bool {
        matches!(
            self.nodes.get(&node),
            Some(Node {
                kind: NodeKind::Folder { .. },
                ..
            })
        )
    }

    pub fn is_root(&self, node: NodeId) -> bool {
        node == self.root
    }

    /// Name of a folder, `None` for leaves and unknown nodes
    pub fn folder_name(&self, node: NodeId) -> Option<&str> {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(NodeKind::Folder { name, .. }) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Object referenced by a leaf, `None` for folders and unknown nodes
    pub fn object_id(&self, node: NodeId) -> Option<ObjectId> {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(NodeKind::Object(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    /// Children of a folder in display order (empty for leaves)
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(NodeKind::Folder { children, .. }) => children,
            _ => &[],
        }
    }

    pub fn children_count(&self, folder: NodeId) -> usize {
        self.children(folder).len()
    }

    pub fn child_at(&self, folder: NodeId, index: usize) -> Result<NodeId> {
        let children = self.folder_children(folder)?;
        children
            .get(index)
            .copied()
            .ok_or(ObjTreeError::IndexOutOfBounds {
                index,
                count: children.len(),
            })
    }

    pub fn child_position(&self, folder: NodeId, node: NodeId) -> Option<usize> {
        self.children(folder).iter().position(|c| *c == node)
    }

    /// Leaf placing the given object
    pub fn leaf_of(&self, object: ObjectId) -> Option<NodeId> {
        self.leaves.get(&object).copied()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Folder names from below the root down to `node`.
    ///
    /// For a leaf this is the path of the folder holding it.
    pub fn folder_path(&self, node: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = if self.is_folder(node) {
            Some(node)
        } else {
            self.parent(node)
        };
        while let Some(id) = current {
            if id == self.root {
                break;
            }
            if let Some(name) = self.folder_name(id) {
                path.push(name.to_string());
            }
            current = self.parent(id);
        }
        path.reverse();
        path
    }

    /// Walk folder names from the root. An empty path is the root itself.
    pub fn find_folder_by_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<NodeId> {
        let mut current = self.root;
        for segment in segments {
            current = self.sibling_folder_named(current, segment.as_ref())?;
        }
        Some(current)
    }

    /// Child folder of `parent` with the given name
    pub fn sibling_folder_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.folder_name(*c) == Some(name))
    }

    /// Objects placed in the subtree under `node`, in display order
    pub fn objects_in_subtree(&self, node: NodeId) -> Vec<ObjectId> {
        let mut objects = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            match self.nodes.get(&id).map(|n| &n.kind) {
                Some(NodeKind::Object(object)) => objects.push(*object),
                Some(NodeKind::Folder { children, .. }) => {
                    stack.extend(children.iter().rev().copied());
                }
                None => {}
            }
        }
        objects
    }

    /// Create a folder under `parent` at child index `position` (clamped)
    pub fn insert_new_folder(&mut self, parent: NodeId, name: &str, position: usize) -> Result<NodeId> {
        self.require_folder(parent)?;
        if self.sibling_folder_named(parent, name).is_some() {
            return Err(ObjTreeError::FolderNameCollision(name.to_string()));
        }

        let id = NodeId::new();
        self.nodes.insert(
            id,
            Node {
                parent: Some(parent),
                kind: NodeKind::Folder {
                    name: name.to_string(),
                    children: Vec::new(),
                },
            },
        );
        self.insert_child(parent, id, position);
        log::debug!("Created folder '{}' under {}", name, parent);
        Ok(id)
    }

    pub fn rename_folder(&mut self, folder: NodeId, new_name: &str) -> Result<()> {
        self.require_folder(folder)?;
        if folder == self.root {
            return Err(ObjTreeError::InvalidMove(
                "the root folder cannot be renamed".to_string(),
            ));
        }
        if let Some(parent) = self.parent(folder) {
            if let Some(existing) = self.sibling_folder_named(parent, new_name) {
                if existing != folder {
                    return Err(ObjTreeError::FolderNameCollision(new_name.to_string()));
                }
            }
        }
        if let Some(Node {
            kind: NodeKind::Folder { name, .. },
            ..
        }) = self.nodes.get_mut(&folder)
        {
            *name = new_name.to_string();
        }
        Ok(())
    }

    /// Reorder a folder's children. Both indices must be in bounds.
    pub fn move_child(&mut self, folder: NodeId, old_index: usize, new_index: usize) -> Result<()> {
        let children = self.folder_children_mut(folder)?;
        let count = children.len();
        for index in [old_index, new_index] {
            if index >= count {
                return Err(ObjTreeError::IndexOutOfBounds { index, count });
            }
        }
        let node = children.remove(old_index);
        children.insert(new_index, node);
        Ok(())
    }

    /// Re-parent a node inside this tree at child index `position` (clamped)
    pub fn move_to_folder(&mut self, node: NodeId, new_parent: NodeId, position: usize) -> Result<()> {
        if !self.contains(node) {
            return Err(ObjTreeError::InvalidFolderReference(node.to_string()));
        }
        if node == self.root {
            return Err(ObjTreeError::InvalidMove(
                "the root folder cannot be moved".to_string(),
            ));
        }
        self.require_folder(new_parent)?;
        if node == new_parent || self.is_descendant_of(new_parent, node) {
            return Err(ObjTreeError::InvalidMove(
                "a folder cannot be moved inside itself".to_string(),
            ));
        }
        if let Some(name) = self.folder_name(node) {
            if let Some(existing) = self.sibling_folder_named(new_parent, name) {
                if existing != node {
                    return Err(ObjTreeError::FolderNameCollision(name.to_string()));
                }
            }
        }

        if let Some(old_parent) = self.parent(node) {
            self.remove_child(old_parent, node);
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = Some(new_parent);
        }
        self.insert_child(new_parent, node, position);
        Ok(())
    }

    pub(crate) fn require_folder(&self, node: NodeId) -> Result<()> {
        if !self.contains(node) {
            return Err(ObjTreeError::InvalidFolderReference(node.to_string()));
        }
        if !self.is_folder(node) {
            return Err(ObjTreeError::NotAFolder(node.to_string()));
        }
        Ok(())
    }

    /// Place an object in `folder`, appended after its current children
    pub(crate) fn insert_leaf(&mut self, folder: NodeId, object: ObjectId) -> Result<NodeId> {
        self.require_folder(folder)?;
        let id = NodeId::new();
        self.nodes.insert(
            id,
            Node {
                parent: Some(folder),
                kind: NodeKind::Object(object),
            },
        );
        self.leaves.insert(object, id);
        self.insert_child(folder, id, usize::MAX);
        Ok(id)
    }

    /// Drop the leaf of an object, wherever it is nested
    pub(crate) fn remove_leaf(&mut self, object: ObjectId) -> Option<NodeId> {
        let leaf = self.leaves.remove(&object)?;
        if let Some(node) = self.nodes.remove(&leaf) {
            if let Some(parent) = node.parent {
                self.remove_child(parent, leaf);
            }
        }
        Some(leaf)
    }

    /// Cut `node` and everything under it out of the tree
    pub(crate) fn detach(&mut self, node: NodeId) -> Result<DetachedSubtree> {
        if !self.contains(node) {
            return Err(ObjTreeError::InvalidFolderReference(node.to_string()));
        }
        if node == self.root {
            return Err(ObjTreeError::InvalidMove(
                "the root folder cannot be detached".to_string(),
            ));
        }
        if let Some(parent) = self.parent(node) {
            self.remove_child(parent, node);
        }

        let mut nodes = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.remove(&id) {
                match &n.kind {
                    NodeKind::Object(object) => {
                        self.leaves.remove(object);
                    }
                    NodeKind::Folder { children, .. } => stack.extend(children.iter().copied()),
                }
                nodes.push((id, n));
            }
        }
        Ok(DetachedSubtree { root: node, nodes })
    }

    /// Graft a detached subtree under `parent`, appended after its children
    pub(crate) fn attach(&mut self, subtree: DetachedSubtree, parent: NodeId) -> Result<()> {
        self.require_folder(parent)?;
        let root = subtree.root;
        for (id, mut node) in subtree.nodes {
            if id == root {
                node.parent = Some(parent);
            }
            if let NodeKind::Object(object) = node.kind {
                self.leaves.insert(object, id);
            }
            self.nodes.insert(id, node);
        }
        self.insert_child(parent, root, usize::MAX);
        Ok(())
    }

    /// Drop every node except an empty root
    pub(crate) fn clear(&mut self) {
        self.nodes.retain(|id, _| *id == self.root);
        self.leaves.clear();
        if let Some(Node {
            kind: NodeKind::Folder { children, .. },
            ..
        }) = self.nodes.get_mut(&self.root)
        {
            children.clear();
        }
    }

    /// Verify parent links, reachability and the leaf index.
    ///
    /// Returns the objects placed in the tree.
    pub(crate) fn check(&self) -> std::result::Result<HashSet<ObjectId>, ConsistencyError> {
        let mut seen = HashSet::new();
        let mut placed = HashSet::new();
        let mut stack = vec![self.root];

        match self.nodes.get(&self.root) {
            Some(Node {
                parent: None,
                kind: NodeKind::Folder { .. },
            }) => {}
            _ => return Err(ConsistencyError::BrokenRoot),
        }

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(ConsistencyError::NodeReachedTwice(id));
            }
            let node = self
                .nodes
                .get(&id)
                .ok_or(ConsistencyError::DanglingNode(id))?;
            match &node.kind {
                NodeKind::Object(object) => {
                    if !placed.insert(*object) {
                        return Err(ConsistencyError::ObjectPlacedTwice(*object));
                    }
                    if self.leaves.get(object) != Some(&id) {
                        return Err(ConsistencyError::StaleLeafIndex(*object));
                    }
                }
                NodeKind::Folder { children, .. } => {
                    for child in children {
                        let child_node = self
                            .nodes
                            .get(child)
                            .ok_or(ConsistencyError::DanglingNode(*child))?;
                        if child_node.parent != Some(id) {
                            return Err(ConsistencyError::WrongParent(*child));
                        }
                        stack.push(*child);
                    }
                }
            }
        }

        if seen.len() != self.nodes.len() {
            return Err(ConsistencyError::UnreachableNodes(self.nodes.len() - seen.len()));
        }
        if placed.len() != self.leaves.len() {
            return Err(ConsistencyError::LeafIndexSize {
                placed: placed.len(),
                indexed: self.leaves.len(),
            });
        }
        Ok(placed)
    }

    fn folder_children(&self, folder: NodeId) -> Result<&Vec<NodeId>> {
        match self.nodes.get(&folder).map(|n| &n.kind) {
            Some(NodeKind::Folder { children, .. }) => Ok(children),
            Some(NodeKind::Object(_)) => Err(ObjTreeError::NotAFolder(folder.to_string())),
            None => Err(ObjTreeError::InvalidFolderReference(folder.to_string())),
        }
    }

    fn folder_children_mut(&mut self, folder: NodeId) -> Result<&mut Vec<NodeId>> {
        match self.nodes.get_mut(&folder).map(|n| &mut n.kind) {
            Some(NodeKind::Folder { children, .. }) => Ok(children),
            Some(NodeKind::Object(_)) => Err(ObjTreeError::NotAFolder(folder.to_string())),
            None => Err(ObjTreeError::InvalidFolderReference(folder.to_string())),
        }
    }

    fn insert_child(&mut self, folder: NodeId, child: NodeId, position: usize) {
        if let Ok(children) = self.folder_children_mut(folder) {
            let position = position.min(children.len());
            children.insert(position, child);
        }
    }

    fn remove_child(&mut self, folder: NodeId, child: NodeId) {
        if let Ok(children) = self.folder_children_mut(folder) {
            children.retain(|c| *c != child);
        }
    }
}

impl Default for FolderTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of one node, able to resolve the object a leaf references
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    container: &'a ObjectsContainer,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(container: &'a ObjectsContainer, id: NodeId) -> Self {
        Self { container, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_folder(&self) -> bool {
        self.container.folders().is_folder(self.id)
    }

    pub fn is_root(&self) -> bool {
        self.container.folders().is_root(self.id)
    }

    pub fn folder_name(&self) -> Option<&'a str> {
        self.container.folders().folder_name(self.id)
    }

    /// The object this leaf references
    pub fn object(&self) -> Option<&'a Object> {
        let id = self.container.folders().object_id(self.id)?;
        self.container.object_by_id(id)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        let container = self.container;
        container
            .folders()
            .parent(self.id)
            .map(|p| NodeRef::new(container, p))
    }

    pub fn children_count(&self) -> usize {
        self.container.folders().children_count(self.id)
    }

    pub fn child_at(&self, index: usize) -> Option<NodeRef<'a>> {
        let container = self.container;
        container
            .folders()
            .children(self.id)
            .get(index)
            .map(|c| NodeRef::new(container, *c))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let container = self.container;
        container
            .folders()
            .children(self.id)
            .iter()
            .map(move |c| NodeRef::new(container, *c))
    }

    /// Whether an object with this name is placed anywhere under this node
    pub fn has_object_named(&self, name: &str) -> bool {
        self.container
            .folders()
            .objects_in_subtree(self.id)
            .into_iter()
            .filter_map(|id| self.container.object_by_id(id))
            .any(|o| o.name() == name)
    }

    pub fn path(&self) -> Vec<String> {
        self.container.folders().folder_path(self.id)
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.object() {
            Some(object) => write!(f, "Leaf({})", object.name()),
            None => write!(f, "Folder({})", self.folder_name().unwrap_or_default()),
        }
    }
}
