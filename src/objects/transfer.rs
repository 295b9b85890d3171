//! Moving objects and folders between containers
//!
//! A transfer checks every precondition on both sides before touching
//! either container, then extracts the subtree from the source and grafts
//! it into the target. Once checks pass the remaining steps cannot fail,
//! so callers observe either the whole move or nothing.

use super::container::ObjectsContainer;
use super::ids::NodeId;
use crate::error::{ObjTreeError, Result};

/// Move `node` (a leaf or a folder subtree) from `source` into `target`.
///
/// The node is appended to `target_parent`'s children. Moved objects enter
/// the target's flat order at `new_position` (clamped) in their source
/// flat order. Source group memberships of moved objects are dropped.
pub fn transfer_node(
    source: &mut ObjectsContainer,
    node: NodeId,
    target: &mut ObjectsContainer,
    target_parent: NodeId,
    new_position: usize,
) -> Result<()> {
    validate_transfer(source, node, target, target_parent)?;

    let (subtree, objects) = source.extract_subtree(node)?;
    let moved = objects.len();
    target.graft_subtree(subtree, objects, target_parent, new_position)?;

    log::debug!(
        "Moved node {} with {} objects from container {} to container {}",
        node,
        moved,
        source.id(),
        target.id()
    );
    Ok(())
}

/// Every check a transfer performs, without mutating anything
pub fn validate_transfer(
    source: &ObjectsContainer,
    node: NodeId,
    target: &ObjectsContainer,
    target_parent: NodeId,
) -> Result<()> {
    let tree = source.folders();
    if !tree.contains(node) {
        return Err(ObjTreeError::InvalidFolderReference(node.to_string()));
    }
    if tree.is_root(node) {
        return Err(ObjTreeError::InvalidMove(
            "the root folder cannot be moved to another container".to_string(),
        ));
    }
    target.folders().require_folder(target_parent)?;

    // Collisions anywhere in the subtree abort the whole move.
    for id in tree.objects_in_subtree(node) {
        if let Some(object) = source.object_by_id(id) {
            if target.has_object_named(object.name()) {
                return Err(ObjTreeError::CrossContainerCollision(
                    object.name().to_string(),
                ));
            }
        }
    }

    if let Some(name) = tree.folder_name(node) {
        if target
            .folders()
            .sibling_folder_named(target_parent, name)
            .is_some()
        {
            return Err(ObjTreeError::FolderNameCollision(name.to_string()));
        }
    }
    Ok(())
}
