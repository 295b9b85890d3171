//! Sharing containers across threads
//!
//! Containers do no locking of their own. [`SharedObjectsContainer`] puts
//! one behind a mutex; [`transfer_between_shared`] holds both locks for the
//! whole move and always takes them in ascending container id order, so
//! two threads moving in opposite directions cannot deadlock.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ObjTreeError, Result};
use crate::objects::{ContainerId, NodeId, ObjectsContainer};

#[derive(Debug, Clone)]
pub struct SharedObjectsContainer {
    id: ContainerId,
    inner: Arc<Mutex<ObjectsContainer>>,
}

impl SharedObjectsContainer {
    pub fn new(container: ObjectsContainer) -> Self {
        Self {
            id: container.id(),
            inner: Arc::new(Mutex::new(container)),
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, ObjectsContainer>> {
        self.inner.lock().map_err(|_| ObjTreeError::LockPoisoned)
    }

    /// Get the container back once no other handle is alive
    pub fn try_unwrap(self) -> std::result::Result<ObjectsContainer, Self> {
        let id = self.id;
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().map_err(|e| Self {
                id,
                inner: Arc::new(Mutex::new(e.into_inner())),
            }),
            Err(inner) => Err(Self { id, inner }),
        }
    }
}

/// Lock both containers in id order and move `node` from `source` to `target`
pub fn transfer_between_shared(
    source: &SharedObjectsContainer,
    node: NodeId,
    target: &SharedObjectsContainer,
    target_parent: NodeId,
    new_position: usize,
) -> Result<()> {
    if Arc::ptr_eq(&source.inner, &target.inner) {
        return Err(ObjTreeError::InvalidMove(
            "source and destination are the same container".to_string(),
        ));
    }

    let (mut source_guard, mut target_guard) = if source.id < target.id {
        let s = source.lock()?;
        let t = target.lock()?;
        (s, t)
    } else {
        let t = target.lock()?;
        let s = source.lock()?;
        (s, t)
    };

    source_guard.move_object_folder_or_object_to_another_container_in_folder(
        node,
        &mut target_guard,
        target_parent,
        new_position,
    )
}
