//! Error types for objtree

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjTreeError {
    #[error("An object named '{0}' already exists")]
    NameCollision(String),

    #[error("No object named '{0}'")]
    ObjectNotFound(String),

    #[error("Index {index} is out of bounds (count is {count})")]
    IndexOutOfBounds { index: usize, count: usize },

    #[error("Destination already has an object named '{0}'")]
    CrossContainerCollision(String),

    #[error("Node {0} does not belong to this container's folder tree")]
    InvalidFolderReference(String),

    #[error("Node {0} is not a folder")]
    NotAFolder(String),

    #[error("A folder named '{0}' already exists here")]
    FolderNameCollision(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("A group named '{0}' already exists")]
    GroupNameCollision(String),

    #[error("No group named '{0}'")]
    GroupNotFound(String),

    #[error("Unknown object type: {0}")]
    UnknownObjectType(String),

    #[error("No scene named '{0}'")]
    SceneNotFound(String),

    #[error("A scene named '{0}' already exists")]
    SceneExists(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Destructive statements are not enabled. Use --allow-actions to modify or delete content")]
    ActionsDisabled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Container lock poisoned")]
    LockPoisoned,
}

impl ObjTreeError {
    /// Lookups that missed: recoverable, the container stays usable
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ObjTreeError::ObjectNotFound(_)
                | ObjTreeError::IndexOutOfBounds { .. }
                | ObjTreeError::GroupNotFound(_)
                | ObjTreeError::SceneNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ObjTreeError>;
