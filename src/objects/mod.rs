//! Object containers for scene editing
//!
//! The core data model:
//! - [`ObjectsContainer`]: ordered, uniquely named objects of one scope
//! - [`FolderTree`]: folders placing every object exactly once
//! - [`ObjectGroupsContainer`]: named groups of object names
//! - [`ObjectFactory`]: how the owning scope builds objects of a given type

mod container;
mod factory;
mod folder;
mod groups;
mod ids;
mod object;
mod serialize;
mod transfer;

pub use container::{ConsistencyError, ObjectsContainer};
pub use factory::{ObjectFactory, ObjectTypeRegistry};
pub use folder::{FolderTree, NodeRef, ROOT_FOLDER_NAME};
pub use groups::{ObjectGroup, ObjectGroupsContainer};
pub use ids::{ContainerId, NodeId, ObjectId};
pub use object::Object;
pub use transfer::{transfer_node, validate_transfer};
