//! Abstract Syntax Tree definitions for the objtree command language

use serde::{Deserialize, Serialize};

use crate::project::Scope;

/// Top-level command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Scope(ScopeCommand),
    Object(ObjectCommand),
    Folder(FolderCommand),
    Group(GroupCommand),
    Query(QueryCommand),
    Context(ContextCommand),
    Explain(Box<Command>),
}

/// A script is a sequence of commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub statements: Vec<Command>,
}

impl Command {
    /// Commands that drop data and need explicit permission
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Command::Scope(ScopeCommand::DropScene(_))
                | Command::Object(ObjectCommand::Delete(_))
                | Command::Folder(FolderCommand::Delete(_))
                | Command::Group(GroupCommand::Delete(_))
        )
    }

    /// Commands that change the project (as opposed to the session)
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::Scope(ScopeCommand::CreateScene(_) | ScopeCommand::DropScene(_))
                | Command::Object(_)
                | Command::Folder(_)
                | Command::Group(_)
        )
    }
}

// ============================================================================
// Scenes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScopeCommand {
    CreateScene(String),
    UseScene(String),
    UseGlobal,
    ListScenes,
    DropScene(String),
}

// ============================================================================
// Objects and folders
// ============================================================================

/// Optional `IN FOLDER` and `AT` clauses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Folder path, resolved against the entered folder
    pub folder: Option<String>,
    /// Flat index for objects, child index for folders
    pub position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectCommand {
    Create {
        name: String,
        object_type: String,
        placement: Placement,
    },
    Delete(String),
    Rename {
        from: String,
        to: String,
    },
    Move {
        from: usize,
        to: usize,
    },
    Swap {
        first: usize,
        second: usize,
    },
    Transfer {
        name: String,
        to: Scope,
        placement: Placement,
    },
    /// Re-place an object inside the folder tree of its own container
    Place {
        name: String,
        folder: String,
        position: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FolderCommand {
    Create {
        name: String,
        placement: Placement,
    },
    Rename {
        path: String,
        new_name: String,
    },
    Place {
        path: String,
        folder: String,
        position: Option<usize>,
    },
    Delete(String),
    Transfer {
        path: String,
        to: Scope,
        placement: Placement,
    },
}

// ============================================================================
// Groups
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupCommand {
    Create(String),
    Delete(String),
    Add { object: String, group: String },
    Remove { object: String, group: String },
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryCommand {
    Objects { folder: Option<String> },
    Object(String),
    ObjectAt(usize),
    Groups,
    Tree,
    Count,
    Check,
}

// ============================================================================
// Context Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContextCommand {
    EnterFolder(String),
    Exit,
    Reset,
    Show(ShowTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShowTarget {
    Context,
    History,
}

impl std::fmt::Display for ShowTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShowTarget::Context => write!(f, "CONTEXT"),
            ShowTarget::History => write!(f, "HISTORY"),
        }
    }
}

// ============================================================================
// Canonical text form
// ============================================================================

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(folder) = &self.folder {
            write!(f, " IN FOLDER {}", quote(folder))?;
        }
        if let Some(position) = self.position {
            write!(f, " AT {}", position)?;
        }
        Ok(())
    }
}

fn at(position: &Option<usize>) -> String {
    position.map(|p| format!(" AT {}", p)).unwrap_or_default()
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Scope(cmd) => match cmd {
                ScopeCommand::CreateScene(name) => write!(f, "CREATE SCENE {}", quote(name)),
                ScopeCommand::UseScene(name) => write!(f, "USE SCENE {}", quote(name)),
                ScopeCommand::UseGlobal => write!(f, "USE GLOBAL"),
                ScopeCommand::ListScenes => write!(f, "LIST SCENES"),
                ScopeCommand::DropScene(name) => write!(f, "DROP SCENE {}", quote(name)),
            },
            Command::Object(cmd) => match cmd {
                ObjectCommand::Create {
                    name,
                    object_type,
                    placement,
                } => write!(
                    f,
                    "CREATE OBJECT {} TYPE {}{}",
                    quote(name),
                    quote(object_type),
                    placement
                ),
                ObjectCommand::Delete(name) => write!(f, "DELETE OBJECT {}", quote(name)),
                ObjectCommand::Rename { from, to } => {
                    write!(f, "RENAME OBJECT {} TO {}", quote(from), quote(to))
                }
                ObjectCommand::Move { from, to } => write!(f, "MOVE OBJECT {} TO {}", from, to),
                ObjectCommand::Swap { first, second } => {
                    write!(f, "SWAP OBJECT {} WITH {}", first, second)
                }
                ObjectCommand::Transfer {
                    name,
                    to,
                    placement,
                } => write!(f, "TRANSFER OBJECT {} TO {}{}", quote(name), to, placement),
                ObjectCommand::Place {
                    name,
                    folder,
                    position,
                } => write!(
                    f,
                    "PLACE OBJECT {} IN FOLDER {}{}",
                    quote(name),
                    quote(folder),
                    at(position)
                ),
            },
            Command::Folder(cmd) => match cmd {
                FolderCommand::Create { name, placement } => {
                    write!(f, "CREATE FOLDER {}{}", quote(name), placement)
                }
                FolderCommand::Rename { path, new_name } => {
                    write!(f, "RENAME FOLDER {} TO {}", quote(path), quote(new_name))
                }
                FolderCommand::Place {
                    path,
                    folder,
                    position,
                } => write!(
                    f,
                    "PLACE FOLDER {} IN FOLDER {}{}",
                    quote(path),
                    quote(folder),
                    at(position)
                ),
                FolderCommand::Delete(path) => write!(f, "DELETE FOLDER {}", quote(path)),
                FolderCommand::Transfer {
                    path,
                    to,
                    placement,
                } => write!(f, "TRANSFER FOLDER {} TO {}{}", quote(path), to, placement),
            },
            Command::Group(cmd) => match cmd {
                GroupCommand::Create(name) => write!(f, "CREATE GROUP {}", quote(name)),
                GroupCommand::Delete(name) => write!(f, "DELETE GROUP {}", quote(name)),
                GroupCommand::Add { object, group } => {
                    write!(f, "ADD {} TO GROUP {}", quote(object), quote(group))
                }
                GroupCommand::Remove { object, group } => {
                    write!(f, "REMOVE {} FROM GROUP {}", quote(object), quote(group))
                }
            },
            Command::Query(cmd) => match cmd {
                QueryCommand::Objects { folder: None } => write!(f, "SELECT OBJECTS"),
                QueryCommand::Objects {
                    folder: Some(folder),
                } => write!(f, "SELECT OBJECTS IN FOLDER {}", quote(folder)),
                QueryCommand::Object(name) => write!(f, "SELECT OBJECT {}", quote(name)),
                QueryCommand::ObjectAt(position) => write!(f, "SELECT OBJECT AT {}", position),
                QueryCommand::Groups => write!(f, "SELECT GROUPS"),
                QueryCommand::Tree => write!(f, "SHOW TREE"),
                QueryCommand::Count => write!(f, "COUNT OBJECTS"),
                QueryCommand::Check => write!(f, "CHECK"),
            },
            Command::Context(cmd) => match cmd {
                ContextCommand::EnterFolder(path) => write!(f, "ENTER FOLDER {}", quote(path)),
                ContextCommand::Exit => write!(f, "EXIT"),
                ContextCommand::Reset => write!(f, "RESET"),
                ContextCommand::Show(target) => write!(f, "SHOW {}", target),
            },
            Command::Explain(inner) => write!(f, "EXPLAIN {}", inner),
        }
    }
}
