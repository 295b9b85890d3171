//! objtree - Ordered, foldered object containers for scene editors
//!
//! A project holds a global objects container and one container per scene
//! (layout). Each container keeps its objects in a stable order, arranges
//! them in a folder tree and groups them by name. Objects and whole folders
//! can be moved between containers. A small SQL-like language edits a
//! project from scripts, the command line or an interactive prompt.
//!
//! # Example
//!
//! ```no_run
//! use objtree::{parse_command, execute_command_with_context, Context, ExecutionContext, Project};
//! use objtree::{format_output, OutputFormat};
//!
//! let mut project = Project::new("Game");
//! let mut context = Context::default();
//! let cmd = parse_command("CREATE OBJECT \"Hero\" TYPE \"Sprite\"").unwrap();
//! let ctx = ExecutionContext::default();
//! let result = execute_command_with_context(&cmd, &ctx, &mut project, &mut context).unwrap();
//! println!("{}", format_output(&result, &OutputFormat::Human));
//! ```

pub mod cli;
pub mod context;
pub mod engine;
pub mod error;
pub mod objects;
pub mod output;
pub mod parser;
pub mod project;
pub mod script;
pub mod sync;

#[cfg(feature = "repl")]
pub mod repl;

pub use context::Context;
pub use engine::{execute_command_with_context, ExecutionContext};
pub use error::{ObjTreeError, Result};
pub use objects::{NodeId, Object, ObjectsContainer};
pub use output::{format_output, OutputFormat};
pub use parser::{parse_command, parse_script, Command, Script};
pub use project::{Layout, Project, Scope};
pub use script::{validate_script, ScriptResult, ScriptRunner};
pub use sync::SharedObjectsContainer;
