//! Execution engine for objtree commands

pub mod executor;

pub use executor::{
    check_project, execute_command_with_context, explain_command, ExecutionContext,
    ExecutionResult, ResultData,
};
