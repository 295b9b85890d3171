//! Script execution module
//!
//! Handles loading, validating, and executing .otree script files.

pub mod runner;
pub mod validator;

pub use runner::{explain_script, is_script_path, ScriptResult, ScriptRunner, SCRIPT_EXTENSION};
pub use validator::{
    has_errors, has_warnings, validate_script, ScriptValidationError, ValidationOptions,
    ValidationSeverity,
};
