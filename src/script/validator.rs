//! Script validation
//!
//! Validates scripts before execution for safety and correctness.

use regex::Regex;

use crate::context::absolute_folder_path;
use crate::parser::{Command, FolderCommand, GroupCommand, ObjectCommand, Script};

/// Names that are usable as identifiers in game events
const IDENTIFIER_PATTERN: &str = r"^[\p{L}_][\p{L}\p{N}_]*$";

/// Problems found while validating a script
#[derive(Debug, Clone)]
pub struct ScriptValidationError {
    /// 1-based index of the statement
    pub statement: Option<usize>,
    pub message: String,
    pub severity: ValidationSeverity,
}

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for ScriptValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            ValidationSeverity::Error => "ERROR",
            ValidationSeverity::Warning => "WARNING",
        };
        if let Some(statement) = self.statement {
            write!(f, "{} (statement {}): {}", prefix, statement, self.message)
        } else {
            write!(f, "{}: {}", prefix, self.message)
        }
    }
}

/// Validation options
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Whether destructive statements are allowed in the script
    pub allow_actions: bool,
}

/// Validate a script for safety and correctness
pub fn validate_script(script: &Script, options: &ValidationOptions) -> Vec<ScriptValidationError> {
    let identifier = match Regex::new(IDENTIFIER_PATTERN) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Name check disabled: {}", e);
            None
        }
    };

    let mut errors = Vec::new();
    for (i, cmd) in script.statements.iter().enumerate() {
        validate_command(cmd, options, identifier.as_ref(), &mut errors, i + 1);
    }
    errors
}

fn validate_command(
    cmd: &Command,
    options: &ValidationOptions,
    identifier: Option<&Regex>,
    errors: &mut Vec<ScriptValidationError>,
    statement: usize,
) {
    let mut report = |severity, message: String| {
        errors.push(ScriptValidationError {
            statement: Some(statement),
            message,
            severity,
        })
    };

    if cmd.is_destructive() && !options.allow_actions {
        report(
            ValidationSeverity::Error,
            format!(
                "{} is destructive. Use --allow-actions to enable destructive statements",
                cmd
            ),
        );
    }

    let mut check_name = |kind: &str, name: &str| {
        if let Some(re) = identifier {
            if !re.is_match(name) {
                report(
                    ValidationSeverity::Warning,
                    format!(
                        "{} name '{}' is not usable as an identifier in events",
                        kind, name
                    ),
                );
            }
        }
    };

    match cmd {
        Command::Object(ObjectCommand::Create { name, .. }) => check_name("Object", name),
        Command::Object(ObjectCommand::Rename { to, .. }) => check_name("Object", to),
        Command::Group(GroupCommand::Create(name)) => check_name("Group", name),
        _ => {}
    }

    match cmd {
        Command::Folder(FolderCommand::Create { name, .. })
        | Command::Folder(FolderCommand::Rename { new_name: name, .. }) => {
            if name.contains('/') {
                report(
                    ValidationSeverity::Error,
                    format!("Folder name '{}' cannot contain '/'", name),
                );
            }
        }
        Command::Folder(FolderCommand::Delete(path)) => {
            // Scripts start at the root folder, so "", "." and ".." land there too
            if absolute_folder_path(path).is_empty() {
                report(
                    ValidationSeverity::Error,
                    "DELETE FOLDER targets the root folder, which cannot be removed".to_string(),
                );
            }
        }
        _ => {}
    }
}

/// Check if a script has any validation errors (not just warnings)
pub fn has_errors(errors: &[ScriptValidationError]) -> bool {
    errors
        .iter()
        .any(|e| e.severity == ValidationSeverity::Error)
}

/// Check if a script has any validation warnings
pub fn has_warnings(errors: &[ScriptValidationError]) -> bool {
    errors
        .iter()
        .any(|e| e.severity == ValidationSeverity::Warning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;

    #[test]
    fn test_validate_safe_script() {
        let script = parse_script(
            "CREATE SCENE \"Level1\"; USE SCENE \"Level1\"; CREATE OBJECT \"Hero\" TYPE \"Sprite\"",
        )
        .unwrap();
        let errors = validate_script(&script, &ValidationOptions::default());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_destructive_without_permission() {
        let script = parse_script("DELETE OBJECT \"Hero\"").unwrap();
        let errors = validate_script(&script, &ValidationOptions::default());
        assert!(has_errors(&errors));
        assert_eq!(errors[0].statement, Some(1));
    }

    #[test]
    fn test_validate_destructive_with_permission() {
        let script = parse_script("DELETE OBJECT \"Hero\"; DROP SCENE \"Level1\"").unwrap();
        let options = ValidationOptions {
            allow_actions: true,
        };
        let errors = validate_script(&script, &options);
        assert!(!has_errors(&errors));
    }

    #[test]
    fn test_explain_is_not_destructive() {
        let script = parse_script("EXPLAIN DELETE OBJECT \"Hero\"").unwrap();
        let errors = validate_script(&script, &ValidationOptions::default());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_names() {
        let script = parse_script(
            "CREATE OBJECT \"Big Boss\" TYPE \"Sprite\"; CREATE GROUP \"Énemis_2\"; RENAME OBJECT \"a\" TO \"2fast\"",
        )
        .unwrap();
        let errors = validate_script(&script, &ValidationOptions::default());
        assert!(!has_errors(&errors));
        assert!(has_warnings(&errors));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validate_folder_names() {
        let script = parse_script("CREATE FOLDER \"a/b\"; RENAME FOLDER \"x\" TO \"c/d\"").unwrap();
        let errors = validate_script(&script, &ValidationOptions::default());
        assert_eq!(errors.iter().filter(|e| e.severity == ValidationSeverity::Error).count(), 2);
    }

    #[test]
    fn test_validate_root_folder_delete() {
        let options = ValidationOptions {
            allow_actions: true,
        };
        for path in ["/", "", "..", "/./", "Enemies/.."] {
            let script = parse_script(&format!("DELETE FOLDER \"{}\"", path)).unwrap();
            let errors = validate_script(&script, &options);
            assert!(has_errors(&errors), "root not caught for {:?}", path);
        }

        let script = parse_script("DELETE FOLDER \"Enemies\"").unwrap();
        assert!(!has_errors(&validate_script(&script, &options)));
    }
}
