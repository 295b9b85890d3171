//! Script runner for executing .otree files

use std::fs;
use std::path::Path;

use crate::context::Context;
use crate::engine::{execute_command_with_context, explain_command, ExecutionContext, ExecutionResult};
use crate::error::{ObjTreeError, Result};
use crate::output::{format_output, OutputFormat};
use crate::parser::{parse_script, Script};
use crate::project::{Project, Scope};
use crate::script::validator::{has_errors, validate_script, ValidationOptions, ValidationSeverity};

/// File extension of objtree scripts
pub const SCRIPT_EXTENSION: &str = "otree";

/// Result of script execution
#[derive(Debug)]
pub struct ScriptResult {
    /// All results from executed statements
    pub results: Vec<ExecutionResult>,
    /// Total statements executed
    pub statements_executed: usize,
    /// Whether the script completed successfully
    pub success: bool,
    /// Error message if script failed
    pub error: Option<String>,
    /// Whether any statement changed the project
    pub modified: bool,
}

/// Script runner that manages script execution
pub struct ScriptRunner {
    /// Execution context (dry_run, allow_actions, etc.)
    exec_ctx: ExecutionContext,
    /// Editing context (scope, entered folders)
    context: Context,
    /// Print each statement's output while running
    echo: bool,
}

impl ScriptRunner {
    pub fn new(exec_ctx: ExecutionContext, scope: Scope) -> Self {
        Self {
            exec_ctx,
            context: Context::new(scope),
            echo: true,
        }
    }

    /// Keep results silent, for callers that format them afterwards
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Load, validate and run a script file
    pub fn run_file(&mut self, project: &mut Project, path: &Path) -> Result<ScriptResult> {
        if !is_script_path(path) {
            return Err(ObjTreeError::ExecutionError(format!(
                "Script file must have .{} extension: {}",
                SCRIPT_EXTENSION,
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let script = parse_script(&content)?;
        log::info!(
            "Loaded script {} ({} statements)",
            path.display(),
            script.statements.len()
        );

        self.validate(&script)?;
        self.run_script(project, &script)
    }

    /// Refuse scripts with validation errors; warnings are only logged
    pub fn validate(&self, script: &Script) -> Result<()> {
        let options = ValidationOptions {
            allow_actions: self.exec_ctx.allow_actions || self.exec_ctx.dry_run,
        };
        let issues = validate_script(script, &options);
        for issue in issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
        {
            log::warn!("{}", issue);
        }
        if has_errors(&issues) {
            let messages: Vec<String> = issues
                .iter()
                .filter(|i| i.severity == ValidationSeverity::Error)
                .map(|i| i.to_string())
                .collect();
            return Err(ObjTreeError::ExecutionError(format!(
                "Script validation failed:\n{}",
                messages.join("\n")
            )));
        }
        Ok(())
    }

    /// Run a parsed script, stopping at the first failing statement
    pub fn run_script(&mut self, project: &mut Project, script: &Script) -> Result<ScriptResult> {
        let mut results = Vec::new();
        let mut statements_executed = 0;
        let mut modified = false;

        for cmd in &script.statements {
            match execute_command_with_context(cmd, &self.exec_ctx, project, &mut self.context) {
                Ok(result) => {
                    statements_executed += 1;
                    modified |= result.modified;
                    if self.echo {
                        println!("{}", format_output(&result, &self.exec_ctx.output_format));
                    }
                    results.push(result);
                }
                Err(e) => {
                    log::debug!("Statement {} failed: {}", statements_executed + 1, e);
                    return Ok(ScriptResult {
                        results,
                        statements_executed,
                        success: false,
                        error: Some(format!("{}: {}", cmd, e)),
                        modified,
                    });
                }
            }
        }

        Ok(ScriptResult {
            results,
            statements_executed,
            success: true,
            error: None,
            modified,
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Get the output format
    pub fn output_format(&self) -> &OutputFormat {
        &self.exec_ctx.output_format
    }
}

/// Whether a path names a script file
pub fn is_script_path(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == SCRIPT_EXTENSION)
}

/// Explain a script without executing
pub fn explain_script(script: &Script, context: &Context) -> Vec<String> {
    script
        .statements
        .iter()
        .enumerate()
        .map(|(i, cmd)| format!("{}. {}", i + 1, explain_command(cmd, context)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn permissive() -> ExecutionContext {
        ExecutionContext {
            allow_actions: true,
            ..ExecutionContext::default()
        }
    }

    #[test]
    fn test_run_script_builds_scene() {
        let mut project = Project::new("Game");
        let script = parse_script(
            r#"
            CREATE SCENE "Level1";
            USE SCENE "Level1";
            CREATE FOLDER "Enemies";
            CREATE OBJECT "Bat" TYPE "Sprite" IN FOLDER "Enemies";
            CREATE OBJECT "Hero" TYPE "Sprite" AT 0;
            SELECT OBJECTS
        "#,
        )
        .unwrap();

        let mut runner = ScriptRunner::new(permissive(), Scope::Global).quiet();
        let result = runner.run_script(&mut project, &script).unwrap();

        assert!(result.success);
        assert!(result.modified);
        assert_eq!(result.statements_executed, 6);
        let level1 = project.container(&Scope::layout("Level1")).unwrap();
        assert_eq!(level1.get_object_at(0).unwrap().name(), "Hero");
        assert_eq!(runner.context().scope(), &Scope::layout("Level1"));
    }

    #[test]
    fn test_run_script_stops_at_failure() {
        let mut project = Project::new("Game");
        let script = parse_script(
            "CREATE OBJECT \"A\" TYPE \"Sprite\"; CREATE OBJECT \"A\" TYPE \"Sprite\"; CREATE OBJECT \"B\" TYPE \"Sprite\"",
        )
        .unwrap();

        let mut runner = ScriptRunner::new(permissive(), Scope::Global).quiet();
        let result = runner.run_script(&mut project, &script).unwrap();

        assert!(!result.success);
        assert_eq!(result.statements_executed, 1);
        assert!(result.error.unwrap().contains("already exists"));
        assert!(!project.global_objects().has_object_named("B"));
    }

    #[test]
    fn test_run_file_requires_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("build.txt");
        fs::write(&path, "COUNT OBJECTS").unwrap();

        let mut project = Project::new("Game");
        let mut runner = ScriptRunner::new(permissive(), Scope::Global).quiet();
        assert!(runner.run_file(&mut project, &path).is_err());
    }

    #[test]
    fn test_run_file_rejects_destructive_without_permission() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cleanup.otree");
        fs::write(&path, "CREATE OBJECT \"A\" TYPE \"Sprite\";\nDELETE OBJECT \"A\"").unwrap();

        let mut project = Project::new("Game");
        let mut runner = ScriptRunner::new(ExecutionContext::default(), Scope::Global).quiet();
        let result = runner.run_file(&mut project, &path);

        assert!(result.is_err());
        assert!(project.global_objects().is_empty());
    }

    #[test]
    fn test_explain_script() {
        let script = parse_script("CREATE GROUP \"Flyers\"; DROP SCENE \"Level1\"").unwrap();
        let explanations = explain_script(&script, &Context::default());
        assert_eq!(explanations.len(), 2);
        assert!(explanations[0].starts_with("1. EXPLAIN"));
        assert!(explanations[1].contains("destructive"));
    }
}
