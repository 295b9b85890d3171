//! objtree CLI - Edit scene object trees with SQL-like commands

use std::path::Path;

use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use objtree::cli::{Args, SubCommand};
use objtree::engine::{check_project, explain_command, ExecutionResult, ResultData};
use objtree::parser::{Command, ScopeCommand};
use objtree::script::{explain_script, is_script_path, validate_script, ScriptRunner, ValidationOptions};
use objtree::{
    execute_command_with_context, format_output, parse_command, parse_script, Context,
    ExecutionContext, ObjTreeError, OutputFormat, Project, Scope,
};

fn main() {
    let args = Args::parse();
    Builder::from_env(Env::default().default_filter_or(args.log_level())).init();

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the subcommand; `Ok(false)` reports a failed check without an error message
fn run(args: Args) -> objtree::Result<bool> {
    let ctx = ExecutionContext {
        dry_run: args.dry_run,
        allow_actions: args.allow_actions,
        output_format: OutputFormat::from_json_flag(args.json),
    };

    match args.command {
        SubCommand::Init { name, force } => {
            if args.project.exists() && !force {
                return Err(ObjTreeError::ExecutionError(format!(
                    "{} already exists. Use --force to overwrite it",
                    args.project.display()
                )));
            }
            let mut project = Project::new(name);
            project.save(&args.project)?;
            println!("Created project '{}' in {}", project.name(), args.project.display());
            Ok(true)
        }

        SubCommand::Exec { statement, scene } => {
            let cmd = parse_command(&statement)?;
            let mut project = load_project(&args.project)?;
            let mut context = Context::new(start_scope(&project, scene)?);

            let result = execute_command_with_context(&cmd, &ctx, &mut project, &mut context)?;
            println!("{}", format_output(&result, &ctx.output_format));
            save_if_modified(&mut project, &args.project, result.modified)?;
            Ok(true)
        }

        SubCommand::Run { file, scene } => {
            let mut project = load_project(&args.project)?;
            let scope = start_scope(&project, scene)?;

            let mut runner = ScriptRunner::new(ctx, scope);
            let result = runner.run_file(&mut project, &file)?;

            if !result.success {
                // Nothing is saved when a statement fails midway
                if let Some(err) = result.error {
                    return Err(ObjTreeError::ExecutionError(err));
                }
            }

            info!(
                "Script completed: {} statements executed",
                result.statements_executed
            );
            save_if_modified(&mut project, &args.project, result.modified)?;
            Ok(true)
        }

        SubCommand::Explain { input } => {
            let path = Path::new(&input);
            let context = Context::default();

            if path.exists() && is_script_path(path) {
                let content = std::fs::read_to_string(path)?;
                let script = parse_script(&content)?;

                println!("Script: {}", path.display());
                println!("Statements: {}\n", script.statements.len());
                for explanation in explain_script(&script, &context) {
                    println!("{}", explanation);
                }

                let issues = validate_script(&script, &ValidationOptions { allow_actions: true });
                if !issues.is_empty() {
                    println!("\nValidation Notes:");
                    for issue in &issues {
                        println!("  - {}", issue);
                    }
                }
            } else {
                let cmd = parse_command(&input)?;
                println!("{}", explain_command(&cmd, &context));
            }
            Ok(true)
        }

        SubCommand::Check => {
            let project = load_project(&args.project)?;
            let info = check_project(&project);
            let consistent = info.problems.is_empty();
            let result = ExecutionResult {
                data: ResultData::Consistency(info),
                modified: false,
            };
            println!("{}", format_output(&result, &ctx.output_format));
            Ok(consistent)
        }

        SubCommand::Scenes => {
            let mut project = load_project(&args.project)?;
            let mut context = Context::default();
            let cmd = Command::Scope(ScopeCommand::ListScenes);
            let result = execute_command_with_context(&cmd, &ctx, &mut project, &mut context)?;
            println!("{}", format_output(&result, &ctx.output_format));
            Ok(true)
        }

        #[cfg(feature = "repl")]
        SubCommand::Repl { scene } => {
            let mut project = load_project(&args.project)?;
            let scope = start_scope(&project, scene)?;
            objtree::repl::run_repl(&mut project, &args.project, ctx, scope)?;
            Ok(true)
        }
        #[cfg(not(feature = "repl"))]
        SubCommand::Repl { .. } => Err(ObjTreeError::ExecutionError(
            "REPL support not enabled. Rebuild with --features repl".to_string(),
        )),
    }
}

fn load_project(path: &Path) -> objtree::Result<Project> {
    if !path.exists() {
        return Err(ObjTreeError::ExecutionError(format!(
            "No project at {}. Run `objtree init` first",
            path.display()
        )));
    }
    Project::load(path)
}

fn start_scope(project: &Project, scene: Option<String>) -> objtree::Result<Scope> {
    match scene {
        Some(name) if !project.has_layout(&name) => Err(ObjTreeError::SceneNotFound(name)),
        Some(name) => Ok(Scope::layout(name)),
        None => Ok(Scope::Global),
    }
}

fn save_if_modified(project: &mut Project, path: &Path, modified: bool) -> objtree::Result<()> {
    if modified {
        project.save(path)?;
    }
    Ok(())
}
