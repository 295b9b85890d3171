//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "objtree")]
#[command(author, version, about = "Edit scene object trees with SQL-like commands", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Project file to load and save
    #[arg(long, short, global = true, env = "OBJTREE_PROJECT", default_value = "project.json")]
    pub project: PathBuf,

    /// Enable dry-run mode (describe changes without applying them)
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Allow destructive statements (DELETE, DROP SCENE)
    #[arg(long, global = true)]
    pub allow_actions: bool,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Create an empty project file
    Init {
        /// Project name
        #[arg(long, default_value = "Project")]
        name: String,

        /// Overwrite an existing project file
        #[arg(long)]
        force: bool,
    },

    /// Execute a single statement
    Exec {
        /// The statement to execute
        statement: String,

        /// Run the statement in a scene instead of the global scope
        #[arg(long)]
        scene: Option<String>,
    },

    /// Run an objtree script file (.otree)
    Run {
        /// Path to the .otree script file
        file: PathBuf,

        /// Start the script in a scene instead of the global scope
        #[arg(long)]
        scene: Option<String>,
    },

    /// Explain a script or statement without executing
    Explain {
        /// Statement or path to .otree script file
        input: String,
    },

    /// Check every container of the project for consistency
    Check,

    /// List the scenes of the project
    Scenes,

    /// Start interactive REPL mode
    Repl {
        /// Start the REPL in a scene
        #[arg(long)]
        scene: Option<String>,
    },
}

impl Args {
    /// Log filter matching the verbosity flag
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "objtree",
            "exec",
            "COUNT OBJECTS",
            "--scene",
            "Level1",
            "--json",
            "-vv",
        ])
        .unwrap();
        assert!(args.json);
        assert_eq!(args.log_level(), "debug");
        match args.command {
            SubCommand::Exec { statement, scene } => {
                assert_eq!(statement, "COUNT OBJECTS");
                assert_eq!(scene.as_deref(), Some("Level1"));
            }
            _ => panic!("expected exec"),
        }
    }
}
