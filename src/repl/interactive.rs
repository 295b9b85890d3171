//! Interactive REPL implementation

use std::path::Path;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::engine::executor::execute_command_with_context;
use crate::error::{ObjTreeError, Result};
use crate::{format_output, parse_command, Context, ExecutionContext, Project, Scope};

/// Edit `project` interactively, saving it to `path` on `save` and on exit
pub fn run_repl(
    project: &mut Project,
    path: &Path,
    exec_ctx: ExecutionContext,
    scope: Scope,
) -> Result<()> {
    let mut rl = DefaultEditor::new().map_err(|e| ObjTreeError::ExecutionError(e.to_string()))?;

    println!("objtree v{} - Interactive Mode", env!("CARGO_PKG_VERSION"));
    println!("Project '{}' ({})", project.name(), path.display());
    println!("Type 'help' for commands, 'exit' to quit\n");

    let mut context = Context::new(scope);
    let mut dirty = false;

    loop {
        let prompt = format!("objtree [{}]> ", context.prompt());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match line.to_lowercase().as_str() {
                    "exit" | "quit" | "q" => break,
                    "help" | "?" => {
                        print_help();
                        continue;
                    }
                    "clear" | "cls" => {
                        print!("\x1B[2J\x1B[1;1H");
                        continue;
                    }
                    "pwd" => {
                        println!("{}\n", context.prompt());
                        continue;
                    }
                    "save" => {
                        match project.save(path) {
                            Ok(()) => {
                                dirty = false;
                                println!("Saved to {}\n", path.display());
                            }
                            Err(e) => eprintln!("Error: {}\n", e),
                        }
                        continue;
                    }
                    _ => {}
                }

                let _ = rl.add_history_entry(line);

                match parse_command(&expand_shortcuts(line)) {
                    Ok(cmd) => match execute_command_with_context(&cmd, &exec_ctx, project, &mut context) {
                        Ok(result) => {
                            dirty |= result.modified;
                            let output = format_output(&result, &exec_ctx.output_format);
                            if !output.is_empty() {
                                println!("{}\n", output);
                            }
                        }
                        Err(e) => eprintln!("Error: {}\n", e),
                    },
                    Err(e) => eprintln!("{}\n", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if dirty {
        project.save(path)?;
        println!("Saved to {}", path.display());
    }
    println!("Goodbye!");
    Ok(())
}

fn expand_shortcuts(input: &str) -> String {
    let lower = input.to_lowercase();

    if lower.starts_with("cd ") {
        let path = input[3..].trim();
        return format!("ENTER FOLDER \"{}\"", path.replace('\\', "\\\\").replace('"', "\\\""));
    }
    match lower.as_str() {
        "cd" | ".." => "EXIT".to_string(),
        "ls" => "SELECT OBJECTS".to_string(),
        "tree" => "SHOW TREE".to_string(),
        "ctx" | "context" => "SHOW CONTEXT".to_string(),
        "scenes" => "LIST SCENES".to_string(),
        _ => input.to_string(),
    }
}

fn print_help() {
    println!(
        r#"
objtree Commands
================

SCENES:
  CREATE SCENE "name"             - Create an empty scene
  USE SCENE "name"                - Edit a scene's objects
  USE GLOBAL                      - Edit the global objects
  LIST SCENES                     - List scenes
  DROP SCENE "name"               - Remove a scene (destructive)

OBJECTS:
  CREATE OBJECT "n" TYPE "t" [IN FOLDER "p"] [AT i]
  RENAME OBJECT "old" TO "new"
  MOVE OBJECT i TO j              - Reorder by position
  SWAP OBJECT i WITH j
  PLACE OBJECT "n" IN FOLDER "p" [AT i]
  TRANSFER OBJECT "n" TO SCENE "s" | GLOBAL [IN FOLDER "p"] [AT i]
  DELETE OBJECT "n"               - (destructive)

FOLDERS:
  CREATE FOLDER "n" [IN FOLDER "p"] [AT i]
  RENAME FOLDER "p" TO "new"
  PLACE FOLDER "p" IN FOLDER "q" [AT i]
  TRANSFER FOLDER "p" TO SCENE "s" | GLOBAL [IN FOLDER "q"] [AT i]
  DELETE FOLDER "p"               - Removes the folder and its objects (destructive)

GROUPS:
  CREATE GROUP "g"
  ADD "n" TO GROUP "g"
  REMOVE "n" FROM GROUP "g"
  DELETE GROUP "g"                - (destructive)

QUERIES (read-only):
  SELECT OBJECTS [IN FOLDER "p"]
  SELECT OBJECT "n"
  SELECT OBJECT AT i
  SELECT GROUPS
  SHOW TREE
  COUNT OBJECTS
  CHECK

CONTEXT NAVIGATION:
  ENTER FOLDER "p"                - Make a folder the default for new content
  EXIT                            - Leave the current folder
  RESET                           - Back to the starting scope
  SHOW CONTEXT                    - Show current context
  SHOW HISTORY                    - Show navigation history

OTHER:
  EXPLAIN <command>               - Show what a command would do
  save                            - Write the project file now

SHORTCUTS:
  cd path                         - Same as ENTER FOLDER "path"
  cd or ..                        - Same as EXIT
  ls                              - Same as SELECT OBJECTS
  tree                            - Same as SHOW TREE
  ctx                             - Same as SHOW CONTEXT
  scenes                          - Same as LIST SCENES
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_shortcuts() {
        assert_eq!(expand_shortcuts("cd Enemies/Flying"), "ENTER FOLDER \"Enemies/Flying\"");
        assert_eq!(expand_shortcuts(".."), "EXIT");
        assert_eq!(expand_shortcuts("LS"), "SELECT OBJECTS");
        assert_eq!(expand_shortcuts("COUNT OBJECTS"), "COUNT OBJECTS");
    }

    #[test]
    fn test_shortcuts_parse() {
        for shortcut in ["cd a", "..", "ls", "tree", "ctx", "scenes"] {
            assert!(parse_command(&expand_shortcuts(shortcut)).is_ok(), "{}", shortcut);
        }
    }
}
