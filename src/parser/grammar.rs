//! Pest grammar parser for the objtree command language

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use crate::error::{ObjTreeError, Result};
use crate::parser::ast::*;
use crate::project::Scope;

#[derive(Parser)]
#[grammar = "../grammar/objtree.pest"]
pub struct ObjTreeParser;

/// Parse a command string into an AST
pub fn parse_command(input: &str) -> Result<Command> {
    let pairs = ObjTreeParser::parse(Rule::command, input)
        .map_err(|e| ObjTreeError::ParseError(e.to_string()))?;

    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| ObjTreeError::ParseError("Empty input".to_string()))?;

    let statement = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::statement)
        .ok_or_else(|| ObjTreeError::ParseError("Expected statement".to_string()))?;

    parse_statement(statement)
}

/// Parse a script (multiple statements) into an AST
pub fn parse_script(input: &str) -> Result<Script> {
    let pairs = ObjTreeParser::parse(Rule::script, input)
        .map_err(|e| ObjTreeError::ParseError(e.to_string()))?;

    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| ObjTreeError::ParseError("Empty script".to_string()))?;

    let mut statements = Vec::new();
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::statement {
            statements.push(parse_statement(inner)?);
        }
    }

    Ok(Script { statements })
}

fn first_inner<'a>(pair: Pair<'a, Rule>, what: &str) -> Result<Pair<'a, Rule>> {
    pair.into_inner()
        .next()
        .ok_or_else(|| ObjTreeError::ParseError(format!("Expected {}", what)))
}

fn parse_statement(pair: Pair<Rule>) -> Result<Command> {
    let inner = first_inner(pair, "statement content")?;
    match inner.as_rule() {
        Rule::explain_cmd => {
            let target = first_inner(inner, "command after EXPLAIN")?;
            Ok(Command::Explain(Box::new(parse_inner_cmd(target)?)))
        }
        _ => parse_inner_cmd(inner),
    }
}

fn parse_inner_cmd(pair: Pair<Rule>) -> Result<Command> {
    match pair.as_rule() {
        Rule::scope_cmd => Ok(Command::Scope(parse_scope_cmd(pair)?)),
        Rule::object_cmd => Ok(Command::Object(parse_object_cmd(pair)?)),
        Rule::folder_cmd => Ok(Command::Folder(parse_folder_cmd(pair)?)),
        Rule::group_cmd => Ok(Command::Group(parse_group_cmd(pair)?)),
        Rule::query_cmd => Ok(Command::Query(parse_query_cmd(pair)?)),
        Rule::context_cmd => Ok(Command::Context(parse_context_cmd(pair)?)),
        rule => Err(ObjTreeError::ParseError(format!(
            "Unexpected rule in statement: {:?}",
            rule
        ))),
    }
}

// ============================================================================
// Values
// ============================================================================

/// Strip the quotes of a string literal and resolve `\` escapes
fn parse_string(pair: Pair<Rule>) -> Result<String> {
    if pair.as_rule() != Rule::string_value {
        return Err(ObjTreeError::ParseError(format!(
            "Expected a quoted string, found {:?}",
            pair.as_rule()
        )));
    }
    let s = pair.as_str();
    let body = &s[1..s.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn parse_number(pair: Pair<Rule>) -> Result<usize> {
    pair.as_str()
        .parse()
        .map_err(|_| ObjTreeError::ParseError(format!("Invalid number: {}", pair.as_str())))
}

fn next_string(inner: &mut Pairs<Rule>, what: &str) -> Result<String> {
    let pair = inner
        .next()
        .ok_or_else(|| ObjTreeError::ParseError(format!("Expected {}", what)))?;
    parse_string(pair)
}

fn next_number(inner: &mut Pairs<Rule>, what: &str) -> Result<usize> {
    let pair = inner
        .next()
        .ok_or_else(|| ObjTreeError::ParseError(format!("Expected {}", what)))?;
    parse_number(pair)
}

fn parse_at_clause(pair: Pair<Rule>) -> Result<usize> {
    parse_number(first_inner(pair, "index after AT")?)
}

fn parse_in_folder_clause(pair: Pair<Rule>) -> Result<String> {
    parse_string(first_inner(pair, "path after IN FOLDER")?)
}

/// Collect the trailing `IN FOLDER` / `AT` clauses, each at most once
fn parse_placement(rest: Pairs<Rule>) -> Result<Placement> {
    let mut placement = Placement::default();
    for clause in rest {
        match clause.as_rule() {
            Rule::at_clause => {
                if placement.position.is_some() {
                    return Err(ObjTreeError::ParseError("AT given twice".to_string()));
                }
                placement.position = Some(parse_at_clause(clause)?);
            }
            Rule::in_folder_clause => {
                if placement.folder.is_some() {
                    return Err(ObjTreeError::ParseError("IN FOLDER given twice".to_string()));
                }
                placement.folder = Some(parse_in_folder_clause(clause)?);
            }
            rule => {
                return Err(ObjTreeError::ParseError(format!(
                    "Unexpected clause: {:?}",
                    rule
                )))
            }
        }
    }
    Ok(placement)
}

fn parse_scope_target(pair: Pair<Rule>) -> Result<Scope> {
    let inner = first_inner(pair, "SCENE or GLOBAL")?;
    match inner.as_rule() {
        Rule::scene_target => Ok(Scope::Layout(parse_string(first_inner(
            inner,
            "scene name",
        )?)?)),
        Rule::global_target => Ok(Scope::Global),
        _ => Err(ObjTreeError::ParseError("Invalid TRANSFER target".to_string())),
    }
}

/// `IN FOLDER "p" [AT i]` of PLACE commands
fn parse_place_tail(inner: &mut Pairs<Rule>) -> Result<(String, Option<usize>)> {
    let folder = inner
        .next()
        .ok_or_else(|| ObjTreeError::ParseError("Expected IN FOLDER".to_string()))
        .and_then(parse_in_folder_clause)?;
    let position = inner.next().map(parse_at_clause).transpose()?;
    Ok((folder, position))
}

// ============================================================================
// Scene Command Parsing
// ============================================================================

fn parse_scope_cmd(pair: Pair<Rule>) -> Result<ScopeCommand> {
    let inner = first_inner(pair, "scene command")?;
    let rule = inner.as_rule();
    let mut args = inner.into_inner();

    match rule {
        Rule::create_scene => Ok(ScopeCommand::CreateScene(next_string(&mut args, "scene name")?)),
        Rule::use_scene => Ok(ScopeCommand::UseScene(next_string(&mut args, "scene name")?)),
        Rule::use_global => Ok(ScopeCommand::UseGlobal),
        Rule::list_scenes => Ok(ScopeCommand::ListScenes),
        Rule::drop_scene => Ok(ScopeCommand::DropScene(next_string(&mut args, "scene name")?)),
        _ => Err(ObjTreeError::ParseError(format!(
            "Unknown scene command: {:?}",
            rule
        ))),
    }
}

// ============================================================================
// Object Command Parsing
// ============================================================================

fn parse_object_cmd(pair: Pair<Rule>) -> Result<ObjectCommand> {
    let inner = first_inner(pair, "object command")?;
    let rule = inner.as_rule();
    let mut args = inner.into_inner();

    match rule {
        Rule::create_object => {
            let name = next_string(&mut args, "object name")?;
            let object_type = next_string(&mut args, "object type")?;
            Ok(ObjectCommand::Create {
                name,
                object_type,
                placement: parse_placement(args)?,
            })
        }
        Rule::delete_object => Ok(ObjectCommand::Delete(next_string(&mut args, "object name")?)),
        Rule::rename_object => Ok(ObjectCommand::Rename {
            from: next_string(&mut args, "object name")?,
            to: next_string(&mut args, "new name")?,
        }),
        Rule::move_object => Ok(ObjectCommand::Move {
            from: next_number(&mut args, "source index")?,
            to: next_number(&mut args, "destination index")?,
        }),
        Rule::swap_objects => Ok(ObjectCommand::Swap {
            first: next_number(&mut args, "first index")?,
            second: next_number(&mut args, "second index")?,
        }),
        Rule::transfer_object => {
            let name = next_string(&mut args, "object name")?;
            let to = args
                .next()
                .ok_or_else(|| ObjTreeError::ParseError("Expected TO target".to_string()))
                .and_then(parse_scope_target)?;
            Ok(ObjectCommand::Transfer {
                name,
                to,
                placement: parse_placement(args)?,
            })
        }
        Rule::place_object => {
            let name = next_string(&mut args, "object name")?;
            let (folder, position) = parse_place_tail(&mut args)?;
            Ok(ObjectCommand::Place {
                name,
                folder,
                position,
            })
        }
        _ => Err(ObjTreeError::ParseError(format!(
            "Unknown object command: {:?}",
            rule
        ))),
    }
}

// ============================================================================
// Folder Command Parsing
// ============================================================================

fn parse_folder_cmd(pair: Pair<Rule>) -> Result<FolderCommand> {
    let inner = first_inner(pair, "folder command")?;
    let rule = inner.as_rule();
    let mut args = inner.into_inner();

    match rule {
        Rule::create_folder => {
            let name = next_string(&mut args, "folder name")?;
            Ok(FolderCommand::Create {
                name,
                placement: parse_placement(args)?,
            })
        }
        Rule::rename_folder => Ok(FolderCommand::Rename {
            path: next_string(&mut args, "folder path")?,
            new_name: next_string(&mut args, "new name")?,
        }),
        Rule::place_folder => {
            let path = next_string(&mut args, "folder path")?;
            let (folder, position) = parse_place_tail(&mut args)?;
            Ok(FolderCommand::Place {
                path,
                folder,
                position,
            })
        }
        Rule::delete_folder => Ok(FolderCommand::Delete(next_string(&mut args, "folder path")?)),
        Rule::transfer_folder => {
            let path = next_string(&mut args, "folder path")?;
            let to = args
                .next()
                .ok_or_else(|| ObjTreeError::ParseError("Expected TO target".to_string()))
                .and_then(parse_scope_target)?;
            Ok(FolderCommand::Transfer {
                path,
                to,
                placement: parse_placement(args)?,
            })
        }
        _ => Err(ObjTreeError::ParseError(format!(
            "Unknown folder command: {:?}",
            rule
        ))),
    }
}

// ============================================================================
// Group Command Parsing
// ============================================================================

fn parse_group_cmd(pair: Pair<Rule>) -> Result<GroupCommand> {
    let inner = first_inner(pair, "group command")?;
    let rule = inner.as_rule();
    let mut args = inner.into_inner();

    match rule {
        Rule::create_group => Ok(GroupCommand::Create(next_string(&mut args, "group name")?)),
        Rule::delete_group => Ok(GroupCommand::Delete(next_string(&mut args, "group name")?)),
        Rule::add_to_group => Ok(GroupCommand::Add {
            object: next_string(&mut args, "object name")?,
            group: next_string(&mut args, "group name")?,
        }),
        Rule::remove_from_group => Ok(GroupCommand::Remove {
            object: next_string(&mut args, "object name")?,
            group: next_string(&mut args, "group name")?,
        }),
        _ => Err(ObjTreeError::ParseError(format!(
            "Unknown group command: {:?}",
            rule
        ))),
    }
}

// ============================================================================
// Query Parsing
// ============================================================================

fn parse_query_cmd(pair: Pair<Rule>) -> Result<QueryCommand> {
    let inner = first_inner(pair, "query")?;
    let rule = inner.as_rule();
    let mut args = inner.into_inner();

    match rule {
        Rule::select_objects => Ok(QueryCommand::Objects {
            folder: args.next().map(parse_in_folder_clause).transpose()?,
        }),
        Rule::select_object_at => {
            let clause = args
                .next()
                .ok_or_else(|| ObjTreeError::ParseError("Expected AT".to_string()))?;
            Ok(QueryCommand::ObjectAt(parse_at_clause(clause)?))
        }
        Rule::select_object => Ok(QueryCommand::Object(next_string(&mut args, "object name")?)),
        Rule::select_groups => Ok(QueryCommand::Groups),
        Rule::show_tree => Ok(QueryCommand::Tree),
        Rule::count_objects => Ok(QueryCommand::Count),
        Rule::check_cmd => Ok(QueryCommand::Check),
        _ => Err(ObjTreeError::ParseError(format!("Unknown query: {:?}", rule))),
    }
}

// ============================================================================
// Context Command Parsing
// ============================================================================

fn parse_context_cmd(pair: Pair<Rule>) -> Result<ContextCommand> {
    let inner = first_inner(pair, "context command")?;

    match inner.as_rule() {
        Rule::enter_folder => {
            let path = parse_string(first_inner(inner, "path after ENTER FOLDER")?)?;
            Ok(ContextCommand::EnterFolder(path))
        }
        Rule::exit_cmd => Ok(ContextCommand::Exit),
        Rule::reset_cmd => Ok(ContextCommand::Reset),
        Rule::show_cmd => parse_show_cmd(inner),
        rule => Err(ObjTreeError::ParseError(format!(
            "Unknown context command: {:?}",
            rule
        ))),
    }
}

fn parse_show_cmd(pair: Pair<Rule>) -> Result<ContextCommand> {
    let inner = first_inner(pair, "target after SHOW")?;

    let target_str = inner.as_str().to_uppercase();
    let target = match target_str.as_str() {
        "CONTEXT" => ShowTarget::Context,
        "HISTORY" => ShowTarget::History,
        _ => {
            return Err(ObjTreeError::ParseError(format!(
                "Unknown SHOW target: {}",
                target_str
            )))
        }
    };

    Ok(ContextCommand::Show(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_object() {
        let cmd = parse_command("CREATE OBJECT \"Enemy2\" TYPE \"Sprite\" AT 1").unwrap();
        match cmd {
            Command::Object(ObjectCommand::Create {
                name,
                object_type,
                placement,
            }) => {
                assert_eq!(name, "Enemy2");
                assert_eq!(object_type, "Sprite");
                assert_eq!(placement.position, Some(1));
                assert!(placement.folder.is_none());
            }
            _ => panic!("Expected Create Object command"),
        }
    }

    #[test]
    fn test_parse_create_object_in_folder() {
        let cmd =
            parse_command("create object \"Bat\" type \"Sprite\" in folder \"/Enemies/Flying\"")
                .unwrap();
        match cmd {
            Command::Object(ObjectCommand::Create { placement, .. }) => {
                assert_eq!(placement.folder.as_deref(), Some("/Enemies/Flying"));
                assert_eq!(placement.position, None);
            }
            _ => panic!("Expected Create Object command"),
        }
    }

    #[test]
    fn test_duplicate_clause_rejected() {
        let result = parse_command("CREATE OBJECT \"A\" TYPE \"Sprite\" AT 1 AT 2");
        assert!(matches!(result, Err(ObjTreeError::ParseError(_))));
    }

    #[test]
    fn test_parse_move_and_swap() {
        assert_eq!(
            parse_command("MOVE OBJECT 0 TO 2").unwrap(),
            Command::Object(ObjectCommand::Move { from: 0, to: 2 })
        );
        assert_eq!(
            parse_command("SWAP OBJECT 1 WITH 3").unwrap(),
            Command::Object(ObjectCommand::Swap { first: 1, second: 3 })
        );
    }

    #[test]
    fn test_parse_transfer() {
        let cmd = parse_command("TRANSFER OBJECT \"Boss\" TO SCENE \"Level2\" AT 0").unwrap();
        assert_eq!(
            cmd,
            Command::Object(ObjectCommand::Transfer {
                name: "Boss".to_string(),
                to: Scope::layout("Level2"),
                placement: Placement {
                    folder: None,
                    position: Some(0)
                },
            })
        );

        let cmd = parse_command("TRANSFER FOLDER \"Enemies\" TO GLOBAL IN FOLDER \"Shared\"").unwrap();
        match cmd {
            Command::Folder(FolderCommand::Transfer { path, to, placement }) => {
                assert_eq!(path, "Enemies");
                assert_eq!(to, Scope::Global);
                assert_eq!(placement.folder.as_deref(), Some("Shared"));
            }
            _ => panic!("Expected Transfer Folder command"),
        }
    }

    #[test]
    fn test_parse_place() {
        let cmd = parse_command("PLACE OBJECT \"Bat\" IN FOLDER \"Enemies\" AT 0").unwrap();
        assert_eq!(
            cmd,
            Command::Object(ObjectCommand::Place {
                name: "Bat".to_string(),
                folder: "Enemies".to_string(),
                position: Some(0),
            })
        );
        let cmd = parse_command("PLACE FOLDER \"Flying\" IN FOLDER \"/\"").unwrap();
        assert!(matches!(
            cmd,
            Command::Folder(FolderCommand::Place { position: None, .. })
        ));
    }

    #[test]
    fn test_parse_folder_commands() {
        assert!(matches!(
            parse_command("CREATE FOLDER \"Enemies\" AT 0").unwrap(),
            Command::Folder(FolderCommand::Create { .. })
        ));
        assert_eq!(
            parse_command("RENAME FOLDER \"Enemies\" TO \"Foes\"").unwrap(),
            Command::Folder(FolderCommand::Rename {
                path: "Enemies".to_string(),
                new_name: "Foes".to_string()
            })
        );
        assert_eq!(
            parse_command("DELETE FOLDER \"Foes\"").unwrap(),
            Command::Folder(FolderCommand::Delete("Foes".to_string()))
        );
    }

    #[test]
    fn test_parse_group_commands() {
        assert_eq!(
            parse_command("ADD \"Bat\" TO GROUP \"Flyers\"").unwrap(),
            Command::Group(GroupCommand::Add {
                object: "Bat".to_string(),
                group: "Flyers".to_string()
            })
        );
        assert_eq!(
            parse_command("REMOVE \"Bat\" FROM GROUP \"Flyers\"").unwrap(),
            Command::Group(GroupCommand::Remove {
                object: "Bat".to_string(),
                group: "Flyers".to_string()
            })
        );
        assert!(parse_command("DELETE GROUP \"Flyers\"").unwrap().is_destructive());
    }

    #[test]
    fn test_parse_queries() {
        assert_eq!(
            parse_command("SELECT OBJECTS").unwrap(),
            Command::Query(QueryCommand::Objects { folder: None })
        );
        assert_eq!(
            parse_command("SELECT OBJECT AT 2").unwrap(),
            Command::Query(QueryCommand::ObjectAt(2))
        );
        assert_eq!(
            parse_command("SELECT OBJECT \"Hero\"").unwrap(),
            Command::Query(QueryCommand::Object("Hero".to_string()))
        );
        assert_eq!(
            parse_command("show tree").unwrap(),
            Command::Query(QueryCommand::Tree)
        );
        assert_eq!(
            parse_command("COUNT OBJECTS;").unwrap(),
            Command::Query(QueryCommand::Count)
        );
    }

    #[test]
    fn test_parse_context_commands() {
        assert_eq!(
            parse_command("ENTER FOLDER \"/Enemies\"").unwrap(),
            Command::Context(ContextCommand::EnterFolder("/Enemies".to_string()))
        );
        assert_eq!(parse_command("EXIT").unwrap(), Command::Context(ContextCommand::Exit));
        assert_eq!(
            parse_command("SHOW HISTORY").unwrap(),
            Command::Context(ContextCommand::Show(ShowTarget::History))
        );
    }

    #[test]
    fn test_parse_explain() {
        let cmd = parse_command("EXPLAIN DROP SCENE \"Level1\"").unwrap();
        match cmd {
            Command::Explain(inner) => {
                assert_eq!(*inner, Command::Scope(ScopeCommand::DropScene("Level1".to_string())));
            }
            _ => panic!("Expected Explain command"),
        }
    }

    #[test]
    fn test_escaped_quotes() {
        let cmd = parse_command(r#"CREATE GROUP "say \"hi\"""#).unwrap();
        assert_eq!(cmd, Command::Group(GroupCommand::Create("say \"hi\"".to_string())));
    }

    #[test]
    fn test_display_reparses() {
        let text = "TRANSFER OBJECT \"Boss\" TO SCENE \"Level2\" IN FOLDER \"Bosses\" AT 3";
        let cmd = parse_command(text).unwrap();
        assert_eq!(cmd.to_string(), text);
        assert_eq!(parse_command(&cmd.to_string()).unwrap(), cmd);
    }

    #[test]
    fn test_invalid_command() {
        assert!(parse_command("FROB OBJECT \"x\"").is_err());
        assert!(parse_command("CREATE OBJECT Hero TYPE \"Sprite\"").is_err());
    }

    #[test]
    fn test_parse_script_with_comments() {
        let script = parse_script(
            r#"
            -- build the first level
            CREATE SCENE "Level1";
            USE SCENE "Level1";
            CREATE OBJECT "Hero" TYPE "Sprite"; -- the player
            ;
            SHOW TREE;
        "#,
        )
        .unwrap();
        assert_eq!(script.statements.len(), 4);
    }

    #[test]
    fn test_parse_empty_script() {
        let script = parse_script("  -- nothing here\n").unwrap();
        assert!(script.statements.is_empty());
    }
}
