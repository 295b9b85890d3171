//! Command executor

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::{absolute_folder_path, format_path, Context};
use crate::error::{ObjTreeError, Result};
use crate::objects::{NodeId, NodeRef, Object, ObjectsContainer};
use crate::output::OutputFormat;
use crate::parser::{
    Command, ContextCommand, FolderCommand, GroupCommand, ObjectCommand, Placement, QueryCommand,
    ScopeCommand, ShowTarget,
};
use crate::project::{Project, Scope};

/// Execution context containing runtime configuration
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub dry_run: bool,
    pub allow_actions: bool,
    pub output_format: OutputFormat,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            dry_run: false,
            allow_actions: false,
            output_format: OutputFormat::Human,
        }
    }
}

/// Result of command execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub data: ResultData,
    /// Whether the project was changed and needs saving
    pub modified: bool,
}

impl ExecutionResult {
    fn read(data: ResultData) -> Self {
        Self {
            data,
            modified: false,
        }
    }

    fn changed(message: String) -> Self {
        Self {
            data: ResultData::Message(message),
            modified: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ResultData {
    Objects(Vec<ObjectInfo>),
    Object(ObjectInfo),
    Tree(TreeNodeInfo),
    Groups(Vec<GroupInfo>),
    Scenes(Vec<SceneInfo>),
    ContextInfo(ContextInfo),
    Count(CountInfo),
    Consistency(ConsistencyInfo),
    Explanation(String),
    Message(String),
}

/// One object as listed by SELECT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub position: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub folder: String,
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tags: String,
    /// Only filled when a single object is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Map<String, Value>>,
}

/// Folder tree as shown by SHOW TREE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNodeInfo {
    pub name: String,
    pub is_folder: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNodeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub name: String,
    pub objects: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneInfo {
    pub name: String,
    pub objects: usize,
    pub groups: usize,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountInfo {
    pub scope: String,
    pub objects: usize,
}

/// Information about current context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextInfo {
    pub scope: String,
    pub current_folder: String,
    pub folder_depth: usize,
    pub history: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyInfo {
    pub containers_checked: usize,
    pub problems: Vec<ConsistencyProblem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyProblem {
    pub scope: String,
    pub error: String,
}

/// Execute a parsed command against a project with a stateful context
pub fn execute_command_with_context(
    cmd: &Command,
    ctx: &ExecutionContext,
    project: &mut Project,
    context: &mut Context,
) -> Result<ExecutionResult> {
    log::debug!("Executing {} in {}", cmd, context.scope());

    if cmd.is_destructive() && !ctx.allow_actions && !ctx.dry_run {
        return Err(ObjTreeError::ActionsDisabled);
    }

    if cmd.is_mutation() && ctx.dry_run {
        return Ok(ExecutionResult::read(ResultData::Explanation(format!(
            "DRY RUN: {}",
            explain_command(cmd, context)
        ))));
    }

    match cmd {
        Command::Scope(scope_cmd) => execute_scope_command(scope_cmd, project, context),
        Command::Object(object_cmd) => execute_object_command(object_cmd, project, context),
        Command::Folder(folder_cmd) => execute_folder_command(folder_cmd, project, context),
        Command::Group(group_cmd) => execute_group_command(group_cmd, project, context),
        Command::Query(query) => execute_query(query, project, context),
        Command::Context(context_cmd) => execute_context_command(context_cmd, project, context),
        Command::Explain(inner) => Ok(ExecutionResult::read(ResultData::Explanation(
            explain_command(inner, context),
        ))),
    }
}

// ============================================================================
// Scenes
// ============================================================================

fn execute_scope_command(
    cmd: &ScopeCommand,
    project: &mut Project,
    context: &mut Context,
) -> Result<ExecutionResult> {
    match cmd {
        ScopeCommand::CreateScene(name) => {
            project.create_layout(name)?;
            Ok(ExecutionResult::changed(format!("Created scene '{}'", name)))
        }
        ScopeCommand::UseScene(name) => {
            project.layout(name)?;
            context.use_scope(Scope::layout(name.as_str()));
            Ok(ExecutionResult::read(ResultData::Message(format!(
                "Using scene '{}'",
                name
            ))))
        }
        ScopeCommand::UseGlobal => {
            context.use_scope(Scope::Global);
            Ok(ExecutionResult::read(ResultData::Message(
                "Using global objects".to_string(),
            )))
        }
        ScopeCommand::ListScenes => {
            let scenes = project
                .layouts()
                .map(|layout| SceneInfo {
                    name: layout.name().to_string(),
                    objects: layout.objects().objects_count(),
                    groups: layout.objects().object_groups().count(),
                    is_active: context.scope() == &Scope::layout(layout.name()),
                })
                .collect();
            Ok(ExecutionResult::read(ResultData::Scenes(scenes)))
        }
        ScopeCommand::DropScene(name) => {
            project.remove_layout(name)?;
            if context.scope() == &Scope::layout(name.as_str()) {
                context.use_scope(Scope::Global);
            }
            Ok(ExecutionResult::changed(format!("Dropped scene '{}'", name)))
        }
    }
}

// ============================================================================
// Objects
// ============================================================================

fn execute_object_command(
    cmd: &ObjectCommand,
    project: &mut Project,
    context: &mut Context,
) -> Result<ExecutionResult> {
    let scope = context.scope().clone();

    match cmd {
        ObjectCommand::Create {
            name,
            object_type,
            placement,
        } => {
            let folder = context.resolve_folder(project.container(&scope)?, placement.folder.as_deref())?;
            let position = placement.position.unwrap_or(usize::MAX);
            project.insert_new_object(&scope, object_type, name, Some(folder), position)?;

            let container = project.container(&scope)?;
            let position = container.get_object_position(name).unwrap_or_default();
            Ok(ExecutionResult::changed(format!(
                "Created object '{}' ({}) at position {} in {}",
                name,
                object_type,
                position,
                format_path(&container.folders().folder_path(folder))
            )))
        }
        ObjectCommand::Delete(name) => {
            let object = project.remove_object(&scope, name)?;
            Ok(ExecutionResult::changed(format!(
                "Deleted object '{}' ({})",
                object.name(),
                object.object_type()
            )))
        }
        ObjectCommand::Rename { from, to } => {
            project.rename_object(&scope, from, to)?;
            Ok(ExecutionResult::changed(format!(
                "Renamed object '{}' to '{}'",
                from, to
            )))
        }
        ObjectCommand::Move { from, to } => {
            project.container_mut(&scope)?.move_object(*from, *to)?;
            Ok(ExecutionResult::changed(format!(
                "Moved object from position {} to {}",
                from, to
            )))
        }
        ObjectCommand::Swap { first, second } => {
            project.container_mut(&scope)?.swap_objects(*first, *second)?;
            Ok(ExecutionResult::changed(format!(
                "Swapped objects at positions {} and {}",
                first, second
            )))
        }
        ObjectCommand::Transfer {
            name,
            to,
            placement,
        } => {
            let node = object_node(project.container(&scope)?, name)?;
            transfer(project, context, node, to, placement)?;
            Ok(ExecutionResult::changed(format!(
                "Transferred object '{}' from {} to {}",
                name, scope, to
            )))
        }
        ObjectCommand::Place {
            name,
            folder,
            position,
        } => {
            let container = project.container_mut(&scope)?;
            let node = object_node(container, name)?;
            let target = context.resolve_folder(container, Some(folder))?;
            container
                .folders_mut()
                .move_to_folder(node, target, position.unwrap_or(usize::MAX))?;
            Ok(ExecutionResult::changed(format!(
                "Placed object '{}' in {}",
                name,
                format_path(&container.folders().folder_path(target))
            )))
        }
    }
}

fn object_node(container: &ObjectsContainer, name: &str) -> Result<NodeId> {
    container
        .node_of(name)
        .ok_or_else(|| ObjTreeError::ObjectNotFound(name.to_string()))
}

/// Move a node of the current scope to another scope.
///
/// The target folder path is taken from the target's root.
fn transfer(
    project: &mut Project,
    context: &mut Context,
    node: NodeId,
    to: &Scope,
    placement: &Placement,
) -> Result<()> {
    let from = context.scope().clone();
    let target_folder = match &placement.folder {
        Some(path) => {
            let segments = absolute_folder_path(path);
            let folder = project
                .container(to)?
                .folders()
                .find_folder_by_path(&segments)
                .ok_or_else(|| ObjTreeError::InvalidFolderReference(format_path(&segments)))?;
            Some(folder)
        }
        None => None,
    };
    project.transfer(
        &from,
        node,
        to,
        target_folder,
        placement.position.unwrap_or(usize::MAX),
    )?;
    context.retain_existing_folders(project.container(&from)?);
    Ok(())
}

// ============================================================================
// Folders
// ============================================================================

fn check_folder_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(ObjTreeError::ExecutionError(format!(
            "Invalid folder name '{}': names must be non-empty and cannot contain '/'",
            name
        )));
    }
    Ok(())
}

fn execute_folder_command(
    cmd: &FolderCommand,
    project: &mut Project,
    context: &mut Context,
) -> Result<ExecutionResult> {
    let scope = context.scope().clone();

    match cmd {
        FolderCommand::Create { name, placement } => {
            check_folder_name(name)?;
            let container = project.container_mut(&scope)?;
            let parent = context.resolve_folder(container, placement.folder.as_deref())?;
            let folder = container.folders_mut().insert_new_folder(
                parent,
                name,
                placement.position.unwrap_or(usize::MAX),
            )?;
            Ok(ExecutionResult::changed(format!(
                "Created folder {}",
                format_path(&container.folders().folder_path(folder))
            )))
        }
        FolderCommand::Rename { path, new_name } => {
            check_folder_name(new_name)?;
            let container = project.container_mut(&scope)?;
            let folder = context.resolve_folder(container, Some(path))?;
            container.folders_mut().rename_folder(folder, new_name)?;
            context.retain_existing_folders(container);
            Ok(ExecutionResult::changed(format!(
                "Renamed folder '{}' to {}",
                path,
                format_path(&container.folders().folder_path(folder))
            )))
        }
        FolderCommand::Place {
            path,
            folder,
            position,
        } => {
            let container = project.container_mut(&scope)?;
            let node = context.resolve_folder(container, Some(path))?;
            let target = context.resolve_folder(container, Some(folder))?;
            container
                .folders_mut()
                .move_to_folder(node, target, position.unwrap_or(usize::MAX))?;
            context.retain_existing_folders(container);
            Ok(ExecutionResult::changed(format!(
                "Placed folder '{}' at {}",
                path,
                format_path(&container.folders().folder_path(node))
            )))
        }
        FolderCommand::Delete(path) => {
            let container = project.container_mut(&scope)?;
            let folder = context.resolve_folder(container, Some(path))?;
            let removed = container.remove_folder(folder)?;
            context.retain_existing_folders(container);
            Ok(ExecutionResult::changed(format!(
                "Deleted folder '{}' and {} object(s)",
                path,
                removed.len()
            )))
        }
        FolderCommand::Transfer {
            path,
            to,
            placement,
        } => {
            let folder = context.resolve_folder(project.container(&scope)?, Some(path))?;
            transfer(project, context, folder, to, placement)?;
            Ok(ExecutionResult::changed(format!(
                "Transferred folder '{}' from {} to {}",
                path, scope, to
            )))
        }
    }
}

// ============================================================================
// Groups
// ============================================================================

fn execute_group_command(
    cmd: &GroupCommand,
    project: &mut Project,
    context: &Context,
) -> Result<ExecutionResult> {
    let scope = context.scope().clone();

    match cmd {
        GroupCommand::Create(name) => {
            project
                .container_mut(&scope)?
                .object_groups_mut()
                .insert_new(name, usize::MAX)?;
            Ok(ExecutionResult::changed(format!("Created group '{}'", name)))
        }
        GroupCommand::Delete(name) => {
            project.container_mut(&scope)?.object_groups_mut().remove(name)?;
            Ok(ExecutionResult::changed(format!("Deleted group '{}'", name)))
        }
        GroupCommand::Add { object, group } => {
            // Scene groups may also list global objects
            let known = project.container(&scope)?.has_object_named(object)
                || project.global_objects().has_object_named(object);
            if !known {
                return Err(ObjTreeError::ObjectNotFound(object.clone()));
            }
            let added = project
                .container_mut(&scope)?
                .object_groups_mut()
                .get_mut(group)?
                .add_object(object);
            if !added {
                return Ok(ExecutionResult::read(ResultData::Message(format!(
                    "'{}' is already in group '{}'",
                    object, group
                ))));
            }
            Ok(ExecutionResult::changed(format!(
                "Added '{}' to group '{}'",
                object, group
            )))
        }
        GroupCommand::Remove { object, group } => {
            let removed = project
                .container_mut(&scope)?
                .object_groups_mut()
                .get_mut(group)?
                .remove_object(object);
            if !removed {
                return Err(ObjTreeError::ObjectNotFound(format!(
                    "'{}' in group '{}'",
                    object, group
                )));
            }
            Ok(ExecutionResult::changed(format!(
                "Removed '{}' from group '{}'",
                object, group
            )))
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

fn object_info(container: &ObjectsContainer, position: usize, object: &Object) -> ObjectInfo {
    let folder = container
        .node_of(object.name())
        .map(|node| format_path(&container.folders().folder_path(node)))
        .unwrap_or_else(|| "/".to_string());
    ObjectInfo {
        position,
        name: object.name().to_string(),
        object_type: object.object_type().to_string(),
        folder,
        groups: container
            .object_groups()
            .groups_of(object.name())
            .into_iter()
            .map(str::to_string)
            .collect(),
        tags: object.tags().to_string(),
        configuration: None,
    }
}

fn detailed_object_info(container: &ObjectsContainer, object: &Object) -> ObjectInfo {
    let position = container.get_object_position(object.name()).unwrap_or_default();
    ObjectInfo {
        configuration: Some(object.configuration().clone()),
        ..object_info(container, position, object)
    }
}

fn tree_info(node: NodeRef<'_>) -> TreeNodeInfo {
    match node.object() {
        Some(object) => TreeNodeInfo {
            name: object.name().to_string(),
            is_folder: false,
            object_type: Some(object.object_type().to_string()),
            children: Vec::new(),
        },
        None => TreeNodeInfo {
            name: if node.is_root() {
                "/".to_string()
            } else {
                node.folder_name().unwrap_or_default().to_string()
            },
            is_folder: true,
            object_type: None,
            children: node.children().map(tree_info).collect(),
        },
    }
}

fn execute_query(
    query: &QueryCommand,
    project: &Project,
    context: &Context,
) -> Result<ExecutionResult> {
    let scope = context.scope();

    let data = match query {
        QueryCommand::Objects { folder } => {
            let container = project.container(scope)?;
            let in_folder: Option<HashSet<&str>> = match folder {
                Some(path) => {
                    let folder = context.resolve_folder(container, Some(path))?;
                    Some(
                        container
                            .folders()
                            .objects_in_subtree(folder)
                            .into_iter()
                            .filter_map(|id| container.object_by_id(id))
                            .map(Object::name)
                            .collect(),
                    )
                }
                None => None,
            };
            let objects = container
                .objects()
                .enumerate()
                .filter(|(_, o)| in_folder.as_ref().map_or(true, |names| names.contains(o.name())))
                .map(|(i, o)| object_info(container, i, o))
                .collect();
            ResultData::Objects(objects)
        }
        QueryCommand::Object(name) => {
            let container = project.container(scope)?;
            ResultData::Object(detailed_object_info(container, container.get_object(name)?))
        }
        QueryCommand::ObjectAt(position) => {
            let container = project.container(scope)?;
            ResultData::Object(detailed_object_info(container, container.get_object_at(*position)?))
        }
        QueryCommand::Groups => {
            let groups = project
                .container(scope)?
                .object_groups()
                .iter()
                .map(|g| GroupInfo {
                    name: g.name().to_string(),
                    objects: g.object_names().to_vec(),
                })
                .collect();
            ResultData::Groups(groups)
        }
        QueryCommand::Tree => ResultData::Tree(tree_info(project.container(scope)?.root_folder())),
        QueryCommand::Count => ResultData::Count(CountInfo {
            scope: scope.to_string(),
            objects: project.container(scope)?.objects_count(),
        }),
        QueryCommand::Check => ResultData::Consistency(check_project(project)),
    };

    Ok(ExecutionResult::read(data))
}

/// Validate every container of a project
pub fn check_project(project: &Project) -> ConsistencyInfo {
    ConsistencyInfo {
        containers_checked: 1 + project.layouts_count(),
        problems: project
            .check()
            .into_iter()
            .map(|(scope, error)| ConsistencyProblem {
                scope: scope.to_string(),
                error: error.to_string(),
            })
            .collect(),
    }
}

// ============================================================================
// Context
// ============================================================================

fn execute_context_command(
    cmd: &ContextCommand,
    project: &Project,
    context: &mut Context,
) -> Result<ExecutionResult> {
    let message = match cmd {
        ContextCommand::EnterFolder(path) => {
            let container = project.container(context.scope())?;
            context.enter_folder(container, path)?;
            format!("Entered folder: {}", format_path(context.current_folder()))
        }
        ContextCommand::Exit => {
            context.exit()?;
            format!("Exited to: {}", format_path(context.current_folder()))
        }
        ContextCommand::Reset => {
            context.reset();
            "Context reset to initial state".to_string()
        }
        ContextCommand::Show(target) => {
            let history = match target {
                ShowTarget::Context => Vec::new(),
                ShowTarget::History => context
                    .history()
                    .iter()
                    .map(|h| {
                        format!(
                            "{}: {} {}{}",
                            h.timestamp.format("%H:%M:%S"),
                            h.action,
                            h.scope,
                            h.folder.as_ref().map(|f| format!(" {}", f)).unwrap_or_default()
                        )
                    })
                    .collect(),
            };
            return Ok(ExecutionResult::read(ResultData::ContextInfo(ContextInfo {
                scope: context.scope().to_string(),
                current_folder: format_path(context.current_folder()),
                folder_depth: context.folder_depth(),
                history,
            })));
        }
    };

    Ok(ExecutionResult::read(ResultData::Message(message)))
}

// ============================================================================
// EXPLAIN
// ============================================================================

fn where_placed(placement: &Placement) -> String {
    let mut out = String::new();
    if let Some(folder) = &placement.folder {
        out.push_str(&format!(" in folder '{}'", folder));
    }
    match placement.position {
        Some(position) => out.push_str(&format!(" at position {}", position)),
        None => out.push_str(" at the end"),
    }
    out
}

/// Describe what a command would do, without running it
pub fn explain_command(cmd: &Command, context: &Context) -> String {
    let scope = context.scope();
    let description = match cmd {
        Command::Scope(c) => match c {
            ScopeCommand::CreateScene(n) => format!("Would create an empty scene '{}'", n),
            ScopeCommand::UseScene(n) => format!("Would switch to scene '{}'", n),
            ScopeCommand::UseGlobal => "Would switch to the global objects".to_string(),
            ScopeCommand::ListScenes => "Would list every scene".to_string(),
            ScopeCommand::DropScene(n) => {
                format!("Would delete scene '{}' with all of its objects", n)
            }
        },
        Command::Object(c) => match c {
            ObjectCommand::Create {
                name,
                object_type,
                placement,
            } => format!(
                "Would create {} object '{}' in {}{}",
                object_type,
                name,
                scope,
                where_placed(placement)
            ),
            ObjectCommand::Delete(n) => format!(
                "Would delete object '{}' from {} and from every group",
                n, scope
            ),
            ObjectCommand::Rename { from, to } => format!(
                "Would rename object '{}' to '{}' in {}, updating group members",
                from, to, scope
            ),
            ObjectCommand::Move { from, to } => format!(
                "Would move the object at position {} to position {} in {}",
                from, to, scope
            ),
            ObjectCommand::Swap { first, second } => format!(
                "Would swap the objects at positions {} and {} in {}",
                first, second, scope
            ),
            ObjectCommand::Transfer {
                name,
                to,
                placement,
            } => format!(
                "Would move object '{}' from {} to {}{}",
                name,
                scope,
                to,
                where_placed(placement)
            ),
            ObjectCommand::Place {
                name,
                folder,
                position,
            } => format!(
                "Would place object '{}' in folder '{}'{} in {}",
                name,
                folder,
                position.map(|p| format!(" at index {}", p)).unwrap_or_default(),
                scope
            ),
        },
        Command::Folder(c) => match c {
            FolderCommand::Create { name, placement } => format!(
                "Would create folder '{}' in {}{}",
                name,
                scope,
                where_placed(placement)
            ),
            FolderCommand::Rename { path, new_name } => {
                format!("Would rename folder '{}' to '{}' in {}", path, new_name, scope)
            }
            FolderCommand::Place {
                path,
                folder,
                position,
            } => format!(
                "Would move folder '{}' into folder '{}'{} in {}",
                path,
                folder,
                position.map(|p| format!(" at index {}", p)).unwrap_or_default(),
                scope
            ),
            FolderCommand::Delete(path) => format!(
                "Would delete folder '{}' and every object under it from {}",
                path, scope
            ),
            FolderCommand::Transfer {
                path,
                to,
                placement,
            } => format!(
                "Would move folder '{}' with everything under it from {} to {}{}",
                path,
                scope,
                to,
                where_placed(placement)
            ),
        },
        Command::Group(c) => match c {
            GroupCommand::Create(n) => format!("Would create group '{}' in {}", n, scope),
            GroupCommand::Delete(n) => format!("Would delete group '{}' from {}", n, scope),
            GroupCommand::Add { object, group } => {
                format!("Would add '{}' to group '{}' in {}", object, group, scope)
            }
            GroupCommand::Remove { object, group } => {
                format!("Would remove '{}' from group '{}' in {}", object, group, scope)
            }
        },
        Command::Query(q) => match q {
            QueryCommand::Objects { folder: None } => {
                format!("Would list the objects of {} in order", scope)
            }
            QueryCommand::Objects { folder: Some(f) } => {
                format!("Would list the objects under folder '{}' in {}", f, scope)
            }
            QueryCommand::Object(n) => format!("Would show object '{}' of {}", n, scope),
            QueryCommand::ObjectAt(i) => {
                format!("Would show the object at position {} of {}", i, scope)
            }
            QueryCommand::Groups => format!("Would list the groups of {}", scope),
            QueryCommand::Tree => format!("Would show the folder tree of {}", scope),
            QueryCommand::Count => format!("Would count the objects of {}", scope),
            QueryCommand::Check => "Would validate every container of the project".to_string(),
        },
        Command::Context(c) => match c {
            ContextCommand::EnterFolder(p) => format!("Would enter folder '{}'", p),
            ContextCommand::Exit => "Would exit the current folder".to_string(),
            ContextCommand::Reset => "Would reset context to initial state".to_string(),
            ContextCommand::Show(t) => format!("Would show {}", t),
        },
        Command::Explain(inner) => return explain_command(inner, context),
    };

    if cmd.is_destructive() {
        format!("EXPLAIN: {} (destructive, requires --allow-actions)", description)
    } else {
        format!("EXPLAIN: {}", description)
    }
}
