//! Editing context
//!
//! The context keeps what a session has selected between statements: the
//! scope (global objects or a scene) and the stack of entered folders.
//! Folder paths given to commands are resolved against it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ObjTreeError, Result};
use crate::objects::{NodeId, ObjectsContainer};
use crate::project::Scope;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Scope selected by USE, and the one RESET goes back to
    scope: Scope,
    initial_scope: Scope,

    /// Entered folders, each as a path from the root folder
    folder_stack: Vec<Vec<String>>,

    history: Vec<ContextHistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextHistoryEntry {
    pub action: String,
    pub scope: Scope,
    pub folder: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Scope::Global)
    }
}

impl Context {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope: scope.clone(),
            initial_scope: scope,
            folder_stack: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Segments of the entered folder, empty at the root
    pub fn current_folder(&self) -> &[String] {
        self.folder_stack.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn folder_depth(&self) -> usize {
        self.folder_stack.len()
    }

    /// Switch scope; entered folders belong to the old scope and are dropped
    pub fn use_scope(&mut self, scope: Scope) {
        self.scope = scope;
        self.folder_stack.clear();
        self.record("USE", None);
    }

    /// Enter a folder of `container`, which must be the current scope's
    pub fn enter_folder(&mut self, container: &ObjectsContainer, path: &str) -> Result<()> {
        let segments = self.resolve_folder_path(path);
        container
            .folders()
            .find_folder_by_path(&segments)
            .ok_or_else(|| ObjTreeError::InvalidFolderReference(format_path(&segments)))?;

        let display = format_path(&segments);
        self.folder_stack.push(segments);
        self.record("ENTER FOLDER", Some(display));
        Ok(())
    }

    /// Leave the last entered folder
    pub fn exit(&mut self) -> Result<()> {
        match self.folder_stack.pop() {
            Some(exited) => {
                self.record("EXIT FOLDER", Some(format_path(&exited)));
                Ok(())
            }
            None => Err(ObjTreeError::ExecutionError(
                "Already at the root folder, cannot exit further".to_string(),
            )),
        }
    }

    /// Back to the starting scope at its root folder
    pub fn reset(&mut self) {
        self.scope = self.initial_scope.clone();
        self.folder_stack.clear();
        self.record("RESET", None);
    }

    /// Turn a folder path into segments from the root.
    ///
    /// A leading `/` makes the path absolute; `.` and `..` are understood.
    pub fn resolve_folder_path(&self, path: &str) -> Vec<String> {
        let base = if path.starts_with('/') {
            Vec::new()
        } else {
            self.current_folder().to_vec()
        };
        walk_path(base, path)
    }

    /// Folder node for `path` (or the entered folder when `None`)
    pub fn resolve_folder(&self, container: &ObjectsContainer, path: Option<&str>) -> Result<NodeId> {
        let segments = match path {
            Some(path) => self.resolve_folder_path(path),
            None => self.current_folder().to_vec(),
        };
        container
            .folders()
            .find_folder_by_path(&segments)
            .ok_or_else(|| ObjTreeError::InvalidFolderReference(format_path(&segments)))
    }

    /// Leave entered folders that no longer exist in `container`
    pub fn retain_existing_folders(&mut self, container: &ObjectsContainer) {
        let before = self.folder_stack.len();
        self.folder_stack
            .retain(|segments| container.folders().find_folder_by_path(segments).is_some());
        if self.folder_stack.len() != before {
            log::debug!("Dropped {} stale entered folders", before - self.folder_stack.len());
        }
    }

    pub fn history(&self) -> &[ContextHistoryEntry] {
        &self.history
    }

    /// Short prompt string, e.g. `Level1:/Enemies`
    pub fn prompt(&self) -> String {
        let scope = match &self.scope {
            Scope::Global => "global".to_string(),
            Scope::Layout(name) => name.clone(),
        };
        format!("{}:{}", scope, format_path(self.current_folder()))
    }

    fn record(&mut self, action: &str, folder: Option<String>) {
        self.history.push(ContextHistoryEntry {
            action: action.to_string(),
            scope: self.scope.clone(),
            folder,
            timestamp: Utc::now(),
        });
    }
}

/// `/a/b` form of a folder path
pub fn format_path(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

/// Segments of a path taken from the root folder, whatever its leading `/`
pub fn absolute_folder_path(path: &str) -> Vec<String> {
    walk_path(Vec::new(), path)
}

fn walk_path(mut segments: Vec<String>, path: &str) -> Vec<String> {
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name.to_string()),
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container_with_folders() -> ObjectsContainer {
        let mut container = ObjectsContainer::new();
        let root = container.folders().root();
        let enemies = container
            .folders_mut()
            .insert_new_folder(root, "Enemies", 0)
            .unwrap();
        container
            .folders_mut()
            .insert_new_folder(enemies, "Flying", 0)
            .unwrap();
        container
    }

    #[test]
    fn test_context_default() {
        let ctx = Context::default();
        assert_eq!(ctx.scope(), &Scope::Global);
        assert!(ctx.current_folder().is_empty());
        assert_eq!(ctx.folder_depth(), 0);
    }

    #[test]
    fn test_enter_and_exit() {
        let container = container_with_folders();
        let mut ctx = Context::new(Scope::layout("Level1"));

        ctx.enter_folder(&container, "Enemies").unwrap();
        ctx.enter_folder(&container, "Flying").unwrap();
        assert_eq!(ctx.current_folder(), ["Enemies", "Flying"]);
        assert_eq!(ctx.prompt(), "Level1:/Enemies/Flying");

        ctx.exit().unwrap();
        assert_eq!(ctx.current_folder(), ["Enemies"]);
        ctx.exit().unwrap();
        assert!(ctx.exit().is_err());
    }

    #[test]
    fn test_enter_missing_folder() {
        let container = container_with_folders();
        let mut ctx = Context::default();
        let result = ctx.enter_folder(&container, "Flying");
        assert!(matches!(result, Err(ObjTreeError::InvalidFolderReference(_))));
        assert_eq!(ctx.folder_depth(), 0);
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let container = container_with_folders();
        let mut ctx = Context::default();
        ctx.enter_folder(&container, "/Enemies").unwrap();

        assert_eq!(ctx.resolve_folder_path("Flying"), ["Enemies", "Flying"]);
        assert_eq!(ctx.resolve_folder_path("/Flying"), ["Flying"]);
        assert_eq!(ctx.resolve_folder_path(".."), Vec::<String>::new());
        assert_eq!(
            ctx.resolve_folder(&container, Some("Flying")).unwrap(),
            container.folders().find_folder_by_path(&["Enemies", "Flying"]).unwrap()
        );
        assert_eq!(
            ctx.resolve_folder(&container, None).unwrap(),
            container.folders().find_folder_by_path(&["Enemies"]).unwrap()
        );
    }

    #[test]
    fn test_stale_folders_are_dropped() {
        let mut container = container_with_folders();
        let mut ctx = Context::default();
        ctx.enter_folder(&container, "Enemies").unwrap();
        ctx.enter_folder(&container, "Flying").unwrap();

        let flying = container.folders().find_folder_by_path(&["Enemies", "Flying"]).unwrap();
        container.folders_mut().rename_folder(flying, "Birds").unwrap();
        ctx.retain_existing_folders(&container);
        assert_eq!(ctx.current_folder(), ["Enemies"]);
        assert_eq!(absolute_folder_path("Enemies/Birds"), ["Enemies", "Birds"]);
    }

    #[test]
    fn test_use_scope_and_reset() {
        let container = container_with_folders();
        let mut ctx = Context::new(Scope::layout("Level1"));
        ctx.enter_folder(&container, "Enemies").unwrap();

        ctx.use_scope(Scope::Global);
        assert_eq!(ctx.folder_depth(), 0);
        assert_eq!(ctx.scope(), &Scope::Global);

        ctx.reset();
        assert_eq!(ctx.scope(), &Scope::layout("Level1"));
        assert_eq!(ctx.history().len(), 3);
    }
}
