//! Human-readable output formatting

use crate::engine::executor::{ExecutionResult, ObjectInfo, ResultData, TreeNodeInfo};

pub fn format_human(result: &ExecutionResult) -> String {
    match &result.data {
        ResultData::Objects(objects) => {
            if objects.is_empty() {
                return "No objects".to_string();
            }
            let mut output = String::from("Objects\n-------\n");
            output.push_str(&format!(
                "{:>4}  {:<24} {:<28} {:<20} {}\n",
                "POS", "NAME", "TYPE", "FOLDER", "GROUPS"
            ));
            output.push_str(&"-".repeat(90));
            output.push('\n');
            for object in objects {
                output.push_str(&format!(
                    "{:>4}  {:<24} {:<28} {:<20} {}\n",
                    object.position,
                    truncate(&object.name, 24),
                    truncate(&object.object_type, 28),
                    truncate(&object.folder, 20),
                    object.groups.join(", ")
                ));
            }
            output
        }
        ResultData::Object(object) => format_object(object),
        ResultData::Tree(root) => {
            let mut output = String::from("/\n");
            let count = root.children.len();
            for (i, child) in root.children.iter().enumerate() {
                write_tree(&mut output, child, "", i + 1 == count);
            }
            output
        }
        ResultData::Groups(groups) => {
            if groups.is_empty() {
                return "No groups".to_string();
            }
            let mut output = String::from("Groups\n------\n");
            for group in groups {
                output.push_str(&format!(
                    "{} ({}): {}\n",
                    group.name,
                    group.objects.len(),
                    group.objects.join(", ")
                ));
            }
            output
        }
        ResultData::Scenes(scenes) => {
            if scenes.is_empty() {
                return "No scenes".to_string();
            }
            let mut output = String::from("Scenes\n------\n");
            output.push_str(&format!(
                "{:<24} {:>8} {:>8} {:>8}\n",
                "NAME", "OBJECTS", "GROUPS", "ACTIVE"
            ));
            output.push_str(&"-".repeat(51));
            output.push('\n');
            for scene in scenes {
                output.push_str(&format!(
                    "{:<24} {:>8} {:>8} {:>8}\n",
                    truncate(&scene.name, 24),
                    scene.objects,
                    scene.groups,
                    if scene.is_active { "*" } else { "" }
                ));
            }
            output
        }
        ResultData::ContextInfo(info) => {
            let mut output = String::new();
            output.push_str("Current Context\n");
            output.push_str("---------------\n");
            output.push_str(&format!("Scope:  {}\n", info.scope));
            output.push_str(&format!("Folder: {}\n", info.current_folder));
            output.push_str(&format!("Depth:  {}\n", info.folder_depth));

            if !info.history.is_empty() {
                output.push_str("\nHistory\n");
                output.push_str("-------\n");
                for entry in &info.history {
                    output.push_str(&format!("  {}\n", entry));
                }
            }
            output
        }
        ResultData::Count(count) => format!("{}: {} object(s)", count.scope, count.objects),
        ResultData::Consistency(info) => {
            if info.problems.is_empty() {
                return format!("OK: {} container(s) consistent", info.containers_checked);
            }
            let mut output = format!(
                "{} of {} container(s) inconsistent\n",
                info.problems.len(),
                info.containers_checked
            );
            for problem in &info.problems {
                output.push_str(&format!("  {}: {}\n", problem.scope, problem.error));
            }
            output
        }
        ResultData::Explanation(explanation) => explanation.clone(),
        ResultData::Message(msg) => msg.clone(),
    }
}

fn format_object(object: &ObjectInfo) -> String {
    let mut output = format!(
        "Object {}\n{}\n\
         Position: {}\n\
         Type:     {}\n\
         Folder:   {}\n",
        object.name,
        "-".repeat(object.name.chars().count() + 7),
        object.position,
        object.object_type,
        object.folder
    );
    if !object.groups.is_empty() {
        output.push_str(&format!("Groups:   {}\n", object.groups.join(", ")));
    }
    if !object.tags.is_empty() {
        output.push_str(&format!("Tags:     {}\n", object.tags));
    }
    if let Some(configuration) = &object.configuration {
        if !configuration.is_empty() {
            output.push_str("Configuration:\n");
            for (key, value) in configuration {
                output.push_str(&format!("  {} = {}\n", key, value));
            }
        }
    }
    output
}

fn write_tree(output: &mut String, node: &TreeNodeInfo, prefix: &str, last: bool) {
    let branch = if last { "└── " } else { "├── " };
    if node.is_folder {
        output.push_str(&format!("{}{}{}/\n", prefix, branch, node.name));
    } else {
        output.push_str(&format!(
            "{}{}{} [{}]\n",
            prefix,
            branch,
            node.name,
            node.object_type.as_deref().unwrap_or("?")
        ));
    }
    let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        write_tree(output, child, &child_prefix, i + 1 == count);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> TreeNodeInfo {
        TreeNodeInfo {
            name: name.to_string(),
            is_folder: false,
            object_type: Some("Sprite".to_string()),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_tree_rendering() {
        let root = TreeNodeInfo {
            name: "/".to_string(),
            is_folder: true,
            object_type: None,
            children: vec![
                TreeNodeInfo {
                    name: "Enemies".to_string(),
                    is_folder: true,
                    object_type: None,
                    children: vec![leaf("Bat")],
                },
                leaf("Hero"),
            ],
        };
        let result = ExecutionResult {
            data: ResultData::Tree(root),
            modified: false,
        };
        assert_eq!(
            format_human(&result),
            "/\n├── Enemies/\n│   └── Bat [Sprite]\n└── Hero [Sprite]\n"
        );
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ÉnemyÉnemy", 6), "Éne...");
        assert_eq!(truncate("Bat", 6), "Bat");
    }
}
