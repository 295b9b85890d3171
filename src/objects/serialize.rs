//! JSON form of an objects container
//!
//! Objects are stored in flat order; the folder structure only references
//! them by name. Loading rebuilds the tree through the container API and
//! repairs what older or hand-edited files get wrong: unknown leaves are
//! dropped, duplicate leaves keep the first placement, and objects missing
//! from the structure are appended to the root.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::container::ObjectsContainer;
use super::folder::{FolderTree, ROOT_FOLDER_NAME};
use super::groups::ObjectGroupsContainer;
use super::ids::NodeId;
use super::object::Object;
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedContainer {
    #[serde(default)]
    objects: Vec<Object>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objects_folder_structure: Option<SerializedNode>,
    #[serde(default)]
    objects_groups: ObjectGroupsContainer,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum SerializedNode {
    Folder {
        #[serde(rename = "folderName")]
        folder_name: String,
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
    Object {
        #[serde(rename = "objectName")]
        object_name: String,
    },
}

impl ObjectsContainer {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn to_serialized(&self) -> SerializedContainer {
        SerializedContainer {
            objects: self.objects().cloned().collect(),
            objects_folder_structure: Some(serialize_node(self, self.folders().root())),
            objects_groups: self.object_groups().clone(),
        }
    }

    fn from_serialized(serialized: SerializedContainer) -> Result<Self> {
        let mut container = ObjectsContainer::new();
        for object in serialized.objects {
            let position = container.objects_count();
            container.insert_object(object, position)?;
        }

        // Every object starts at the root; walking the structure re-places
        // leaves in file order, then stragglers go to the end of the root.
        let mut placed = HashSet::new();
        if let Some(SerializedNode::Folder { children, .. }) = serialized.objects_folder_structure {
            let root = container.folders().root();
            place_children(&mut container, root, children, &mut placed)?;
        }

        let root = container.folders().root();
        let unplaced: Vec<NodeId> = container
            .objects()
            .filter(|o| !placed.contains(o.name()))
            .filter_map(|o| container.node_of(o.name()))
            .collect();
        for leaf in unplaced {
            container.folders_mut().move_to_folder(leaf, root, usize::MAX)?;
        }

        // Groups go through `insert` so a repeated name fails the load
        let groups = container.object_groups_mut();
        for group in serialized.objects_groups.into_groups() {
            groups.insert(group, usize::MAX)?;
        }
        Ok(container)
    }
}

fn serialize_node(container: &ObjectsContainer, node: NodeId) -> SerializedNode {
    let tree: &FolderTree = container.folders();
    match tree.object_id(node).and_then(|id| container.object_by_id(id)) {
        Some(object) => SerializedNode::Object {
            object_name: object.name().to_string(),
        },
        None => SerializedNode::Folder {
            folder_name: if tree.is_root(node) {
                ROOT_FOLDER_NAME.to_string()
            } else {
                tree.folder_name(node).unwrap_or_default().to_string()
            },
            children: tree
                .children(node)
                .iter()
                .map(|c| serialize_node(container, *c))
                .collect(),
        },
    }
}

fn place_children(
    container: &mut ObjectsContainer,
    folder: NodeId,
    children: Vec<SerializedNode>,
    placed: &mut HashSet<String>,
) -> Result<()> {
    for child in children {
        match child {
            SerializedNode::Object { object_name } => {
                let Some(leaf) = container.node_of(&object_name) else {
                    log::warn!(
                        "Folder structure references unknown object '{}', dropping it",
                        object_name
                    );
                    continue;
                };
                if !placed.insert(object_name.clone()) {
                    log::warn!(
                        "Object '{}' is placed twice in the folder structure, keeping the first",
                        object_name
                    );
                    continue;
                }
                container
                    .folders_mut()
                    .move_to_folder(leaf, folder, usize::MAX)?;
            }
            SerializedNode::Folder {
                folder_name,
                children,
            } => {
                let existing = container.folders().sibling_folder_named(folder, &folder_name);
                let subfolder = match existing {
                    Some(id) => {
                        log::warn!("Merging duplicate folder '{}'", folder_name);
                        id
                    }
                    None => container
                        .folders_mut()
                        .insert_new_folder(folder, &folder_name, usize::MAX)?,
                };
                place_children(container, subfolder, children, placed)?;
            }
        }
    }
    Ok(())
}

impl Serialize for ObjectsContainer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_serialized().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectsContainer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let serialized = SerializedContainer::deserialize(deserializer)?;
        ObjectsContainer::from_serialized(serialized).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjTreeError;
    use serde_json::json;

    fn names(container: &ObjectsContainer) -> Vec<String> {
        container.objects().map(|o| o.name().to_string()).collect()
    }

    fn root_child_names(container: &ObjectsContainer) -> Vec<String> {
        container
            .root_folder()
            .children()
            .map(|n| match n.object() {
                Some(o) => o.name().to_string(),
                None => format!("{}/", n.folder_name().unwrap_or_default()),
            })
            .collect()
    }

    #[test]
    fn test_save_and_load_keeps_both_orders() {
        let mut container = ObjectsContainer::new();
        for name in ["A", "B", "C"] {
            let position = container.objects_count();
            container.insert_object(Object::new("Sprite", name), position).unwrap();
        }
        let root = container.folders().root();
        let folder = container.folders_mut().insert_new_folder(root, "Props", 1).unwrap();
        let leaf = container.node_of("A").unwrap();
        container.folders_mut().move_to_folder(leaf, folder, 0).unwrap();
        container
            .object_groups_mut()
            .insert_new("G", 0)
            .unwrap()
            .add_object("C");

        let json = container.to_json().unwrap();
        let loaded = ObjectsContainer::from_json(&json).unwrap();

        assert_eq!(names(&loaded), vec!["A", "B", "C"]);
        assert_eq!(root_child_names(&loaded), vec!["Props/", "B", "C"]);
        let props = loaded.folders().find_folder_by_path(&["Props"]).unwrap();
        assert!(loaded.node(props).unwrap().has_object_named("A"));
        assert!(loaded.object_groups().get("G").unwrap().has_object("C"));
        loaded.check_consistency().unwrap();
    }

    #[test]
    fn test_load_rejects_duplicate_group_names() {
        let serialized: SerializedContainer = serde_json::from_value(json!({
            "objects": [ { "name": "Bat", "type": "Sprite" } ],
            "objectsGroups": [
                { "name": "Flyers", "objects": [ { "name": "Bat" } ] },
                { "name": "Flyers", "objects": [] }
            ]
        }))
        .unwrap();
        assert!(matches!(
            ObjectsContainer::from_serialized(serialized),
            Err(ObjTreeError::GroupNameCollision(ref name)) if name == "Flyers"
        ));

        let json = r#"{ "objectsGroups": [ { "name": "G", "objects": [] }, { "name": "G", "objects": [] } ] }"#;
        assert!(ObjectsContainer::from_json(json).is_err());
    }

    #[test]
    fn test_load_repairs_folder_structure() {
        let value = json!({
            "objects": [
                { "name": "Player", "type": "Sprite" },
                { "name": "Bat", "type": "Sprite" },
                { "name": "Owl", "type": "Sprite" }
            ],
            "objectsFolderStructure": {
                "folderName": "__ROOT",
                "children": [
                    { "objectName": "Ghost" },
                    { "folderName": "Enemies", "children": [ { "objectName": "Bat" } ] },
                    { "objectName": "Bat" },
                    { "objectName": "Player" }
                ]
            }
        });

        let container: ObjectsContainer = serde_json::from_value(value).unwrap();

        assert_eq!(names(&container), vec!["Player", "Bat", "Owl"]);
        assert_eq!(root_child_names(&container), vec!["Enemies/", "Player", "Owl"]);
        container.check_consistency().unwrap();
    }

    #[test]
    fn test_load_without_structure_places_at_root() {
        let value = json!({ "objects": [ { "name": "A", "type": "Sprite" }, { "name": "B", "type": "Sprite" } ] });
        let container: ObjectsContainer = serde_json::from_value(value).unwrap();
        assert_eq!(root_child_names(&container), vec!["A", "B"]);
    }

    #[test]
    fn test_load_rejects_duplicate_names() {
        let value = json!({ "objects": [ { "name": "A", "type": "Sprite" }, { "name": "A", "type": "Sprite" } ] });
        let result: std::result::Result<ObjectsContainer, _> = serde_json::from_value(value);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_serialized_layout() {
        let mut container = ObjectsContainer::new();
        container.insert_object(Object::new("Sprite", "Hero"), 0).unwrap();
        let value = serde_json::to_value(&container).unwrap();
        assert_eq!(
            value,
            json!({
                "objects": [ { "name": "Hero", "type": "Sprite" } ],
                "objectsFolderStructure": {
                    "folderName": "__ROOT",
                    "children": [ { "objectName": "Hero" } ]
                },
                "objectsGroups": []
            })
        );
    }
}
