//! Object groups
//!
//! A group is a named set of object names that events address together.
//! Groups only hold names: the owning container keeps them in sync when an
//! object is removed, renamed or moved away.

use serde::{Deserialize, Serialize};

use crate::error::{ObjTreeError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectGroup {
    name: String,
    #[serde(with = "member_list")]
    objects: Vec<String>,
}

impl ObjectGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an object name. Returns false if it was already a member.
    pub fn add_object(&mut self, name: &str) -> bool {
        if self.has_object(name) {
            return false;
        }
        self.objects.push(name.to_string());
        true
    }

    /// Remove an object name. Returns false if it was not a member.
    pub fn remove_object(&mut self, name: &str) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o != name);
        self.objects.len() != before
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o == name)
    }

    pub fn object_names(&self) -> &[String] {
        &self.objects
    }

    fn rename_object(&mut self, old: &str, new: &str) {
        for member in self.objects.iter_mut().filter(|o| o.as_str() == old) {
            *member = new.to_string();
        }
    }
}

/// Ordered collection of uniquely named groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectGroupsContainer {
    groups: Vec<ObjectGroup>,
}

impl ObjectGroupsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    pub fn get(&self, name: &str) -> Result<&ObjectGroup> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| ObjTreeError::GroupNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut ObjectGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.name == name)
            .ok_or_else(|| ObjTreeError::GroupNotFound(name.to_string()))
    }

    pub fn get_at(&self, index: usize) -> Result<&ObjectGroup> {
        self.groups.get(index).ok_or(ObjTreeError::IndexOutOfBounds {
            index,
            count: self.groups.len(),
        })
    }

    /// Create an empty group at `position` (clamped)
    pub fn insert_new(&mut self, name: &str, position: usize) -> Result<&mut ObjectGroup> {
        self.insert(ObjectGroup::new(name), position)
    }

    pub fn insert(&mut self, group: ObjectGroup, position: usize) -> Result<&mut ObjectGroup> {
        if self.has(&group.name) {
            return Err(ObjTreeError::GroupNameCollision(group.name));
        }
        let position = position.min(self.groups.len());
        self.groups.insert(position, group);
        Ok(&mut self.groups[position])
    }

    pub fn remove(&mut self, name: &str) -> Result<ObjectGroup> {
        let position = self
            .position(name)
            .ok_or_else(|| ObjTreeError::GroupNotFound(name.to_string()))?;
        Ok(self.groups.remove(position))
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if old != new && self.has(new) {
            return Err(ObjTreeError::GroupNameCollision(new.to_string()));
        }
        self.get_mut(old)?.name = new.to_string();
        Ok(())
    }

    pub fn move_group(&mut self, old_index: usize, new_index: usize) -> Result<()> {
        let count = self.groups.len();
        for index in [old_index, new_index] {
            if index >= count {
                return Err(ObjTreeError::IndexOutOfBounds { index, count });
            }
        }
        let group = self.groups.remove(old_index);
        self.groups.insert(new_index, group);
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectGroup> {
        self.groups.iter()
    }

    /// Names of the groups an object belongs to
    pub fn groups_of(&self, object: &str) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|g| g.has_object(object))
            .map(|g| g.name())
            .collect()
    }

    pub(crate) fn remove_object_everywhere(&mut self, object: &str) -> usize {
        let mut removed = 0;
        for group in &mut self.groups {
            if group.remove_object(object) {
                removed += 1;
            }
        }
        removed
    }

    pub(crate) fn rename_object_everywhere(&mut self, old: &str, new: &str) {
        for group in &mut self.groups {
            group.rename_object(old, new);
        }
    }

    pub(crate) fn into_groups(self) -> Vec<ObjectGroup> {
        self.groups
    }

    pub(crate) fn clear(&mut self) {
        self.groups.clear();
    }
}

/// Members are stored as `[{ "name": "..." }]` in project files
mod member_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Member {
        name: String,
    }

    pub fn serialize<S: Serializer>(names: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        let members: Vec<Member> = names
            .iter()
            .map(|n| Member { name: n.clone() })
            .collect();
        members.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let members = Vec::<Member>::deserialize(deserializer)?;
        Ok(members.into_iter().map(|m| m.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_members_are_unique() {
        let mut group = ObjectGroup::new("Enemies");
        assert!(group.add_object("Bat"));
        assert!(!group.add_object("Bat"));
        assert_eq!(group.object_names(), &["Bat".to_string()]);
        assert!(group.remove_object("Bat"));
        assert!(!group.remove_object("Bat"));
    }

    #[test]
    fn test_insert_new_rejects_duplicate() {
        let mut groups = ObjectGroupsContainer::new();
        groups.insert_new("Enemies", 0).unwrap();
        let result = groups.insert_new("Enemies", 0);
        assert!(matches!(result, Err(ObjTreeError::GroupNameCollision(_))));
        assert_eq!(groups.count(), 1);
    }

    #[test]
    fn test_rename_and_remove() {
        let mut groups = ObjectGroupsContainer::new();
        groups.insert_new("A", 0).unwrap();
        groups.insert_new("B", 1).unwrap();

        assert!(groups.rename("A", "B").is_err());
        groups.rename("A", "C").unwrap();
        assert!(groups.has("C"));
        assert!(!groups.has("A"));

        groups.remove("C").unwrap();
        assert!(matches!(groups.remove("C"), Err(ObjTreeError::GroupNotFound(_))));
        assert_eq!(groups.count(), 1);
    }

    #[test]
    fn test_membership_cascades() {
        let mut groups = ObjectGroupsContainer::new();
        groups.insert_new("A", 0).unwrap().add_object("Bat");
        groups.insert_new("B", 1).unwrap().add_object("Bat");

        assert_eq!(groups.groups_of("Bat"), vec!["A", "B"]);
        groups.rename_object_everywhere("Bat", "Owl");
        assert_eq!(groups.groups_of("Owl"), vec!["A", "B"]);
        assert_eq!(groups.remove_object_everywhere("Owl"), 2);
        assert!(groups.groups_of("Owl").is_empty());
    }

    #[test]
    fn test_serialized_member_format() {
        let mut groups = ObjectGroupsContainer::new();
        groups.insert_new("Enemies", 0).unwrap().add_object("Bat");

        let value = serde_json::to_value(&groups).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "name": "Enemies", "objects": [{ "name": "Bat" }] }])
        );
    }
}
