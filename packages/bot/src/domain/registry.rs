//! Joined-room registry.
//!
//! Keeps the id→name and name→id maps in lockstep: an id is registered if and
//! only if its name is. Names are matched case-insensitively.

use std::collections::HashMap;

use super::value_object::RoomId;

/// A room the bot currently sits in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSession {
    pub id: RoomId,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    by_id: HashMap<RoomId, String>,
    by_name: HashMap<String, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a joined room, evicting stale pairs for either key
    pub fn insert(&mut self, id: RoomId, name: String) {
        let key = name.to_lowercase();

        if let Some(old_name) = self.by_id.remove(&id) {
            self.by_name.remove(&old_name.to_lowercase());
        }
        if let Some(old_id) = self.by_name.remove(&key) {
            self.by_id.remove(&old_id);
        }

        self.by_id.insert(id.clone(), name);
        self.by_name.insert(key, id);
    }

    /// Unregister a room by id, returning its display name
    pub fn remove_by_id(&mut self, id: &RoomId) -> Option<String> {
        let name = self.by_id.remove(id)?;
        self.by_name.remove(&name.to_lowercase());
        Some(name)
    }

    pub fn id_of(&self, name: &str) -> Option<RoomId> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    pub fn name_of(&self, id: &RoomId) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_lowercase())
    }

    /// Lowercased names of every joined room
    pub fn names(&self) -> Vec<String> {
        self.by_name.keys().cloned().collect()
    }

    pub fn sessions(&self) -> Vec<RoomSession> {
        let mut sessions: Vec<RoomSession> = self
            .by_id
            .iter()
            .map(|(id, name)| RoomSession {
                id: id.clone(),
                name: name.clone(),
            })
            .collect();
        sessions.sort_by(|a, b| a.name.cmp(&b.name));
        sessions
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.by_id.len() == self.by_name.len()
            && self
                .by_id
                .iter()
                .all(|(id, name)| self.by_name.get(&name.to_lowercase()) == Some(id))
    }
}
