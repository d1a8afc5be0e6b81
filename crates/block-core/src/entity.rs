use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{BlockData, DataPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(u64);

impl EntityKey {
    pub fn new(key: u64) -> Self {
        Self(key)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Link,
    Comment,
    Image,
    File,
    Video,
    TaskBoard,
    Document,
    Embed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityMutability {
    /// Inline annotations whose data may be patched in place.
    Mutable,
    /// Atomic payloads, only replaced or deleted as a unit.
    Immutable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub mutability: EntityMutability,
    #[serde(default)]
    pub data: BlockData,
}

impl Entity {
    pub fn new(kind: EntityKind, mutability: EntityMutability, data: BlockData) -> Self {
        Self {
            kind,
            mutability,
            data,
        }
    }

    pub fn link(url: impl Into<String>, target: impl Into<String>) -> Self {
        let mut data = BlockData::new();
        data.insert("url".to_string(), Value::String(url.into()));
        data.insert("target".to_string(), Value::String(target.into()));
        Self::new(EntityKind::Link, EntityMutability::Mutable, data)
    }

    pub fn comment_thread(comments: &[Comment]) -> Self {
        let mut data = BlockData::new();
        data.insert("comments".to_string(), comments_value(comments));
        Self::new(EntityKind::Comment, EntityMutability::Mutable, data)
    }

    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// The comment list of a `COMMENT` entity. Malformed payloads read as empty.
    pub fn comments(&self) -> Vec<Comment> {
        if self.kind != EntityKind::Comment {
            return Vec::new();
        }
        self.data
            .get("comments")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}

pub(crate) fn comments_value(comments: &[Comment]) -> Value {
    serde_json::to_value(comments).unwrap_or(Value::Array(Vec::new()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<CommentReply>,
}

impl Comment {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            message: message.into(),
            created_at,
            replies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReply {
    pub id: String,
    pub author: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Entity side table. Characters reference entries by key; the map owns the payloads.
#[derive(Debug, Clone, Default)]
pub struct EntityMap {
    entries: BTreeMap<EntityKey, Arc<Entity>>,
    last_key: u64,
}

impl PartialEq for EntityMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl EntityMap {
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entries.get(&key).map(|e| e.as_ref())
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    pub fn add(&mut self, entity: Entity) -> EntityKey {
        self.last_key += 1;
        let key = EntityKey(self.last_key);
        self.entries.insert(key, Arc::new(entity));
        key
    }

    pub fn insert_with_key(&mut self, key: EntityKey, entity: Entity) {
        self.last_key = self.last_key.max(key.0);
        self.entries.insert(key, Arc::new(entity));
    }

    /// Patches an entity's data. The entry is cloned before writing when another
    /// snapshot still holds it.
    pub(crate) fn merge_data(&mut self, key: EntityKey, patch: &DataPatch) -> bool {
        let Some(entry) = self.entries.get_mut(&key) else {
            return false;
        };
        patch.apply_to(&mut Arc::make_mut(entry).data);
        true
    }

    pub(crate) fn remove(&mut self, key: EntityKey) -> Option<Arc<Entity>> {
        self.entries.remove(&key)
    }
}
