use serde::{Deserialize, Serialize};

/// A channel from `channels.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub created: i64,
    pub is_archived: bool,
    pub is_general: bool,
    pub topic: String,
    pub purpose: String,
}

/// A workspace member from `users.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub real_name: String,
    pub display_name: String,
    pub is_bot: bool,
    pub is_deleted: bool,
    pub email: String,
}

impl User {
    /// Best human-facing name: display name, then real name, then handle.
    pub fn resolved_name(&self) -> &str {
        [&self.display_name, &self.real_name]
            .into_iter()
            .find(|candidate| !candidate.is_empty())
            .unwrap_or(&self.name)
    }
}

/// `(id, name)` pair returned by listing queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
}

// Raw export shapes. Slack nests some fields and omits defaults freely.

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TextValue {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawChannel {
    pub id: String,
    pub name: String,
    pub created: i64,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_general: bool,
    #[serde(default)]
    pub topic: TextValue,
    #[serde(default)]
    pub purpose: TextValue,
}

impl From<RawChannel> for Channel {
    fn from(raw: RawChannel) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            created: raw.created,
            is_archived: raw.is_archived,
            is_general: raw.is_general,
            topic: raw.topic.value,
            purpose: raw.purpose.value,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub profile: RawProfile,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            real_name: raw.real_name,
            display_name: raw.profile.display_name,
            is_bot: raw.is_bot,
            is_deleted: raw.deleted,
            email: raw.profile.email,
        }
    }
}
