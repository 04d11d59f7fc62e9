//! Read-only view over a Slack workspace export.
//!
//! The export directory must contain `channels.json` and `users.json`. Both
//! are loaded fully into memory; all queries are answered from there.

mod model;

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

pub use model::{Channel, Entry, User};
use model::{RawChannel, RawUser};

pub const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum SlackDbError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid export file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct SlackDb {
    channels: Vec<Channel>,
    users: Vec<User>,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, SlackDbError> {
    let text = fs::read_to_string(path).map_err(|source| SlackDbError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SlackDbError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl SlackDb {
    /// Load `channels.json` and `users.json` from an export directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SlackDbError> {
        let dir = dir.as_ref();

        let channels: Vec<RawChannel> = load_json(&dir.join("channels.json"))?;
        let users: Vec<RawUser> = load_json(&dir.join("users.json"))?;

        let db = Self::from_parts(
            channels.into_iter().map(Channel::from).collect(),
            users.into_iter().map(User::from).collect(),
        );
        info!(
            path = %dir.display(),
            channels = db.channels.len(),
            users = db.users.len(),
            "loaded slack export"
        );
        Ok(db)
    }

    pub fn from_parts(channels: Vec<Channel>, users: Vec<User>) -> Self {
        Self { channels, users }
    }

    /// Active (non-archived) channels ordered by name.
    pub fn all_channels(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .channels
            .iter()
            .filter(|c| !c.is_archived)
            .map(|c| Entry {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Active users with their resolved display name, ordered by that name.
    pub fn all_users(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .users
            .iter()
            .filter(|u| !u.is_deleted)
            .map(|u| Entry {
                id: u.id.clone(),
                name: u.resolved_name().to_string(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    pub fn channel_by_id(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == channel_id)
    }

    pub fn user_by_id(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Active users whose handle, real name or display name contains `query`
    /// (case-insensitive), ordered by display name, real name, handle.
    pub fn find_users_like(&self, query: &str, limit: usize) -> Vec<&User> {
        let needle = query.to_lowercase();
        let mut found: Vec<&User> = self
            .users
            .iter()
            .filter(|u| !u.is_deleted)
            .filter(|u| {
                contains_ci(&u.name, &needle)
                    || contains_ci(&u.real_name, &needle)
                    || contains_ci(&u.display_name, &needle)
            })
            .collect();

        found.sort_by(|a, b| compare_users(a, b));
        found.truncate(limit);
        found
    }

    /// Active channels whose name contains `query` (case-insensitive), ordered by name.
    pub fn find_channels_like(&self, query: &str, limit: usize) -> Vec<&Channel> {
        let needle = query.to_lowercase();
        let mut found: Vec<&Channel> = self
            .channels
            .iter()
            .filter(|c| !c.is_archived && contains_ci(&c.name, &needle))
            .collect();

        found.sort_by(|a, b| a.name.cmp(&b.name));
        found.truncate(limit);
        found
    }
}

fn compare_users(a: &User, b: &User) -> Ordering {
    a.resolved_name()
        .cmp(b.resolved_name())
        .then_with(|| a.real_name.cmp(&b.real_name))
        .then_with(|| a.name.cmp(&b.name))
}
