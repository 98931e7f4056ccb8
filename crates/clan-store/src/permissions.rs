//! Permissions registry - per-command channel allow-list
//!
//! A JSON file maps command names to the channels they may run in, each
//! entry either a numeric channel id or a channel name that is resolved
//! against the live channel at lookup time. A command with no entry is
//! allowed everywhere.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use clan_core::error::DomainError;

/// One allow-list entry: a channel id or a channel name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelRef {
    Id(u64),
    Name(String),
}

impl ChannelRef {
    fn matches(&self, channel_id: u64, channel_name: &str) -> bool {
        match self {
            Self::Id(id) => *id == channel_id,
            Self::Name(name) => name.eq_ignore_ascii_case(channel_name),
        }
    }
}

/// Per-command channel allow-list persisted to disk
#[derive(Debug)]
pub struct PermissionsRegistry {
    path: PathBuf,
    map: BTreeMap<String, Vec<ChannelRef>>,
}

impl PermissionsRegistry {
    /// Load the registry, starting empty if the file does not exist yet
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let map = match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| DomainError::Persistence(format!("permissions file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(DomainError::Persistence(e.to_string())),
        };
        Ok(Self {
            path: path.to_path_buf(),
            map,
        })
    }

    /// Number of commands with a restriction entry
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether `command` may run in the given channel
    pub fn is_allowed(&self, command: &str, channel_id: u64, channel_name: &str) -> bool {
        match self.map.get(command) {
            None => true,
            Some(refs) => refs.iter().any(|r| r.matches(channel_id, channel_name)),
        }
    }

    /// Add a channel to a command's allow-list and persist
    pub fn allow(&mut self, command: &str, channel: ChannelRef) -> Result<(), DomainError> {
        let refs = self.map.entry(command.to_string()).or_default();
        if !refs.contains(&channel) {
            refs.push(channel);
        }
        self.save()
    }

    /// Remove a channel from a command's allow-list and persist
    ///
    /// Removing the last entry deletes the command's entry entirely,
    /// which re-opens the command to all channels.
    pub fn deny(&mut self, command: &str, channel: &ChannelRef) -> Result<(), DomainError> {
        if let Some(refs) = self.map.get_mut(command) {
            refs.retain(|r| r != channel);
            if refs.is_empty() {
                self.map.remove(command);
            }
        }
        self.save()
    }

    fn save(&self) -> Result<(), DomainError> {
        let contents = serde_json::to_string_pretty(&self.map)
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents).map_err(|e| DomainError::Persistence(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| DomainError::Persistence(e.to_string()))?;
        debug!(path = %self.path.display(), commands = self.map.len(), "Permissions saved");
        Ok(())
    }
}
