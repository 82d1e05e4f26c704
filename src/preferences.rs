//! Local preference storage
//!
//! A small key-value store persisted as one JSON object. Holds client-side state
//! such as the last-seen notification timestamp and the last selected branch.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::Result;
use crate::error::BranchFinderError;
use crate::models::BranchCandidate;

const LAST_SEEN_NOTIFICATION: &str = "last_seen_notification";
const LAST_SELECTED_BRANCH: &str = "last_selected_branch";

pub struct Preferences {
    path: PathBuf,
    values: Map<String, Value>,
}

impl Preferences {
    /// Load preferences from `path`. A missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<Map<String, Value>>(&contents).map_err(|e| {
                BranchFinderError::config(format!(
                    "Preference file {} is not a JSON object: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preference file at {}, starting empty", path.display());
                Map::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Typed read. Values that no longer deserialize are treated as absent.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?.clone();
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "Ignoring unreadable preference");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| {
            BranchFinderError::config(format!("Preference '{key}' cannot be stored: {e}"))
        })?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Write the store back to disk, creating parent directories as needed
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.values).map_err(|e| {
            BranchFinderError::config(format!("Failed to serialize preferences: {e}"))
        })?;
        fs::write(&self.path, contents)?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }

    #[must_use]
    pub fn last_seen_notification(&self) -> Option<DateTime<Utc>> {
        self.get(LAST_SEEN_NOTIFICATION)
    }

    pub fn set_last_seen_notification(&mut self, seen: DateTime<Utc>) -> Result<()> {
        self.set(LAST_SEEN_NOTIFICATION, &seen)
    }

    #[must_use]
    pub fn last_selected_branch(&self) -> Option<BranchCandidate> {
        self.get(LAST_SELECTED_BRANCH)
    }

    pub fn set_last_selected_branch(&mut self, branch: &BranchCandidate) -> Result<()> {
        self.set(LAST_SELECTED_BRANCH, branch)
    }
}
