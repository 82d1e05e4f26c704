//! Notification freshness
//!
//! Compares backend notifications against the last-seen timestamp kept in local
//! preferences to decide what the user has not looked at yet.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::error::BranchFinderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Notifications for one user, as fetched from the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationFeed {
    notifications: Vec<Notification>,
}

impl NotificationFeed {
    #[must_use]
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self { notifications }
    }

    /// Parse a feed from a JSON array of notifications
    pub fn from_json(json: &str) -> Result<Self> {
        let notifications: Vec<Notification> = serde_json::from_str(json).map_err(|e| {
            BranchFinderError::no_usable_data(format!("Malformed notification feed: {e}"))
        })?;
        Ok(Self::new(notifications))
    }

    /// Read a feed previously fetched from the backend
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let feed = Self::from_json(&fs::read_to_string(path)?)?;
        debug!("Loaded {} notifications from {}", feed.len(), path.display());
        Ok(feed)
    }

    /// Notifications strictly newer than `last_seen`, newest first.
    /// Everything is unseen when nothing has been seen yet.
    #[must_use]
    pub fn unseen(&self, last_seen: Option<DateTime<Utc>>) -> Vec<&Notification> {
        let mut unseen: Vec<&Notification> = self
            .notifications
            .iter()
            .filter(|n| last_seen.is_none_or(|seen| n.created_at > seen))
            .collect();
        unseen.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        unseen
    }

    #[must_use]
    pub fn has_unseen(&self, last_seen: Option<DateTime<Utc>>) -> bool {
        self.notifications
            .iter()
            .any(|n| last_seen.is_none_or(|seen| n.created_at > seen))
    }

    #[must_use]
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.notifications.iter().map(|n| n.created_at).max()
    }

    /// Timestamp to store once the user has opened the feed.
    /// Never moves an existing marker backwards.
    #[must_use]
    pub fn mark_all_seen(&self, last_seen: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        match (self.latest_timestamp(), last_seen) {
            (Some(latest), Some(seen)) => Some(latest.max(seen)),
            (latest, seen) => latest.or(seen),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}
