//! Saved selection snapshot.
//!
//! The selection is stored as a JSON array of full course records under a
//! single key. Loading is fail-soft: a value that does not decode to an
//! array of courses is deleted and treated as absent.

use crate::catalog::Course;
use crate::db::{KeyValueStore, StoreError};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info, warn};

/// Key the selection is stored under.
pub const SNAPSHOT_KEY: &str = "selectedCourses";

/// Reads and writes the selection snapshot through a key-value store.
pub struct SnapshotStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, SNAPSHOT_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrites the snapshot with the given courses, in order.
    pub fn save<'a, I>(&self, courses: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = &'a Course>,
    {
        let courses: Vec<&Course> = courses.into_iter().collect();
        let encoded = serde_json::to_string(&courses)?;
        self.store.set(&self.key, &encoded)
    }

    /// Loads the saved courses.
    ///
    /// Returns `None` when nothing is saved, when the stored value is
    /// corrupt (the key is cleared), or when the store cannot be read.
    pub fn load(&self) -> Option<Vec<Course>> {
        let entry = match self.store.get(&self.key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                error!(key = %self.key, error = %e, "Failed to read saved selection");
                return None;
            }
        };

        match decode_snapshot(&entry.value) {
            Ok(courses) => {
                info!(key = %self.key, count = courses.len(), "Loaded saved selection");
                Some(courses)
            }
            Err(reason) => {
                warn!(key = %self.key, reason = %reason, "Discarding corrupt saved selection");
                if let Err(e) = self.store.remove(&self.key) {
                    error!(key = %self.key, error = %e, "Failed to clear corrupt saved selection");
                }
                None
            }
        }
    }

    /// Time of the last successful save, if any.
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.store
            .get(&self.key)
            .ok()
            .flatten()
            .map(|entry| entry.updated_at)
    }
}

fn decode_snapshot(raw: &str) -> Result<Vec<Course>, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if !value.is_array() {
        return Err("saved value is not an array".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}
