//! File-backed map from `(database_id, relation_id)` to a display name.
//!
//! The whole file is re-read on every [`RelationCache::get_name`] so names
//! written by another process become visible, and the whole map is rewritten
//! on every mutation. There is no cross-process locking: two writers can
//! lose each other's updates. Storage failures never reach the caller; reads
//! degrade to an empty map and writes are dropped after logging.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub struct RelationCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

fn cache_key(database_id: &str, relation_id: &str) -> String {
    format!("{}:{}", database_id, relation_id)
}

impl RelationCache {
    /// Open the cache stored at `path`, loading whatever is there now.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path).unwrap_or_default();
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_name(&self, database_id: &str, relation_id: &str) -> Option<String> {
        let key = cache_key(database_id, relation_id);
        // Held across the reload so a concurrent write cannot be replaced by
        // an older snapshot.
        let mut entries = self.lock();
        match load_entries(&self.path) {
            Some(fresh) => {
                let name = fresh.get(&key).cloned();
                *entries = fresh;
                tracing::debug!(key = %key, found = name.is_some(), "relation cache lookup");
                name
            }
            None => None,
        }
    }

    pub fn set_name(&self, database_id: &str, relation_id: &str, name: &str) {
        let mut entries = self.lock();
        entries.insert(cache_key(database_id, relation_id), name.to_string());
        persist(&self.path, &entries);
    }

    /// Store every `relation_id -> name` pair under `database_id`, then
    /// persist once.
    pub fn bulk_set(&self, database_id: &str, items: &HashMap<String, String>) {
        let mut entries = self.lock();
        for (relation_id, name) in items {
            entries.insert(cache_key(database_id, relation_id), name.clone());
        }
        persist(&self.path, &entries);
        tracing::info!(
            count = items.len(),
            database_id,
            "cached relations"
        );
    }

    /// Membership in the in-memory copy only. Can be stale relative to the
    /// file until the next `get_name`.
    pub fn exists(&self, database_id: &str, relation_id: &str) -> bool {
        self.lock().contains_key(&cache_key(database_id, relation_id))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn load_entries(path: &Path) -> Option<HashMap<String, String>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "relation cache file does not exist yet");
            return None;
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read relation cache");
            return None;
        }
    };
    match serde_json::from_str::<HashMap<String, String>>(&raw) {
        Ok(entries) => {
            tracing::debug!(path = %path.display(), "relation cache loaded");
            Some(entries)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "relation cache is not a string map");
            None
        }
    }
}

fn persist(path: &Path, entries: &HashMap<String, String>) {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            if let Err(e) = fs::create_dir_all(dir) {
                tracing::error!(path = %dir.display(), error = %e, "failed to create cache directory");
                return;
            }
        }
    }
    let json = match serde_json::to_string_pretty(entries) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize relation cache");
            return;
        }
    };
    match fs::write(path, json) {
        Ok(()) => tracing::debug!(path = %path.display(), "relation cache written"),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to write relation cache")
        }
    }
}
