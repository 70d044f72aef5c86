//! Snapshot persistence
//!
//! State is stored as named JSON blobs. `FileSnapshotStore` keeps one file per
//! key in the state directory and replaces it atomically on save.

use crate::constants::{GROUP_STATE_KEY, MEDIA_STATE_KEY};
use crate::models::{GroupSnapshot, MediaWatchState, Result, WatchError};
use log::info;
use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Key-value blob storage for watcher state
pub trait SnapshotStore: Send + Sync {
    /// Load a blob. `Ok(None)` means the key has never been saved.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Save a blob, replacing any previous value
    fn save(&self, key: &str, blob: &[u8]) -> Result<()>;
}

/// Stores each key as a file inside a directory
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WatchError::persistence("read", key, e)),
        }
    }

    fn save(&self, key: &str, blob: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| WatchError::persistence("write", key, e))?;

        // Write next to the target so the rename stays on one filesystem
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| WatchError::persistence("write", key, e))?;
        tmp.write_all(blob)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| WatchError::persistence("write", key, e))?;
        tmp.persist(self.path_for(key))
            .map_err(|e| WatchError::persistence("write", key, e.error))?;

        info!("State saved to {}", self.path_for(key).display());
        Ok(())
    }
}

/// Volatile store, used when nothing should touch the disk
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|e| WatchError::persistence("read", key, e))?;
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &[u8]) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| WatchError::persistence("write", key, e))?;
        blobs.insert(key.to_string(), blob.to_vec());
        Ok(())
    }
}

/// Load the media watch state. A missing or empty blob is an empty state.
pub fn load_media_state(store: &dyn SnapshotStore) -> Result<MediaWatchState> {
    match store.load(MEDIA_STATE_KEY)? {
        Some(data) if !data.iter().all(u8::is_ascii_whitespace) => serde_json::from_slice(&data)
            .map_err(|e| WatchError::persistence("decode", MEDIA_STATE_KEY, e)),
        _ => Ok(MediaWatchState::new()),
    }
}

pub fn save_media_state(store: &dyn SnapshotStore, state: &MediaWatchState) -> Result<()> {
    let data = serde_json::to_vec_pretty(state)
        .map_err(|e| WatchError::persistence("encode", MEDIA_STATE_KEY, e))?;
    store.save(MEDIA_STATE_KEY, &data)
}

/// Load the group snapshot.
///
/// `Ok(None)` means no snapshot was ever persisted. A blob that exists but is
/// empty is an empty snapshot.
pub fn load_group_snapshot(store: &dyn SnapshotStore) -> Result<Option<GroupSnapshot>> {
    match store.load(GROUP_STATE_KEY)? {
        None => Ok(None),
        Some(data) if data.iter().all(u8::is_ascii_whitespace) => Ok(Some(GroupSnapshot::new())),
        Some(data) => serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| WatchError::persistence("decode", GROUP_STATE_KEY, e)),
    }
}

pub fn save_group_snapshot(store: &dyn SnapshotStore, snapshot: &GroupSnapshot) -> Result<()> {
    let data = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| WatchError::persistence("encode", GROUP_STATE_KEY, e))?;
    store.save(GROUP_STATE_KEY, &data)
}
