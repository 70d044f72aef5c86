//! Fake collaborators for exercising the engines without a Zabbix server
//!
//! Every fake is a cheap cloneable handle, so a test can give one copy to the
//! engine and keep another to inspect what happened.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use zbxwatch::models::{ChannelStatus, MediaChannel, UserGroup, WatchError};
use zbxwatch::notify::AlertSink;
use zbxwatch::state::{MemorySnapshotStore, SnapshotStore};
use zbxwatch::zabbix::DirectoryClient;
use zbxwatch::Result;

pub fn channel(id: &str, name: &str, status: ChannelStatus) -> MediaChannel {
    MediaChannel {
        id: id.to_string(),
        name: name.to_string(),
        status,
    }
}

#[derive(Default)]
struct DirectoryInner {
    channels: Mutex<Vec<MediaChannel>>,
    groups: Mutex<Vec<UserGroup>>,
    enable_calls: Mutex<Vec<String>>,
    fail_listing: AtomicBool,
    fail_enable: AtomicBool,
    fail_groups: AtomicBool,
}

/// In-memory stand-in for the Zabbix API
#[derive(Clone, Default)]
pub struct FakeDirectory {
    inner: Arc<DirectoryInner>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_channels(&self, channels: Vec<MediaChannel>) {
        *self.inner.channels.lock().unwrap() = channels;
    }

    pub fn set_status(&self, id: &str, status: ChannelStatus) {
        for channel in self.inner.channels.lock().unwrap().iter_mut() {
            if channel.id == id {
                channel.status = status;
            }
        }
    }

    pub fn set_groups(&self, groups: Vec<UserGroup>) {
        *self.inner.groups.lock().unwrap() = groups;
    }

    pub fn enable_calls(&self) -> Vec<String> {
        self.inner.enable_calls.lock().unwrap().clone()
    }

    pub fn fail_listing(&self, fail: bool) {
        self.inner.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn fail_enable(&self, fail: bool) {
        self.inner.fail_enable.store(fail, Ordering::SeqCst);
    }

    pub fn fail_groups(&self, fail: bool) {
        self.inner.fail_groups.store(fail, Ordering::SeqCst);
    }
}

fn remote_error() -> WatchError {
    WatchError::RemoteApi {
        code: -32500,
        message: "Application error.".to_string(),
        data: "No permissions to referred object.".to_string(),
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn list_channels(&self, names: &[String]) -> Result<Vec<MediaChannel>> {
        if self.inner.fail_listing.load(Ordering::SeqCst) {
            return Err(remote_error());
        }
        Ok(self
            .inner
            .channels
            .lock()
            .unwrap()
            .iter()
            .filter(|c| names.is_empty() || names.contains(&c.name))
            .cloned()
            .collect())
    }

    async fn enable_channel(&self, channel_id: &str) -> Result<()> {
        self.inner.enable_calls.lock().unwrap().push(channel_id.to_string());
        if self.inner.fail_enable.load(Ordering::SeqCst) {
            return Err(remote_error());
        }
        self.set_status(channel_id, ChannelStatus::Enabled);
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<UserGroup>> {
        if self.inner.fail_groups.load(Ordering::SeqCst) {
            return Err(remote_error());
        }
        Ok(self.inner.groups.lock().unwrap().clone())
    }
}

/// Alert sink that remembers every message
#[derive(Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn notify(&self, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(WatchError::Notification("503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

/// Shared in-memory store with switchable write failures
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<MemorySnapshotStore>,
    saves: Arc<Mutex<Vec<String>>>,
    fail_saves: Arc<AtomicBool>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys saved so far, in order
    pub fn saves(&self) -> Vec<String> {
        self.saves.lock().unwrap().clone()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl SnapshotStore for SharedStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, blob: &[u8]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(WatchError::persistence("write", key, "disk full"));
        }
        self.saves.lock().unwrap().push(key.to_string());
        self.inner.save(key, blob)
    }
}
