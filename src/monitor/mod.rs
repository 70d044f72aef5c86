//! Reconciliation engines run by the poll loop
//!
//! - `media`: tracks disabled media channels and re-enables them after the
//!   configured threshold
//! - `groups`: reports user group drift against the last persisted snapshot

pub mod groups;
pub mod media;

pub use groups::{GroupChange, GroupCycleReport, GroupWatch};
pub use media::{MediaAction, MediaCycleReport, RemediationSettings};

use crate::daemon::logging::DaemonLogger;
use crate::notify::AlertSink;
use crate::state::SnapshotStore;
use crate::zabbix::DirectoryClient;
use log::error;

/// Collaborators shared by both engines for one cycle
pub struct WatchContext<'a> {
    pub client: &'a dyn DirectoryClient,
    pub store: &'a dyn SnapshotStore,
    pub alerts: &'a dyn AlertSink,
    pub system_log: &'a DaemonLogger,
}

impl<'a> WatchContext<'a> {
    /// Deliver an alert. Failures are logged and otherwise ignored.
    pub(crate) async fn alert(&self, text: &str) {
        if let Err(e) = self.alerts.notify(text).await {
            error!("Failed to deliver alert: {}", e);
        }
    }
}
