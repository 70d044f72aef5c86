//! Watcher daemon: state bootstrap and the poll loop
//!
//! Each cycle runs the media engine to completion, then the group detector,
//! then sleeps for the configured interval. Nothing runs concurrently.

pub mod config;
pub mod logging;

use crate::daemon::config::WatcherConfiguration;
use crate::daemon::logging::DaemonLogger;
use crate::models::MediaWatchState;
use crate::monitor::{self, GroupWatch, RemediationSettings, WatchContext};
use crate::notify::{sink_for, AlertSink};
use crate::state::{load_group_snapshot, load_media_state, FileSnapshotStore, SnapshotStore};
use crate::zabbix::{DirectoryClient, ZabbixClient};
use anyhow::Result;
use chrono::Utc;
use log::{error, info, warn};
use std::time::Duration;
use tokio::signal;

/// Everything the poll loop owns for the lifetime of the process
pub struct DaemonState {
    client: Box<dyn DirectoryClient>,
    store: Box<dyn SnapshotStore>,
    alerts: Box<dyn AlertSink>,
    logger: DaemonLogger,
    settings: RemediationSettings,
    media_state: MediaWatchState,
    groups: GroupWatch,
}

impl DaemonState {
    /// Build collaborators from configuration and load persisted state
    pub fn new(config: &WatcherConfiguration) -> Self {
        let store = FileSnapshotStore::new(&config.state_dir);
        Self::with_collaborators(
            Box::new(ZabbixClient::new(&config.api_url, &config.api_token)),
            Box::new(store),
            sink_for(config.webhook_url.as_deref()),
            config.remediation_settings(),
        )
    }

    /// Load persisted state through `store`.
    ///
    /// Unreadable media state starts empty. An unreadable group snapshot is
    /// treated as missing, so the next observation becomes a fresh baseline.
    pub fn with_collaborators(
        client: Box<dyn DirectoryClient>,
        store: Box<dyn SnapshotStore>,
        alerts: Box<dyn AlertSink>,
        settings: RemediationSettings,
    ) -> Self {
        let media_state = match load_media_state(store.as_ref()) {
            Ok(state) => {
                info!("Media state loaded: {} entries", state.len());
                state
            }
            Err(e) => {
                warn!("Failed to load media state: {}", e);
                MediaWatchState::new()
            }
        };

        let groups = match load_group_snapshot(store.as_ref()) {
            Ok(Some(snapshot)) => {
                info!("Group state loaded: {} entries", snapshot.len());
                GroupWatch::from_persisted(Some(snapshot))
            }
            Ok(None) => {
                info!("No group state found, the first check will record a baseline without notifications");
                GroupWatch::from_persisted(None)
            }
            Err(e) => {
                warn!("Failed to load group state, recording a new baseline: {}", e);
                GroupWatch::from_persisted(None)
            }
        };

        Self {
            client,
            store,
            alerts,
            logger: DaemonLogger::default(),
            settings,
            media_state,
            groups,
        }
    }

    pub fn media_state(&self) -> &MediaWatchState {
        &self.media_state
    }

    pub fn groups(&self) -> &GroupWatch {
        &self.groups
    }

    /// Run one full cycle: media remediation, then group drift detection.
    /// A failure in one engine is logged and does not stop the other.
    pub async fn run_cycle(&mut self) {
        let ctx = WatchContext {
            client: self.client.as_ref(),
            store: self.store.as_ref(),
            alerts: self.alerts.as_ref(),
            system_log: &self.logger,
        };

        info!("Starting media type check");
        if let Err(e) =
            monitor::media::run_cycle(&ctx, &self.settings, &mut self.media_state, Utc::now()).await
        {
            error!("Failed to get media types: {}", e);
        }

        if let Err(e) = monitor::groups::run_cycle(&ctx, &mut self.groups).await {
            error!("Failed to get user groups: {}", e);
        }
    }
}

/// Run the watcher until interrupted, or for a single cycle with `--once`
pub async fn run_daemon(config: WatcherConfiguration) -> Result<()> {
    info!("Configuration loaded | {}", config.summary());

    let mut state = DaemonState::new(&config);
    state.logger.log_startup(&config.state_dir, std::process::id());

    if config.run_once {
        state.run_cycle().await;
        return Ok(());
    }

    run_poll_loop(&mut state, config.check_interval).await;
    Ok(())
}

async fn run_poll_loop(state: &mut DaemonState, interval: Duration) {
    loop {
        state.run_cycle().await;

        info!(
            "Waiting {} until the next check",
            humantime::format_duration(interval)
        );
        // Only the pause is interruptible; a cycle always runs to completion
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal");
                return;
            }
        }
    }
}
