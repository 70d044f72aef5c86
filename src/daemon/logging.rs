//! Logging for the watcher daemon
//!
//! Application logs go through the `log` facade to an `env_logger` backend
//! that writes one JSON object per line. `DaemonLogger` additionally emits
//! structured audit events under the system log target.

use crate::constants::{
    EVENT_DAEMON_STARTUP, EVENT_ERROR, EVENT_GROUP_CHANGED, EVENT_MEDIA_DISABLED,
    EVENT_MEDIA_ENABLED, EVENT_MEDIA_THRESHOLD, SYSTEM_LOG_TARGET,
};
use anyhow::Result;
use log::{log, Level};
use serde_json::json;
use std::io::Write;
use std::time::Duration;

/// Install the JSON line logger. Verbosity follows `RUST_LOG`, default `info`.
pub fn init_logger() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let line = json!({
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "level": record.level().as_str().to_lowercase(),
                "target": record.target(),
                "message": record.args().to_string(),
            });
            writeln!(buf, "{}", line)
        })
        .target(env_logger::Target::Stdout)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))
}

/// Structured system log for operator-visible events. Filtering is left to
/// the `log` backend (`RUST_LOG=zbxwatch::system=warn`).
#[derive(Debug, Clone, Default)]
pub struct DaemonLogger;

impl DaemonLogger {
    /// Log daemon startup event
    pub fn log_startup(&self, state_dir: &std::path::Path, pid: u32) {
        let message = json!({
            "event": EVENT_DAEMON_STARTUP,
            "pid": pid,
            "state_dir": state_dir.display().to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(Level::Info, "Watcher started", &message)
    }

    /// A media channel was seen disabled for the first time
    pub fn log_media_disabled(&self, channel_id: &str, name: &str) {
        let message = json!({
            "event": EVENT_MEDIA_DISABLED,
            "media_id": channel_id,
            "media_name": name,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(
            Level::Warn,
            &format!("Disabled media detected: id={} name={}", channel_id, name),
            &message,
        )
    }

    /// A media channel stayed disabled past the threshold
    pub fn log_threshold_exceeded(&self, channel_id: &str, name: &str, elapsed: Duration, threshold: Duration) {
        let message = json!({
            "event": EVENT_MEDIA_THRESHOLD,
            "media_id": channel_id,
            "media_name": name,
            "disabled_secs": elapsed.as_secs(),
            "threshold_secs": threshold.as_secs(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(
            Level::Warn,
            &format!("Media id={} name={} disabled past threshold", channel_id, name),
            &message,
        )
    }

    /// The watcher re-enabled a media channel
    pub fn log_media_enabled(&self, channel_id: &str, name: &str) {
        let message = json!({
            "event": EVENT_MEDIA_ENABLED,
            "media_id": channel_id,
            "media_name": name,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(
            Level::Info,
            &format!("Watcher enabled media id={} name={}", channel_id, name),
            &message,
        )
    }

    /// A user group change was detected
    pub fn log_group_change(&self, change: &str) {
        let message = json!({
            "event": EVENT_GROUP_CHANGED,
            "change": change,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(
            Level::Warn,
            &format!("UserGroup change detected: {}", change),
            &message,
        )
    }

    /// Log error events
    pub fn log_error(&self, error_message: &str, context: Option<&str>) {
        let message = json!({
            "event": EVENT_ERROR,
            "message": error_message,
            "context": context,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(Level::Error, error_message, &message)
    }

    fn log_structured(&self, level: Level, message: &str, data: &serde_json::Value) {
        log!(target: SYSTEM_LOG_TARGET, level, "{}", event_line(message, data));
    }
}

fn event_line(message: &str, data: &serde_json::Value) -> String {
    format!("{} | {}", message, data)
}
