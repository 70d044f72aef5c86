//! Alert text formatting
//!
//! All operator-facing messages are built here so the wording stays
//! consistent between the webhook and the logs.

use crate::constants::GROUP_ALERT_PREFIX;
use std::time::Duration;

/// Round to the nearest minute and render in human form ("1h 5m", "30m")
pub fn format_minutes(duration: Duration) -> String {
    let minutes = (duration.as_secs() + 30) / 60;
    humantime::format_duration(Duration::from_secs(minutes * 60)).to_string()
}

pub fn channel_down(name: &str, remaining: Duration) -> String {
    format!(
        "Media channel went down: {}\nWill be re-enabled automatically in: {}",
        name,
        format_minutes(remaining)
    )
}

pub fn channel_reminder(name: &str, elapsed: Duration, remaining: Duration) -> String {
    format!(
        "Media channel still disabled: {}\nDisabled for: {}\nAutomatic re-enable in: {}",
        name,
        format_minutes(elapsed),
        format_minutes(remaining)
    )
}

pub fn channel_restored_automatically(name: &str) -> String {
    format!("Media channel restored automatically: {} was re-enabled by the watcher.", name)
}

pub fn remediation_failed(name: &str, error: &dyn std::fmt::Display) -> String {
    format!("Failed to re-enable media channel: {}\nError: {}", name, error)
}

pub fn channel_restored(name: &str) -> String {
    format!("Media channel restored: {}", name)
}

pub fn group_change_alert(change: &str) -> String {
    format!("{}{}", GROUP_ALERT_PREFIX, change)
}
