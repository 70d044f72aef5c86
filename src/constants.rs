//! Global constants for zbxwatch
//!
//! Centralized location for application-wide constants

use std::time::Duration;

/// Log target for structured system-log events
pub const SYSTEM_LOG_TARGET: &str = "zbxwatch::system";

/// Snapshot store key for the media watch state
pub const MEDIA_STATE_KEY: &str = "media_state.json";

/// Snapshot store key for the user group snapshot
pub const GROUP_STATE_KEY: &str = "usergroup_state.json";

/// JSON-RPC endpoint, relative to the API base URL
pub const API_ENDPOINT: &str = "/api_jsonrpc.php";

/// A channel disabled at least this long gets a reminder on every cycle
/// until it is re-enabled. Not configurable.
pub const REMINDER_AFTER: Duration = Duration::from_secs(30 * 60);

/// Prefix for user group change alerts sent to the webhook
pub const GROUP_ALERT_PREFIX: &str = "User group change: ";

// System log event identifiers
pub const EVENT_DAEMON_STARTUP: &str = "daemon_startup";
pub const EVENT_MEDIA_DISABLED: &str = "media_disabled";
pub const EVENT_MEDIA_THRESHOLD: &str = "media_threshold_exceeded";
pub const EVENT_MEDIA_ENABLED: &str = "media_enabled";
pub const EVENT_GROUP_CHANGED: &str = "usergroup_changed";
pub const EVENT_ERROR: &str = "error";
