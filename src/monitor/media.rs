//! Media channel remediation
//!
//! A channel seen disabled is tracked with the instant it was first seen.
//! While tracked it is reported once when it goes down, reminded about on
//! every cycle after `REMINDER_AFTER`, and re-enabled once it has been
//! disabled for `off_duration`. A channel restored by someone else is simply
//! untracked.

use super::WatchContext;
use crate::constants::REMINDER_AFTER;
use crate::models::{ChannelStatus, MediaChannel, MediaWatchState, Result};
use crate::output;
use crate::state::save_media_state;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::time::Duration;

/// Per-cycle inputs taken from configuration
#[derive(Debug, Clone)]
pub struct RemediationSettings {
    /// How long a channel may stay disabled before it is re-enabled
    pub off_duration: Duration,
    /// Channel names to watch; empty watches all channels
    pub media_names: Vec<String>,
}

/// What the engine should do about one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDecision {
    /// Disabled and not yet tracked
    NewlyDisabled { remaining: Duration },
    /// Disabled for at least the threshold
    Remediate { elapsed: Duration },
    /// Disabled, threshold not reached. `remind` once past `REMINDER_AFTER`.
    Waiting {
        elapsed: Duration,
        remaining: Duration,
        remind: bool,
    },
    /// Enabled again while still tracked
    Restored,
    /// Enabled and not tracked
    Healthy,
}

/// Decide what to do about `channel` given the current watch state
pub fn evaluate(
    channel: &MediaChannel,
    state: &MediaWatchState,
    now: DateTime<Utc>,
    off_duration: Duration,
) -> MediaDecision {
    match (channel.status, state.first_seen(&channel.id)) {
        (ChannelStatus::Disabled, None) => MediaDecision::NewlyDisabled {
            remaining: off_duration,
        },
        (ChannelStatus::Disabled, Some(first_seen)) => {
            // A clock that moved backwards counts as no time elapsed
            let elapsed = (now - first_seen).to_std().unwrap_or_default();
            if elapsed >= off_duration {
                MediaDecision::Remediate { elapsed }
            } else {
                MediaDecision::Waiting {
                    elapsed,
                    remaining: off_duration - elapsed,
                    remind: elapsed >= REMINDER_AFTER,
                }
            }
        }
        (ChannelStatus::Enabled, Some(_)) => MediaDecision::Restored,
        (ChannelStatus::Enabled, None) => MediaDecision::Healthy,
    }
}

/// Action taken for a channel during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaAction {
    Tracked(String),
    Reminded(String),
    Remediated(String),
    RemediationFailed { id: String, error: String },
    Restored(String),
}

/// Outcome of one media cycle
#[derive(Debug, Default)]
pub struct MediaCycleReport {
    /// Number of channels returned by the remote side
    pub channels_seen: usize,
    pub actions: Vec<MediaAction>,
    /// Alert texts handed to the sink, in emission order
    pub alerts: Vec<String>,
    /// Whether the watch state was mutated
    pub state_changed: bool,
    /// No watched channel was disabled
    pub all_healthy: bool,
    /// Set when the mutated state could not be persisted
    pub persist_error: Option<String>,
}

impl MediaCycleReport {
    async fn alert(&mut self, ctx: &WatchContext<'_>, text: String) {
        ctx.alert(&text).await;
        self.alerts.push(text);
    }
}

/// Run one remediation cycle.
///
/// Fails without touching `state` when the channel list cannot be obtained.
/// Persistence failures are reported in the returned report; the in-memory
/// state is kept either way.
pub async fn run_cycle(
    ctx: &WatchContext<'_>,
    settings: &RemediationSettings,
    state: &mut MediaWatchState,
    now: DateTime<Utc>,
) -> Result<MediaCycleReport> {
    let channels = ctx.client.list_channels(&settings.media_names).await?;

    let mut report = MediaCycleReport::default();
    if channels.is_empty() {
        warn!("No media types received for processing");
        return Ok(report);
    }
    report.channels_seen = channels.len();

    let mut found_disabled = false;
    for channel in &channels {
        info!(
            "Checking media id={} name={} status={}",
            channel.id,
            channel.name,
            channel.status.as_wire()
        );
        if channel.is_disabled() {
            found_disabled = true;
        }

        match evaluate(channel, state, now, settings.off_duration) {
            MediaDecision::NewlyDisabled { remaining } => {
                state.track(&channel.id, now);
                report.state_changed = true;
                warn!("Disabled media detected: id={} name={}", channel.id, channel.name);
                ctx.system_log.log_media_disabled(&channel.id, &channel.name);
                report.actions.push(MediaAction::Tracked(channel.id.clone()));
                report
                    .alert(ctx, output::channel_down(&channel.name, remaining))
                    .await;
            }
            MediaDecision::Remediate { elapsed } => {
                warn!(
                    "Media id={} name={} disabled for {}s, longer than allowed",
                    channel.id,
                    channel.name,
                    elapsed.as_secs()
                );
                ctx.system_log.log_threshold_exceeded(
                    &channel.id,
                    &channel.name,
                    elapsed,
                    settings.off_duration,
                );

                match ctx.client.enable_channel(&channel.id).await {
                    Ok(()) => {
                        info!("Media id={} name={} enabled", channel.id, channel.name);
                        ctx.system_log.log_media_enabled(&channel.id, &channel.name);
                        state.untrack(&channel.id);
                        report.state_changed = true;
                        report.actions.push(MediaAction::Remediated(channel.id.clone()));
                        report
                            .alert(ctx, output::channel_restored_automatically(&channel.name))
                            .await;
                    }
                    Err(e) => {
                        error!("Failed to enable media id={} name={}: {}", channel.id, channel.name, e);
                        report.actions.push(MediaAction::RemediationFailed {
                            id: channel.id.clone(),
                            error: e.to_string(),
                        });
                        report
                            .alert(ctx, output::remediation_failed(&channel.name, &e))
                            .await;
                    }
                }
            }
            MediaDecision::Waiting {
                elapsed,
                remaining,
                remind,
            } => {
                info!(
                    "Media id={} name={} disabled for {}s, threshold not reached",
                    channel.id,
                    channel.name,
                    elapsed.as_secs()
                );
                // Repeats on every cycle past the mark; there is no
                // "last reminded" bookkeeping.
                if remind {
                    report.actions.push(MediaAction::Reminded(channel.id.clone()));
                    report
                        .alert(ctx, output::channel_reminder(&channel.name, elapsed, remaining))
                        .await;
                }
            }
            MediaDecision::Restored => {
                state.untrack(&channel.id);
                report.state_changed = true;
                info!("Media id={} name={} enabled, removed from state", channel.id, channel.name);
                report.actions.push(MediaAction::Restored(channel.id.clone()));
                report.alert(ctx, output::channel_restored(&channel.name)).await;
            }
            MediaDecision::Healthy => {}
        }
    }

    report.all_healthy = !found_disabled;
    if report.all_healthy {
        info!("All watched media types are enabled");
    }

    if report.state_changed {
        if let Err(e) = save_media_state(ctx.store, state) {
            error!("Failed to save media state: {}", e);
            ctx.system_log.log_error(&e.to_string(), Some("media state"));
            report.persist_error = Some(e.to_string());
        }
    }

    Ok(report)
}
