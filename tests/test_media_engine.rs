//! Media remediation engine scenarios
//!
//! Drives `monitor::media::run_cycle` against fake collaborators with an
//! explicit clock.

mod helpers;

use chrono::{DateTime, Duration as TimeDelta, TimeZone, Utc};
use helpers::{channel, FakeDirectory, RecordingSink, SharedStore};
use std::time::Duration;
use zbxwatch::constants::MEDIA_STATE_KEY;
use zbxwatch::daemon::logging::DaemonLogger;
use zbxwatch::models::{ChannelStatus, MediaWatchState};
use zbxwatch::monitor::media::run_cycle;
use zbxwatch::monitor::{MediaAction, RemediationSettings, WatchContext};
use zbxwatch::state::load_media_state;

const OFF: Duration = Duration::from_secs(60 * 60);

struct Fixture {
    directory: FakeDirectory,
    sink: RecordingSink,
    store: SharedStore,
    logger: DaemonLogger,
    settings: RemediationSettings,
    state: MediaWatchState,
}

impl Fixture {
    fn new() -> Self {
        Self {
            directory: FakeDirectory::new(),
            sink: RecordingSink::new(),
            store: SharedStore::new(),
            logger: DaemonLogger::default(),
            settings: RemediationSettings {
                off_duration: OFF,
                media_names: Vec::new(),
            },
            state: MediaWatchState::new(),
        }
    }

    async fn cycle(&mut self, now: DateTime<Utc>) -> zbxwatch::Result<zbxwatch::monitor::MediaCycleReport> {
        let ctx = WatchContext {
            client: &self.directory,
            store: &self.store,
            alerts: &self.sink,
            system_log: &self.logger,
        };
        run_cycle(&ctx, &self.settings, &mut self.state, now).await
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn mins(n: i64) -> TimeDelta {
    TimeDelta::minutes(n)
}

#[tokio::test]
async fn test_first_sighting_tracks_and_alerts() {
    let mut fx = Fixture::new();
    fx.directory
        .set_channels(vec![channel("7", "Email", ChannelStatus::Disabled)]);

    let report = fx.cycle(t0()).await.unwrap();

    assert_eq!(fx.state.first_seen("7"), Some(t0()));
    assert!(report.state_changed);
    assert!(!report.all_healthy);
    assert_eq!(report.actions, vec![MediaAction::Tracked("7".to_string())]);

    let messages = fx.sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Email"));
    assert!(messages[0].contains("1h"), "remaining time equals the threshold: {}", messages[0]);

    assert_eq!(load_media_state(&fx.store).unwrap(), fx.state);
}

#[tokio::test]
async fn test_repeated_cycle_without_elapsed_time_is_idempotent() {
    let mut fx = Fixture::new();
    fx.directory.set_channels(vec![
        channel("7", "Email", ChannelStatus::Disabled),
        channel("8", "SMS", ChannelStatus::Enabled),
    ]);

    fx.cycle(t0()).await.unwrap();
    let state_after_first = fx.state.clone();
    let saves_after_first = fx.store.saves().len();
    fx.sink.clear();

    let report = fx.cycle(t0()).await.unwrap();

    assert!(!report.state_changed);
    assert!(report.actions.is_empty());
    assert!(fx.sink.messages().is_empty());
    assert_eq!(fx.state, state_after_first);
    assert_eq!(fx.store.saves().len(), saves_after_first);
}

#[tokio::test]
async fn test_remediation_only_at_or_after_threshold() {
    let mut fx = Fixture::new();
    fx.directory
        .set_channels(vec![channel("7", "Email", ChannelStatus::Disabled)]);

    fx.cycle(t0()).await.unwrap();
    for offset in [1, 15, 30, 45, 59] {
        fx.cycle(t0() + mins(offset)).await.unwrap();
        assert!(
            fx.directory.enable_calls().is_empty(),
            "no remediation expected at {offset} minutes"
        );
    }

    fx.cycle(t0() + mins(60)).await.unwrap();
    fx.cycle(t0() + mins(65)).await.unwrap();
    fx.cycle(t0() + mins(70)).await.unwrap();

    assert_eq!(fx.directory.enable_calls(), vec!["7".to_string()]);
    assert!(fx.state.is_empty());
}

#[tokio::test]
async fn test_email_example_restored_automatically() {
    let mut fx = Fixture::new();
    fx.directory
        .set_channels(vec![channel("7", "Email", ChannelStatus::Disabled)]);

    fx.cycle(t0()).await.unwrap();
    fx.sink.clear();

    let report = fx.cycle(t0() + mins(61)).await.unwrap();

    assert_eq!(fx.directory.enable_calls(), vec!["7".to_string()]);
    assert_eq!(report.actions, vec![MediaAction::Remediated("7".to_string())]);
    assert!(!fx.state.is_tracked("7"));
    assert!(load_media_state(&fx.store).unwrap().is_empty());

    let messages = fx.sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("restored automatically"));
    assert!(messages[0].contains("Email"));
}

#[tokio::test]
async fn test_reminder_repeats_every_cycle_past_thirty_minutes() {
    let mut fx = Fixture::new();
    fx.directory
        .set_channels(vec![channel("7", "Email", ChannelStatus::Disabled)]);

    fx.cycle(t0()).await.unwrap();
    fx.sink.clear();

    let report = fx.cycle(t0() + mins(20)).await.unwrap();
    assert!(report.alerts.is_empty());

    let mut reminders = 0;
    for offset in [30, 31, 40, 50, 59] {
        let report = fx.cycle(t0() + mins(offset)).await.unwrap();
        assert_eq!(report.actions, vec![MediaAction::Reminded("7".to_string())]);
        reminders += report.alerts.len();
    }

    // Not deduplicated: one reminder per cycle
    assert_eq!(reminders, 5);
    assert_eq!(fx.sink.messages().len(), 5);
    assert!(fx.sink.messages()[0].contains("30m"));
    assert!(fx.directory.enable_calls().is_empty());
}

#[tokio::test]
async fn test_failed_remediation_keeps_tracking_and_retries() {
    let mut fx = Fixture::new();
    fx.directory
        .set_channels(vec![channel("7", "Email", ChannelStatus::Disabled)]);
    fx.cycle(t0()).await.unwrap();
    fx.sink.clear();

    fx.directory.fail_enable(true);
    let report = fx.cycle(t0() + mins(61)).await.unwrap();

    assert_eq!(fx.state.first_seen("7"), Some(t0()));
    assert!(!report.state_changed);
    assert!(matches!(
        report.actions.as_slice(),
        [MediaAction::RemediationFailed { id, .. }] if id == "7"
    ));
    let messages = fx.sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Failed to re-enable"));
    assert!(messages[0].contains("No permissions"));

    fx.directory.fail_enable(false);
    fx.cycle(t0() + mins(62)).await.unwrap();

    assert_eq!(fx.directory.enable_calls().len(), 2);
    assert!(fx.state.is_empty());
}

#[tokio::test]
async fn test_external_restore_untracks_without_remote_call() {
    let mut fx = Fixture::new();
    fx.directory
        .set_channels(vec![channel("7", "Email", ChannelStatus::Disabled)]);
    fx.cycle(t0()).await.unwrap();
    fx.sink.clear();

    fx.directory.set_status("7", ChannelStatus::Enabled);
    let report = fx.cycle(t0() + mins(10)).await.unwrap();

    assert!(report.state_changed);
    assert!(report.all_healthy);
    assert_eq!(report.actions, vec![MediaAction::Restored("7".to_string())]);
    assert!(fx.directory.enable_calls().is_empty());
    assert!(fx.state.is_empty());
    assert_eq!(fx.sink.messages(), vec!["Media channel restored: Email".to_string()]);
}

#[tokio::test]
async fn test_listing_failure_aborts_without_mutation() {
    let mut fx = Fixture::new();
    fx.state.track("7", t0());
    fx.directory.fail_listing(true);

    let result = fx.cycle(t0() + mins(90)).await;

    assert!(result.is_err());
    assert_eq!(fx.state.first_seen("7"), Some(t0()));
    assert!(fx.sink.messages().is_empty());
    assert!(fx.store.saves().is_empty());
}

#[tokio::test]
async fn test_empty_channel_list_is_a_no_op() {
    let mut fx = Fixture::new();
    fx.state.track("7", t0());

    let report = fx.cycle(t0() + mins(90)).await.unwrap();

    assert_eq!(report.channels_seen, 0);
    assert!(fx.state.is_tracked("7"));
    assert!(fx.directory.enable_calls().is_empty());
}

#[tokio::test]
async fn test_persistence_failure_keeps_memory_state() {
    let mut fx = Fixture::new();
    fx.directory
        .set_channels(vec![channel("7", "Email", ChannelStatus::Disabled)]);
    fx.store.fail_saves(true);

    let report = fx.cycle(t0()).await.unwrap();

    assert!(report.persist_error.is_some());
    assert!(fx.state.is_tracked("7"));
    assert_eq!(fx.sink.messages().len(), 1);
}

#[tokio::test]
async fn test_alert_delivery_failure_does_not_block_remediation() {
    let mut fx = Fixture::new();
    fx.directory
        .set_channels(vec![channel("7", "Email", ChannelStatus::Disabled)]);
    fx.sink.fail(true);

    fx.cycle(t0()).await.unwrap();
    fx.cycle(t0() + mins(60)).await.unwrap();

    assert_eq!(fx.directory.enable_calls(), vec!["7".to_string()]);
    assert!(fx.state.is_empty());
}

#[tokio::test]
async fn test_allow_list_limits_watched_channels() {
    let mut fx = Fixture::new();
    fx.settings.media_names = vec!["Email".to_string()];
    fx.directory.set_channels(vec![
        channel("7", "Email", ChannelStatus::Disabled),
        channel("8", "SMS", ChannelStatus::Disabled),
    ]);

    let report = fx.cycle(t0()).await.unwrap();

    assert_eq!(report.channels_seen, 1);
    assert!(fx.state.is_tracked("7"));
    assert!(!fx.state.is_tracked("8"));
}

#[tokio::test]
async fn test_all_healthy_cycle() {
    let mut fx = Fixture::new();
    fx.directory.set_channels(vec![
        channel("7", "Email", ChannelStatus::Enabled),
        channel("8", "SMS", ChannelStatus::Enabled),
    ]);

    let report = fx.cycle(t0()).await.unwrap();

    assert!(report.all_healthy);
    assert!(!report.state_changed);
    assert!(fx.store.saves().is_empty());
    assert!(fx.sink.messages().is_empty());
    assert!(load_media_state(&fx.store).unwrap().is_empty());
    assert!(!fx.store.saves().contains(&MEDIA_STATE_KEY.to_string()));
}
