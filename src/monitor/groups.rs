//! User group drift detection
//!
//! Compares each observation against the last persisted snapshot. The very
//! first observation of a process that started without a snapshot is stored
//! as ground truth and never compared, so deploying against a populated
//! server does not report every existing group as new.

use super::WatchContext;
use crate::models::{GroupSnapshot, Result, SnapshotMode};
use crate::output;
use crate::state::save_group_snapshot;
use log::{error, info, warn};
use std::fmt;

/// One structural difference between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupChange {
    Added { name: String },
    Renamed { old_name: String, new_name: String },
    MembershipChanged { name: String },
    Removed { name: String },
}

impl fmt::Display for GroupChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupChange::Added { name } => write!(f, "group added: {}", name),
            GroupChange::Renamed { old_name, new_name } => {
                write!(f, "group renamed: {} → {}", old_name, new_name)
            }
            GroupChange::MembershipChanged { name } => {
                write!(f, "membership changed in group: {}", name)
            }
            GroupChange::Removed { name } => write!(f, "group removed: {}", name),
        }
    }
}

/// Structural diff between `prior` and `current`, keyed by group id.
///
/// A group both renamed and re-membered yields two changes. Callers must not
/// rely on the order of the result.
pub fn diff_groups(prior: &GroupSnapshot, current: &GroupSnapshot) -> Vec<GroupChange> {
    let mut changes = Vec::new();

    for group in current.iter() {
        match prior.get(&group.id) {
            None => changes.push(GroupChange::Added {
                name: group.name.clone(),
            }),
            Some(previous) => {
                if previous.name != group.name {
                    changes.push(GroupChange::Renamed {
                        old_name: previous.name.clone(),
                        new_name: group.name.clone(),
                    });
                }
                if previous.members != group.members {
                    changes.push(GroupChange::MembershipChanged {
                        name: group.name.clone(),
                    });
                }
            }
        }
    }

    for previous in prior.iter() {
        if !current.contains(&previous.id) {
            changes.push(GroupChange::Removed {
                name: previous.name.clone(),
            });
        }
    }

    changes
}

/// Group snapshot and its lifecycle, owned by the poll loop
#[derive(Debug, Clone)]
pub struct GroupWatch {
    mode: SnapshotMode,
    snapshot: GroupSnapshot,
}

impl GroupWatch {
    /// Start from the persisted snapshot, or in baseline mode when there is none
    pub fn from_persisted(persisted: Option<GroupSnapshot>) -> Self {
        match persisted {
            Some(snapshot) => Self {
                mode: SnapshotMode::Steady,
                snapshot,
            },
            None => Self {
                mode: SnapshotMode::Baseline,
                snapshot: GroupSnapshot::new(),
            },
        }
    }

    pub fn mode(&self) -> SnapshotMode {
        self.mode
    }

    pub fn snapshot(&self) -> &GroupSnapshot {
        &self.snapshot
    }
}

/// Outcome of one group cycle
#[derive(Debug, Default)]
pub struct GroupCycleReport {
    /// This cycle stored the baseline snapshot
    pub baseline_captured: bool,
    pub changes: Vec<GroupChange>,
    /// Alert texts handed to the sink
    pub alerts: Vec<String>,
    /// Set when the new snapshot could not be persisted
    pub persist_error: Option<String>,
}

/// Run one drift detection cycle.
///
/// Fails without touching `watch` when the group list cannot be obtained; a
/// baseline cycle that fails this way is retried as baseline next time.
pub async fn run_cycle(ctx: &WatchContext<'_>, watch: &mut GroupWatch) -> Result<GroupCycleReport> {
    let current: GroupSnapshot = ctx.client.list_groups().await?.into_iter().collect();
    let mut report = GroupCycleReport::default();

    if watch.mode == SnapshotMode::Baseline {
        match save_group_snapshot(ctx.store, &current) {
            Ok(()) => info!(
                "Group baseline of {} groups saved, no notifications sent",
                current.len()
            ),
            Err(e) => {
                error!("Failed to save group baseline: {}", e);
                report.persist_error = Some(e.to_string());
            }
        }
        watch.snapshot = current;
        watch.mode = SnapshotMode::Steady;
        report.baseline_captured = true;
        return Ok(report);
    }

    report.changes = diff_groups(&watch.snapshot, &current);
    if report.changes.is_empty() {
        return Ok(report);
    }

    for change in &report.changes {
        let description = change.to_string();
        ctx.system_log.log_group_change(&description);
        warn!("UserGroup change: {}", description);

        let text = output::group_change_alert(&description);
        ctx.alert(&text).await;
        report.alerts.push(text);
    }

    if let Err(e) = save_group_snapshot(ctx.store, &current) {
        error!("Failed to save group state: {}", e);
        ctx.system_log.log_error(&e.to_string(), Some("group state"));
        report.persist_error = Some(e.to_string());
    }
    watch.snapshot = current;

    Ok(report)
}
