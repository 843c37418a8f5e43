use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::TaskStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
}

/// Timer for a single task. While `Running`, the task's last interval is the
/// open interval this timer owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTimer {
    task_id: Uuid,
    status: TimerStatus,
}

impl IntervalTimer {
    pub fn new(task_id: Uuid) -> Self {
        Self {
            task_id,
            status: TimerStatus::Idle,
        }
    }

    /// Running timer adopting the task's existing open interval. No new
    /// interval is created; `None` when the task has nothing open.
    pub fn resume(store: &TaskStore, task_id: Uuid) -> Option<Self> {
        store.get(task_id)?.open_interval()?;
        Some(Self {
            task_id,
            status: TimerStatus::Running,
        })
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Opens a new interval at `now`. No-op when already running.
    pub fn start(&mut self, store: &mut TaskStore, now: DateTime<FixedOffset>) -> bool {
        if self.is_running() {
            return false;
        }
        if store.open_interval(self.task_id, now) {
            self.status = TimerStatus::Running;
            return true;
        }
        // An interval left open on the task is picked up instead of stacking a
        // second one behind it.
        if Self::resume(store, self.task_id).is_some() {
            self.status = TimerStatus::Running;
        }
        false
    }

    /// Finalizes the open interval with `duration = now - start`. No-op when
    /// idle.
    pub fn stop(&mut self, store: &mut TaskStore, now: DateTime<FixedOffset>) -> Option<TimeDelta> {
        if !self.is_running() {
            return None;
        }
        self.status = TimerStatus::Idle;
        store.close_open_interval(self.task_id, now)
    }

    /// Recomputes the open interval's duration without finalizing it.
    pub fn live_refresh(&self, store: &mut TaskStore, now: DateTime<FixedOffset>) -> bool {
        self.is_running() && store.refresh_open_interval(self.task_id, now)
    }

    /// Elapsed time of the current session.
    pub fn elapsed(&self, store: &TaskStore, now: DateTime<FixedOffset>) -> TimeDelta {
        if !self.is_running() {
            return TimeDelta::zero();
        }
        store
            .get(self.task_id)
            .and_then(|task| task.open_interval())
            .map(|interval| interval.elapsed(now))
            .unwrap_or_else(TimeDelta::zero)
    }

    pub fn started_at(&self, store: &TaskStore) -> Option<DateTime<FixedOffset>> {
        if !self.is_running() {
            return None;
        }
        store
            .get(self.task_id)
            .and_then(|task| task.open_interval())
            .map(|interval| interval.start)
    }
}
