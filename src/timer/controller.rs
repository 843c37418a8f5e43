use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, TimeDelta};
use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::store::TaskStore;
use crate::utils::time::{end_of_day, tick};

use super::{IntervalTimer, TimerStatus};

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub task_id: Option<Uuid>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub elapsed_ms: i64,
}

/// Outcome of selecting a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Started { task_id: Uuid, stopped: Option<Uuid> },
    Cleared { task_id: Uuid },
}

/// Owns the only timer allowed to run. Selecting a task and running it are
/// the same thing: there is no selection without a running timer.
#[derive(Debug, Default)]
pub struct SessionController {
    active: Option<IntervalTimer>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller picking up a timer resumed at startup.
    pub fn resumed(timer: IntervalTimer) -> Self {
        Self {
            active: Some(timer).filter(IntervalTimer::is_running),
        }
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.active.as_ref().map(IntervalTimer::task_id)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn status_of(&self, task_id: Uuid) -> TimerStatus {
        match &self.active {
            Some(timer) if timer.task_id() == task_id => timer.status(),
            _ => TimerStatus::Idle,
        }
    }

    /// Selects `task_id`: the running timer is stopped first, then the new one
    /// starts. Selecting the task that is already running only stops it.
    pub fn select(
        &mut self,
        store: &mut TaskStore,
        task_id: Uuid,
        now: DateTime<FixedOffset>,
    ) -> Result<SelectionChange> {
        if store.get(task_id).is_none() {
            return Err(anyhow!("unknown task {task_id}"));
        }

        let stopped = self.stop(store, now).map(|(id, _)| id);
        if stopped == Some(task_id) {
            return Ok(SelectionChange::Cleared { task_id });
        }

        let mut timer = IntervalTimer::new(task_id);
        timer.start(store, now);
        info!("Timer started for task {task_id}");
        self.active = Some(timer);
        Ok(SelectionChange::Started { task_id, stopped })
    }

    /// Stops the running timer and clears the selection.
    pub fn stop(
        &mut self,
        store: &mut TaskStore,
        now: DateTime<FixedOffset>,
    ) -> Option<(Uuid, TimeDelta)> {
        let mut timer = self.active.take()?;
        let duration = timer.stop(store, now).unwrap_or_else(TimeDelta::zero);
        info!(
            "Timer stopped for task {} after {}s",
            timer.task_id(),
            duration.num_seconds()
        );
        Some((timer.task_id(), duration))
    }

    /// Stops the timer if it belongs to `task_id`; called before the task is
    /// removed from the store.
    pub fn release(&mut self, store: &mut TaskStore, task_id: Uuid, now: DateTime<FixedOffset>) {
        if self.selected() == Some(task_id) {
            self.stop(store, now);
        }
    }

    /// Refresh tick: closes a session that crossed midnight at the end of its
    /// day and continues it from the following midnight, then projects the
    /// open interval to `now`.
    pub fn refresh(&mut self, store: &mut TaskStore, now: DateTime<FixedOffset>) -> bool {
        let Some(timer) = self.active.as_mut() else {
            return false;
        };

        // Days are read in the offset the session started with; each pass
        // moves the open interval to the next midnight of that offset.
        while let Some(started_at) = timer
            .started_at(store)
            .filter(|started_at| started_at.date_naive() < now.date_naive())
        {
            let task_id = timer.task_id();
            let day_end = end_of_day(started_at);
            store.close_open_interval(task_id, day_end);
            let midnight = day_end + tick();
            store.open_interval(task_id, midnight);
            info!("Session for task {task_id} rolled over to {}", midnight.date_naive());
        }

        timer.live_refresh(store, now)
    }

    pub fn snapshot(&self, store: &TaskStore, now: DateTime<FixedOffset>) -> TimerSnapshot {
        match &self.active {
            Some(timer) => TimerSnapshot {
                status: timer.status(),
                task_id: Some(timer.task_id()),
                started_at: timer.started_at(store),
                elapsed_ms: timer.elapsed(store, now).num_milliseconds(),
            },
            None => TimerSnapshot {
                status: TimerStatus::Idle,
                task_id: None,
                started_at: None,
                elapsed_ms: 0,
            },
        }
    }
}
