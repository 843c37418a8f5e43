use chrono::{DateTime, FixedOffset, TimeDelta};
use uuid::Uuid;

use crate::timer::{SelectionChange, TimerSnapshot};
use crate::AppState;

pub fn get_timer_state(state: &AppState, now: DateTime<FixedOffset>) -> Result<TimerSnapshot, String> {
    Ok(state.session.snapshot(&state.store, now))
}

/// Selecting a task starts it; selecting the running task stops it.
pub fn select_task(
    state: &mut AppState,
    task_id: Uuid,
    now: DateTime<FixedOffset>,
) -> Result<SelectionChange, String> {
    state
        .session
        .select(&mut state.store, task_id, now)
        .map_err(|e| e.to_string())
}

pub fn stop_timer(state: &mut AppState, now: DateTime<FixedOffset>) -> Result<Option<TimeDelta>, String> {
    Ok(state
        .session
        .stop(&mut state.store, now)
        .map(|(_, duration)| duration))
}
