use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::aggregation::AggregateSnapshot;
use crate::models::{Rgba, Task, DEFAULT_TASK_COLOR, DEFAULT_TASK_NAME};
use crate::AppState;

pub fn get_tasks(state: &AppState, now: DateTime<FixedOffset>) -> Result<AggregateSnapshot, String> {
    Ok(state.summary(now))
}

pub fn create_task(state: &mut AppState, name: Option<String>) -> Result<Uuid, String> {
    let name = name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_TASK_NAME.to_string());
    Ok(state.store.add_task(name, DEFAULT_TASK_COLOR))
}

/// Removes the task and its history. A running timer on it is stopped first.
pub fn delete_task(state: &mut AppState, task_id: Uuid, now: DateTime<FixedOffset>) -> Result<Task, String> {
    if state.store.get(task_id).is_none() {
        return Err(format!("unknown task {task_id}"));
    }
    state.session.release(&mut state.store, task_id, now);
    state
        .store
        .remove_task(task_id)
        .ok_or_else(|| format!("unknown task {task_id}"))
}

pub fn rename_task(state: &mut AppState, task_id: Uuid, name: String) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Task name cannot be empty".into());
    }
    if state.store.rename_task(task_id, name) {
        Ok(())
    } else {
        Err(format!("unknown task {task_id}"))
    }
}

pub fn update_task_color(state: &mut AppState, task_id: Uuid, color: String) -> Result<(), String> {
    Rgba::parse_hex(&color).map_err(|e| e.to_string())?;
    if state.store.set_color(task_id, color.trim()) {
        Ok(())
    } else {
        Err(format!("unknown task {task_id}"))
    }
}
