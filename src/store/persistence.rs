//! Flat-file persistence for the task collection.
//!
//! Neither direction reports failure to the caller: a missing or unreadable
//! file loads as an empty list, and a failed write is logged and dropped.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::Task;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub trait TaskPersistence {
    fn save(&self, path: &Path, tasks: &[Task]);
    fn load(&self, path: &Path) -> Vec<Task>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTaskPersistence;

impl JsonTaskPersistence {
    fn write(path: &Path, tasks: &[Task]) -> Result<()> {
        let serialized = serde_json::to_string_pretty(tasks)?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)
            .context("Failed to create temp file")?;
        temp_file
            .write_all(serialized.as_bytes())
            .context("Failed to write to temp file")?;
        temp_file
            .persist(path)
            .with_context(|| format!("Failed to write tasks to {}", path.display()))?;
        Ok(())
    }

    fn read(path: &Path) -> Result<Vec<Task>> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tasks from {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        let tasks: Option<Vec<Task>> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse tasks from {}", path.display()))?;
        Ok(tasks.unwrap_or_default())
    }

    /// Keeps an unparseable file around so the next autosave does not erase
    /// the only copy.
    fn quarantine(path: &Path) {
        let mut target = PathBuf::from(path);
        target.as_mut_os_string().push(".corrupt");
        match fs::copy(path, &target) {
            Ok(_) => log_warn!("Copied unreadable tasks file to {}", target.display()),
            Err(err) => log_warn!("Failed to back up unreadable tasks file: {err}"),
        }
    }
}

impl TaskPersistence for JsonTaskPersistence {
    fn save(&self, path: &Path, tasks: &[Task]) {
        if let Err(err) = Self::write(path, tasks) {
            log_warn!("Autosave failed: {err:#}");
        }
    }

    fn load(&self, path: &Path) -> Vec<Task> {
        if !path.exists() {
            log_info!("No tasks file at {}", path.display());
            return Vec::new();
        }

        match Self::read(path) {
            Ok(tasks) => {
                log_info!("Loaded {} tasks from {}", tasks.len(), path.display());
                tasks
            }
            Err(err) => {
                log_warn!("{err:#}; starting from an empty task list");
                Self::quarantine(path);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta};

    use crate::models::Interval;

    fn sample_tasks() -> Vec<Task> {
        let mut task = Task::new("Task 1", "#787878");
        let mut interval = Interval::open(
            task.id,
            DateTime::parse_from_rfc3339("2026-03-02T08:00:00+01:00").expect("valid datetime"),
        );
        interval.duration = TimeDelta::minutes(90);
        interval.is_finalized = true;
        task.intervals.push(interval);
        task.intervals.push(Interval::open(
            task.id,
            DateTime::parse_from_rfc3339("2026-03-02T10:00:00+01:00").expect("valid datetime"),
        ));
        vec![task, Task::new("Task 2", "#FD5A70")]
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = JsonTaskPersistence.load(&dir.path().join("tasks.json"));
        assert!(loaded.is_empty());
    }

    #[test]
    fn saved_tasks_load_back_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let tasks = sample_tasks();

        JsonTaskPersistence.save(&path, &tasks);
        assert_eq!(JsonTaskPersistence.load(&path), tasks);
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let tasks = sample_tasks();

        JsonTaskPersistence.save(&path, &tasks);
        JsonTaskPersistence.save(&path, &tasks[1..]);
        assert_eq!(JsonTaskPersistence.load(&path).len(), 1);
    }

    #[test]
    fn file_uses_pascal_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        JsonTaskPersistence.save(&path, &sample_tasks());

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"ColorHex\""));
        assert!(raw.contains("\"IsFinalized\""));
        assert!(raw.contains("\"Duration\": \"01:30:00\""));
    }

    #[test]
    fn garbage_loads_empty_and_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(JsonTaskPersistence.load(&path).is_empty());
        assert!(dir.path().join("tasks.json.corrupt").exists());
    }

    #[test]
    fn null_and_blank_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        fs::write(&path, "null").unwrap();
        assert!(JsonTaskPersistence.load(&path).is_empty());

        fs::write(&path, "  \n").unwrap();
        assert!(JsonTaskPersistence.load(&path).is_empty());
    }

    #[test]
    fn unwritable_target_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the file makes the final rename fail.
        let path = dir.path().join("tasks.json");
        fs::create_dir(&path).unwrap();
        JsonTaskPersistence.save(&path, &sample_tasks());
        assert!(path.is_dir());
    }
}
