//! Task record store: owns every task and its intervals, plus the id index
//! intervals are resolved through.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, TimeDelta};
use uuid::Uuid;

use crate::models::{Interval, Task};

mod error;
pub mod persistence;
mod seed;

pub use error::IntegrityError;
pub use persistence::{JsonTaskPersistence, TaskPersistence};
pub use seed::default_tasks;

#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    index: HashMap<Uuid, usize>,
    /// Bumped on every structural change. Live refresh of an open interval
    /// does not count.
    revision: u64,
}

impl TaskStore {
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, IntegrityError> {
        let mut store = Self::default();
        for task in tasks {
            if store.index.contains_key(&task.id) {
                return Err(IntegrityError::DuplicateTask(task.id));
            }
            store.index.insert(task.id, store.tasks.len());
            store.tasks.push(task);
        }
        store.validate()?;
        Ok(store)
    }

    /// Builds the store from loaded records, seeding defaults when nothing was
    /// loaded.
    pub fn load_or_seed(tasks: Vec<Task>) -> Result<Self, IntegrityError> {
        if tasks.is_empty() {
            log::info!("No stored tasks found; seeding defaults");
            Self::from_tasks(default_tasks())
        } else {
            Self::from_tasks(tasks)
        }
    }

    pub fn validate(&self) -> Result<(), IntegrityError> {
        for (position, task) in self.tasks.iter().enumerate() {
            if self.index.get(&task.id) != Some(&position) {
                return Err(IntegrityError::UnknownTask(task.id));
            }

            let last = task.intervals.len().saturating_sub(1);
            for (i, interval) in task.intervals.iter().enumerate() {
                if interval.task_id != task.id {
                    if !self.index.contains_key(&interval.task_id) {
                        return Err(IntegrityError::UnknownTask(interval.task_id));
                    }
                    return Err(IntegrityError::ForeignInterval {
                        task: task.id,
                        owner: interval.task_id,
                    });
                }
                if interval.is_open() && i != last {
                    return Err(IntegrityError::OpenIntervalNotLast(task.id));
                }
                if interval.duration < TimeDelta::zero() {
                    return Err(IntegrityError::NegativeDuration(task.id));
                }
            }
        }
        Ok(())
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.index.get(&id).map(|&position| &self.tasks[position])
    }

    /// Index lookup for an interval's owner. A miss means the store is
    /// corrupted.
    pub fn resolve(&self, id: Uuid) -> Result<&Task, IntegrityError> {
        self.get(id).ok_or(IntegrityError::UnknownTask(id))
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.name == name)
    }

    pub fn all_intervals(&self) -> impl Iterator<Item = &Interval> {
        self.tasks.iter().flat_map(|task| task.intervals.iter())
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn add_task(&mut self, name: impl Into<String>, color_hex: impl Into<String>) -> Uuid {
        let mut task = Task::new(name, color_hex);
        while self.index.contains_key(&task.id) {
            task.id = Uuid::new_v4();
        }
        let id = task.id;
        self.index.insert(id, self.tasks.len());
        self.tasks.push(task);
        self.revision += 1;
        id
    }

    pub fn remove_task(&mut self, id: Uuid) -> Option<Task> {
        let position = self.index.remove(&id)?;
        let task = self.tasks.remove(position);
        self.reindex();
        self.revision += 1;
        Some(task)
    }

    pub fn rename_task(&mut self, id: Uuid, name: impl Into<String>) -> bool {
        let name = name.into();
        match self.get_mut(id) {
            Some(task) if task.name != name => task.name = name,
            Some(_) => return true,
            None => return false,
        }
        self.revision += 1;
        true
    }

    pub fn set_color(&mut self, id: Uuid, color_hex: impl Into<String>) -> bool {
        let color_hex = color_hex.into();
        match self.get_mut(id) {
            Some(task) if task.color_hex != color_hex => task.color_hex = color_hex,
            Some(_) => return true,
            None => return false,
        }
        self.revision += 1;
        true
    }

    /// Appends a fresh open interval starting at `now`. Returns false when the
    /// task is unknown or already has an open interval.
    pub fn open_interval(&mut self, id: Uuid, now: DateTime<FixedOffset>) -> bool {
        let Some(task) = self.get_mut(id) else {
            return false;
        };
        if task.open_interval().is_some() {
            return false;
        }
        task.intervals.push(Interval::open(id, now));
        self.revision += 1;
        true
    }

    /// Finalizes the open interval so that it ends at `end`. Returns the
    /// final duration.
    pub fn close_open_interval(
        &mut self,
        id: Uuid,
        end: DateTime<FixedOffset>,
    ) -> Option<TimeDelta> {
        let interval = self.get_mut(id)?.open_interval_mut()?;
        interval.duration = (end - interval.start).max(TimeDelta::zero());
        interval.is_finalized = true;
        let duration = interval.duration;
        self.revision += 1;
        Some(duration)
    }

    /// Finalizes the open interval keeping its last recorded duration.
    pub fn seal_open_interval(&mut self, id: Uuid) -> Option<TimeDelta> {
        let interval = self.get_mut(id)?.open_interval_mut()?;
        interval.duration = interval.duration.max(TimeDelta::zero());
        interval.is_finalized = true;
        let duration = interval.duration;
        self.revision += 1;
        Some(duration)
    }

    /// Recomputes the open interval's duration as `now - start` without
    /// finalizing it.
    pub fn refresh_open_interval(&mut self, id: Uuid, now: DateTime<FixedOffset>) -> bool {
        let Some(interval) = self.get_mut(id).and_then(Task::open_interval_mut) else {
            return false;
        };
        interval.duration = (now - interval.start).max(TimeDelta::zero());
        true
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        let position = *self.index.get(&id)?;
        self.tasks.get_mut(position)
    }

    fn reindex(&mut self) {
        self.index = self
            .tasks
            .iter()
            .enumerate()
            .map(|(position, task)| (task.id, position))
            .collect();
    }
}
