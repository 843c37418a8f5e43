use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::Task;
use crate::store::{TaskPersistence, TaskStore};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

pub const AUTOSAVE_PERIOD: Duration = Duration::from_secs(1);

/// Writes a full snapshot of the store on every autosave tick. Open intervals
/// are saved as they stand so a crash loses at most one period.
pub struct AutoSave {
    persistence: Box<dyn TaskPersistence>,
    path: PathBuf,
    saves: u64,
}

impl AutoSave {
    pub fn new(persistence: Box<dyn TaskPersistence>, path: PathBuf) -> Self {
        Self {
            persistence,
            path,
            saves: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Vec<Task> {
        self.persistence.load(&self.path)
    }

    pub fn save(&mut self, store: &TaskStore) {
        self.persistence.save(&self.path, store.tasks());
        self.saves += 1;
        log_debug!("Autosave #{} ({} tasks)", self.saves, store.len());
    }

    pub fn saves(&self) -> u64 {
        self.saves
    }
}
