use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::timeline::TimelineConfig;

/// Overrides the directory the settings and tasks files live in.
pub const HOME_ENV: &str = "DAYTRACK_HOME";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Relative paths resolve against the base directory.
    pub tasks_file: String,
    pub timeline: TimelineConfig,
    pub refresh_interval_ms: u64,
    pub max_columns: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tasks_file: "tasks.json".into(),
            timeline: TimelineConfig::default(),
            refresh_interval_ms: 100,
            max_columns: 3,
        }
    }
}

pub struct SettingsStore {
    base_dir: PathBuf,
    path: PathBuf,
    data: AppSettings,
}

impl SettingsStore {
    /// Settings from `DAYTRACK_HOME`, or the executable's directory.
    pub fn from_env() -> Result<Self> {
        Self::new(base_dir()?)
    }

    pub fn new(base_dir: PathBuf) -> Result<Self> {
        let path = base_dir.join(SETTINGS_FILE);
        let data = if path.exists() {
            Self::read(&path).unwrap_or_else(|e| {
                log::warn!("Ignoring settings: {e:#}");
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };

        Ok(Self {
            base_dir,
            path,
            data,
        })
    }

    pub fn settings(&self) -> &AppSettings {
        &self.data
    }

    pub fn tasks_file_path(&self) -> PathBuf {
        let configured = Path::new(&self.data.tasks_file);
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.base_dir.join(configured)
        }
    }

    pub fn timeline(&self) -> TimelineConfig {
        self.data.timeline
    }

    /// Refresh tick period, never below 10 ms.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.data.refresh_interval_ms.max(10))
    }

    pub fn max_columns(&self) -> usize {
        self.data.max_columns.max(1)
    }

    pub fn update_max_columns(&mut self, columns: usize) -> Result<()> {
        self.data.max_columns = columns.max(1);
        self.persist()
    }

    fn read(path: &Path) -> Result<AppSettings> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {}", path.display()))
    }

    fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

fn base_dir() -> Result<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let exe = env::current_exe().context("Failed to locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("Executable path has no parent directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.settings(), &AppSettings::default());
        assert_eq!(store.tasks_file_path(), dir.path().join("tasks.json"));
        assert_eq!(store.refresh_interval(), Duration::from_millis(100));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "tasksFile": "work.json", "timeline": { "startHour": 8 } }"#,
        )
        .unwrap();

        let store = SettingsStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.tasks_file_path(), dir.path().join("work.json"));
        assert_eq!(store.timeline().start_hour, 8);
        assert_eq!(store.timeline().span_hours, 18);
        assert_eq!(store.max_columns(), 3);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let store = SettingsStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.settings(), &AppSettings::default());
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the file cannot be read as text.
        fs::create_dir(dir.path().join(SETTINGS_FILE)).unwrap();
        let store = SettingsStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.settings(), &AppSettings::default());
    }

    #[test]
    fn column_updates_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::new(dir.path().to_path_buf()).unwrap();
        store.update_max_columns(5).unwrap();

        let reloaded = SettingsStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.max_columns(), 5);
    }
}
