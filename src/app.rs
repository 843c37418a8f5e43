//! Application state owned by the event loop.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use std::time::Duration;

use crate::aggregation::{self, AggregateSnapshot};
use crate::autosave::AutoSave;
use crate::dialog::DialogService;
use crate::settings::SettingsStore;
use crate::store::{IntegrityError, TaskPersistence, TaskStore};
use crate::timeline::{Refresh, TimelineView, TimelineWindow};
use crate::timer::{reconcile_open_intervals, SessionController};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub struct AppState {
    pub(crate) store: TaskStore,
    pub(crate) session: SessionController,
    pub(crate) settings: SettingsStore,
    pub(crate) autosave: AutoSave,
    pub(crate) dialog: Box<dyn DialogService>,
    pub(crate) timeline: TimelineView,
}

impl AppState {
    /// Loads the tasks file, seeds it when empty and repairs intervals left
    /// open by the previous run. Nothing is written before this succeeds.
    pub fn bootstrap(
        settings: SettingsStore,
        persistence: Box<dyn TaskPersistence>,
        dialog: Box<dyn DialogService>,
        now: DateTime<FixedOffset>,
    ) -> Result<Self> {
        let autosave = AutoSave::new(persistence, settings.tasks_file_path());
        let mut store = TaskStore::load_or_seed(autosave.load())
            .with_context(|| format!("Tasks file {} is inconsistent", autosave.path().display()))?;

        let (report, resumed) = reconcile_open_intervals(&mut store, now);
        if !report.closed_stale.is_empty() || !report.sealed.is_empty() {
            log_warn!(
                "Recovered {} stale and {} extra open sessions",
                report.closed_stale.len(),
                report.sealed.len()
            );
        }
        let session = match resumed {
            Some(timer) => SessionController::resumed(timer),
            None => SessionController::new(),
        };

        log_info!(
            "Loaded {} tasks from {}",
            store.len(),
            autosave.path().display()
        );

        let mut state = Self {
            store,
            session,
            settings,
            autosave,
            dialog,
            timeline: TimelineView::new(),
        };
        state.on_refresh(now)?;
        Ok(state)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn timeline(&self) -> &TimelineView {
        &self.timeline
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn refresh_interval(&self) -> Duration {
        self.settings.refresh_interval()
    }

    pub fn window_for(&self, now: DateTime<FixedOffset>) -> TimelineWindow {
        self.settings.timeline().window_for(now)
    }

    /// Refresh tick: advances the running interval and the timeline.
    pub fn on_refresh(&mut self, now: DateTime<FixedOffset>) -> Result<Refresh, IntegrityError> {
        self.session.refresh(&mut self.store, now);
        let window = self.window_for(now);
        self.timeline
            .refresh(&self.store, self.session.selected(), window, now)
    }

    pub fn on_autosave(&mut self) {
        self.autosave.save(&self.store);
    }

    pub fn summary(&self, now: DateTime<FixedOffset>) -> AggregateSnapshot {
        aggregation::summarize(&self.store, now)
    }

    pub fn notify_error(&self, message: &str) {
        self.dialog.show_message(message, "Error");
    }

    /// Final flush. A running interval stays open so the next start resumes
    /// it.
    pub fn shutdown(&mut self, now: DateTime<FixedOffset>) {
        self.session.refresh(&mut self.store, now);
        self.autosave.save(&self.store);
        log_info!("Saved {} tasks on shutdown", self.store.len());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use crate::models::{Interval, Task};
    use crate::timer::TimerStatus;

    pub(crate) fn fixed_time(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).expect("valid datetime")
    }

    #[derive(Default, Clone)]
    pub(crate) struct MemoryPersistence {
        pub(crate) stored: Rc<RefCell<Vec<Task>>>,
        pub(crate) saves: Rc<RefCell<usize>>,
    }

    impl TaskPersistence for MemoryPersistence {
        fn save(&self, _path: &Path, tasks: &[Task]) {
            *self.stored.borrow_mut() = tasks.to_vec();
            *self.saves.borrow_mut() += 1;
        }

        fn load(&self, _path: &Path) -> Vec<Task> {
            self.stored.borrow().clone()
        }
    }

    #[derive(Default, Clone)]
    pub(crate) struct RecordingDialog {
        pub(crate) messages: Rc<RefCell<Vec<(String, String)>>>,
    }

    impl DialogService for RecordingDialog {
        fn show_message(&self, text: &str, title: &str) {
            self.messages
                .borrow_mut()
                .push((title.to_string(), text.to_string()));
        }
    }

    pub(crate) fn app_with(
        tasks: Vec<Task>,
        now: DateTime<FixedOffset>,
    ) -> (AppState, MemoryPersistence, RecordingDialog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::new(dir.path().to_path_buf()).unwrap();
        let persistence = MemoryPersistence::default();
        *persistence.stored.borrow_mut() = tasks;
        let dialog = RecordingDialog::default();
        let state = AppState::bootstrap(
            settings,
            Box::new(persistence.clone()),
            Box::new(dialog.clone()),
            now,
        )
        .unwrap();
        (state, persistence, dialog, dir)
    }

    #[test]
    fn empty_file_boots_with_seed_tasks() {
        let (state, persistence, _, _dir) = app_with(Vec::new(), fixed_time("2026-03-02T09:00:00+00:00"));
        assert_eq!(state.store().len(), 5);
        assert!(!state.session().is_running());
        assert_eq!(*persistence.saves.borrow(), 0);
    }

    #[test]
    fn inconsistent_file_aborts_without_saving() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::new(dir.path().to_path_buf()).unwrap();
        let persistence = MemoryPersistence::default();
        let mut task = Task::new("a", "#111111");
        task.intervals.push(Interval::open(
            uuid::Uuid::new_v4(),
            fixed_time("2026-03-02T08:00:00+00:00"),
        ));
        *persistence.stored.borrow_mut() = vec![task];

        let result = AppState::bootstrap(
            settings,
            Box::new(persistence.clone()),
            Box::new(RecordingDialog::default()),
            fixed_time("2026-03-02T09:00:00+00:00"),
        );
        assert!(result.is_err());
        assert_eq!(*persistence.saves.borrow(), 0);
    }

    #[test]
    fn same_day_session_resumes_on_boot() {
        let mut task = Task::new("a", "#111111");
        task.intervals
            .push(Interval::open(task.id, fixed_time("2026-03-02T08:00:00+00:00")));
        let id = task.id;

        let (state, _, _, _dir) = app_with(vec![task], fixed_time("2026-03-02T09:00:00+00:00"));
        assert_eq!(state.session().status_of(id), TimerStatus::Running);
        assert_eq!(state.store().get(id).unwrap().intervals.len(), 1);
        let running = state
            .timeline()
            .blocks()
            .iter()
            .find(|block| block.task_id == Some(id))
            .expect("running block");
        assert_eq!(running.end(), fixed_time("2026-03-02T09:00:00+00:00"));
    }

    #[test]
    fn shutdown_saves_the_running_interval_still_open() {
        let now = fixed_time("2026-03-02T09:00:00+00:00");
        let (mut state, persistence, _, _dir) = app_with(Vec::new(), now);
        let id = state.store().tasks()[0].id;
        state.session.select(&mut state.store, id, now).unwrap();

        state.shutdown(now + chrono::TimeDelta::minutes(12));

        let stored = persistence.stored.borrow();
        let interval = stored[0].intervals.last().expect("saved interval");
        assert!(interval.is_open());
        assert_eq!(interval.duration, chrono::TimeDelta::minutes(12));
    }
}
