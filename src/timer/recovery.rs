//! Startup repair of intervals left open by an unclean shutdown.

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::store::TaskStore;
use crate::utils::time::end_of_day;

use super::IntervalTimer;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Task whose same-day session continues live.
    pub resumed: Option<Uuid>,
    /// Tasks whose prior-day session was closed at the end of its day.
    pub closed_stale: Vec<Uuid>,
    /// Extra same-day sessions closed at their last saved duration.
    pub sealed: Vec<Uuid>,
}

impl RecoveryReport {
    pub fn is_clean(&self) -> bool {
        self.resumed.is_none() && self.closed_stale.is_empty() && self.sealed.is_empty()
    }
}

/// Scans every task for a trailing open interval.
///
/// - started today: the first one found resumes live, reusing its interval;
/// - started on a prior day: finalized at 23:59:59.9999999 of that day;
/// - any further same-day one: finalized at its last saved duration.
///
/// Afterwards at most one task holds an open interval. The returned timer, if
/// any, is already running.
pub fn reconcile_open_intervals(
    store: &mut TaskStore,
    now: DateTime<FixedOffset>,
) -> (RecoveryReport, Option<IntervalTimer>) {
    let today = now.date_naive();
    let open: Vec<(Uuid, DateTime<FixedOffset>)> = store
        .tasks()
        .iter()
        .filter_map(|task| task.open_interval().map(|interval| (task.id, interval.start)))
        .collect();

    let mut report = RecoveryReport::default();
    let mut resumed = None;

    // Dates compare in the offset each start was recorded with.
    for (task_id, start) in open {
        if start.date_naive() < today {
            if let Some(duration) = store.close_open_interval(task_id, end_of_day(start)) {
                log_warn!(
                    "Closed stale session of task {task_id} from {} after {}s",
                    start.date_naive(),
                    duration.num_seconds()
                );
            }
            report.closed_stale.push(task_id);
            continue;
        }

        if resumed.is_none() {
            resumed = IntervalTimer::resume(store, task_id);
            if resumed.is_some() {
                log_info!("Resuming session of task {task_id} started at {start}");
                report.resumed = Some(task_id);
                continue;
            }
        }

        if store.seal_open_interval(task_id).is_some() {
            log_warn!("Sealed extra open session of task {task_id}");
            report.sealed.push(task_id);
        }
    }

    (report, resumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    use crate::models::{Interval, Task};

    fn fixed_time(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).expect("valid datetime")
    }

    fn task_with_open(name: &str, start: &str, saved: TimeDelta) -> Task {
        let mut task = Task::new(name, "#888888");
        let mut interval = Interval::open(task.id, fixed_time(start));
        interval.duration = saved;
        task.intervals.push(interval);
        task
    }

    #[test]
    fn same_day_open_interval_resumes_without_new_interval() {
        let task = task_with_open("a", "2026-03-02T09:00:00+01:00", TimeDelta::minutes(20));
        let id = task.id;
        let mut store = TaskStore::from_tasks(vec![task]).unwrap();
        let now = fixed_time("2026-03-02T11:00:00+01:00");

        let (report, timer) = reconcile_open_intervals(&mut store, now);

        let timer = timer.expect("resumed timer");
        assert!(timer.is_running());
        assert_eq!(timer.task_id(), id);
        assert_eq!(report.resumed, Some(id));
        let task = store.get(id).unwrap();
        assert_eq!(task.intervals.len(), 1);
        assert_eq!(task.open_interval().unwrap().start, fixed_time("2026-03-02T09:00:00+01:00"));
    }

    #[test]
    fn prior_day_open_interval_closes_at_end_of_that_day() {
        let task = task_with_open("a", "2026-03-01T14:00:00+01:00", TimeDelta::minutes(5));
        let id = task.id;
        let mut store = TaskStore::from_tasks(vec![task]).unwrap();
        let now = fixed_time("2026-03-02T08:00:00+01:00");

        let (report, timer) = reconcile_open_intervals(&mut store, now);

        assert!(timer.is_none());
        assert_eq!(report.closed_stale, vec![id]);
        let interval = &store.get(id).unwrap().intervals[0];
        assert!(interval.is_finalized);
        assert_eq!(interval.duration, TimeDelta::hours(10) - TimeDelta::nanoseconds(100));
    }

    #[test]
    fn stale_intervals_after_the_resumed_task_are_still_closed() {
        let today = task_with_open("today", "2026-03-02T09:00:00+01:00", TimeDelta::zero());
        let stale = task_with_open("stale", "2026-02-27T22:00:00+01:00", TimeDelta::zero());
        let (today_id, stale_id) = (today.id, stale.id);
        let mut store = TaskStore::from_tasks(vec![today, stale]).unwrap();

        let (report, timer) =
            reconcile_open_intervals(&mut store, fixed_time("2026-03-02T10:00:00+01:00"));

        assert_eq!(timer.map(|t| t.task_id()), Some(today_id));
        assert_eq!(report.closed_stale, vec![stale_id]);
        let closed = &store.get(stale_id).unwrap().intervals[0];
        assert_eq!(closed.duration, TimeDelta::hours(2) - TimeDelta::nanoseconds(100));
    }

    #[test]
    fn second_same_day_open_interval_is_sealed() {
        let first = task_with_open("first", "2026-03-02T08:00:00+01:00", TimeDelta::minutes(10));
        let second = task_with_open("second", "2026-03-02T08:30:00+01:00", TimeDelta::minutes(12));
        let (first_id, second_id) = (first.id, second.id);
        let mut store = TaskStore::from_tasks(vec![first, second]).unwrap();

        let (report, _) = reconcile_open_intervals(&mut store, fixed_time("2026-03-02T10:00:00+01:00"));

        assert_eq!(report.resumed, Some(first_id));
        assert_eq!(report.sealed, vec![second_id]);
        let open_count = store
            .tasks()
            .iter()
            .filter(|task| task.open_interval().is_some())
            .count();
        assert_eq!(open_count, 1);
        assert_eq!(store.get(second_id).unwrap().intervals[0].duration, TimeDelta::minutes(12));
    }

    #[test]
    fn start_date_is_read_in_its_recorded_offset() {
        // Saved before a DST fallback, resumed after it on the same local day.
        let task = task_with_open("a", "2026-10-25T00:30:00+02:00", TimeDelta::minutes(5));
        let id = task.id;
        let mut store = TaskStore::from_tasks(vec![task]).unwrap();

        let (report, timer) =
            reconcile_open_intervals(&mut store, fixed_time("2026-10-25T10:00:00+01:00"));

        assert_eq!(report.resumed, Some(id));
        assert!(report.closed_stale.is_empty());
        assert_eq!(timer.map(|t| t.task_id()), Some(id));
        assert!(store.get(id).unwrap().open_interval().is_some());
    }

    #[test]
    fn stale_close_uses_the_start_day_midnight_of_its_own_offset() {
        let task = task_with_open("a", "2026-10-24T23:00:00+02:00", TimeDelta::zero());
        let id = task.id;
        let mut store = TaskStore::from_tasks(vec![task]).unwrap();

        let (report, _) = reconcile_open_intervals(&mut store, fixed_time("2026-10-26T09:00:00+01:00"));

        assert_eq!(report.closed_stale, vec![id]);
        let interval = &store.get(id).unwrap().intervals[0];
        assert_eq!(interval.duration, TimeDelta::hours(1) - TimeDelta::nanoseconds(100));
    }

    #[test]
    fn store_without_open_intervals_is_untouched() {
        let mut store = TaskStore::load_or_seed(Vec::new()).unwrap();
        let revision = store.revision();
        let (report, timer) = reconcile_open_intervals(&mut store, fixed_time("2026-03-02T10:00:00+01:00"));
        assert!(report.is_clean());
        assert!(timer.is_none());
        assert_eq!(store.revision(), revision);
    }
}
