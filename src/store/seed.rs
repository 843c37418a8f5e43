use crate::models::Task;

const SEED_TASKS: [(&str, &str); 5] = [
    ("Task 1", "#787878"),
    ("Task 2", "#FD5A70"),
    ("Task 3", "#FED068"),
    ("Task 4", "#00BFA0"),
    ("Task 5", "#0580B0"),
];

/// Tasks created on first run, when nothing could be loaded.
pub fn default_tasks() -> Vec<Task> {
    SEED_TASKS
        .iter()
        .map(|(name, color)| Task::new(*name, *color))
        .collect()
}
