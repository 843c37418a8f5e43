use thiserror::Error;
use uuid::Uuid;

/// A violated store invariant. These indicate corrupted state and are never
/// recovered from locally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("interval references unknown task {0}")]
    UnknownTask(Uuid),
    #[error("duplicate task id {0}")]
    DuplicateTask(Uuid),
    #[error("task {task} holds an interval owned by task {owner}")]
    ForeignInterval { task: Uuid, owner: Uuid },
    #[error("task {0} has an open interval that is not its last interval")]
    OpenIntervalNotLast(Uuid),
    #[error("task {0} has an interval with a negative duration")]
    NegativeDuration(Uuid),
}
