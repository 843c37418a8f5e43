pub mod commands;
pub mod controller;
pub mod recovery;
pub mod state;

pub use controller::{SelectionChange, SessionController, TimerSnapshot};
pub use recovery::{reconcile_open_intervals, RecoveryReport};
pub use state::{IntervalTimer, TimerStatus};
