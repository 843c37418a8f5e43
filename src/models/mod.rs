pub mod color;
pub mod span;
pub mod task;

pub use color::Rgba;
pub use task::{Interval, Task, DEFAULT_TASK_COLOR, DEFAULT_TASK_NAME};
