//! Day timeline: gap-free active/idle blocks over a configurable window.

pub mod algorithm;
pub mod config;
pub mod layout;

pub use algorithm::{build_timeline, TimelineBlock};
pub use config::{TimelineConfig, TimelineWindow};
pub use layout::{block_geometry, BlockGeometry, Refresh, TimelineView};
