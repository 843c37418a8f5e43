use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Task;
use crate::store::{IntegrityError, TaskStore};

use super::algorithm::{build_timeline, TimelineBlock};
use super::config::TimelineWindow;

/// Horizontal placement of a block on a canvas of a given width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockGeometry {
    pub left: f64,
    pub width: f64,
}

pub fn block_geometry(block: &TimelineBlock, window: &TimelineWindow, canvas_width: f64) -> BlockGeometry {
    let total_ms = window.duration.num_milliseconds() as f64;
    if total_ms <= 0.0 || canvas_width <= 0.0 {
        return BlockGeometry { left: 0.0, width: 0.0 };
    }
    let offset_ms = (block.start - window.start).num_milliseconds() as f64;
    let duration_ms = block.duration.num_milliseconds() as f64;
    BlockGeometry {
        left: offset_ms / total_ms * canvas_width,
        width: (duration_ms / total_ms * canvas_width).max(0.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Blocks were rebuilt from every interval.
    Rebuilt,
    /// Only the running block and the idle tail behind it moved.
    Extended,
    Unchanged,
}

/// Cached block sequence for the display window.
///
/// A full rebuild happens whenever the store's revision or the window moves.
/// Between structural changes only the running task's block grows, so a tick
/// rewrites the last active block and the trailing idle block in place.
#[derive(Debug, Default)]
pub struct TimelineView {
    blocks: Vec<TimelineBlock>,
    window: Option<TimelineWindow>,
    revision: Option<u64>,
}

impl TimelineView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[TimelineBlock] {
        &self.blocks
    }

    pub fn window(&self) -> Option<&TimelineWindow> {
        self.window.as_ref()
    }

    /// Forces the next refresh to rebuild.
    pub fn invalidate(&mut self) {
        self.revision = None;
    }

    pub fn refresh(
        &mut self,
        store: &TaskStore,
        running: Option<Uuid>,
        window: TimelineWindow,
        now: DateTime<FixedOffset>,
    ) -> Result<Refresh, IntegrityError> {
        if self.window == Some(window) && self.revision == Some(store.revision()) {
            match running {
                None => return Ok(Refresh::Unchanged),
                Some(task_id) => {
                    if self.extend(store, task_id, &window, now)? {
                        return Ok(Refresh::Extended);
                    }
                }
            }
        }

        self.blocks = build_timeline(store, &window, now)?;
        self.window = Some(window);
        self.revision = Some(store.revision());
        Ok(Refresh::Rebuilt)
    }

    /// Geometry of every cached block, in block order.
    pub fn layout(&self, canvas_width: f64) -> Vec<BlockGeometry> {
        let Some(window) = &self.window else {
            return Vec::new();
        };
        self.blocks
            .iter()
            .map(|block| block_geometry(block, window, canvas_width))
            .collect()
    }

    fn extend(
        &mut self,
        store: &TaskStore,
        task_id: Uuid,
        window: &TimelineWindow,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, IntegrityError> {
        let Some(interval) = store.get(task_id).and_then(Task::open_interval) else {
            return Ok(false);
        };
        let Some(last_active) = self.blocks.iter().rposition(|block| !block.is_idle) else {
            return Ok(false);
        };
        // At most one idle block may trail the running one.
        if self.blocks.len() - last_active > 2 {
            return Ok(false);
        }

        let block = &self.blocks[last_active];
        let start = block.start;
        if block.task_id != Some(task_id) || start != interval.start.max(window.start) {
            return Ok(false);
        }
        let window_end = window.end();
        let end = interval.end(now).min(window_end);
        if end < block.end() {
            return Ok(false);
        }

        let task = store.resolve(task_id)?;
        self.blocks[last_active] = TimelineBlock::active(task, start, end, window);
        self.blocks.truncate(last_active + 1);
        if end < window_end {
            self.blocks.push(TimelineBlock::idle(end, window_end, window));
        }
        Ok(true)
    }
}
