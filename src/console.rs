//! Line-oriented front end standing in for the window.

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::aggregation::{distribution_bar, AggregateSnapshot, BarSegment};
use crate::store::TaskStore;
use crate::tasks::commands::{create_task, delete_task, get_tasks, rename_task, update_task_color};
use crate::timeline::TimelineView;
use crate::timer::commands::select_task;
use crate::timer::SelectionChange;
use crate::utils::time::format_clock;
use crate::AppState;

const CANVAS_WIDTH: usize = 72;
const IDLE_HATCH: char = '/';

pub const HELP: &str = "\
Commands:
  list                     tasks with total and daily time
  select <task>            start <task>; selecting the running task stops it
  add [name]               new task
  remove <task>            delete a task and its history
  rename <task> <name>     rename a task
  color <task> <#hex>      change a task's color
  timeline                 today's timeline
  bar                      today's time distribution
  columns <n>              task list columns
  help                     this text
  quit                     save and exit
<task> is a 1-based index or an exact task name.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Select(String),
    Add(Option<String>),
    Remove(String),
    Rename(String, String),
    Color(String, String),
    Timeline,
    Bar,
    Columns(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let required = |what: &str| {
        if rest.is_empty() {
            Err(format!("'{verb}' needs {what}"))
        } else {
            Ok(rest.to_string())
        }
    };
    let pair = |what: &str| match rest.split_once(char::is_whitespace) {
        Some((task, value)) if !value.trim().is_empty() => {
            Ok((task.to_string(), value.trim().to_string()))
        }
        _ => Err(format!("'{verb}' needs <task> and {what}")),
    };

    match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => Ok(Command::List),
        "select" | "s" => required("<task>").map(Command::Select),
        "add" => Ok(Command::Add(Some(rest.to_string()).filter(|n| !n.is_empty()))),
        "remove" | "rm" => required("<task>").map(Command::Remove),
        "rename" => pair("<name>").map(|(task, name)| Command::Rename(task, name)),
        "color" => pair("<#hex>").map(|(task, color)| Command::Color(task, color)),
        "timeline" | "t" => Ok(Command::Timeline),
        "bar" | "b" => Ok(Command::Bar),
        "columns" => rest
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(Command::Columns)
            .ok_or_else(|| "'columns' needs a positive number".to_string()),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

/// Looks a task up by 1-based position, then by exact name.
pub fn resolve_task(store: &TaskStore, token: &str) -> Result<Uuid, String> {
    if let Ok(position) = token.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| store.tasks().get(index))
            .map(|task| task.id)
            .ok_or_else(|| format!("no task at position {position}"));
    }
    store
        .find_by_name(token)
        .map(|task| task.id)
        .ok_or_else(|| format!("no task named '{token}'"))
}

/// Runs one command and returns the text to print.
pub fn execute(state: &mut AppState, command: Command, now: DateTime<FixedOffset>) -> Result<String, String> {
    match command {
        Command::List => {
            let snapshot = get_tasks(state, now)?;
            Ok(render_task_list(
                &snapshot,
                state.session.selected(),
                state.settings.max_columns(),
            ))
        }
        Command::Select(token) => {
            let task_id = resolve_task(&state.store, &token)?;
            let change = select_task(state, task_id, now)?;
            let name = |id: Uuid| {
                state
                    .store
                    .get(id)
                    .map(|task| task.name.clone())
                    .unwrap_or_default()
            };
            Ok(match change {
                SelectionChange::Started {
                    task_id,
                    stopped: Some(previous),
                } => format!("Stopped {}, started {}", name(previous), name(task_id)),
                SelectionChange::Started { task_id, stopped: None } => {
                    format!("Started {}", name(task_id))
                }
                SelectionChange::Cleared { task_id } => format!("Stopped {}", name(task_id)),
            })
        }
        Command::Add(name) => {
            let task_id = create_task(state, name)?;
            let position = state.store.position(task_id).map_or(0, |p| p + 1);
            Ok(format!("Added task {position}"))
        }
        Command::Remove(token) => {
            let task_id = resolve_task(&state.store, &token)?;
            let removed = delete_task(state, task_id, now)?;
            Ok(format!("Removed {}", removed.name))
        }
        Command::Rename(token, name) => {
            let task_id = resolve_task(&state.store, &token)?;
            rename_task(state, task_id, name)?;
            Ok("Renamed".to_string())
        }
        Command::Color(token, color) => {
            let task_id = resolve_task(&state.store, &token)?;
            update_task_color(state, task_id, color)?;
            Ok("Color updated".to_string())
        }
        Command::Timeline => {
            state.on_refresh(now).map_err(|e| e.to_string())?;
            Ok(render_timeline(&state.store, &state.timeline, CANVAS_WIDTH))
        }
        Command::Bar => {
            let snapshot = state.summary(now);
            Ok(render_bar(&state.store, &distribution_bar(&snapshot), CANVAS_WIDTH))
        }
        Command::Columns(columns) => {
            state
                .settings
                .update_max_columns(columns)
                .map_err(|e| format!("{e:#}"))?;
            Ok(format!("Showing up to {} columns", state.settings.max_columns()))
        }
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}

/// Parses and runs one input line. Failures go to the dialog.
pub fn handle_line(state: &mut AppState, line: &str, now: DateTime<FixedOffset>) -> Flow {
    if line.trim().is_empty() {
        return Flow::Continue;
    }
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(message) => {
            state.notify_error(&message);
            return Flow::Continue;
        }
    };
    if command == Command::Quit {
        return Flow::Quit;
    }
    match execute(state, command, now) {
        Ok(output) if !output.is_empty() => println!("{output}"),
        Ok(_) => {}
        Err(message) => state.notify_error(&message),
    }
    Flow::Continue
}

fn marker(store: &TaskStore, task_id: Option<Uuid>) -> char {
    const MARKERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    task_id
        .and_then(|id| store.position(id))
        .and_then(|position| MARKERS.get(position))
        .map_or('#', |b| char::from(*b))
}

pub fn render_timeline(store: &TaskStore, view: &TimelineView, width: usize) -> String {
    let Some(window) = view.window() else {
        return String::new();
    };
    let mut row = vec![' '; width];
    for (block, geometry) in view.blocks().iter().zip(view.layout(width as f64)) {
        let from = (geometry.left.round() as usize).min(width);
        let to = ((geometry.left + geometry.width).round() as usize).min(width);
        let fill = if block.is_idle {
            IDLE_HATCH
        } else {
            marker(store, block.task_id)
        };
        row[from..to.max(from)].fill(fill);
    }

    let offset = window.start.offset();
    let start = window.start.format("%H:%M").to_string();
    let end = window.end().with_timezone(offset).format("%H:%M").to_string();
    let mut out = format!(
        "{start}{end:>pad$}\n|{}|",
        row.into_iter().collect::<String>(),
        pad = (width + 2).saturating_sub(start.len())
    );
    for block in view.blocks().iter().filter(|block| !block.is_idle) {
        out.push('\n');
        out.push(marker(store, block.task_id));
        out.push(' ');
        out.push_str(&block.label.replace('\n', "  "));
    }
    out
}

/// Proportional runs of task markers; the last run absorbs rounding.
pub fn render_bar(store: &TaskStore, segments: &[BarSegment], width: usize) -> String {
    if segments.is_empty() {
        return "(nothing tracked today)".to_string();
    }
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    let mut used = 0;
    for (i, segment) in segments.iter().enumerate() {
        let run = if i + 1 == segments.len() {
            width.saturating_sub(used)
        } else {
            ((segment.weight * width as f64).round() as usize).min(width - used)
        };
        bar.extend(std::iter::repeat(marker(store, Some(segment.task_id))).take(run));
        used += run;
    }
    bar.push(']');
    bar
}

pub fn render_task_list(snapshot: &AggregateSnapshot, selected: Option<Uuid>, columns: usize) -> String {
    let cells: Vec<String> = snapshot
        .tasks
        .iter()
        .enumerate()
        .map(|(i, summary)| {
            let running = if selected == Some(summary.task_id) { " *" } else { "" };
            format!(
                "{}. {}{}  {} ({} today, {:.0}%)",
                i + 1,
                summary.name,
                running,
                format_clock(summary.total),
                format_clock(summary.daily_total),
                summary.daily_progress * 100.0
            )
        })
        .collect();
    let cell_width = cells.iter().map(|cell| cell.chars().count()).max().unwrap_or(0);

    cells
        .chunks(columns.max(1))
        .map(|row| {
            row.iter()
                .map(|cell| format!("{cell:<cell_width$}"))
                .collect::<Vec<_>>()
                .join("   ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
