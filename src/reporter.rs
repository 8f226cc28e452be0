use std::path::Path;
use tracing::{error, info};

use crate::events::Event;

pub const ARROW: &str = "  =>  ";

/// Reporter aggregates events and produces human or JSON output.
#[derive(Debug, Default)]
pub struct Reporter {
    events: Vec<Event>,
    json_mode: bool,
}

impl Reporter {
    pub fn new(json_mode: bool) -> Self {
        Self {
            events: Vec::new(),
            json_mode,
        }
    }

    pub fn record(&mut self, event: Event) {
        if self.json_mode {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{}", line);
            }
        } else {
            log_event(&event);
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Print planned operations as two aligned columns. Does nothing in JSON mode.
    pub fn print_plan(&self) {
        if self.json_mode {
            return;
        }
        let rows = self.planned_rows();
        if !rows.is_empty() {
            print!("{}", two_column_table(&rows, ARROW));
        }
    }

    fn planned_rows(&self) -> Vec<(String, String)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::RenamePlanned { src, dst } | Event::RestorePlanned { src, dst } => {
                    Some((show(src), show(dst)))
                }
                Event::DeletePlanned { path } => Some((show(path), "(delete)".to_string())),
                _ => None,
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        let count = |pred: fn(&Event) -> bool| self.events.iter().filter(|e| pred(e)).count();
        let renamed = count(|e| matches!(e, Event::Renamed { .. }));
        let deleted = count(|e| matches!(e, Event::Deleted { .. }));
        let restored = count(|e| matches!(e, Event::Restored { .. }));
        format!("{renamed} renamed, {deleted} deleted, {restored} restored")
    }
}

fn log_event(event: &Event) {
    match event {
        Event::Renamed { src, dst, .. } => info!("\"{}\"{ARROW}\"{}\"", show(src), show(dst)),
        Event::Restored { src, dst } => info!("\"{}\"{ARROW}\"{}\"", show(src), show(dst)),
        Event::Deleted { path, .. } => info!("Deleted \"{}\"", show(path)),
        Event::Failed { error } => error!("{}", error),
        Event::NoChanges => info!("No changes."),
        Event::RenamePlanned { .. }
        | Event::DeletePlanned { .. }
        | Event::RestorePlanned { .. }
        | Event::Completed { .. } => {}
    }
}

fn show(path: &Path) -> String {
    path.display().to_string()
}

/// Render rows with the first column padded to a common width.
pub fn two_column_table(rows: &[(String, String)], separator: &str) -> String {
    let width = rows
        .iter()
        .map(|(left, _)| left.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (left, right) in rows {
        let pad = width - left.chars().count();
        out.push_str(left);
        out.extend(std::iter::repeat_n(' ', pad));
        out.push_str(separator);
        out.push_str(right);
        out.push('\n');
    }
    out
}
