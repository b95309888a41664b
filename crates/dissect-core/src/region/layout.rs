//! Region text layout.
//!
//! Turns the positioned text runs of a page into the plain text seen by an
//! extraction expression: runs inside the region are grouped into lines by a
//! vertical sweep, ordered left to right, and joined.

use std::cmp::Ordering;

use crate::models::config::LayoutConfig;
use crate::models::document::{Page, TextRun};
use crate::models::pattern::Rectangle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Edge {
    // Ends sort before starts at the same position
    End,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Pending,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct Event {
    y: f64,
    edge: Edge,
    run: usize,
}

impl Page {
    /// Get the text inside `rect`, one line per visual text line.
    pub fn region_text(&self, rect: &Rectangle, config: &LayoutConfig) -> String {
        region_text(self, rect, config)
    }
}

/// Get the text inside `rect` on `page`.
///
/// Only runs lying entirely within the normalized rectangle are included.
/// A run starting exactly on the left or top edge is left out, while one
/// ending on the right or bottom edge is kept.
pub fn region_text(page: &Page, rect: &Rectangle, config: &LayoutConfig) -> String {
    let rect = rect.normalized();
    if rect.is_empty() {
        return String::new();
    }

    let runs: Vec<&TextRun> = page
        .text_runs
        .iter()
        .filter(|run| rect.contains(&run.rect.normalized()))
        .collect();

    split_into_lines(&runs, config.line_top_inset)
        .iter()
        .map(|line| {
            line.iter()
                .map(|&i| runs[i].text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Group runs into lines, returning run indexes ordered by `x` within each line.
///
/// Each run occupies `[y + h * inset, y2]` vertically. A line ends whenever no
/// run is open, so overlapping runs always land on the same line.
fn split_into_lines(runs: &[&TextRun], inset: f64) -> Vec<Vec<usize>> {
    let mut events: Vec<Event> = Vec::with_capacity(runs.len() * 2);
    for (run, text_run) in runs.iter().enumerate() {
        let rect = text_run.rect.normalized();
        events.push(Event {
            y: rect.y + rect.height() * inset,
            edge: Edge::Start,
            run,
        });
        events.push(Event {
            y: rect.y2,
            edge: Edge::End,
            run,
        });
    }
    events.sort_by(|a, b| {
        a.y.total_cmp(&b.y)
            .then(a.edge.cmp(&b.edge))
            .then(a.run.cmp(&b.run))
    });

    let mut state = vec![RunState::Pending; runs.len()];
    let mut depth = 0usize;
    let mut lines = Vec::new();
    let mut line: Vec<usize> = Vec::new();

    for event in events {
        match (event.edge, state[event.run]) {
            (Edge::Start, RunState::Pending) => {
                state[event.run] = RunState::Open;
                depth += 1;
                line.push(event.run);
            }
            (Edge::End, RunState::Open) => {
                state[event.run] = RunState::Closed;
                depth -= 1;
            }
            // Zero-height run: it closes before it opens
            (Edge::End, RunState::Pending) => {
                state[event.run] = RunState::Closed;
                line.push(event.run);
            }
            _ => continue,
        }
        if event.edge == Edge::End && depth == 0 {
            lines.push(std::mem::take(&mut line));
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    for line in &mut lines {
        line.sort_by(|&a, &b| match runs[a].rect.x.total_cmp(&runs[b].rect.x) {
            Ordering::Equal => a.cmp(&b),
            other => other,
        });
    }
    lines
}
