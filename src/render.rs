//! Plain-text rendering of the two projections.
//!
//! The original surfaces styled cells (backgrounds, bold borders, rich
//! text); here the same classifications map to text markers: `!` for
//! anything demanding attention (due today and pending, or overdue), `+`
//! for completed-today, and a `*`-wrapped day number for today's column.
//! JSON output carries the full structured grid instead.

use crate::calendar::{CalendarCell, MonthGrid, OccurrenceStatus, WEEKDAY_HEADERS};
use crate::today::TodayRow;

/// Width of one calendar column in characters
const COL_WIDTH: usize = 14;

fn status_marker(status: OccurrenceStatus) -> &'static str {
    match status {
        OccurrenceStatus::TodayPending | OccurrenceStatus::Overdue => "!",
        OccurrenceStatus::TodayDone => "+",
        OccurrenceStatus::PastDone | OccurrenceStatus::Future => "",
    }
}

/// Render the today view as aligned text rows
pub fn today_lines(rows: &[TodayRow]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["nothing due today".to_string()];
    }

    rows.iter()
        .map(|row| {
            let done = if row.done { "[x]" } else { "[ ]" };
            let person = if row.person.is_empty() {
                "(unassigned)".to_string()
            } else {
                row.person.clone()
            };
            format!("{} {} {} - {}", done, row.date_display, row.name, person)
        })
        .collect()
}

/// Render a month grid as text lines: weekday header, then per week a day
/// row followed by one line per task sub-row.
pub fn grid_lines(grid: &MonthGrid) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("{}-{:02}", grid.year, grid.month));
    lines.push(
        WEEKDAY_HEADERS
            .iter()
            .map(|day| pad(day))
            .collect::<Vec<_>>()
            .join(""),
    );

    for week in &grid.weeks {
        lines.push(
            week.cells
                .iter()
                .map(|cell| pad(&day_label(cell)))
                .collect::<Vec<_>>()
                .join(""),
        );

        for sub_row in 0..week.sub_rows {
            lines.push(
                week.cells
                    .iter()
                    .map(|cell| pad(&slot_label(cell, sub_row)))
                    .collect::<Vec<_>>()
                    .join(""),
            );
        }
    }

    lines
}

fn day_label(cell: &CalendarCell) -> String {
    match cell.date {
        Some(date) => {
            use chrono::Datelike;
            if cell.is_today {
                format!("*{:02}*", date.day())
            } else {
                format!("{:02}", date.day())
            }
        }
        None => String::new(),
    }
}

fn slot_label(cell: &CalendarCell, sub_row: usize) -> String {
    match cell.slots.get(sub_row).and_then(|slot| slot.as_ref()) {
        Some(slot) => {
            let mut label = format!("{}{}", slot.name, status_marker(slot.status));
            if let Some(person) = &slot.person {
                label.push_str(&format!(" ({person})"));
            }
            label
        }
        None => String::new(),
    }
}

fn pad(text: &str) -> String {
    let mut truncated: String = text.chars().take(COL_WIDTH - 1).collect();
    while truncated.chars().count() < COL_WIDTH {
        truncated.push(' ');
    }
    truncated
}
