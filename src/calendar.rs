//! Calendar grid builder.
//!
//! Lays a month out as week rows of seven cells (Sunday-first, matching the
//! weekday order of the original sheet), padded with empty cells before day
//! 1. Each week carries "task sub-rows": every cell's slot list is padded to
//! the maximum occurrence count across that week so columns align when
//! rendered. The builder is a pure function of the store plus `(year,
//! month, today)` and never mutates anything; the grid is transient and
//! rebuilt on demand.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dates;
use crate::error::{Error, Result};
use crate::occurrence::Occurrence;
use crate::person::DEFAULT_PERSON_COLOR;
use crate::storage::Storage;

const CALENDAR_SCHEMA_VERSION: &str = "rota.calendar.v1";

pub const WEEKDAY_HEADERS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Status of one occurrence relative to `today`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OccurrenceStatus {
    TodayDone,
    TodayPending,
    Overdue,
    PastDone,
    Future,
}

/// Classify an occurrence for cell styling
pub fn classify(due_date: NaiveDate, done: bool, today: NaiveDate) -> OccurrenceStatus {
    if due_date == today {
        if done {
            OccurrenceStatus::TodayDone
        } else {
            OccurrenceStatus::TodayPending
        }
    } else if due_date < today {
        if done {
            OccurrenceStatus::PastDone
        } else {
            // flagged regardless of how far past
            OccurrenceStatus::Overdue
        }
    } else {
        OccurrenceStatus::Future
    }
}

/// One occurrence summary inside a calendar cell
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CellSlot {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    pub color: String,
    pub person_color: String,
    pub status: OccurrenceStatus,
}

/// One cell of the 7-column grid. `date` is `None` for padding cells before
/// day 1. `slots` is padded to the week's sub-row count; `None` slots are
/// empty alignment fillers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarCell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_display: Option<String>,
    pub is_today: bool,
    pub slots: Vec<Option<CellSlot>>,
}

impl CalendarCell {
    fn empty() -> Self {
        Self {
            date: None,
            date_display: None,
            is_today: false,
            slots: Vec::new(),
        }
    }

    /// Occupied slots only (padding stripped)
    pub fn occurrences(&self) -> impl Iterator<Item = &CellSlot> {
        self.slots.iter().flatten()
    }
}

/// A week row: seven cells plus the shared sub-row count
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarWeek {
    pub cells: Vec<CalendarCell>,
    pub sub_rows: usize,
}

/// A fully laid-out month
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub today: NaiveDate,
    pub weeks: Vec<CalendarWeek>,
}

/// Build the grid for one month.
///
/// Same store contents + same `(year, month, today)` always produce an
/// identical grid.
pub fn build_month(
    occurrences: &[Occurrence],
    person_colors: &HashMap<String, String>,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        Error::InvalidArgument(format!("invalid year/month: {year}-{month:02}"))
    })?;
    let days_in_month = days_in_month(year, month);
    let first_weekday = first.weekday().num_days_from_sunday() as usize;

    // Only active occurrences reach the grid. Engine output is all-active,
    // but a hand-edited store should still render consistently.
    let active: Vec<&Occurrence> = occurrences.iter().filter(|occ| occ.active).collect();

    let mut weeks = Vec::new();
    let mut cells: Vec<CalendarCell> = (0..first_weekday).map(|_| CalendarCell::empty()).collect();

    for day in 1..=days_in_month {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid day of month");
        let slots: Vec<Option<CellSlot>> = active
            .iter()
            .filter(|occ| occ.due_date == date)
            .map(|occ| Some(slot_for(occ, person_colors, today)))
            .collect();

        cells.push(CalendarCell {
            date: Some(date),
            date_display: Some(dates::format_display(date)),
            is_today: date == today,
            slots,
        });

        if cells.len() == 7 {
            weeks.push(close_week(std::mem::take(&mut cells)));
        }
    }

    if !cells.is_empty() {
        cells.resize_with(7, CalendarCell::empty);
        weeks.push(close_week(cells));
    }

    Ok(MonthGrid {
        year,
        month,
        today,
        weeks,
    })
}

fn slot_for(
    occurrence: &Occurrence,
    person_colors: &HashMap<String, String>,
    today: NaiveDate,
) -> CellSlot {
    let person = if occurrence.person.is_empty() {
        None
    } else {
        Some(occurrence.person.clone())
    };
    let person_color = person
        .as_deref()
        .and_then(|name| person_colors.get(name).cloned())
        .unwrap_or_else(|| DEFAULT_PERSON_COLOR.to_string());

    CellSlot {
        name: occurrence.name.clone(),
        person,
        color: occurrence.color.clone(),
        person_color,
        status: classify(occurrence.due_date, occurrence.done, today),
    }
}

/// Pad every cell's slots to the week maximum so columns align
fn close_week(mut cells: Vec<CalendarCell>) -> CalendarWeek {
    let sub_rows = cells.iter().map(|cell| cell.slots.len()).max().unwrap_or(0);
    for cell in &mut cells {
        cell.slots.resize(sub_rows, None);
    }
    CalendarWeek { cells, sub_rows }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|date| date.pred_opt())
        .map(|date| date.day())
        .unwrap_or(31)
}

// =============================================================================
// Persisted year/month selector
// =============================================================================

/// The grid's persisted year/month selector (the original sheet's B1/B2)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarSelector {
    pub year: i32,
    pub month: u32,
}

impl CalendarSelector {
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(Error::InvalidArgument(format!(
                "month must be 1-12, got {}",
                self.month
            )));
        }
        if NaiveDate::from_ymd_opt(self.year, self.month, 1).is_none() {
            return Err(Error::InvalidArgument(format!(
                "invalid year/month: {}-{:02}",
                self.year, self.month
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SelectorFile {
    schema_version: String,
    selector: CalendarSelector,
}

/// Load the persisted selector, defaulting to today's month
pub fn load_selector(storage: &Storage, today: NaiveDate) -> Result<CalendarSelector> {
    let path = storage.calendar_file();
    if !path.exists() {
        return Ok(CalendarSelector {
            year: today.year(),
            month: today.month(),
        });
    }
    let file: SelectorFile = storage.read_json(&path)?;
    Ok(file.selector)
}

/// Persist the selector
pub fn store_selector(storage: &Storage, selector: CalendarSelector) -> Result<()> {
    selector.validate()?;
    storage.write_json(
        &storage.calendar_file(),
        &SelectorFile {
            schema_version: CALENDAR_SCHEMA_VERSION.to_string(),
            selector,
        },
    )
}
