//! Daily projector.
//!
//! Forward: derive the "due today" view from the store (filter active
//! occurrences due today, sort by name, format dates as `DD.MM.YYYY`).
//!
//! Backward: apply a single edited view row back into the store. The view
//! does not carry the occurrence's `task_id`, so the row is matched by
//! `(name, due_date)`; when two active templates produce same-named
//! occurrences due the same day, the first match in store order wins. Known
//! limitation, kept rather than papered over with a guessed tie-break.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::dates;
use crate::error::Result;
use crate::occurrence::{Occurrence, OccurrenceKey, OccurrenceStore};

/// Per-row styling status for the today view
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Done,
    Pending,
}

/// One rendered row of the today view
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TodayRow {
    pub date_display: String,
    pub name: String,
    pub person: String,
    pub done: bool,
    pub status: RowStatus,
}

/// Forward projection: store contents → today rows.
///
/// Pure function; performs no mutation. Rows are sorted ascending by name
/// with `task_id` as the tie-break so name collisions still order
/// deterministically.
pub fn project(occurrences: &[Occurrence], today: NaiveDate) -> Vec<TodayRow> {
    let mut due: Vec<&Occurrence> = occurrences
        .iter()
        .filter(|occ| occ.active && occ.due_date == today)
        .collect();
    due.sort_by(|left, right| {
        left.name
            .cmp(&right.name)
            .then_with(|| left.task_id.cmp(&right.task_id))
    });

    due.into_iter()
        .map(|occ| TodayRow {
            date_display: dates::format_display(occ.due_date),
            name: occ.name.clone(),
            person: occ.person.clone(),
            done: occ.done,
            status: if occ.done {
                RowStatus::Done
            } else {
                RowStatus::Pending
            },
        })
        .collect()
}

/// An edit made on the rendered view, as presented: the row's date and name
/// identify the occurrence; `None` fields were not touched.
#[derive(Debug, Clone)]
pub struct RowEdit {
    pub due_date: NaiveDate,
    pub name: String,
    pub person: Option<String>,
    pub done: Option<bool>,
}

/// Outcome of a backward edit
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum EditOutcome {
    /// Sticky fields were updated on the matched occurrence
    Applied { task_id: String },
    /// The row matched but nothing differed; store untouched
    Unchanged { task_id: String },
    /// No occurrence matches the row; edit dropped, store untouched
    Dropped,
}

/// Backward projection: apply one view-row edit to the store.
///
/// Only `person` and `done` can change this way, and only the fields that
/// actually differ are written. A row with no matching occurrence is a
/// logged no-op — view edits never fabricate occurrences.
pub fn apply_row_edit(store: &OccurrenceStore, edit: &RowEdit) -> Result<EditOutcome> {
    let name = edit.name.trim();
    let matched = store
        .read_all()?
        .into_iter()
        .find(|occ| occ.due_date == edit.due_date && occ.name.trim() == name);

    let Some(occurrence) = matched else {
        warn!(
            date = %edit.due_date,
            name = %edit.name,
            "backward edit matches no occurrence; dropping"
        );
        return Ok(EditOutcome::Dropped);
    };

    let person = edit
        .person
        .as_ref()
        .filter(|person| **person != occurrence.person)
        .cloned();
    let done = edit.done.filter(|done| *done != occurrence.done);

    if person.is_none() && done.is_none() {
        return Ok(EditOutcome::Unchanged {
            task_id: occurrence.task_id,
        });
    }

    let key = OccurrenceKey::new(occurrence.task_id.clone(), occurrence.due_date);
    store.update_fields(&key, person, done)?;
    Ok(EditOutcome::Applied {
        task_id: occurrence.task_id,
    })
}
