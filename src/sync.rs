//! Sync controller.
//!
//! Maps an external change event, by its location alone, onto one of three
//! deterministic pipelines and runs it to completion:
//!
//! - template-source data edit  => engine -> today (forward) -> grid
//! - today-view sticky-cell edit => today (backward) -> today (forward) -> grid
//! - calendar selector edit      => grid only
//!
//! Anything else is out of scope and ignored without side effects. Every
//! pipeline is idempotent: re-running with unchanged inputs reproduces the
//! same store and views.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calendar::{self, MonthGrid};
use crate::config::Config;
use crate::engine;
use crate::error::Result;
use crate::occurrence::OccurrenceStore;
use crate::person::PersonDirectory;
use crate::storage::Storage;
use crate::template::TemplateSource;
use crate::today::{self, EditOutcome, RowEdit, TodayRow};

// Mapped regions, mirroring the original sheet layout: template data starts
// at row 2 across columns 1..=7; today's editable cells are Person/Done
// (columns 3..=4) from row 4 down; the calendar selector is rows 1-2 of
// column 2.
const TEMPLATE_DATA_FIRST_ROW: u32 = 2;
const TEMPLATE_DATA_COLS: (u32, u32) = (1, 7);
const TODAY_DATA_FIRST_ROW: u32 = 4;
const TODAY_STICKY_COLS: (u32, u32) = (3, 4);
const CALENDAR_SELECTOR_ROWS: (u32, u32) = (1, 2);
const CALENDAR_SELECTOR_COL: u32 = 2;

/// The surface a change event originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Templates,
    Today,
    Calendar,
}

/// Inclusive 1-based cell range along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub start: u32,
    pub end: u32,
}

impl CellRange {
    pub fn single(index: u32) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    fn intersects(&self, start: u32, end: u32) -> bool {
        self.start <= end && self.end >= start
    }
}

/// A change-event location delivered by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub surface: Surface,
    pub rows: CellRange,
    pub cols: CellRange,
}

/// The pipeline a change event maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    /// Engine -> forward projector -> grid builder
    Regenerate,
    /// Backward projector (one row) -> forward projector -> grid builder
    BackwardEdit,
    /// Grid builder only
    RebuildGrid,
    /// Out-of-scope event; nothing runs
    Ignored,
}

/// Decide which pipeline a change event triggers. Pure routing, no I/O.
pub fn route(event: &ChangeEvent) -> Pipeline {
    match event.surface {
        Surface::Templates => {
            // any edit (single cell, multi-cell, paste) intersecting the data region
            if event.rows.end >= TEMPLATE_DATA_FIRST_ROW
                && event.cols.intersects(TEMPLATE_DATA_COLS.0, TEMPLATE_DATA_COLS.1)
            {
                Pipeline::Regenerate
            } else {
                Pipeline::Ignored
            }
        }
        Surface::Today => {
            // single-cell edits to the sticky columns only
            if event.rows.is_single()
                && event.cols.is_single()
                && event.rows.start >= TODAY_DATA_FIRST_ROW
                && event.cols.intersects(TODAY_STICKY_COLS.0, TODAY_STICKY_COLS.1)
            {
                Pipeline::BackwardEdit
            } else {
                Pipeline::Ignored
            }
        }
        Surface::Calendar => {
            if event.rows.is_single()
                && event.cols.is_single()
                && event
                    .rows
                    .intersects(CALENDAR_SELECTOR_ROWS.0, CALENDAR_SELECTOR_ROWS.1)
                && event.cols.start == CALENDAR_SELECTOR_COL
            {
                Pipeline::RebuildGrid
            } else {
                Pipeline::Ignored
            }
        }
    }
}

/// Result of running (or skipping) a pipeline
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub pipeline: Pipeline,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<Vec<TodayRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<MonthGrid>,
}

impl SyncOutcome {
    fn ignored() -> Self {
        Self {
            pipeline: Pipeline::Ignored,
            occurrences: None,
            edit: None,
            today: None,
            grid: None,
        }
    }
}

/// Orchestrates pipeline runs over live storage
#[derive(Debug, Clone)]
pub struct SyncController {
    storage: Storage,
    config: Config,
}

impl SyncController {
    pub fn new(storage: Storage, config: Config) -> Self {
        Self { storage, config }
    }

    fn templates(&self) -> TemplateSource {
        TemplateSource::new(self.storage.clone())
    }

    fn store(&self) -> OccurrenceStore {
        OccurrenceStore::new(self.storage.clone())
    }

    fn persons(&self) -> PersonDirectory {
        PersonDirectory::new(self.storage.clone())
    }

    /// Template pipeline: engine -> forward projection -> grid
    pub fn run_regenerate(&self, today: NaiveDate) -> Result<SyncOutcome> {
        let store = self.store();
        let count = engine::regenerate(
            &self.templates(),
            &store,
            today,
            self.config.schedule.clamped_months_ahead(),
        )?;
        info!(occurrences = count, "occurrence store regenerated");

        let occurrences = store.read_all()?;
        let rows = today::project(&occurrences, today);
        let grid = self.build_grid(today)?;

        Ok(SyncOutcome {
            pipeline: Pipeline::Regenerate,
            occurrences: Some(count),
            edit: None,
            today: Some(rows),
            grid: Some(grid),
        })
    }

    /// Backward pipeline: apply one view-row edit, then re-project both views
    pub fn run_backward_edit(&self, edit: &RowEdit, today: NaiveDate) -> Result<SyncOutcome> {
        let store = self.store();
        let outcome = today::apply_row_edit(&store, edit)?;

        let occurrences = store.read_all()?;
        let rows = today::project(&occurrences, today);
        let grid = self.build_grid(today)?;

        Ok(SyncOutcome {
            pipeline: Pipeline::BackwardEdit,
            occurrences: None,
            edit: Some(outcome),
            today: Some(rows),
            grid: Some(grid),
        })
    }

    /// Grid-only pipeline; the store is untouched
    pub fn run_rebuild_grid(&self, today: NaiveDate) -> Result<SyncOutcome> {
        let grid = self.build_grid(today)?;
        Ok(SyncOutcome {
            pipeline: Pipeline::RebuildGrid,
            occurrences: None,
            edit: None,
            today: None,
            grid: Some(grid),
        })
    }

    /// Forward projection of the current store
    pub fn project_today(&self, today: NaiveDate) -> Result<Vec<TodayRow>> {
        let occurrences = self.store().read_all()?;
        Ok(today::project(&occurrences, today))
    }

    /// Build the grid for the persisted (or given) selector
    pub fn build_grid_for(
        &self,
        year: Option<i32>,
        month: Option<u32>,
        today: NaiveDate,
    ) -> Result<MonthGrid> {
        let selector = calendar::load_selector(&self.storage, today)?;
        let year = year.unwrap_or(selector.year);
        let month = month.unwrap_or(selector.month);
        let occurrences = self.store().read_all()?;
        calendar::build_month(&occurrences, &self.persons().colors()?, year, month, today)
    }

    fn build_grid(&self, today: NaiveDate) -> Result<MonthGrid> {
        self.build_grid_for(None, None, today)
    }

    /// Resolve a 1-based row number of the current today view into a
    /// `RowEdit`. The date text round-trips through the display format,
    /// the same normalization the presentation surface would apply.
    pub fn edit_for_row(
        &self,
        row: usize,
        person: Option<String>,
        done: Option<bool>,
        today: NaiveDate,
    ) -> Result<Option<RowEdit>> {
        let rows = self.project_today(today)?;
        let Some(view_row) = row.checked_sub(1).and_then(|idx| rows.get(idx)) else {
            return Ok(None);
        };
        Ok(Some(RowEdit {
            due_date: crate::dates::parse_display(&view_row.date_display)?,
            name: view_row.name.clone(),
            person,
            done,
        }))
    }

    /// Handle one external change event end to end.
    ///
    /// For a `BackwardEdit` pipeline the host supplies the edited row's
    /// content alongside the location; without it there is nothing to apply
    /// and the event degrades to a no-op.
    pub fn handle(
        &self,
        event: &ChangeEvent,
        edit: Option<&RowEdit>,
        today: NaiveDate,
    ) -> Result<SyncOutcome> {
        let pipeline = route(event);
        debug!(surface = ?event.surface, pipeline = ?pipeline, "routing change event");
        match pipeline {
            Pipeline::Regenerate => self.run_regenerate(today),
            Pipeline::BackwardEdit => match edit {
                Some(edit) => self.run_backward_edit(edit, today),
                None => Ok(SyncOutcome::ignored()),
            },
            Pipeline::RebuildGrid => self.run_rebuild_grid(today),
            Pipeline::Ignored => Ok(SyncOutcome::ignored()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(surface: Surface, rows: (u32, u32), cols: (u32, u32)) -> ChangeEvent {
        ChangeEvent {
            surface,
            rows: CellRange {
                start: rows.0,
                end: rows.1,
            },
            cols: CellRange {
                start: cols.0,
                end: cols.1,
            },
        }
    }

    #[test]
    fn template_data_edits_trigger_regenerate() {
        // single cell inside the data region
        assert_eq!(
            route(&event(Surface::Templates, (2, 2), (3, 3))),
            Pipeline::Regenerate
        );
        // multi-row paste intersecting the region
        assert_eq!(
            route(&event(Surface::Templates, (1, 10), (1, 7))),
            Pipeline::Regenerate
        );
    }

    #[test]
    fn template_header_edit_is_ignored() {
        assert_eq!(
            route(&event(Surface::Templates, (1, 1), (1, 7))),
            Pipeline::Ignored
        );
        // off to the right of the data columns
        assert_eq!(
            route(&event(Surface::Templates, (2, 2), (8, 9))),
            Pipeline::Ignored
        );
    }

    #[test]
    fn today_sticky_cell_edit_triggers_backward() {
        assert_eq!(
            route(&event(Surface::Today, (4, 4), (3, 3))),
            Pipeline::BackwardEdit
        );
        assert_eq!(
            route(&event(Surface::Today, (9, 9), (4, 4))),
            Pipeline::BackwardEdit
        );
    }

    #[test]
    fn today_multi_cell_or_out_of_region_is_ignored() {
        // multi-cell edits are tolerated but do nothing
        assert_eq!(
            route(&event(Surface::Today, (4, 6), (3, 4))),
            Pipeline::Ignored
        );
        // date/name columns are not editable through the view
        assert_eq!(
            route(&event(Surface::Today, (4, 4), (1, 1))),
            Pipeline::Ignored
        );
        // header rows
        assert_eq!(
            route(&event(Surface::Today, (3, 3), (4, 4))),
            Pipeline::Ignored
        );
    }

    #[test]
    fn calendar_selector_edit_triggers_grid_only() {
        assert_eq!(
            route(&event(Surface::Calendar, (1, 1), (2, 2))),
            Pipeline::RebuildGrid
        );
        assert_eq!(
            route(&event(Surface::Calendar, (2, 2), (2, 2))),
            Pipeline::RebuildGrid
        );
        assert_eq!(
            route(&event(Surface::Calendar, (5, 5), (2, 2))),
            Pipeline::Ignored
        );
        assert_eq!(
            route(&event(Surface::Calendar, (1, 1), (1, 1))),
            Pipeline::Ignored
        );
    }
}
