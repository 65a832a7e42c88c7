//! rota today commands
//!
//! `rota today` renders the forward projection. `rota today set` pushes a
//! single-row edit back into the store through the backward projector, then
//! re-renders both views, the same path a today-view change event takes.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::render;
use crate::today::{EditOutcome, TodayRow};

use super::{Context, TodayCommands};

#[derive(Serialize)]
struct TodayReport {
    date_display: String,
    rows: Vec<TodayRow>,
}

#[derive(Serialize)]
struct TodayEditReport {
    edit: EditOutcome,
    rows: Vec<TodayRow>,
}

pub fn run(ctx: &Context, command: Option<TodayCommands>) -> Result<()> {
    ctx.storage.ensure_initialized()?;

    match command {
        None => show(ctx),
        Some(TodayCommands::Set { row, person, done }) => set(ctx, row, person, done),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let rows = ctx.controller().project_today(ctx.today)?;

    let mut human = HumanOutput::new(format!(
        "rota today: {} task(s) due {}",
        rows.len(),
        crate::dates::format_display(ctx.today)
    ));
    for line in render::today_lines(&rows) {
        human.push_detail(line);
    }
    if rows.iter().any(|row| !row.done) {
        human.push_next_step("rota today set <row> --done true");
    }

    let report = TodayReport {
        date_display: crate::dates::format_display(ctx.today),
        rows,
    };
    emit_success(ctx.options, "today", &report, Some(&human))
}

fn set(ctx: &Context, row: usize, person: Option<String>, done: Option<bool>) -> Result<()> {
    if person.is_none() && done.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to change: pass --person and/or --done".to_string(),
        ));
    }

    let controller = ctx.controller();
    let outcome = match controller.edit_for_row(row, person, done, ctx.today)? {
        Some(edit) => controller.run_backward_edit(&edit, ctx.today)?,
        None => {
            return Err(Error::InvalidArgument(format!(
                "row {row} is not on the today view"
            )))
        }
    };

    let edit = outcome.edit.unwrap_or(EditOutcome::Dropped);
    let rows = outcome.today.unwrap_or_default();

    let mut human = HumanOutput::new(match &edit {
        EditOutcome::Applied { task_id } => format!("rota today set: updated {task_id}"),
        EditOutcome::Unchanged { task_id } => {
            format!("rota today set: {task_id} already up to date")
        }
        EditOutcome::Dropped => "rota today set: no matching occurrence, edit dropped".to_string(),
    });
    if matches!(edit, EditOutcome::Dropped) {
        human.push_warning("the row no longer matches the store; re-run rota today");
    }
    for line in render::today_lines(&rows) {
        human.push_detail(line);
    }

    let report = TodayEditReport { edit, rows };
    emit_success(ctx.options, "today set", &report, Some(&human))
}
