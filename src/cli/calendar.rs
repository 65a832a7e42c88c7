//! rota calendar commands
//!
//! `rota calendar` builds the month grid for the persisted year/month
//! selector (or explicit `--year`/`--month` overrides, which do not touch
//! the selector). `rota calendar select` persists a new selector first,
//! the grid-only pipeline of the sync controller.

use serde::Serialize;

use crate::calendar::{store_selector, CalendarSelector, MonthGrid};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::render;

use super::{CalendarCommands, Context};

#[derive(Serialize)]
struct CalendarReport {
    grid: MonthGrid,
}

pub fn run(
    ctx: &Context,
    year: Option<i32>,
    month: Option<u32>,
    command: Option<CalendarCommands>,
) -> Result<()> {
    ctx.storage.ensure_initialized()?;

    let grid = match command {
        Some(CalendarCommands::Select { year, month }) => {
            store_selector(&ctx.storage, CalendarSelector { year, month })?;
            ctx.controller().build_grid_for(None, None, ctx.today)?
        }
        None => ctx.controller().build_grid_for(year, month, ctx.today)?,
    };

    let mut human = HumanOutput::new(format!(
        "rota calendar: {}-{:02}",
        grid.year, grid.month
    ));
    for line in render::grid_lines(&grid) {
        human.push_detail(line);
    }

    let report = CalendarReport { grid };
    emit_success(ctx.options, "calendar", &report, Some(&human))
}
