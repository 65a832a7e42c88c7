//! rota sync command implementation
//!
//! Delivers one external change event to the sync controller. The event
//! carries only a location (surface + row/col ranges); the controller
//! decides which pipeline to run, if any. Out-of-scope events succeed
//! with nothing done.

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::sync::{route, CellRange, ChangeEvent, Pipeline, Surface};

use super::Context;

pub fn run(
    ctx: &Context,
    surface: Surface,
    rows: &str,
    cols: &str,
    row: Option<usize>,
    person: Option<String>,
    done: Option<bool>,
) -> Result<()> {
    ctx.storage.ensure_initialized()?;

    let event = ChangeEvent {
        surface,
        rows: parse_range(rows)?,
        cols: parse_range(cols)?,
    };

    let controller = ctx.controller();
    let edit = match (route(&event), row) {
        (Pipeline::BackwardEdit, Some(row)) => {
            controller.edit_for_row(row, person, done, ctx.today)?
        }
        _ => None,
    };

    let outcome = controller.handle(&event, edit.as_ref(), ctx.today)?;

    let mut human = HumanOutput::new(match outcome.pipeline {
        Pipeline::Regenerate => "rota sync: template change, full pipeline run",
        Pipeline::BackwardEdit => "rota sync: today-view edit applied",
        Pipeline::RebuildGrid => "rota sync: calendar rebuilt",
        Pipeline::Ignored => "rota sync: event out of scope, ignored",
    });
    if let Some(count) = outcome.occurrences {
        human.push_summary("occurrences", count.to_string());
    }
    if let Some(rows) = &outcome.today {
        human.push_summary("due today", rows.len().to_string());
    }

    emit_success(ctx.options, "sync", &outcome, Some(&human))
}

/// Parse a 1-based inclusive range: "4" or "2..10"
fn parse_range(text: &str) -> Result<CellRange> {
    let invalid = || Error::InvalidArgument(format!("invalid range {text:?} (expected N or A..B)"));

    let trimmed = text.trim();
    if let Some((start, end)) = trimmed.split_once("..") {
        let start: u32 = start.trim().parse().map_err(|_| invalid())?;
        let end: u32 = end.trim().parse().map_err(|_| invalid())?;
        if start == 0 || end < start {
            return Err(invalid());
        }
        Ok(CellRange { start, end })
    } else {
        let index: u32 = trimmed.parse().map_err(|_| invalid())?;
        if index == 0 {
            return Err(invalid());
        }
        Ok(CellRange::single(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_and_span_ranges() {
        assert_eq!(parse_range("4").unwrap(), CellRange::single(4));
        assert_eq!(
            parse_range("2..10").unwrap(),
            CellRange { start: 2, end: 10 }
        );
    }

    #[test]
    fn parse_rejects_bad_ranges() {
        assert!(parse_range("0").is_err());
        assert!(parse_range("5..2").is_err());
        assert!(parse_range("abc").is_err());
        assert!(parse_range("").is_err());
    }
}
