//! rota generate command implementation
//!
//! Runs the occurrence engine alone: expand active templates over the
//! horizon, merge sticky fields, replace the store. The projections are
//! re-read lazily by `rota today` / `rota calendar`.

use serde::Serialize;

use crate::engine;
use crate::error::Result;
use crate::occurrence::OccurrenceStore;
use crate::output::{emit_success, HumanOutput};
use crate::template::TemplateSource;

use super::Context;

#[derive(Serialize)]
struct GenerateReport {
    templates: usize,
    occurrences: usize,
    months_ahead: u32,
}

pub fn run(ctx: &Context) -> Result<()> {
    ctx.storage.ensure_initialized()?;

    let source = TemplateSource::new(ctx.storage.clone());
    let store = OccurrenceStore::new(ctx.storage.clone());
    let months_ahead = ctx.config.schedule.clamped_months_ahead();

    let templates = source.list_active()?.len();
    let occurrences = engine::regenerate(&source, &store, ctx.today, months_ahead)?;

    let report = GenerateReport {
        templates,
        occurrences,
        months_ahead,
    };

    let mut human = HumanOutput::new("rota generate: occurrence store rebuilt");
    human.push_summary("active templates", templates.to_string());
    human.push_summary("occurrences", occurrences.to_string());
    human.push_summary("horizon", format!("{months_ahead} month(s)"));
    human.push_next_step("rota today");
    human.push_next_step("rota calendar");

    emit_success(ctx.options, "generate", &report, Some(&human))
}
