//! rota template commands
//!
//! Every mutation of the template source runs the full template pipeline
//! afterwards (engine, then both projections), the same path a template
//! change event takes through the sync controller.

use serde::Serialize;

use crate::dates;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::template::{TaskTemplate, TemplatePatch, TemplateSource};

use super::{Context, TemplateCommands};

#[derive(Serialize)]
struct TemplateReport {
    template: TaskTemplate,
    occurrences: usize,
    due_today: usize,
}

#[derive(Serialize)]
struct TemplateListReport {
    templates: Vec<TaskTemplate>,
}

pub fn run(ctx: &Context, command: TemplateCommands) -> Result<()> {
    ctx.storage.ensure_initialized()?;
    let source = TemplateSource::new(ctx.storage.clone());

    match command {
        TemplateCommands::Add {
            name,
            start,
            every,
            color,
            id,
        } => {
            let start = dates::parse_display(&start)?;
            let template = source.add(id, name, start, every, color)?;
            finish(ctx, "template add", template)
        }
        TemplateCommands::List => list(ctx, &source),
        TemplateCommands::Set {
            id,
            name,
            start,
            every,
            color,
        } => {
            let start = start.as_deref().map(dates::parse_display).transpose()?;
            let template = source.update(
                &id,
                TemplatePatch {
                    name,
                    start_date: start,
                    interval_days: every,
                    color,
                },
            )?;
            finish(ctx, "template set", template)
        }
        TemplateCommands::Enable { id } => {
            let template = source.set_active(&id, true)?;
            finish(ctx, "template enable", template)
        }
        TemplateCommands::Disable { id } => {
            let template = source.set_active(&id, false)?;
            finish(ctx, "template disable", template)
        }
    }
}

/// Run the template pipeline and report the refreshed projections
fn finish(ctx: &Context, command: &str, template: TaskTemplate) -> Result<()> {
    let outcome = ctx.controller().run_regenerate(ctx.today)?;
    let occurrences = outcome.occurrences.unwrap_or(0);
    let due_today = outcome.today.as_ref().map(Vec::len).unwrap_or(0);

    let report = TemplateReport {
        template: template.clone(),
        occurrences,
        due_today,
    };

    let mut human = HumanOutput::new(format!("rota {command}: {}", template.name));
    human.push_summary("id", template.id.clone());
    human.push_summary("active", template.active.to_string());
    human.push_summary(
        "schedule",
        format!(
            "every {} day(s) from {}",
            template.interval_days,
            dates::format_display(template.start_date)
        ),
    );
    human.push_summary("occurrences", occurrences.to_string());
    human.push_summary("due today", due_today.to_string());
    human.push_next_step("rota today".to_string());
    human.push_next_step("rota calendar".to_string());

    emit_success(ctx.options, command, &report, Some(&human))
}

fn list(ctx: &Context, source: &TemplateSource) -> Result<()> {
    let templates = source.list()?;

    let mut human = HumanOutput::new(format!("rota template list: {} template(s)", templates.len()));
    for template in &templates {
        let state = if template.active { "active" } else { "inactive" };
        human.push_detail(format!(
            "{} - {} - every {} day(s) from {} [{state}]",
            template.id,
            template.name,
            template.interval_days,
            dates::format_display(template.start_date),
        ));
    }
    if templates.is_empty() {
        human.push_next_step("rota template add <name> --start <DD.MM.YYYY> --every <days>");
    }

    let report = TemplateListReport { templates };
    emit_success(ctx.options, "template list", &report, Some(&human))
}
