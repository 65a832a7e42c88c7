//! rota person commands

use serde::Serialize;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::person::{Person, PersonDirectory};

use super::{Context, PersonCommands};

#[derive(Serialize)]
struct PersonReport {
    person: Person,
}

#[derive(Serialize)]
struct PersonListReport {
    persons: Vec<Person>,
}

pub fn run(ctx: &Context, command: PersonCommands) -> Result<()> {
    ctx.storage.ensure_initialized()?;
    let directory = PersonDirectory::new(ctx.storage.clone());

    match command {
        PersonCommands::Set { name, color } => {
            let person = directory.set(&name, &color)?;

            let mut human = HumanOutput::new(format!("rota person set: {}", person.name));
            human.push_summary("color", person.color.clone());

            let report = PersonReport { person };
            emit_success(ctx.options, "person set", &report, Some(&human))
        }
        PersonCommands::List => {
            let persons = directory.list()?;

            let mut human =
                HumanOutput::new(format!("rota person list: {} person(s)", persons.len()));
            for person in &persons {
                human.push_detail(format!("{} - {}", person.name, person.color));
            }

            let report = PersonListReport { persons };
            emit_success(ctx.options, "person list", &report, Some(&human))
        }
    }
}
