//! rota init command implementation
//!
//! Creates the initial config file and data directory.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

use super::Context;

#[derive(serde::Serialize)]
struct InitReport {
    dir: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    data_dir: bool,
}

pub fn run(ctx: &Context) -> Result<()> {
    let created_data_dir = !ctx.storage.is_initialized();
    ctx.storage.init()?;

    let config_path = ctx.storage.config_file();
    let created_config = if config_path.exists() {
        if !config_path.is_file() {
            return Err(Error::OperationFailed(format!(
                ".rota.toml exists but is not a file: {}",
                config_path.display()
            )));
        }
        false
    } else {
        Config::default().save(&config_path)?;
        true
    };

    let report = InitReport {
        dir: ctx.storage.root().to_path_buf(),
        created: InitCreated {
            config: created_config,
            data_dir: created_data_dir,
        },
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(".rota.toml");
    }
    if created_data_dir {
        created_items.push(".rota/");
    }

    let header = if created_items.is_empty() {
        "rota init: nothing to do".to_string()
    } else {
        "rota init: initialized".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("dir", ctx.storage.root().display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("rota template add <name> --start <DD.MM.YYYY> --every <days>");
    human.push_next_step("rota generate");

    emit_success(ctx.options, "init", &report, Some(&human))?;

    Ok(())
}
