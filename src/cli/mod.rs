//! Command-line interface for rota
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::dates;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::storage::Storage;
use crate::sync::{Surface, SyncController};

mod calendar;
mod generate;
mod init;
mod person;
mod sync;
mod template;
mod today;

/// rota - Recurring-Task Rota
///
/// Expands recurring task templates into dated occurrences and keeps a
/// "due today" list and a month calendar in sync with them.
#[derive(Parser, Debug)]
#[command(name = "rota")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Working directory holding .rota.toml and .rota/ (defaults to cwd)
    #[arg(long, global = true, env = "ROTA_DIR")]
    pub dir: Option<PathBuf>,

    /// Override the reference date, DD.MM.YYYY (defaults to the system clock)
    #[arg(long, global = true, env = "ROTA_TODAY")]
    pub today: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize rota in a directory
    Init,

    /// Manage recurring task templates
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Regenerate the occurrence store from the templates
    Generate,

    /// Show the "due today" list, or push an edit back into the store
    Today {
        #[command(subcommand)]
        command: Option<TodayCommands>,
    },

    /// Build the month calendar grid
    Calendar {
        /// Year to render (defaults to the persisted selector)
        #[arg(long)]
        year: Option<i32>,

        /// Month to render, 1-12 (defaults to the persisted selector)
        #[arg(long)]
        month: Option<u32>,

        #[command(subcommand)]
        command: Option<CalendarCommands>,
    },

    /// Manage assignee display colors
    #[command(subcommand)]
    Person(PersonCommands),

    /// Deliver one external change event to the sync controller
    Sync {
        /// Surface the change occurred on
        #[arg(long, value_enum)]
        surface: Surface,

        /// Edited row range, 1-based ("4" or "2..10")
        #[arg(long)]
        rows: String,

        /// Edited column range, 1-based ("3" or "1..7")
        #[arg(long)]
        cols: String,

        /// For today-view edits: 1-based row of the rendered view
        #[arg(long)]
        row: Option<usize>,

        /// For today-view edits: new assignee
        #[arg(long)]
        person: Option<String>,

        /// For today-view edits: new completion state
        #[arg(long)]
        done: Option<bool>,
    },
}

/// Template management subcommands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Add a recurring task template
    Add {
        /// Task name shown on both views
        name: String,

        /// First due date, DD.MM.YYYY
        #[arg(long)]
        start: String,

        /// Repetition interval in days (must be positive)
        #[arg(long)]
        every: i64,

        /// Display color, e.g. "#00F"
        #[arg(long)]
        color: Option<String>,

        /// Explicit template id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// List all templates
    List,

    /// Edit a template's fields
    Set {
        /// Template id
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// New start date, DD.MM.YYYY
        #[arg(long)]
        start: Option<String>,

        /// New interval in days
        #[arg(long)]
        every: Option<i64>,

        #[arg(long)]
        color: Option<String>,
    },

    /// Reactivate a template
    Enable {
        /// Template id
        id: String,
    },

    /// Deactivate a template (drops all its occurrences on the next run)
    Disable {
        /// Template id
        id: String,
    },
}

/// Today-view subcommands
#[derive(Subcommand, Debug)]
pub enum TodayCommands {
    /// Edit one row of the rendered today view (assignee and/or done)
    Set {
        /// 1-based row number in the rendered view
        row: usize,

        /// New assignee
        #[arg(long)]
        person: Option<String>,

        /// New completion state
        #[arg(long)]
        done: Option<bool>,
    },
}

/// Calendar subcommands
#[derive(Subcommand, Debug)]
pub enum CalendarCommands {
    /// Persist a new year/month selector, then rebuild the grid
    Select {
        /// Year
        year: i32,

        /// Month, 1-12
        month: u32,
    },
}

/// Person registry subcommands
#[derive(Subcommand, Debug)]
pub enum PersonCommands {
    /// Set an assignee's display color
    Set {
        /// Person name as entered on the today view
        name: String,

        /// Display color, e.g. "#F00"
        color: String,
    },

    /// List registered assignees
    List,
}

/// Shared state resolved once per invocation
pub(crate) struct Context {
    pub storage: Storage,
    pub config: Config,
    pub today: NaiveDate,
    pub options: OutputOptions,
}

impl Context {
    pub fn controller(&self) -> SyncController {
        SyncController::new(self.storage.clone(), self.config.clone())
    }
}

impl Cli {
    /// Execute the parsed command
    pub fn run(self) -> Result<()> {
        let root = match &self.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        let today = match &self.today {
            Some(text) => dates::parse_display(text)?,
            None => Local::now().date_naive(),
        };

        let storage = Storage::new(root);
        let config = Config::load_from_dir(storage.root())?;
        let ctx = Context {
            storage,
            config,
            today,
            options: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
        };

        match self.command {
            Commands::Init => init::run(&ctx),
            Commands::Template(command) => template::run(&ctx, command),
            Commands::Generate => generate::run(&ctx),
            Commands::Today { command } => today::run(&ctx, command),
            Commands::Calendar {
                year,
                month,
                command,
            } => calendar::run(&ctx, year, month, command),
            Commands::Person(command) => person::run(&ctx, command),
            Commands::Sync {
                surface,
                rows,
                cols,
                row,
                person,
                done,
            } => sync::run(&ctx, surface, &rows, &cols, row, person, done),
        }
    }
}
