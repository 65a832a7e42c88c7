//! rota - Recurring-Task Rota Library
//!
//! This library provides the core functionality for the rota CLI tool:
//! expanding recurring task templates into dated occurrences and keeping
//! two projections (a "due today" list and a month calendar grid) in sync
//! with the canonical occurrence store.
//!
//! # Core Concepts
//!
//! - **Templates**: recurring task definitions (start date + fixed interval
//!   in days), the external source the engine expands from
//! - **Occurrences**: concrete dated instances with sticky per-occurrence
//!   state (`person`, `done`) that survives regeneration
//! - **Horizon**: the rolling forward window occurrences are materialized for
//! - **Projections**: pure views over the store; edits on the today view
//!   flow back through the backward projector
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `.rota.toml`
//! - `dates`: the `DD.MM.YYYY` display/parsing contract
//! - `engine`: template expansion and sticky-field merge
//! - `error`: error types and result aliases
//! - `calendar`: month grid builder and persisted year/month selector
//! - `occurrence`: occurrence model and canonical store
//! - `person`: assignee registry (display colors)
//! - `render`: plain-text rendering of both projections
//! - `storage`: `.rota/` data directory and atomic file I/O
//! - `sync`: change-event routing and pipeline orchestration
//! - `template`: template model and source registry
//! - `today`: daily projector (forward and backward)
//! - `lock`: file locking for pipeline write-backs

pub mod calendar;
pub mod cli;
pub mod config;
pub mod dates;
pub mod engine;
pub mod error;
pub mod lock;
pub mod occurrence;
pub mod output;
pub mod person;
pub mod render;
pub mod storage;
pub mod sync;
pub mod template;
pub mod today;

pub use error::{Error, Result};
