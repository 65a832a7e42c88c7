//! Date display contract.
//!
//! Every date shown on or parsed from a presentation surface uses the fixed
//! `DD.MM.YYYY` format. The backward projector depends on parsing exactly
//! this shape, so any alternate formatting must be normalized before it
//! reaches the engine or store.

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// strftime pattern for `DD.MM.YYYY`
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y";

const DISPLAY_EXPECTED: &str = "DD.MM.YYYY";

/// Format a date for a presentation surface
pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parse a `DD.MM.YYYY` date from a presentation surface
pub fn parse_display(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DISPLAY_FORMAT).map_err(|_| Error::MalformedDate {
        text: text.to_string(),
        expected: DISPLAY_EXPECTED,
    })
}
