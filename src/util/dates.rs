use chrono::{DateTime, Local, NaiveDate};

use crate::fmt;
use crate::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed start/end date range for which plays are counted. Inclusive on
/// both ends, matching the remote service's mindate/maxdate semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn parse(start: &str, end: &str) -> Result<Self, Error> {
        let start = NaiveDate::parse_from_str(start, DATE_FORMAT)
            .map_err(|e| fmt!("invalid window start date {start}: {e}"))?;
        let end = NaiveDate::parse_from_str(end, DATE_FORMAT)
            .map_err(|e| fmt!("invalid window end date {end}: {e}"))?;

        if end < start {
            return Err(fmt!("reporting window ends ({end}) before it starts ({start})").into());
        }

        Ok(Self { start, end })
    }
}

pub fn local_date_yyyy_mm_dd() -> String {
    let now: DateTime<Local> = Local::now();
    now.format(DATE_FORMAT).to_string()
}
