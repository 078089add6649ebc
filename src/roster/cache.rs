use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::FetchError;
use crate::{fmt, str};

/// Field separator of the cache file. Must not appear in any member handle;
/// saving rejects handles that contain it.
pub const DELIMITER: char = '|';

/// Last fully synchronized view of the guild roster, persisted between runs
/// as a single flat line: `count|latest_join|member1|member2|...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSnapshot {
    pub total_count: u32,
    pub latest_join: String,
    pub members: Vec<String>,
}

/// Read the cached roster. A missing file is a first run and loads as the
/// empty snapshot.
pub fn load(path: &Path) -> Result<RosterSnapshot, FetchError> {
    if !path.exists() {
        debug!(path = %path.display(), "No roster cache found, starting empty");
        return Ok(RosterSnapshot::default());
    }

    let raw = fs::read_to_string(path).map_err(|source| FetchError::Cache {
        path: path.to_path_buf(),
        message: str!("could not read"),
        source: Some(source),
    })?;

    parse(raw.trim_end_matches('\n')).map_err(|message| FetchError::Cache {
        path: path.to_path_buf(),
        message,
        source: None,
    })
}

/// Overwrite the cache wholesale with a freshly synchronized snapshot.
pub fn save(path: &Path, snapshot: &RosterSnapshot) -> Result<(), FetchError> {
    fs::write(path, serialize(snapshot)?).map_err(|source| FetchError::Cache {
        path: path.to_path_buf(),
        message: str!("could not write"),
        source: Some(source),
    })
}

fn parse(raw: &str) -> Result<RosterSnapshot, String> {
    if raw.is_empty() {
        return Ok(RosterSnapshot::default());
    }

    let mut fields = raw.split(DELIMITER);

    let count_field = fields.next().unwrap_or_default();
    let total_count = count_field
        .parse::<u32>()
        .map_err(|_| fmt!("malformed member count {count_field:?}"))?;

    let latest_join = match fields.next() {
        Some(marker) => str!(marker),
        None => return Err(str!("truncated: no latest-join marker")),
    };

    let members: Vec<String> = fields.map(String::from).collect();

    Ok(RosterSnapshot {
        total_count,
        latest_join,
        members,
    })
}

fn serialize(snapshot: &RosterSnapshot) -> Result<String, FetchError> {
    for handle in &snapshot.members {
        if handle.contains(DELIMITER) {
            return Err(FetchError::data(
                "roster cache",
                fmt!("member handle {handle:?} contains the delimiter {DELIMITER:?}"),
            ));
        }
    }

    let mut fields = vec![snapshot.total_count.to_string(), snapshot.latest_join.clone()];
    fields.extend(snapshot.members.iter().cloned());
    Ok(fields.join(&str!(DELIMITER)))
}
