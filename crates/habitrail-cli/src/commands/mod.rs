pub mod config;
pub mod export;
pub mod focus;
pub mod habit;
pub mod import;
pub mod journal;
pub mod notify;
pub mod remind;
pub mod stats;
pub mod task;

use habitrail_core::DateKey;
use serde::Serialize;

pub(crate) type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `YYYY-MM-DD`, or today when absent.
pub(crate) fn date_or_today(raw: Option<&str>) -> Result<DateKey, Box<dyn std::error::Error>> {
    match raw {
        Some(raw) => Ok(DateKey::parse(raw)?),
        None => Ok(DateKey::today()),
    }
}
