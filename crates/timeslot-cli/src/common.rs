//! Helpers shared by the CLI commands.

use std::error::Error;
use std::io::{self, BufRead, Write};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use timeslot_core::{Config, CountdownSession, Event, SlotService, SlotStore, SqliteSlotStore};

pub type CmdResult = Result<(), Box<dyn Error>>;

/// Load the config and open the slot database it points at.
pub fn open_service() -> Result<(Config, SlotService<SqliteSlotStore>), Box<dyn Error>> {
    let config = Config::load_or_default();
    let store = SqliteSlotStore::open_with(&config)?;
    Ok((config, SlotService::new(store)))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an event as a single JSON line. Completion also rings the bell.
pub fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "could not encode event"),
    }
    if matches!(event, Event::CountdownCompleted { .. }) {
        eprint!("\x07");
        let _ = io::stderr().flush();
    }
}

/// Surface a failed save without aborting the command.
pub fn warn_unsaved<S: SlotStore + ?Sized>(session: &mut CountdownSession<'_, S>) {
    if let Some(e) = session.take_write_error() {
        eprintln!("warning: progress not saved: {e}");
    }
}

/// Ask a yes/no question on stderr, reading the answer from stdin.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| format!("expected RFC 3339 timestamp or YYYY-MM-DD, got '{s}'"))
}
