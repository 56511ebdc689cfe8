//! Slot management commands.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use timeslot_core::countdown::format_remaining;
use timeslot_core::storage::import_blob;
use timeslot_core::{NewSlot, TimeSlot, Window};

use crate::common::{open_service, parse_instant, print_json, CmdResult};

#[derive(Subcommand)]
pub enum SlotAction {
    /// Create a new slot
    Create {
        /// Slot title
        title: String,
        /// Countdown hours (0-23)
        #[arg(long, default_value = "0")]
        hours: u32,
        /// Countdown minutes (0-59)
        #[arg(long, default_value = "0")]
        minutes: u32,
        /// Valid for this many days starting today
        #[arg(long, conflicts_with_all = ["start", "end"])]
        days: Option<i64>,
        /// Window start (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_instant, requires = "end")]
        start: Option<DateTime<Utc>>,
        /// Window end (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_instant, requires = "start")]
        end: Option<DateTime<Utc>>,
        /// Reset the countdown every N days (0 disables)
        #[arg(long, default_value = "0")]
        reset_every: i64,
        /// Free-form description
        #[arg(long)]
        description: Option<String>,
        /// Accent color (defaults to the first palette color)
        #[arg(long)]
        color: Option<String>,
        /// Checklist entry (repeatable)
        #[arg(long = "task")]
        tasks: Vec<String>,
        /// Print the created slot as JSON
        #[arg(long)]
        json: bool,
    },
    /// List slots, applying due resets first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one slot
    Show {
        /// Slot ID
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a slot
    Delete {
        /// Slot ID
        id: String,
    },
    /// Import slots from a JSON export
    Import {
        /// File holding a slot array, or an object with a "timers" entry
        path: std::path::PathBuf,
    },
}

pub fn run(action: SlotAction) -> CmdResult {
    let (config, service) = open_service()?;

    match action {
        SlotAction::Create {
            title,
            hours,
            minutes,
            days,
            start,
            end,
            reset_every,
            description,
            color,
            tasks,
            json,
        } => {
            let window = match (start, end) {
                (Some(start), Some(end)) => Window::Exact { start, end },
                _ => Window::Days(days.unwrap_or(1)),
            };
            let mut new = NewSlot::new(title, hours, minutes, window);
            new.description = description;
            new.color_theme = color.or_else(|| config.display.palette.first().cloned());
            new.reset_intervals = reset_every;
            new.tasks = tasks;

            let slot = service.create(new, Utc::now())?;
            if json {
                print_json(&slot)?;
            } else {
                println!("{}", slot.id);
            }
        }
        SlotAction::List { json } => {
            let report = service.refresh(Utc::now());
            if let Some(e) = &report.error {
                eprintln!("warning: {e}");
            }
            if json {
                print_json(&report.slots)?;
            } else if report.slots.is_empty() {
                println!("no slots");
            } else {
                for slot in &report.slots {
                    println!("{}", summary_line(slot));
                }
            }
        }
        SlotAction::Show { id, json } => {
            let slot = service.get(&id)?;
            if json {
                print_json(&slot)?;
            } else {
                print_details(&slot);
            }
        }
        SlotAction::Delete { id } => {
            service.delete(&id)?;
            println!("deleted {id}");
        }
        SlotAction::Import { path } => {
            let blob = std::fs::read_to_string(&path)?;
            let count = import_blob(service.store(), &blob)?;
            println!("imported {count} slots");
        }
    }
    Ok(())
}

fn summary_line(slot: &TimeSlot) -> String {
    let state = if slot.timer.seconds_left == 0 {
        "done"
    } else if slot.timer.is_running {
        "running"
    } else {
        "paused"
    };
    format!(
        "{}  {:<24} {:>8}  {:<7} {}/{} tasks",
        slot.id,
        slot.title,
        format_remaining(slot.timer.seconds_left),
        state,
        slot.completed_tasks(),
        slot.tasks.len()
    )
}

fn print_details(slot: &TimeSlot) {
    println!("{} ({})", slot.title, slot.id);
    if let Some(description) = &slot.description {
        println!("  {description}");
    }
    println!(
        "  window:    {} .. {} ({} days)",
        slot.start.format("%Y-%m-%d"),
        slot.end.format("%Y-%m-%d"),
        slot.duration_days
    );
    println!(
        "  remaining: {} of {}",
        format_remaining(slot.timer.seconds_left),
        format_remaining(slot.timer.initial_seconds)
    );
    if slot.auto_reset_enabled() {
        println!("  resets:    every {} days", slot.reset_intervals);
    }
    println!("  stopped:   {} times", slot.timer.times_stopped);
    for task in &slot.tasks {
        let mark = if task.completed { "x" } else { " " };
        println!("  [{mark}] {} ({})", task.text, task.id);
    }
}
