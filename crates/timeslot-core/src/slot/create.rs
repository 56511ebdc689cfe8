//! Building a validated [`TimeSlot`] from user input.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

use super::{generate_id, SlotTimer, Task, TimeSlot};
use crate::error::ValidationError;

/// Accent colors offered when creating a slot. The first is the default.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#FF6B6B", "#6BCB77", "#4D96FF", "#FFD93D", "#6A0572", "#FF914D", "#00A8E8", "#ADFF2F",
    "#FF69B4", "#A0522D",
];

/// How the validity window of a new slot is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Window {
    /// `n` whole days starting today.
    Days(i64),
    /// Explicit boundaries.
    Exact {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// User input for a new slot.
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub title: String,
    pub description: Option<String>,
    pub color_theme: Option<String>,
    pub window: Window,
    pub hours: u32,
    pub minutes: u32,
    pub reset_intervals: i64,
    pub tasks: Vec<String>,
}

impl NewSlot {
    pub fn new(title: impl Into<String>, hours: u32, minutes: u32, window: Window) -> Self {
        Self {
            title: title.into(),
            description: None,
            color_theme: None,
            window,
            hours,
            minutes,
            reset_intervals: 0,
            tasks: Vec::new(),
        }
    }

    /// Validate and turn the input into a slot created at `now`.
    pub fn build(self, now: DateTime<Utc>) -> Result<TimeSlot, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::BlankTitle);
        }

        if self.hours > 23 {
            return Err(ValidationError::InvalidDuration(
                "hours must be between 0 and 23".into(),
            ));
        }
        if self.minutes > 59 {
            return Err(ValidationError::InvalidDuration(
                "minutes must be between 0 and 59".into(),
            ));
        }
        if self.hours == 0 && self.minutes == 0 {
            return Err(ValidationError::InvalidDuration(
                "timer duration must not be zero".into(),
            ));
        }

        let (start, end, duration_days) = resolve_window(&self.window, now)?;

        let mut tasks: Vec<Task> = Vec::with_capacity(self.tasks.len());
        for text in &self.tasks {
            let text = text.trim();
            if text.is_empty() {
                return Err(ValidationError::BlankTask);
            }
            if tasks.iter().any(|t| t.text == text) {
                return Err(ValidationError::DuplicateTask(text.to_string()));
            }
            tasks.push(Task::new(text));
        }

        Ok(TimeSlot {
            id: generate_id(),
            title: title.to_string(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            start,
            end,
            color_theme: self
                .color_theme
                .unwrap_or_else(|| DEFAULT_PALETTE[0].to_string()),
            date_created: now,
            reset_intervals: self.reset_intervals.max(0),
            duration_days,
            tasks,
            timer: SlotTimer::new(self.hours, self.minutes),
        })
    }
}

fn resolve_window(
    window: &Window,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>, i64), ValidationError> {
    match *window {
        Window::Days(days) => {
            if days <= 0 {
                return Err(ValidationError::InvalidWindow(
                    "duration must be at least 1 day".into(),
                ));
            }
            let start = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN));
            let end = start + Duration::days(days) - Duration::milliseconds(1);
            Ok((start, end, days))
        }
        Window::Exact { start, end } => {
            if start >= end {
                return Err(ValidationError::InvalidWindow(
                    "end must be after start".into(),
                ));
            }
            let span_ms = (end - start).num_milliseconds();
            let day_ms = Duration::days(1).num_milliseconds();
            let whole_days = (span_ms + day_ms - 1) / day_ms;
            Ok((start, end, whole_days + 1))
        }
    }
}
