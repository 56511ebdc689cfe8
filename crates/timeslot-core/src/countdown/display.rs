/// `HH:MM:SS` from one hour up, `MM:SS` below.
pub fn format_remaining(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Share of the countdown still left, in `0.0..=1.0`.
pub fn remaining_fraction(seconds_left: u32, initial_seconds: u32) -> f64 {
    if initial_seconds == 0 {
        return 0.0;
    }
    (f64::from(seconds_left) / f64::from(initial_seconds)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_and_without_hours() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(59), "00:59");
        assert_eq!(format_remaining(125), "02:05");
        assert_eq!(format_remaining(3600), "01:00:00");
        assert_eq!(format_remaining(3 * 3600 + 7 * 60 + 9), "03:07:09");
    }

    #[test]
    fn fraction_handles_zero_duration() {
        assert_eq!(remaining_fraction(5, 0), 0.0);
        assert_eq!(remaining_fraction(30, 60), 0.5);
        assert_eq!(remaining_fraction(90, 60), 1.0);
    }
}
