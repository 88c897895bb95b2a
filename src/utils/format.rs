//! Elapsed time formatting for the timer display

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;

/// Display string shown while the timer is idle
pub const ZERO_DISPLAY: &str = "00:00:00";

/// Format a millisecond count as `HH:MM:SS`.
///
/// Each component is padded to two digits; hours are never truncated, so
/// 100 hours renders as `100:00:00`. Sub-second remainders are dropped.
pub fn format_elapsed(millis: u64) -> String {
    let hours = millis / MILLIS_PER_HOUR;
    let total_seconds = millis / MILLIS_PER_SECOND;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_matches_idle_display() {
        assert_eq!(format_elapsed(0), ZERO_DISPLAY);
    }

    #[test]
    fn test_one_hour_one_minute_one_second() {
        assert_eq!(format_elapsed(3_661_000), "01:01:01");
    }

    #[test]
    fn test_sub_second_remainder_is_dropped() {
        assert_eq!(format_elapsed(999), "00:00:00");
        assert_eq!(format_elapsed(59_999), "00:00:59");
        assert_eq!(format_elapsed(60_000), "00:01:00");
    }

    #[test]
    fn test_minutes_roll_over_into_hours() {
        assert_eq!(format_elapsed(3_599_999), "00:59:59");
        assert_eq!(format_elapsed(3_600_000), "01:00:00");
    }

    #[test]
    fn test_large_hours_are_not_truncated() {
        assert_eq!(format_elapsed(10 * MILLIS_PER_HOUR), "10:00:00");
        assert_eq!(format_elapsed(100 * MILLIS_PER_HOUR + 61_000), "100:01:01");
    }

    #[test]
    fn test_components_stay_in_range() {
        for millis in (0..200_000_000u64).step_by(7_777_777) {
            let display = format_elapsed(millis);
            let parts: Vec<u64> = display
                .split(':')
                .map(|part| part.parse().unwrap())
                .collect();

            assert_eq!(parts.len(), 3);
            assert!(display.split(':').all(|part| part.len() >= 2));
            assert_eq!(parts[0], millis / MILLIS_PER_HOUR);
            assert!(parts[1] < 60);
            assert!(parts[2] < 60);
            assert_eq!(parts[0] * 3600 + parts[1] * 60 + parts[2], millis / 1000);
        }
    }
}
