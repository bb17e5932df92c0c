/// Above this, and at or below the negative cutoff, tenths are never shown.
pub const POSITIVE_TENTHS_CUTOFF: i64 = 10_000;
pub const NEGATIVE_TENTHS_CUTOFF: i64 = -1_000;

/// Clock display string for a remaining time.
///
/// A day or more shows as fractional days (`1.5 days`), an hour or more as
/// `hh:mm:ss`, anything shorter as `mm:ss`, with tenths (`mm:ss.d`) in the
/// last ten seconds when `show_tenths` is set. Positive times round up and
/// negative (overtime) times round toward zero, so a countdown changes
/// exactly on whole seconds.
pub fn format_millis(ms: i64, show_tenths: bool) -> String {
    let neg = ms < 0;
    let sign = if neg { "-" } else { "" };
    let abs = ms.unsigned_abs();
    let total_secs = if neg { abs / 1000 } else { abs.div_ceil(1000) };

    if total_secs >= 24 * 3600 {
        let days = format!("{:.1}", total_secs as f64 / 86_400.0);
        let unit = if days == "1.0" { "day" } else { "days" };
        return format!("{}{} {}", sign, days, unit);
    }
    if total_secs >= 3600 {
        let (h, m, s) = (total_secs / 3600, total_secs % 3600 / 60, total_secs % 60);
        return format!("{}{:02}:{:02}:{:02}", sign, h, m, s);
    }

    if ms > POSITIVE_TENTHS_CUTOFF || ms <= NEGATIVE_TENTHS_CUTOFF || !show_tenths {
        return format!("{}{:02}:{:02}", sign, total_secs / 60, total_secs % 60);
    }
    let deci = if neg { abs / 100 } else { abs.div_ceil(100) };
    let (mins, tenths_of_minute) = (deci / 600, deci % 600);
    format!("{}{:02}:{:02}.{}", sign, mins, tenths_of_minute / 10, tenths_of_minute % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_and_seconds_round_up() {
        assert_eq!(format_millis(65_000, true), "01:05");
        assert_eq!(format_millis(64_001, true), "01:05");
        assert_eq!(format_millis(600_000, false), "10:00");
    }

    #[test]
    fn tenths_in_the_last_ten_seconds() {
        assert_eq!(format_millis(10_000, true), "00:10.0");
        assert_eq!(format_millis(10_001, true), "00:11");
        assert_eq!(format_millis(9_950, true), "00:10.0");
        assert_eq!(format_millis(1, true), "00:00.1");
        assert_eq!(format_millis(0, true), "00:00.0");
        assert_eq!(format_millis(5_500, false), "00:06");
    }

    #[test]
    fn overtime_rounds_toward_zero() {
        assert_eq!(format_millis(-50, true), "-00:00.0");
        assert_eq!(format_millis(-999, true), "-00:00.9");
        assert_eq!(format_millis(-1_000, true), "-00:01");
        assert_eq!(format_millis(-61_500, true), "-01:01");
    }

    #[test]
    fn hours_and_days() {
        assert_eq!(format_millis(3_600_000, true), "01:00:00");
        assert_eq!(format_millis(5_025_000, true), "01:23:45");
        assert_eq!(format_millis(86_400_000, true), "1.0 day");
        assert_eq!(format_millis(3 * 86_400_000 / 2, true), "1.5 days");
    }
}
