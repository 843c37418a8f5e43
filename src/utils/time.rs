use chrono::{DateTime, FixedOffset, Local, NaiveTime, TimeDelta};

/// Smallest span the tasks file can represent.
pub fn tick() -> TimeDelta {
    TimeDelta::nanoseconds(100)
}

pub fn now_local() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Midnight of `t`'s calendar date, in `t`'s offset.
pub fn start_of_day(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    t - (t.time() - NaiveTime::MIN)
}

/// Last representable instant of `t`'s calendar date (23:59:59.9999999).
pub fn end_of_day(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    start_of_day(t) + TimeDelta::days(1) - tick()
}

/// `hh:mm` for a span, hours not wrapped at 24.
pub fn format_hours_minutes(span: TimeDelta) -> String {
    let minutes = span.num_minutes().max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// `hh:mm:ss` for a span, hours not wrapped at 24.
pub fn format_clock(span: TimeDelta) -> String {
    let seconds = span.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).expect("valid datetime")
    }

    #[test]
    fn day_bounds_stay_in_the_same_offset() {
        let t = fixed_time("2026-03-02T14:25:10+02:00");
        assert_eq!(start_of_day(t), fixed_time("2026-03-02T00:00:00+02:00"));
        assert_eq!(
            end_of_day(t),
            fixed_time("2026-03-02T23:59:59.9999999+02:00")
        );
    }

    #[test]
    fn formats_spans() {
        assert_eq!(format_hours_minutes(TimeDelta::minutes(90)), "01:30");
        assert_eq!(format_clock(TimeDelta::seconds(3_725)), "01:02:05");
        assert_eq!(format_clock(TimeDelta::hours(30)), "30:00:00");
    }
}
