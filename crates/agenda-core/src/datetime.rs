use anyhow::anyhow;
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

/// Parse a due-date expression against a caller-supplied `now`.
///
/// Accepted forms: `YYYY-MM-DD` (midnight UTC), a full RFC 3339
/// timestamp, `today` / `tomorrow` / `yesterday`, and `in Nd` / `in Nw`.
pub fn parse_due_input(input: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let text = input.trim().to_ascii_lowercase();

    match text.as_str() {
        "today" => return Ok(now),
        "tomorrow" => return Ok(now + Duration::days(1)),
        "yesterday" => return Ok(now - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = text.strip_prefix("in ") {
        let offset = parse_relative(rest.trim())
            .ok_or_else(|| anyhow!("invalid relative due date: {input}"))?;
        return Ok(now + offset);
    }

    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid date: {input}"))?;
        return Ok(midnight.and_utc());
    }

    DateTime::parse_from_rfc3339(input.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| anyhow!("unrecognized due date '{input}': {err}"))
}

/// `Nd` or `Nw` with a non-negative count.
fn parse_relative(expr: &str) -> Option<Duration> {
    if let Some(days) = expr.strip_suffix('d') {
        return days.trim().parse::<i64>().ok().map(Duration::days);
    }
    if let Some(weeks) = expr.strip_suffix('w') {
        return weeks.trim().parse::<i64>().ok().map(Duration::weeks);
    }
    None
}

/// Display form used by the renderer, in the local timezone.
pub fn format_due(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::parse_due_input;

    fn fixed_now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
            .single()
            .expect("valid now")
    }

    #[test]
    fn parses_iso_date_as_midnight_utc() {
        let parsed = parse_due_input("2026-04-01", fixed_now()).expect("parse date");
        assert_eq!(parsed.to_rfc3339(), "2026-04-01T00:00:00+00:00");
    }

    #[test]
    fn parses_rfc3339_timestamp() {
        let parsed = parse_due_input("2026-04-01T08:30:00Z", fixed_now()).expect("parse timestamp");
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2026, 4, 1, 8, 30, 0)
                .single()
                .expect("valid timestamp")
        );
    }

    #[test]
    fn parses_named_days() {
        let now = fixed_now();
        assert_eq!(parse_due_input("today", now).expect("today"), now);
        assert_eq!(
            parse_due_input("Tomorrow", now).expect("tomorrow"),
            now + Duration::days(1)
        );
        assert_eq!(
            parse_due_input("yesterday", now).expect("yesterday"),
            now - Duration::days(1)
        );
    }

    #[test]
    fn parses_relative_offsets() {
        let now = fixed_now();
        assert_eq!(
            parse_due_input("in 3d", now).expect("in 3d"),
            now + Duration::days(3)
        );
        assert_eq!(
            parse_due_input("in 2w", now).expect("in 2w"),
            now + Duration::weeks(2)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_due_input("someday", fixed_now()).is_err());
        assert!(parse_due_input("in 3y", fixed_now()).is_err());
        assert!(parse_due_input("2026-13-40", fixed_now()).is_err());
    }
}
