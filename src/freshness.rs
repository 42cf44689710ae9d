use chrono::{DateTime, NaiveDateTime, Utc};

/// Calendar-field timestamps some boards embed without a zone suffix.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Parses the timestamp shapes the sources actually emit: RFC 3339 / ISO-8601
/// with a zone, RFC 2822 ("Tue, 05 Aug 2026 09:30:00 GMT"), and zoneless
/// ISO-ish strings. A timestamp without an explicit zone is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// A record with no usable timestamp is treated as just published, so that
/// sources without reliable dates are not silently dropped by the freshness
/// filter.
pub fn normalize(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    published.unwrap_or(now)
}

/// Whole elapsed minutes between `now` and the instant. Callers pass the
/// same `now` for every record in a scan so repeated measurements agree.
pub fn age_minutes(instant: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - instant).num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn reference_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_timestamp("2026-08-05T13:00:00+02:00").expect("parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 5, 11, 0, 0).unwrap());
    }

    #[test]
    fn parses_rfc2822() {
        let parsed = parse_timestamp("Wed, 05 Aug 2026 09:30:00 GMT").expect("parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 5, 9, 30, 0).unwrap());
    }

    #[test]
    fn zoneless_timestamp_reads_as_utc() {
        let parsed = parse_timestamp("2026-08-05T09:30:00").expect("parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 5, 9, 30, 0).unwrap());
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_timestamp("yesterday-ish").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn missing_timestamp_normalizes_to_now() {
        let now = reference_now();
        assert_eq!(normalize(None, now), now);
        assert_eq!(age_minutes(normalize(None, now), now), 0);
    }

    #[test]
    fn age_is_floored_whole_minutes() {
        let now = reference_now();
        let instant = now - Duration::seconds(119);
        assert_eq!(age_minutes(instant, now), 1);
    }

    #[test]
    fn future_timestamp_yields_negative_age() {
        let now = reference_now();
        let instant = now + Duration::minutes(5);
        assert_eq!(age_minutes(instant, now), -5);
    }
}
