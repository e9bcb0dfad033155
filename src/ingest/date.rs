// src/ingest/date.rs
//! Provider timestamps look like `Tue, 17 Dec 2025 09:00:00 +0900`.
//!
//! The weekday must be a valid abbreviation but is not checked against the date;
//! upstream feeds are not always consistent about it.

use chrono::{DateTime, FixedOffset, Weekday};

const BODY_FORMAT: &str = "%d %b %Y %H:%M:%S %z";
const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a provider timestamp, keeping its UTC offset. `None` on any mismatch.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let (weekday, body) = raw.split_once(", ")?;
    if weekday.len() != 3 || weekday.parse::<Weekday>().is_err() {
        return None;
    }
    DateTime::parse_from_str(body, BODY_FORMAT).ok()
}

/// Wall-clock rendering in the instant's own offset.
pub fn format_pub_date(dt: &DateTime<FixedOffset>) -> String {
    dt.format(OUTPUT_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, TimeZone, Utc};

    #[test]
    fn parses_and_keeps_offset() {
        let dt = parse_pub_date("Wed, 17 Dec 2025 09:00:00 +0900").expect("parse");
        assert_eq!(dt.offset().fix().local_minus_utc(), 9 * 3600);
        assert_eq!(
            dt.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2025, 12, 17, 0, 0, 0).unwrap()
        );
        assert_eq!(format_pub_date(&dt), "2025-12-17 09:00:00");
    }

    #[test]
    fn weekday_is_not_cross_checked() {
        // 17 Dec 2025 is a Wednesday.
        assert!(parse_pub_date("Tue, 17 Dec 2025 09:00:00 +0900").is_some());
    }

    #[test]
    fn negative_offset() {
        let dt = parse_pub_date("Mon, 01 Jan 2024 23:30:00 -0500").expect("parse");
        assert_eq!(format_pub_date(&dt), "2024-01-01 23:30:00");
        assert_eq!(
            dt.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 1, 2, 4, 30, 0).unwrap()
        );
    }

    #[test]
    fn rejects_malformed() {
        for s in [
            "",
            "garbage",
            "17 Dec 2025 09:00:00 +0900",
            "Xyz, 17 Dec 2025 09:00:00 +0900",
            "Wed, 32 Dec 2025 09:00:00 +0900",
            "Wed, 17 Foo 2025 09:00:00 +0900",
            "Wed, 17 Dec 2025 25:00:00 +0900",
            "Wed, 17 Dec 2025 09:00:00",
            "2025-12-17T09:00:00+09:00",
        ] {
            assert!(parse_pub_date(s).is_none(), "should reject {s:?}");
        }
    }
}
