//! Timestamp conversion between the two stores.
//!
//! The relational store keeps timestamps as text (whatever the writer used,
//! usually `YYYY-MM-DD HH:MM:SS.ffffff`), the document store keeps native BSON
//! datetimes. Everything in between is a naive UTC [`NaiveDateTime`].
//!
//! Parsing never fails loudly: an unknown timestamp is `None`, and the calling
//! step decides whether to substitute its capture time.

use bson::Bson;
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// Pattern written to the relational store.
pub const RELATIONAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Patterns tried, in order, when reading a string timestamp.
const SOURCE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses a string timestamp from either store.
///
/// Returns `None` for null, empty or unparseable input. RFC 3339 strings with
/// an offset are accepted last and converted to UTC.
#[must_use]
pub fn parse_source_format(raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

    for format in SOURCE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc).naive_utc());
    }

    warn!("Could not parse timestamp: {raw}");
    None
}

/// Reads a timestamp out of a BSON value.
#[must_use]
pub fn from_bson(value: Option<&Bson>) -> Option<NaiveDateTime> {
    match value? {
        Bson::DateTime(dt) => Some(dt.to_chrono().naive_utc()),
        Bson::String(s) => parse_source_format(Some(s.as_str())),
        _ => None,
    }
}

/// Converts to the document store's native type. Sub-millisecond precision is dropped.
#[must_use]
pub fn to_document(ts: NaiveDateTime) -> bson::DateTime {
    bson::DateTime::from_chrono(ts.and_utc())
}

/// Converts to the relational store's text pattern.
#[must_use]
pub fn to_relational(ts: NaiveDateTime) -> String {
    ts.format(RELATIONAL_FORMAT).to_string()
}

/// Current time, used as the capture-time default for required timestamps.
#[must_use]
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn ts(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 1)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    #[test]
    fn test_parse_microsecond_space_separated() {
        let parsed = parse_source_format(Some("2025-09-01 10:15:30.123456"));
        assert_eq!(parsed, Some(ts(10, 15, 30, 123_456)));
    }

    #[test]
    fn test_parse_second_precision() {
        assert_eq!(
            parse_source_format(Some("2025-09-01 10:15:30")),
            Some(ts(10, 15, 30, 0))
        );
        assert_eq!(
            parse_source_format(Some("2025-09-01T10:15:30")),
            Some(ts(10, 15, 30, 0))
        );
    }

    #[test]
    fn test_parse_iso_with_fraction() {
        assert_eq!(
            parse_source_format(Some("2025-09-01T10:15:30.5")),
            Some(ts(10, 15, 30, 500_000))
        );
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        assert_eq!(
            parse_source_format(Some("2025-09-01T12:15:30+02:00")),
            Some(ts(10, 15, 30, 0))
        );
    }

    #[test]
    fn test_unknown_inputs() {
        assert_eq!(parse_source_format(None), None);
        assert_eq!(parse_source_format(Some("")), None);
        assert_eq!(parse_source_format(Some("   ")), None);
        assert_eq!(parse_source_format(Some("yesterday at noon")), None);
        assert_eq!(parse_source_format(Some("2025-13-45 99:00:00")), None);
    }

    #[test]
    fn test_relational_format_has_microseconds() {
        assert_eq!(
            to_relational(ts(8, 5, 3, 42)),
            "2025-09-01 08:05:03.000042"
        );
        assert_eq!(to_relational(ts(8, 5, 3, 0)), "2025-09-01 08:05:03.000000");
    }

    #[test]
    fn test_document_roundtrip_keeps_milliseconds() {
        let original = ts(23, 59, 58, 123_456);
        let back = from_bson(Some(&Bson::DateTime(to_document(original)))).unwrap();

        assert_eq!(back.second(), 58);
        assert_eq!(back.nanosecond(), 123_000_000);
    }

    #[test]
    fn test_from_bson_variants() {
        assert_eq!(
            from_bson(Some(&Bson::String("2025-09-01 10:15:30".into()))),
            Some(ts(10, 15, 30, 0))
        );
        assert_eq!(from_bson(Some(&Bson::Null)), None);
        assert_eq!(from_bson(Some(&Bson::Int32(7))), None);
        assert_eq!(from_bson(None), None);
    }
}
