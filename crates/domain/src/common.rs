//! Small pure helpers shared by the domain and engine crates.

use chrono::{DateTime, Utc};

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Parses an RFC 3339 timestamp, using `fallback` when the stored value is
/// malformed.
pub fn parse_datetime_or(s: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    parse_datetime(s).unwrap_or(fallback)
}

/// Empty-string-as-absent conversion for values read back from the store.
pub trait StringExt {
    fn into_option(self) -> Option<String>;
}

impl StringExt for String {
    fn into_option(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Trims and rejects blank text, naming the field in the error.
pub fn require_text(value: &str, field: &str) -> Result<String, crate::DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::DomainError::validation(format!(
            "{field} cannot be empty"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn parses_offsets_into_utc() {
        let dt = parse_datetime("2024-01-15T10:30:00+05:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 5);
    }

    #[test]
    fn malformed_timestamp_uses_fallback() {
        let fallback = Utc.with_ymd_and_hms(2020, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(parse_datetime_or("", fallback), fallback);
        assert_eq!(parse_datetime_or("yesterday", fallback), fallback);
    }

    #[test]
    fn empty_string_is_absent() {
        assert_eq!(String::new().into_option(), None);
        assert_eq!(" ".to_string().into_option(), Some(" ".to_string()));
    }

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("  library ", "description").unwrap(), "library");
        let err = require_text("   ", "description").unwrap_err();
        assert!(err.to_string().contains("description cannot be empty"));
    }
}
