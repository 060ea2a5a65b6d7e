//! Display formatting for the `created_at` field of user records.
//!
//! The service has emitted timestamps in more than one shape over time, so
//! parsing walks a fixed, ordered list of accepted formats and keeps the
//! first one that succeeds.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Shown when a record carries no timestamp at all.
pub const DATE_PLACEHOLDER: &str = "Date not available";

/// Output shape: `Jan 15, 2024 10:30`.
const DISPLAY_FORMAT: &str = "%b %d, %Y %H:%M";

/// ISO-8601 with millisecond precision and a literal `Z`.
const ISO_MILLIS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// One accepted input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `2024-01-15T10:30:00.123Z`
    IsoMillis,
    /// `Mon, 15 Jan 2024 10:30:00 GMT`
    Rfc1123,
    /// `2024-01-15T10:30:00+02:00`
    Rfc3339,
}

/// Formats tried in order; the first successful parse wins.
pub const ACCEPTED_FORMATS: [DateFormat; 3] =
    [DateFormat::IsoMillis, DateFormat::Rfc1123, DateFormat::Rfc3339];

impl DateFormat {
    fn parse(self, input: &str) -> Option<DateTime<Utc>> {
        match self {
            DateFormat::IsoMillis => NaiveDateTime::parse_from_str(input, ISO_MILLIS_FORMAT)
                .ok()
                .map(|naive| naive.and_utc()),
            DateFormat::Rfc1123 => DateTime::parse_from_rfc2822(input)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Parse a timestamp using the accepted formats, or `None` if none match.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    ACCEPTED_FORMATS.iter().find_map(|fmt| fmt.parse(input))
}

/// Render a `created_at` value for the users list.
///
/// Absent values render as [`DATE_PLACEHOLDER`]; values in no accepted
/// format are shown unchanged.
pub fn format_created_at(created_at: Option<&str>) -> String {
    let Some(raw) = created_at else {
        return DATE_PLACEHOLDER.to_string();
    };
    match parse_timestamp(raw) {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => {
            tracing::debug!(value = raw, "unrecognised timestamp format");
            raw.to_string()
        }
    }
}
