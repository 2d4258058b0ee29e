//! Purpose: Convert raw timestamp inputs into `OffsetDateTime` and back to unix seconds.
//! Exports: `from_unix`, `to_unix`, `parse_text`, `format_rfc3339`.
//! Role: Coercion backend for every timestamp-shaped field.
//! Invariants: All parsed values are normalized to UTC.
//! Invariants: `to_unix(from_unix(t)) == t` for every representable `t`.
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::core::error::{Error, ErrorKind};

// Graph API timestamps use a colon-less offset, e.g. `2013-01-02T03:04:05+0000`.
const GRAPH_FORMAT: &str =
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]";
const DATE_FORMAT: &str = "[year]-[month]-[day]";

pub fn from_unix(seconds: i64) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|err| {
        Error::new(ErrorKind::Validation)
            .with_message("unix timestamp out of range")
            .with_value(seconds.to_string())
            .with_source(err)
    })
}

pub fn to_unix(value: &OffsetDateTime) -> i64 {
    value.unix_timestamp()
}

/// Accepts unix seconds, RFC3339, the Graph API offset form, or a bare date.
pub fn parse_text(raw: &str) -> Result<OffsetDateTime, Error> {
    let trimmed = raw.trim();
    if let Ok(seconds) = trimmed.parse::<i64>() {
        return from_unix(seconds);
    }
    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(parsed.to_offset(UtcOffset::UTC));
    }
    let graph = time::format_description::parse(GRAPH_FORMAT).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid timestamp format description")
            .with_source(err)
    })?;
    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &graph) {
        return Ok(parsed.to_offset(UtcOffset::UTC));
    }
    let date = time::format_description::parse(DATE_FORMAT).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid date format description")
            .with_source(err)
    })?;
    match Date::parse(trimmed, &date) {
        Ok(parsed) => Ok(parsed.midnight().assume_utc()),
        Err(err) => Err(Error::new(ErrorKind::Validation)
            .with_message("unrecognized timestamp text")
            .with_value(format!("{trimmed:?}"))
            .with_source(err)),
    }
}

pub fn format_rfc3339(value: &OffsetDateTime) -> String {
    value
        .format(&Rfc3339)
        .unwrap_or_else(|_| value.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_rfc3339, from_unix, parse_text, to_unix};
    use crate::core::error::ErrorKind;

    #[test]
    fn unix_seconds_round_trip() {
        for seconds in [0, 1_356_998_400, 1_700_000_000] {
            let parsed = from_unix(seconds).expect("in range");
            assert_eq!(to_unix(&parsed), seconds);
        }
    }

    #[test]
    fn graph_offset_form_is_normalized_to_utc() {
        let parsed = parse_text("2013-01-01T05:00:00+0500").expect("graph form");
        assert_eq!(to_unix(&parsed), 1_356_998_400);
        assert_eq!(format_rfc3339(&parsed), "2013-01-01T00:00:00Z");
    }

    #[test]
    fn rfc3339_date_and_numeric_text_are_accepted() {
        let rfc = parse_text("2013-01-01T00:00:00Z").expect("rfc3339");
        let date = parse_text("2013-01-01").expect("date");
        let numeric = parse_text("1356998400").expect("numeric");
        assert_eq!(rfc, date);
        assert_eq!(rfc, numeric);
    }

    #[test]
    fn garbage_text_is_a_validation_error() {
        let err = parse_text("next tuesday").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
