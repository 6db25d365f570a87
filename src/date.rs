//! Derived date forms for entries. An entry carries a calendar date only
//! (no time of day); every derived instant is midnight local time, with the
//! host's current UTC offset. The offset is whatever is in effect when the
//! site is generated, not when the entry was written.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime,
    SecondsFormat, TimeZone,
};
use serde::Serialize;

/// The three derived forms of an entry's calendar date, plus the underlying
/// instant for feed timestamps. Only the string forms are exposed to
/// templates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntryDate {
    /// Calendar form without an offset, e.g. `2020-01-15T00:00:00`.
    pub iso8601: String,

    /// Midnight local time with an explicit UTC offset, e.g.
    /// `2020-01-15T00:00:00-05:00`.
    pub rfc3339: String,

    /// Display form, `YYYY-MM-DD`.
    pub display: String,

    #[serde(skip)]
    pub stamp: DateTime<FixedOffset>,
}

impl EntryDate {
    /// Derives all forms from a calendar date using the host's current UTC
    /// offset.
    pub fn from_naive(date: NaiveDate) -> EntryDate {
        let stamp = local_midnight(date);
        EntryDate {
            iso8601: stamp.naive_local().format("%Y-%m-%dT%H:%M:%S").to_string(),
            rfc3339: stamp.to_rfc3339_opts(SecondsFormat::Secs, false),
            display: date.format("%Y-%m-%d").to_string(),
            stamp,
        }
    }
}

/// Returns midnight local time on `date` as an offset-carrying instant.
pub fn local_midnight(date: NaiveDate) -> DateTime<FixedOffset> {
    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap(); // always valid
    let offset = *Local::now().offset();
    offset
        .from_local_datetime(&NaiveDateTime::new(date, midnight))
        .single()
        .unwrap() // a fixed offset maps every local time to a single instant
}

#[cfg(test)]
mod test {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 15).unwrap()
    }

    #[test]
    fn test_display_form() {
        assert_eq!("2020-01-15", EntryDate::from_naive(date()).display);
    }

    #[test]
    fn test_iso8601_is_midnight() {
        assert_eq!(
            "2020-01-15T00:00:00",
            EntryDate::from_naive(date()).iso8601
        );
    }

    #[test]
    fn test_rfc3339_is_midnight_with_explicit_offset() {
        let rfc3339 = EntryDate::from_naive(date()).rfc3339;
        assert!(rfc3339.starts_with("2020-01-15T00:00:00"));
        let offset = &rfc3339["2020-01-15T00:00:00".len()..];
        assert_eq!(6, offset.len());
        assert!(offset.starts_with('+') || offset.starts_with('-'));
        assert_eq!(Some(':'), offset.chars().nth(3));
    }

    #[test]
    fn test_stamp_round_trips_through_rfc3339() {
        let entry_date = EntryDate::from_naive(date());
        assert_eq!(
            entry_date.rfc3339,
            entry_date.stamp.to_rfc3339_opts(SecondsFormat::Secs, false)
        );
    }
}
