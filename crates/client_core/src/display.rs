//! Local date/time rendering in one configured zone.
//!
//! Every view (list rows, reschedule pre-fill, report day buckets) goes
//! through the same `DisplayZone`, so a timestamp always lands on the same
//! calendar day wherever it is shown.

use std::str::FromStr;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use shared::domain::Timestamp;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid UTC offset '{0}', expected e.g. -03:00")]
pub struct InvalidOffset(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone {
    offset: FixedOffset,
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl DisplayZone {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Wall-clock time in this zone. Offset-less server values already are.
    pub fn local(&self, ts: impl Into<Timestamp>) -> NaiveDateTime {
        match ts.into() {
            Timestamp::Instant(instant) => instant.with_timezone(&self.offset).naive_local(),
            Timestamp::Wall(wall) => wall,
        }
    }

    /// Calendar day used for bucketing.
    pub fn day(&self, ts: impl Into<Timestamp>) -> NaiveDate {
        self.local(ts).date()
    }

    /// `dd/mm/yyyy`
    pub fn date_label(&self, ts: impl Into<Timestamp>) -> String {
        self.local(ts).format("%d/%m/%Y").to_string()
    }

    /// `HH:MM`
    pub fn time_label(&self, ts: impl Into<Timestamp>) -> String {
        self.local(ts).format("%H:%M").to_string()
    }

    /// Date and time input values (`YYYY-MM-DD`, `HH:MM`).
    pub fn input_fields(&self, ts: impl Into<Timestamp>) -> (String, String) {
        let local = self.local(ts);
        (
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M").to_string(),
        )
    }
}

impl FromStr for DisplayZone {
    type Err = InvalidOffset;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }

        let invalid = || InvalidOffset(raw.to_string());
        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::new)
            .ok_or_else(invalid)
    }
}

/// Combine `YYYY-MM-DD` and `HH:MM` inputs into a wall-clock timestamp.
pub fn parse_input_fields(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .ok()?;
    Some(date.and_time(time))
}

/// Optional `YYYY-MM-DD` input; blank means unset.
pub fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("Fecha inválida: {raw}"))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone};

    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn parses_offsets() {
        let zone: DisplayZone = "-03:00".parse().expect("offset");
        assert_eq!(zone.offset().local_minus_utc(), -3 * 3600);
        let zone: DisplayZone = "+05:30".parse().expect("offset");
        assert_eq!(zone.offset().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!("UTC".parse::<DisplayZone>().expect("utc"), DisplayZone::utc());
        assert!("03:00".parse::<DisplayZone>().is_err());
        assert!("-25:00".parse::<DisplayZone>().is_err());
    }

    #[test]
    fn utc_midnight_stays_on_the_previous_local_day_west_of_greenwich() {
        let zone: DisplayZone = "-03:00".parse().expect("offset");
        let midnight = ts(2024, 5, 2, 0, 0);
        assert_eq!(zone.day(midnight), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(zone.date_label(midnight), "01/05/2024");
        assert_eq!(zone.time_label(midnight), "21:00");
    }

    #[test]
    fn input_fields_round_trip_through_the_zone() {
        let zone: DisplayZone = "-03:00".parse().expect("offset");
        let (date, time) = zone.input_fields(ts(2024, 5, 1, 13, 0));
        assert_eq!((date.as_str(), time.as_str()), ("2024-05-01", "10:00"));
        assert_eq!(
            parse_input_fields(&date, &time),
            NaiveDate::from_ymd_opt(2024, 5, 1).and_then(|d| d.and_hms_opt(10, 0, 0))
        );
    }

    #[test]
    fn wall_clock_values_prefill_and_submit_unchanged() {
        let zone: DisplayZone = "-03:00".parse().expect("offset");
        let sent = Timestamp::parse("2024-05-01T10:00:00").expect("wire");
        assert_eq!(zone.time_label(sent), "10:00");

        let (date, time) = zone.input_fields(sent);
        assert_eq!((date.as_str(), time.as_str()), ("2024-05-01", "10:00"));
        let resubmitted = parse_input_fields(&date, &time).expect("inputs");
        assert_eq!(Timestamp::Wall(resubmitted), sent);
        assert_eq!(Timestamp::Wall(resubmitted).to_string(), "2024-05-01T10:00:00");
    }

    #[test]
    fn wall_clock_midnight_buckets_on_its_own_day() {
        let zone: DisplayZone = "-03:00".parse().expect("offset");
        let sent = Timestamp::parse("2024-05-02T00:00:00").expect("wire");
        assert_eq!(zone.day(sent), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn rejects_malformed_inputs() {
        assert_eq!(parse_input_fields("", "10:00"), None);
        assert_eq!(parse_input_fields("2024-13-01", "10:00"), None);
        assert_eq!(parse_optional_date("  "), Ok(None));
        assert!(parse_optional_date("01/05/2024").is_err());
    }
}
