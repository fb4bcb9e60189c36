//! Local-day bucketing.
//!
//! Clients report their timezone as `getTimezoneOffset()` minutes: positive
//! west of UTC, so UTC-6 is `360`. A local calendar day is the half-open UTC
//! range starting at UTC midnight of the date shifted by that many minutes.
//! The server's own zone never takes part.

use serde::{Deserialize, Serializer};
use time::{
    format_description::FormatItem, macros::format_description, Date, Duration, OffsetDateTime,
    UtcOffset,
};

use crate::errors::ApiError;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

#[cfg(test)]
impl DayRange {
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        instant >= self.start && instant < self.end
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BucketError {
    #[error("date must be a valid calendar date in YYYY-MM-DD form")]
    InvalidDate,
    #[error("tzOffset must be an integer number of minutes")]
    InvalidOffset,
    #[error("date and tzOffset fall outside the supported range")]
    OutOfRange,
}

impl From<BucketError> for ApiError {
    fn from(e: BucketError) -> Self {
        ApiError::validation(e.to_string())
    }
}

/// UTC range covering `date` for a client at `tz_offset_minutes`.
pub fn day_range(date: Date, tz_offset_minutes: i32) -> Result<DayRange, BucketError> {
    let utc_midnight = date.midnight().assume_utc();
    let start = utc_midnight
        .checked_add(Duration::minutes(i64::from(tz_offset_minutes)))
        .ok_or(BucketError::OutOfRange)?;
    let end = start.checked_add(Duration::DAY).ok_or(BucketError::OutOfRange)?;
    Ok(DayRange { start, end })
}

#[cfg(test)]
pub fn day_range_ymd(
    year: i32,
    month: u8,
    day: u8,
    tz_offset_minutes: i32,
) -> Result<DayRange, BucketError> {
    let month = time::Month::try_from(month).map_err(|_| BucketError::InvalidDate)?;
    let date = Date::from_calendar_date(year, month, day).map_err(|_| BucketError::InvalidDate)?;
    day_range(date, tz_offset_minutes)
}

/// The client-local calendar date an instant falls on.
pub fn local_date_of(instant: OffsetDateTime, tz_offset_minutes: i32) -> Date {
    let utc = instant.to_offset(UtcOffset::UTC);
    utc.checked_sub(Duration::minutes(i64::from(tz_offset_minutes)))
        .unwrap_or(utc)
        .date()
}

pub fn parse_date(raw: &str) -> Result<Date, BucketError> {
    Date::parse(raw.trim(), DATE_FORMAT).map_err(|_| BucketError::InvalidDate)
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| {
        format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
    })
}

/// Omitted or blank offsets mean UTC.
pub fn parse_offset(raw: Option<&str>) -> Result<i32, BucketError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(0),
        Some(v) => v.parse::<i32>().map_err(|_| BucketError::InvalidOffset),
    }
}

/// `?date=YYYY-MM-DD&tzOffset=<minutes>`, kept as raw strings so a bad value
/// is reported by field name rather than as a generic query rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayQuery {
    pub date: Option<String>,
    pub tz_offset: Option<String>,
}

impl DayQuery {
    pub fn offset(&self) -> Result<i32, BucketError> {
        parse_offset(self.tz_offset.as_deref())
    }

    pub fn date(&self) -> Result<Option<Date>, BucketError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_date(raw).map(Some),
        }
    }
}

pub mod iso_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_date(*date))
    }
}
