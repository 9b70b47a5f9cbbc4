//! The local calendar time record.

use serde::Serialize;
use time::{OffsetDateTime, Weekday};

use crate::timezone::ZoneOffset;

/// An instant broken down into local calendar fields.
///
/// Records can only be created by [LocalTimeReader](crate::LocalTimeReader),
/// so every record has been through a local time conversion and the offset
/// is always populated. A record is an owned copy: later reads of the clock
/// never change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenDownTime {
    year: i32,
    /// 1-12
    month: u8,
    /// 1-31
    day: u8,
    /// 0-23
    hour: u8,
    /// 0-59
    minute: u8,
    /// 0-59
    second: u8,
    weekday: Weekday,
    /// 1-366
    day_of_year: u16,
    is_dst: bool,
    utc_offset_seconds: i64,
    abbreviation: Option<String>,
    unix_timestamp: i64,
}

impl BrokenDownTime {
    /// Break `local` into fields. `local` must already carry the offset in `zone`.
    pub(crate) fn new(local: OffsetDateTime, zone: ZoneOffset) -> Self {
        Self {
            year: local.year(),
            month: u8::from(local.month()),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
            weekday: local.weekday(),
            day_of_year: local.ordinal(),
            is_dst: zone.is_dst,
            utc_offset_seconds: i64::from(zone.offset.whole_seconds()),
            abbreviation: zone.abbreviation,
            unix_timestamp: local.unix_timestamp(),
        }
    }

    /// The calendar year, e.g. 2024.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of the year, starting from 1 for January.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The day of the month, starting from 1.
    pub fn day(&self) -> u8 {
        self.day
    }

    /// The hour of the day, 0-23.
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// The minute of the hour, 0-59.
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// The second of the minute, 0-59.
    pub fn second(&self) -> u8 {
        self.second
    }

    /// The day of the week.
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// The day of the year, starting from 1 for January 1st.
    pub fn day_of_year(&self) -> u16 {
        self.day_of_year
    }

    /// Whether daylight saving time was in effect.
    ///
    /// This is `false` when the host only reported a bare offset.
    pub fn is_dst(&self) -> bool {
        self.is_dst
    }

    /// Seconds east of UTC, including any daylight saving adjustment.
    pub fn utc_offset_seconds(&self) -> i64 {
        self.utc_offset_seconds
    }

    /// The zone abbreviation, e.g. "NZDT", when the zone is known by name.
    pub fn abbreviation(&self) -> Option<&str> {
        self.abbreviation.as_deref()
    }

    /// The instant as seconds since the Unix epoch.
    pub fn unix_timestamp(&self) -> i64 {
        self.unix_timestamp
    }
}
