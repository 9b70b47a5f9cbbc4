//! Sources of the current instant.

use std::time::{SystemTime, UNIX_EPOCH};

use time::OffsetDateTime;

use crate::Error;

/// Something that can tell the current time.
///
/// Implementations return a UTC instant with the sub-second part dropped.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC, at seconds resolution.
    fn now(&self) -> Result<OffsetDateTime, Error>;
}

/// The operating system's wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<OffsetDateTime, Error> {
        let timestamp = unix_seconds(SystemTime::now())?;

        OffsetDateTime::from_unix_timestamp(timestamp)
            .map_err(|error| Error::ClockUnavailable(error.to_string()))
    }
}

/// Whole seconds since the Unix epoch, rounded toward negative infinity so
/// that instants before 1970 stay in the correct second.
fn unix_seconds(system_time: SystemTime) -> Result<i64, Error> {
    let out_of_range =
        || Error::ClockUnavailable(format!("{system_time:?} is out of range for a timestamp"));

    match system_time.duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => i64::try_from(since_epoch.as_secs()).map_err(|_| out_of_range()),
        Err(error) => {
            let before_epoch = error.duration();
            let whole_seconds = i64::try_from(before_epoch.as_secs()).map_err(|_| out_of_range())?;
            let partial_second = i64::from(before_epoch.subsec_nanos() > 0);

            Ok(-whole_seconds - partial_second)
        }
    }
}

/// A clock that is stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock {
    instant: OffsetDateTime,
}

impl FixedClock {
    /// Create a clock that always reports `instant`, converted to UTC and
    /// truncated to whole seconds.
    pub fn new(instant: OffsetDateTime) -> Self {
        let utc = instant.to_offset(time::UtcOffset::UTC);

        Self {
            instant: utc.replace_nanosecond(0).unwrap_or(utc),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Result<OffsetDateTime, Error> {
        Ok(self.instant)
    }
}
