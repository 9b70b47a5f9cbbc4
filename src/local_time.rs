//! Reading the current local time.

use crate::{
    BrokenDownTime, Error,
    clock::{Clock, SystemClock},
    timezone::TimeZoneSetting,
};

/// Reads the current instant from a [Clock] and converts it to local time.
///
/// The reader holds no mutable state. Every call reads the clock again and
/// resolves the zone offset for that instant, so one reader can be shared
/// between threads.
#[derive(Debug, Clone)]
pub struct LocalTimeReader<C = SystemClock> {
    clock: C,
    timezone: TimeZoneSetting,
}

impl LocalTimeReader {
    /// A reader using the system clock and the host time zone.
    pub fn new() -> Self {
        Self::with_timezone(TimeZoneSetting::Host)
    }

    /// A reader using the system clock and `timezone`.
    pub fn with_timezone(timezone: TimeZoneSetting) -> Self {
        Self::with_clock(SystemClock, timezone)
    }
}

impl Default for LocalTimeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> LocalTimeReader<C> {
    /// A reader that gets the current instant from `clock`.
    pub fn with_clock(clock: C, timezone: TimeZoneSetting) -> Self {
        Self { clock, timezone }
    }

    /// The time zone local times are converted into.
    pub fn timezone(&self) -> TimeZoneSetting {
        self.timezone
    }

    /// Get the current time broken down into local calendar fields.
    ///
    /// # Errors
    /// - [Error::ClockUnavailable] if the clock cannot provide the current instant.
    /// - [Error::TimeZoneConversion] if the instant cannot be converted to local time.
    pub fn current_local_time(&self) -> Result<BrokenDownTime, Error> {
        let now = self.clock.now()?;
        let zone = self.timezone.offset_at(now)?;

        let local = now.checked_to_offset(zone.offset).ok_or_else(|| {
            Error::TimeZoneConversion(format!(
                "{now} is out of range with offset {}",
                zone.offset
            ))
        })?;

        tracing::debug!("read local time {local} in time zone {}", self.timezone);

        Ok(BrokenDownTime::new(local, zone))
    }
}

/// Get the current local time using the system clock and host time zone.
///
/// # Errors
/// See [LocalTimeReader::current_local_time].
pub fn current_local_time() -> Result<BrokenDownTime, Error> {
    LocalTimeReader::new().current_local_time()
}

/// The UTC offset of `record` in seconds, positive east of UTC.
///
/// This reads the offset stored in the record and never touches the clock.
pub fn utc_offset_seconds(record: &BrokenDownTime) -> i64 {
    record.utc_offset_seconds()
}
