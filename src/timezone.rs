//! Selecting the time zone used for local time and resolving its offset.

use std::fmt;

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

use crate::{Error, host_zone};

/// The name accepted by [TimeZoneSetting::from_name] for the host's zone.
pub const HOST_TIMEZONE_NAME: &str = "host";

/// Which time zone local times are converted into.
#[derive(Clone, Copy, Default)]
pub enum TimeZoneSetting {
    /// Whatever the host is configured with, via `TZ` or `/etc/localtime`.
    #[default]
    Host,
    /// A canonical IANA time zone, e.g. "Pacific/Auckland".
    Named(&'static Tz),
}

impl TimeZoneSetting {
    /// Parse a time zone setting.
    ///
    /// An empty string or "host" (any case) selects the host zone, anything
    /// else must be a canonical timezone name.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if `name` is not a known time zone.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        if name.is_empty() || name.eq_ignore_ascii_case(HOST_TIMEZONE_NAME) {
            return Ok(Self::Host);
        }

        time_tz::timezones::get_by_name(name)
            .map(Self::Named)
            .ok_or_else(|| Error::InvalidTimezone(name.to_owned()))
    }

    /// The setting's name, "host" or the IANA name.
    pub fn name(&self) -> &str {
        match self {
            Self::Host => HOST_TIMEZONE_NAME,
            Self::Named(tz) => tz.name(),
        }
    }

    /// Resolve the offset in effect at `instant`.
    pub(crate) fn offset_at(&self, instant: OffsetDateTime) -> Result<ZoneOffset, Error> {
        match self {
            Self::Host => host_zone::host_offset_at(instant),
            Self::Named(tz) => Ok(ZoneOffset::from_tz(tz, instant)),
        }
    }
}

impl fmt::Debug for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => f.write_str("Host"),
            Self::Named(tz) => f.debug_tuple("Named").field(&tz.name()).finish(),
        }
    }
}

impl PartialEq for TimeZoneSetting {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Host, Self::Host) => true,
            (Self::Named(left), Self::Named(right)) => left.name() == right.name(),
            _ => false,
        }
    }
}

impl fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The UTC offset of a zone at a particular instant.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ZoneOffset {
    pub(crate) offset: UtcOffset,
    pub(crate) is_dst: bool,
    pub(crate) abbreviation: Option<String>,
}

impl ZoneOffset {
    pub(crate) fn from_tz(tz: &Tz, instant: OffsetDateTime) -> Self {
        Self::from_offset(&tz.get_offset_utc(&instant))
    }

    pub(crate) fn from_offset(offset: &impl Offset) -> Self {
        Self {
            offset: offset.to_utc(),
            is_dst: offset.is_dst(),
            abbreviation: Some(offset.name().to_owned()),
        }
    }

    pub(crate) fn utc() -> Self {
        Self {
            offset: UtcOffset::UTC,
            is_dst: false,
            abbreviation: Some("UTC".to_owned()),
        }
    }
}
