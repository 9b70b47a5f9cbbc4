//! Defines the crate level error type.

/// The errors that may occur while reading the local time.
///
/// None of these are retried internally. A clock or time zone failure is a
/// property of the host environment, so the caller decides whether to abort
/// or substitute a fallback time.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The clock could not supply the current instant.
    ///
    /// Callers should pass in a description of the underlying failure.
    #[error("the clock could not provide the current time: {0}")]
    ClockUnavailable(String),

    /// The current instant could not be converted to local calendar time,
    /// e.g., the host time zone configuration is missing or corrupt.
    #[error("could not convert to local time: {0}")]
    TimeZoneConversion(String),

    /// A time zone name did not match a canonical IANA time zone.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}
