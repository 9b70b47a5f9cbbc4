//! Wallclock reads the current time from the operating system and breaks it
//! into local calendar fields.
//!
//! ```no_run
//! let now = wallclock::current_local_time()?;
//! println!("UTC offset: {}s", wallclock::utc_offset_seconds(&now));
//! # Ok::<(), wallclock::Error>(())
//! ```
//!
//! Local time follows the host's time zone by default. Use
//! [LocalTimeReader::with_timezone] to pin a canonical IANA zone instead.

#![warn(missing_docs)]

mod broken_down_time;
mod clock;
mod error;
mod host_zone;
mod local_time;
mod timezone;

pub use broken_down_time::BrokenDownTime;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::Error;
pub use local_time::{LocalTimeReader, current_local_time, utc_offset_seconds};
pub use timezone::{HOST_TIMEZONE_NAME, TimeZoneSetting};
