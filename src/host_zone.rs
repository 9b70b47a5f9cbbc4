//! Resolving the time zone the host is configured with.
//!
//! The lookup follows the C library: the `TZ` environment variable wins when
//! it is set, otherwise `/etc/localtime` decides. Everything here reads plain
//! files and strings, so it is safe to call from any thread. The OS offset
//! query is only asked when the configuration cannot be understood.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Tz, posix_tz::PosixTz};

use crate::{Error, timezone::ZoneOffset};

const TZ_VARIABLE: &str = "TZ";
#[cfg(unix)]
const LOCALTIME_PATH: &str = "/etc/localtime";
#[cfg(unix)]
const TIMEZONE_PATH: &str = "/etc/timezone";
const ZONEINFO_MARKER: &str = "zoneinfo/";
const TZIF_MAGIC: &[u8] = b"TZif";

/// Where the host's time zone configuration lives.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HostZoneSource {
    /// The value of `TZ`.
    Variable(String),
    /// A compiled zone file and the optional file naming the zone.
    Files {
        localtime: PathBuf,
        timezone: PathBuf,
    },
}

impl HostZoneSource {
    fn from_env() -> Result<Self, String> {
        match env::var(TZ_VARIABLE) {
            Ok(value) => Ok(Self::Variable(value)),
            #[cfg(unix)]
            Err(env::VarError::NotPresent) => Ok(Self::Files {
                localtime: PathBuf::from(LOCALTIME_PATH),
                timezone: PathBuf::from(TIMEZONE_PATH),
            }),
            #[cfg(not(unix))]
            Err(env::VarError::NotPresent) => Err("TZ is not set".to_owned()),
            Err(env::VarError::NotUnicode(value)) => Err(format!("TZ={value:?} is not unicode")),
        }
    }

    fn offset_at(&self, instant: OffsetDateTime) -> Result<ZoneOffset, String> {
        match self {
            Self::Variable(value) => offset_from_variable(value, instant),
            Self::Files {
                localtime,
                timezone,
            } => offset_from_files(localtime, timezone, instant),
        }
    }
}

/// The host's offset at `instant`.
pub(crate) fn host_offset_at(instant: OffsetDateTime) -> Result<ZoneOffset, Error> {
    let reason = match HostZoneSource::from_env().and_then(|source| source.offset_at(instant)) {
        Ok(zone) => return Ok(zone),
        Err(reason) => reason,
    };

    tracing::warn!("could not resolve the host time zone ({reason}), asking the OS");

    UtcOffset::local_offset_at(instant)
        .map(|offset| ZoneOffset {
            offset,
            is_dst: false,
            abbreviation: None,
        })
        .map_err(|os_error| Error::TimeZoneConversion(format!("{reason}; {os_error}")))
}

/// Interpret `TZ` the way the C library does: empty means UTC, a leading ':'
/// is dropped, then it is a zone name, a zone file path or a POSIX TZ string.
fn offset_from_variable(value: &str, instant: OffsetDateTime) -> Result<ZoneOffset, String> {
    let spec = value.strip_prefix(':').unwrap_or(value);

    if spec.is_empty() {
        return Ok(ZoneOffset::utc());
    }

    if let Some(tz) = zone_by_name(spec) {
        return Ok(ZoneOffset::from_tz(tz, instant));
    }

    if Path::new(spec).is_absolute() {
        let bytes = fs::read(spec).map_err(|error| format!("could not read {spec}: {error}"))?;
        return offset_from_tzif(&bytes, instant).map_err(|reason| format!("{spec}: {reason}"));
    }

    offset_from_posix_string(spec, instant).map_err(|reason| format!("TZ={value}: {reason}"))
}

/// Resolve the zone from `localtime`: by the name of the zone it links to,
/// then by the name in `timezone`, then by the TZ string at the end of the
/// `localtime` contents. A missing `localtime` means UTC.
///
/// time-tz only applies POSIX daylight saving rules that start and end in the
/// same calendar year, so southern hemisphere TZ strings need the zone name.
fn offset_from_files(
    localtime: &Path,
    timezone: &Path,
    instant: OffsetDateTime,
) -> Result<ZoneOffset, String> {
    let linked_zone = fs::read_link(localtime)
        .ok()
        .and_then(|target| target.to_str().and_then(zone_by_name));

    if let Some(tz) = linked_zone {
        return Ok(ZoneOffset::from_tz(tz, instant));
    }

    let bytes = match fs::read(localtime) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} does not exist, using UTC", localtime.display());
            return Ok(ZoneOffset::utc());
        }
        Err(error) => return Err(format!("could not read {}: {error}", localtime.display())),
    };

    let named_zone = fs::read_to_string(timezone)
        .ok()
        .and_then(|name| zone_by_name(name.trim()));

    if let Some(tz) = named_zone {
        return Ok(ZoneOffset::from_tz(tz, instant));
    }

    offset_from_tzif(&bytes, instant).map_err(|reason| format!("{}: {reason}", localtime.display()))
}

/// Look up a zone by its IANA name, or by a path into a zoneinfo directory.
fn zone_by_name(name: &str) -> Option<&'static Tz> {
    time_tz::timezones::get_by_name(name).or_else(|| {
        let (_, zone_name) = name.rsplit_once(ZONEINFO_MARKER)?;
        let zone_name = zone_name
            .strip_prefix("posix/")
            .or_else(|| zone_name.strip_prefix("right/"))
            .unwrap_or(zone_name);

        time_tz::timezones::get_by_name(zone_name)
    })
}

fn offset_from_tzif(bytes: &[u8], instant: OffsetDateTime) -> Result<ZoneOffset, String> {
    offset_from_posix_string(tzif_footer(bytes)?, instant)
}

fn offset_from_posix_string(spec: &str, instant: OffsetDateTime) -> Result<ZoneOffset, String> {
    let posix = PosixTz::parse(spec)
        .map_err(|error| format!("invalid POSIX TZ string {spec:?}: {error}"))?;
    let offset = posix
        .get_offset(&instant)
        .map_err(|error| error.to_string())?;

    Ok(ZoneOffset::from_offset(&offset))
}

/// The POSIX TZ string that version 2+ TZif files end with, between the last
/// two newlines. It describes the rules for instants after the last
/// transition in the file.
fn tzif_footer(bytes: &[u8]) -> Result<&str, String> {
    if !bytes.starts_with(TZIF_MAGIC) {
        return Err("not a TZif file".to_owned());
    }

    if bytes.get(4).is_none_or(|version| *version == 0) {
        return Err("version 1 TZif files have no TZ string".to_owned());
    }

    let body = bytes
        .strip_suffix(b"\n")
        .ok_or_else(|| "TZif file does not end with a TZ string".to_owned())?;
    let start = body
        .iter()
        .rposition(|byte| *byte == b'\n')
        .ok_or_else(|| "TZif file does not end with a TZ string".to_owned())?;

    let footer = std::str::from_utf8(&body[start + 1..])
        .map_err(|_| "TZ string is not unicode".to_owned())?;

    if footer.is_empty() {
        return Err("TZif file has an empty TZ string".to_owned());
    }

    Ok(footer)
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf};

    use time::{OffsetDateTime, macros::datetime};

    use super::{offset_from_files, offset_from_variable, tzif_footer};

    const WINTER: OffsetDateTime = datetime!(2024-01-15 12:00:00 UTC);
    const SUMMER: OffsetDateTime = datetime!(2024-07-15 12:00:00 UTC);

    /// A minimal version 2 TZif file: header, an arbitrary binary body and
    /// the TZ string footer.
    fn tzif_v2(footer: &str) -> Vec<u8> {
        let mut bytes = b"TZif2".to_vec();
        bytes.extend_from_slice(&[0; 15]);
        bytes.extend_from_slice(&[0x0a, 0xff, 0x00, 0x0a, 0x7f]);
        bytes.push(b'\n');
        bytes.extend_from_slice(footer.as_bytes());
        bytes.push(b'\n');
        bytes
    }

    /// A fresh directory standing in for `/etc`.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("wallclock-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn empty_variable_is_utc() {
        for value in ["", ":"] {
            let got = offset_from_variable(value, WINTER).unwrap();

            assert_eq!(got.offset.whole_seconds(), 0, "TZ={value:?}");
        }
    }

    #[test]
    fn variable_zone_name() {
        for value in ["Asia/Tokyo", ":Asia/Tokyo", "/usr/share/zoneinfo/Asia/Tokyo"] {
            let got = offset_from_variable(value, WINTER).unwrap();

            assert_eq!(got.offset.whole_seconds(), 32_400, "TZ={value:?}");
            assert!(!got.is_dst);
        }
    }

    #[test]
    fn variable_zoneinfo_subdirectory_path() {
        let got = offset_from_variable("/usr/share/zoneinfo/posix/Pacific/Auckland", WINTER).unwrap();

        assert_eq!(got.offset.whole_seconds(), 13 * 3600);
        assert!(got.is_dst);
    }

    #[test]
    fn variable_posix_fixed_offset() {
        let got = offset_from_variable("JST-9", SUMMER).unwrap();

        assert_eq!(got.offset.whole_seconds(), 32_400);
        assert!(!got.is_dst);
        assert_eq!(got.abbreviation.as_deref(), Some("JST"));
    }

    #[test]
    fn variable_posix_daylight_saving_rule() {
        let spec = "EST5EDT,M3.2.0,M11.1.0";

        let summer = offset_from_variable(spec, SUMMER).unwrap();
        let winter = offset_from_variable(spec, WINTER).unwrap();

        assert_eq!(summer.offset.whole_seconds(), -4 * 3600);
        assert!(summer.is_dst);
        assert_eq!(winter.offset.whole_seconds(), -5 * 3600);
        assert!(!winter.is_dst);
    }

    #[test]
    fn variable_garbage_is_rejected() {
        let got = offset_from_variable("not a zone!", WINTER);

        assert!(got.is_err(), "got {got:?}");
    }

    #[test]
    fn variable_missing_zone_file_is_rejected() {
        let got = offset_from_variable("/nonexistent/zone/file", WINTER);

        assert!(got.is_err(), "got {got:?}");
    }

    #[test]
    fn footer_is_read_from_tzif_v2() {
        assert_eq!(tzif_footer(&tzif_v2("JST-9")), Ok("JST-9"));
    }

    #[test]
    fn footer_requires_tzif_magic() {
        assert!(tzif_footer(b"Asia/Tokyo\n").is_err());
    }

    #[test]
    fn footer_is_missing_from_tzif_v1() {
        let mut bytes = b"TZif".to_vec();
        bytes.extend_from_slice(&[0; 40]);

        assert!(tzif_footer(&bytes).is_err());
    }

    #[test]
    fn footer_may_not_be_empty() {
        assert!(tzif_footer(&tzif_v2("")).is_err());
    }

    #[test]
    fn regular_localtime_file_uses_its_footer() {
        let dir = scratch_dir("regular-localtime");
        let localtime = dir.join("localtime");
        fs::write(&localtime, tzif_v2("JST-9")).unwrap();

        let got = offset_from_files(&localtime, &dir.join("timezone"), WINTER).unwrap();

        assert_eq!(got.offset.whole_seconds(), 32_400);
    }

    #[test]
    fn timezone_file_is_preferred_over_footer() {
        let dir = scratch_dir("timezone-file-first");
        let localtime = dir.join("localtime");
        let timezone = dir.join("timezone");
        fs::write(&localtime, tzif_v2("NZST-12NZDT,M9.5.0,M4.1.0/3")).unwrap();
        fs::write(&timezone, "Pacific/Auckland\n").unwrap();

        let got = offset_from_files(&localtime, &timezone, WINTER).unwrap();

        assert_eq!(got.offset.whole_seconds(), 13 * 3600);
        assert!(got.is_dst);
    }

    #[test]
    fn unknown_timezone_file_falls_back_to_footer() {
        let dir = scratch_dir("unknown-timezone-file");
        let localtime = dir.join("localtime");
        let timezone = dir.join("timezone");
        fs::write(&localtime, tzif_v2("JST-9")).unwrap();
        fs::write(&timezone, "Nowhere/Special\n").unwrap();

        let got = offset_from_files(&localtime, &timezone, WINTER).unwrap();

        assert_eq!(got.offset.whole_seconds(), 32_400);
    }

    #[test]
    fn timezone_file_names_zone_when_localtime_has_no_footer() {
        let dir = scratch_dir("timezone-file");
        let localtime = dir.join("localtime");
        let timezone = dir.join("timezone");
        fs::write(&localtime, b"TZif\0rest of a version 1 file").unwrap();
        fs::write(&timezone, "Pacific/Auckland\n").unwrap();

        let got = offset_from_files(&localtime, &timezone, SUMMER).unwrap();

        assert_eq!(got.offset.whole_seconds(), 12 * 3600);
        assert_eq!(got.abbreviation.as_deref(), Some("NZST"));
    }

    #[test]
    fn unreadable_configuration_is_rejected() {
        let dir = scratch_dir("unreadable");
        let localtime = dir.join("localtime");
        fs::write(&localtime, b"definitely not a zone file").unwrap();

        let got = offset_from_files(&localtime, &dir.join("timezone"), WINTER);

        assert!(got.is_err(), "got {got:?}");
    }

    #[test]
    fn missing_localtime_is_utc() {
        let dir = scratch_dir("missing-localtime");

        let got = offset_from_files(&dir.join("localtime"), &dir.join("timezone"), WINTER).unwrap();

        assert_eq!(got.offset.whole_seconds(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_localtime_uses_zone_name() {
        let dir = scratch_dir("symlinked-localtime");
        let localtime = dir.join("localtime");
        std::os::unix::fs::symlink("/usr/share/zoneinfo/Pacific/Auckland", &localtime).unwrap();

        let got = offset_from_files(&localtime, &dir.join("timezone"), WINTER).unwrap();

        assert_eq!(got.offset.whole_seconds(), 13 * 3600);
        assert!(got.is_dst);
        assert_eq!(got.abbreviation.as_deref(), Some("NZDT"));
    }
}
