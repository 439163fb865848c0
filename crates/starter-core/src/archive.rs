//! Deterministic zip packaging of a generated project directory
//!
//! The archive depends only on the directory contents and the timestamp
//! passed in: entries are written in sorted path order and every entry gets
//! the same modification time, so identical projects zip to identical bytes.

use chrono::{Days, NaiveDate, NaiveDateTime};
use std::fmt;
use std::io::{Cursor, Write};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::ProjectError;

/// Default entry timestamp, 2021-01-01 00:00:00
pub const DEFAULT_TIMESTAMP: (u16, u8, u8, u8, u8, u8) = (2021, 1, 1, 0, 0, 0);

/// Modification time stamped on every archive entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveTimestamp(DateTime);

impl ArchiveTimestamp {
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, zip::result::DateTimeRangeError> {
        DateTime::from_date_and_time(year, month, day, hour, minute, second).map(Self)
    }

    pub fn as_zip_datetime(&self) -> DateTime {
        self.0
    }

    fn to_naive(self) -> Option<NaiveDateTime> {
        let dt = self.0;
        NaiveDate::from_ymd_opt(dt.year().into(), dt.month().into(), dt.day().into())?.and_hms_opt(
            dt.hour().into(),
            dt.minute().into(),
            dt.second().into(),
        )
    }

    /// Accept the timestamp only if it lies at least one day before `now`
    pub fn ensure_in_past(self, now: NaiveDateTime) -> Result<Self, String> {
        let latest = now
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| format!("cannot compute a day before {}", now))?;
        match self.to_naive() {
            Some(stamp) if stamp <= latest => Ok(self),
            _ => Err(format!(
                "archive timestamp {} must be at least one day in the past",
                self
            )),
        }
    }
}

impl fmt::Display for ArchiveTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.0;
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second()
        )
    }
}

impl Default for ArchiveTimestamp {
    fn default() -> Self {
        let (year, month, day, hour, minute, second) = DEFAULT_TIMESTAMP;
        Self::new(year, month, day, hour, minute, second).unwrap_or(Self(DateTime::default()))
    }
}

impl std::str::FromStr for ArchiveTimestamp {
    type Err = String;

    /// Parses `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date, time) = s.split_once('T').unwrap_or((s, "00:00:00"));
        let date: Vec<&str> = date.split('-').collect();
        let time: Vec<&str> = time.split(':').collect();
        if date.len() != 3 || time.len() != 3 {
            return Err(format!("invalid archive timestamp '{}'", s));
        }
        let num = |part: &str| {
            part.parse::<u16>()
                .map_err(|_| format!("invalid archive timestamp '{}'", s))
        };
        let small = |part: &str| num(part).map(|n| n.min(u8::MAX as u16) as u8);
        Self::new(
            num(date[0])?,
            small(date[1])?,
            small(date[2])?,
            small(time[0])?,
            small(time[1])?,
            small(time[2])?,
        )
        .map_err(|_| format!("archive timestamp out of zip range '{}'", s))
    }
}

/// Zip `dir` with every entry nested under `root_name/`.
///
/// Directories get explicit entries and unix permission bits are kept, so
/// wrapper scripts stay executable after extraction.
pub fn zip_directory(
    dir: &Path,
    root_name: &str,
    timestamp: ArchiveTimestamp,
) -> Result<Vec<u8>, ProjectError> {
    let mut zip_buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
        let base_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(timestamp.as_zip_datetime());

        zip.add_directory(format!("{}/", root_name), base_options.unix_permissions(0o755))?;

        for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                ProjectError::Io(std::io::Error::other(format!("failed to walk project: {}", e)))
            })?;
            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(|e| ProjectError::Io(std::io::Error::other(e.to_string())))?;
            let name = format!("{}/{}", root_name, to_zip_path(relative));
            let options = base_options.unix_permissions(permissions(&entry)?);

            if entry.file_type().is_dir() {
                zip.add_directory(format!("{}/", name), options)?;
            } else {
                let content = std::fs::read(entry.path())?;
                zip.start_file(name, options)?;
                zip.write_all(&content)?;
            }
        }

        zip.finish()?;
    }
    Ok(zip_buffer)
}

fn to_zip_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn permissions(entry: &walkdir::DirEntry) -> Result<u32, ProjectError> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = entry
        .metadata()
        .map_err(|e| ProjectError::Io(std::io::Error::other(e.to_string())))?;
    Ok(metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permissions(entry: &walkdir::DirEntry) -> Result<u32, ProjectError> {
    Ok(if entry.file_type().is_dir() { 0o755 } else { 0o644 })
}
