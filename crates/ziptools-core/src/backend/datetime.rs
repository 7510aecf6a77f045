//! Conversion between ZIP (MS-DOS) timestamps and `SystemTime`.
//!
//! ZIP entries carry no timezone; timestamps are read and written as UTC.

use std::time::Duration;
use std::time::SystemTime;

use chrono::Datelike;
use chrono::NaiveDate;
use chrono::Timelike;
use chrono::Utc;
use zip::DateTime;

/// Converts a ZIP timestamp to `SystemTime`.
///
/// Returns `None` for timestamps that do not form a valid calendar date
/// (some writers store all-zero fields).
pub fn to_system_time(stamp: DateTime) -> Option<SystemTime> {
    let date = NaiveDate::from_ymd_opt(
        i32::from(stamp.year()),
        u32::from(stamp.month()),
        u32::from(stamp.day()),
    )?;
    let naive = date.and_hms_opt(
        u32::from(stamp.hour()),
        u32::from(stamp.minute()),
        u32::from(stamp.second()),
    )?;
    let secs = u64::try_from(naive.and_utc().timestamp()).ok()?;
    SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(secs))
}

/// Converts `SystemTime` to a ZIP timestamp.
///
/// Times outside the DOS range (1980..=2107) clamp to the DOS epoch.
pub fn from_system_time(time: SystemTime) -> DateTime {
    let utc: chrono::DateTime<Utc> = time.into();
    dos_fields(&utc)
        .and_then(|(year, month, day, hour, minute, second)| {
            DateTime::from_date_and_time(year, month, day, hour, minute, second).ok()
        })
        .unwrap_or_default()
}

fn dos_fields(utc: &chrono::DateTime<Utc>) -> Option<(u16, u8, u8, u8, u8, u8)> {
    Some((
        u16::try_from(utc.year()).ok()?,
        u8::try_from(utc.month()).ok()?,
        u8::try_from(utc.day()).ok()?,
        u8::try_from(utc.hour()).ok()?,
        u8::try_from(utc.minute()).ok()?,
        u8::try_from(utc.second()).ok()?,
    ))
}
