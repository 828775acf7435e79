//! Hour slots and the `reservationTime` timestamp format.
//!
//! `reservationTime` is always written as UTC with millisecond precision and a
//! `Z` suffix. Every stored timestamp has the same width, so the store's
//! lexicographic `<` on strings agrees with chronological order.

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveTime, SecondsFormat, TimeZone,
    Timelike, Utc,
};

use crate::utils::error::ValidationError;

pub const SLOTS_PER_DAY: u32 = 24;

const DATE_FORMAT: &str = "%Y-%m-%d";
const SLOT_FORMAT: &str = "%H:%M";

/// 產生 24 個整點時段，從目前小時開始並繞回午夜
pub fn generate_time_slots(current_hour: u32) -> Vec<String> {
    let start = current_hour % SLOTS_PER_DAY;
    (0..SLOTS_PER_DAY)
        .map(|i| format!("{:02}:00", (start + i) % SLOTS_PER_DAY))
        .collect()
}

pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn invalid(date: &str, time: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidSchedule {
        date: date.to_string(),
        time: time.to_string(),
        reason: reason.into(),
    }
}

pub fn parse_date(date: &str, time: &str) -> Result<NaiveDate, ValidationError> {
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| invalid(date, time, format!("date: {}", e)))?;
    // 衝突檢查用字串比對，只接受標準寫法
    if parsed.format(DATE_FORMAT).to_string() != date {
        return Err(invalid(date, time, "date must be written as YYYY-MM-DD"));
    }
    Ok(parsed)
}

pub fn parse_slot(date: &str, time: &str) -> Result<NaiveTime, ValidationError> {
    let parsed = NaiveTime::parse_from_str(time, SLOT_FORMAT)
        .map_err(|e| invalid(date, time, format!("time: {}", e)))?;
    if parsed.minute() != 0 || parsed.format(SLOT_FORMAT).to_string() != time {
        return Err(invalid(date, time, "time must be an hour slot written as HH:00"));
    }
    Ok(parsed)
}

/// How a local `date` + `time` pair maps onto an absolute instant.
///
/// `Host` follows the host time zone's rules for each date, so daylight-saving
/// transitions are honoured. `Fixed` pins every date to one offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalConvention {
    Host,
    Fixed(FixedOffset),
}

impl From<FixedOffset> for LocalConvention {
    fn from(offset: FixedOffset) -> Self {
        LocalConvention::Fixed(offset)
    }
}

impl LocalConvention {
    /// 目前的本地小時，用於產生時段
    pub fn hour_at(&self, now: DateTime<Utc>) -> u32 {
        match self {
            LocalConvention::Host => now.with_timezone(&Local).hour(),
            LocalConvention::Fixed(offset) => now.with_timezone(offset).hour(),
        }
    }

    pub fn format_local(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        match self {
            LocalConvention::Host => instant.with_timezone(&Local).format(pattern).to_string(),
            LocalConvention::Fixed(offset) => {
                instant.with_timezone(offset).format(pattern).to_string()
            }
        }
    }
}

/// 把本地日期與時段合併成絕對時間
pub fn reservation_instant(
    date: &str,
    time: &str,
    convention: LocalConvention,
) -> Result<DateTime<Utc>, ValidationError> {
    let local = parse_date(date, time)?.and_time(parse_slot(date, time)?);
    match convention {
        LocalConvention::Host => match Local.from_local_datetime(&local) {
            LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
            // 秋季回撥時同一時段出現兩次，取較早者
            LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => Err(invalid(
                date,
                time,
                "this slot does not exist in the host time zone",
            )),
        },
        LocalConvention::Fixed(offset) => offset
            .from_local_datetime(&local)
            .single()
            .map(|instant| instant.with_timezone(&Utc))
            .ok_or_else(|| invalid(date, time, "ambiguous local time")),
    }
}

/// Parses `+03:00`, `-05:30`, `+0300`, `Z` or `UTC`.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    raw.parse::<FixedOffset>().ok()
}
