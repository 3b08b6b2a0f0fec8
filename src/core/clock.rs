use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

const ID_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");
const LOG_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Current wall-clock time in the local offset, falling back to UTC when the
/// offset cannot be determined.
#[must_use]
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// One-second resolution identifier used for update artifacts and backup
/// branches (`YYYYMMDD_HHMMSS`).
#[must_use]
pub fn timestamp_id(at: OffsetDateTime) -> String {
    at.format(ID_FORMAT).unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Timestamp rendered at the start of every log line.
#[must_use]
pub fn log_timestamp(at: OffsetDateTime) -> String {
    at.format(LOG_FORMAT).unwrap_or_else(|_| at.to_string())
}
