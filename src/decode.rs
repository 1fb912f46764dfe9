//! Per-attribute value decoding.
//!
//! Rules are chosen by logical attribute, not by storage type: several
//! attributes share a binary column type but mean different things.
use std::fmt::{self, Write};

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};

use crate::config::{DecodeOptions, TimestampZone};
use crate::sid::{Sid, SidError};

/// 100ns intervals between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET: i64 = 116_444_736_000_000_000;
const FILETIME_TICKS_PER_SEC: i64 = 10_000_000;
/// Last year a file-time is rendered for. Later values, including the
/// `i64::MAX` "never expires" marker, are out of range.
const MAX_RENDERED_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeRule {
    Sid,
    Utf16,
    U32,
    FileTime,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected} bytes, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("UTF-16 value has odd length {0}")]
    OddUtf16Length(usize),
    #[error("malformed SID: {0}")]
    MalformedSid(#[from] SidError),
    #[error("file-time {0} is outside the representable range")]
    TimestampOutOfRange(i64),
    #[error("invalid timestamp format {0:?}")]
    TimestampFormat(String),
}

/// Decode `bytes` under `rule`. `Ok(None)` means the value is present but
/// semantically unset (a non-positive file-time).
pub fn decode(
    rule: DecodeRule,
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<Option<String>, DecodeError> {
    match rule {
        DecodeRule::Sid => Ok(Some(Sid::from_bytes(bytes)?.to_string())),
        DecodeRule::Utf16 => decode_utf16(bytes).map(Some),
        DecodeRule::U32 => Ok(Some(decode_u32(bytes)?.to_string())),
        DecodeRule::FileTime => decode_filetime(bytes, options),
    }
}

pub fn decode_u32(bytes: &[u8]) -> Result<u32, DecodeError> {
    let raw: [u8; 4] = bytes.try_into().map_err(|_| DecodeError::WidthMismatch {
        expected: 4,
        actual: bytes.len(),
    })?;
    Ok(u32::from_le_bytes(raw))
}

pub fn decode_i64(bytes: &[u8]) -> Result<i64, DecodeError> {
    let raw: [u8; 8] = bytes.try_into().map_err(|_| DecodeError::WidthMismatch {
        expected: 8,
        actual: bytes.len(),
    })?;
    Ok(i64::from_le_bytes(raw))
}

/// UTF-16LE text. Unpaired surrogates become U+FFFD.
pub fn decode_utf16(bytes: &[u8]) -> Result<String, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddUtf16Length(bytes.len()));
    }
    let units = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]));
    Ok(char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

/// Convert a file-time tick count to UTC. `None` when out of chrono's range.
pub fn filetime_to_utc(ticks: i64) -> Option<DateTime<Utc>> {
    let since_unix = i128::from(ticks) - i128::from(FILETIME_UNIX_OFFSET);
    let secs = since_unix.div_euclid(i128::from(FILETIME_TICKS_PER_SEC));
    let nanos = since_unix.rem_euclid(i128::from(FILETIME_TICKS_PER_SEC)) * 100;
    DateTime::from_timestamp(i64::try_from(secs).ok()?, u32::try_from(nanos).ok()?)
}

pub fn decode_filetime(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<Option<String>, DecodeError> {
    let ticks = decode_i64(bytes)?;
    if ticks <= 0 {
        return Ok(None);
    }
    let utc = filetime_to_utc(ticks).ok_or(DecodeError::TimestampOutOfRange(ticks))?;
    let text = match options.timestamp_zone {
        TimestampZone::Utc => render(&utc, ticks, &options.timestamp_format)?,
        TimestampZone::Local => {
            render(&utc.with_timezone(&Local), ticks, &options.timestamp_format)?
        }
    };
    Ok(Some(text))
}

fn render<Tz>(at: &DateTime<Tz>, ticks: i64, format: &str) -> Result<String, DecodeError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if at.year() > MAX_RENDERED_YEAR {
        return Err(DecodeError::TimestampOutOfRange(ticks));
    }
    let mut text = String::new();
    write!(text, "{}", at.format(format))
        .map_err(|_| DecodeError::TimestampFormat(format.to_string()))?;
    Ok(text)
}
