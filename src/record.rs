//! Redirect record codec.
//!
//! A stored value is exactly three ASCII digits (the HTTP status code), one
//! separator byte, and the redirect target as the remaining bytes. The
//! status is taken at face value: "999" decodes successfully and is passed
//! through uninterpreted.

use thiserror::Error;

/// Minimum length of an encoded value: three digits plus the separator.
pub const MIN_VALUE_LEN: usize = 4;

/// Separator written by `encode`. `decode` accepts any byte in that slot.
pub const SEPARATOR: u8 = b' ';

/// Decoded form of a stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRecord {
    pub status: u16,
    pub location: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("value too short: {0} bytes, need at least {MIN_VALUE_LEN}")]
    TooShort(usize),

    #[error("status bytes are not ASCII digits")]
    NonDigitStatus,

    #[error("location is not valid UTF-8")]
    BadLocation,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("status {0} does not fit in three digits")]
    StatusOutOfRange(u16),
}

/// Decode a stored value into a redirect record.
///
/// The location is length-checked and dynamically sized; a value of exactly
/// `MIN_VALUE_LEN` bytes decodes to an empty location.
pub fn decode(value: &[u8]) -> Result<RedirectRecord, DecodeError> {
    if value.len() < MIN_VALUE_LEN {
        return Err(DecodeError::TooShort(value.len()));
    }

    let mut status: u16 = 0;
    for &b in &value[..3] {
        if !b.is_ascii_digit() {
            return Err(DecodeError::NonDigitStatus);
        }
        status = status * 10 + u16::from(b - b'0');
    }

    // value[3] is the separator; nothing to check there.
    let location = std::str::from_utf8(&value[MIN_VALUE_LEN..])
        .map_err(|_| DecodeError::BadLocation)?
        .to_string();

    Ok(RedirectRecord { status, location })
}

/// Encode a status code and redirect target into the stored value format.
///
/// Symmetric with `decode`; used by the store population tool and tests.
pub fn encode(status: u16, location: &str) -> Result<Vec<u8>, EncodeError> {
    if status > 999 {
        return Err(EncodeError::StatusOutOfRange(status));
    }

    let mut value = Vec::with_capacity(MIN_VALUE_LEN + location.len());
    value.extend_from_slice(format!("{status:03}").as_bytes());
    value.push(SEPARATOR);
    value.extend_from_slice(location.as_bytes());
    Ok(value)
}
