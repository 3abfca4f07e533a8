//! Temporal decoders.
//!
//! Bound TIME/DATE/DATETIME/TIMESTAMP columns are written by the engine as a
//! 40-byte native record (all fields native-endian):
//! - bytes[0..24]: year, month, day, hour, minute, second (u32 each)
//! - bytes[24..32]: microseconds (u64)
//! - byte[32]: negative flag (TIME only)
//! - bytes[33..36]: padding
//! - bytes[36..40]: time kind (i32)
//!
//! Text-protocol values arrive as `YYYY-MM-DD`, `YYYY-MM-DD hh:mm:ss[.ffffff]`
//! and `[-]hhh:mm:ss[.ffffff]`.

use crate::error::{Error, Result};
use crate::protocol::constants::NATIVE_TIME_SIZE;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// Kind tag stored in the native temporal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeKind {
    None,
    Date,
    DateTime,
    Time,
}

impl TimeKind {
    fn from_raw(raw: i32) -> Self {
        match raw {
            0 => TimeKind::Date,
            1 => TimeKind::DateTime,
            2 => TimeKind::Time,
            _ => TimeKind::None,
        }
    }

    fn to_raw(self) -> i32 {
        match self {
            TimeKind::None => -1,
            TimeKind::Date => 0,
            TimeKind::DateTime => 1,
            TimeKind::Time => 2,
        }
    }
}

/// Native temporal record as bound for temporal output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeTime {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u64,
    pub negative: bool,
    pub kind: TimeKind,
}

impl NativeTime {
    /// A DATE value.
    pub fn date(year: u32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            microsecond: 0,
            negative: false,
            kind: TimeKind::Date,
        }
    }

    /// A DATETIME or TIMESTAMP value.
    pub fn datetime(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
            kind: TimeKind::DateTime,
            ..Self::date(year, month, day)
        }
    }

    /// A TIME value. Hours may exceed 23.
    pub fn time(negative: bool, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year: 0,
            month: 0,
            day: 0,
            hour,
            minute,
            second,
            microsecond: 0,
            negative,
            kind: TimeKind::Time,
        }
    }

    pub fn with_microsecond(mut self, microsecond: u64) -> Self {
        self.microsecond = microsecond;
        self
    }

    /// Decode from the 40-byte native layout.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < NATIVE_TIME_SIZE {
            return Err(Error::type_conversion(format!(
                "temporal value must be {} bytes, got {}",
                NATIVE_TIME_SIZE,
                data.len()
            )));
        }

        let u32_at = |offset: usize| {
            u32::from_ne_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ])
        };
        let mut micros = [0u8; 8];
        micros.copy_from_slice(&data[24..32]);

        Ok(Self {
            year: u32_at(0),
            month: u32_at(4),
            day: u32_at(8),
            hour: u32_at(12),
            minute: u32_at(16),
            second: u32_at(20),
            microsecond: u64::from_ne_bytes(micros),
            negative: data[32] != 0,
            kind: TimeKind::from_raw(u32_at(36) as i32),
        })
    }

    /// Encode into the 40-byte native layout.
    pub fn write_to(&self, out: &mut [u8]) -> Result<()> {
        if out.len() < NATIVE_TIME_SIZE {
            return Err(Error::type_conversion(format!(
                "temporal buffer must be {} bytes, got {}",
                NATIVE_TIME_SIZE,
                out.len()
            )));
        }

        let fields = [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ];
        for (i, field) in fields.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&field.to_ne_bytes());
        }
        out[24..32].copy_from_slice(&self.microsecond.to_ne_bytes());
        out[32] = self.negative as u8;
        out[33..36].fill(0);
        out[36..40].copy_from_slice(&self.kind.to_raw().to_ne_bytes());
        Ok(())
    }

    /// Encode into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; NATIVE_TIME_SIZE];
        // Cannot fail: the buffer has the required size.
        let _ = self.write_to(&mut out);
        out
    }

    pub fn to_date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month, self.day).ok_or_else(|| {
            Error::type_conversion(format!(
                "Invalid DATE: year={}, month={}, day={}",
                self.year, self.month, self.day
            ))
        })
    }

    pub fn to_datetime(&self) -> Result<NaiveDateTime> {
        let date = self.to_date()?;
        let time = NaiveTime::from_hms_micro_opt(
            self.hour,
            self.minute,
            self.second,
            self.microsecond as u32,
        )
        .ok_or_else(|| {
            Error::type_conversion(format!(
                "Invalid TIME: hour={}, minute={}, second={}",
                self.hour, self.minute, self.second
            ))
        })?;
        Ok(NaiveDateTime::new(date, time))
    }

    pub fn to_duration(&self) -> TimeDelta {
        let magnitude = TimeDelta::seconds(
            self.day as i64 * 86_400
                + self.hour as i64 * 3600
                + self.minute as i64 * 60
                + self.second as i64,
        ) + TimeDelta::microseconds(self.microsecond as i64);
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Parse a textual DATE.
pub fn parse_text_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| Error::type_conversion(format!("Invalid DATE '{}': {}", text, e)))
}

/// Parse a textual DATETIME or TIMESTAMP.
pub fn parse_text_datetime(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| parse_text_date(text).map(|d| d.and_time(NaiveTime::default())))
        .map_err(|_| Error::type_conversion(format!("Invalid DATETIME '{}'", text)))
}

/// Parse a textual TIME (`[-]hhh:mm:ss[.ffffff]`).
pub fn parse_text_time(text: &str) -> Result<TimeDelta> {
    let invalid = || Error::type_conversion(format!("Invalid TIME '{}'", text));

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (clock, fraction) = body.split_once('.').unwrap_or((body, ""));

    let mut parts = clock.split(':');
    let hours: i64 = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
    let minutes: i64 = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
    let seconds: i64 = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
    if parts.next().is_some() || minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    let micros = if fraction.is_empty() {
        0
    } else {
        if fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        // Right-pad to six digits: ".25" is 250000 microseconds.
        format!("{:0<6}", fraction).parse::<i64>().map_err(|_| invalid())?
    };

    let magnitude = TimeDelta::seconds(hours * 3600 + minutes * 60 + seconds)
        + TimeDelta::microseconds(micros);
    Ok(if negative { -magnitude } else { magnitude })
}
