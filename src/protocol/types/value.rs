//! Owned column values.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;

/// A single decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Signed integer (TINYINT .. BIGINT, YEAR).
    Int(i64),
    /// Integer column carrying the UNSIGNED flag.
    UInt(u64),
    /// FLOAT or DOUBLE.
    Float(f64),
    /// DECIMAL as its exact textual form.
    Decimal(String),
    /// Strings, blobs, bit fields and anything without a richer mapping.
    Bytes(Vec<u8>),
    /// DATE.
    Date(NaiveDate),
    /// DATETIME or TIMESTAMP.
    DateTime(NaiveDateTime),
    /// TIME, which is a signed duration and may exceed 24 hours.
    Time(TimeDelta),
}

impl Value {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get the value as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            Value::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Decimal(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Try to convert to i64.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            Value::Decimal(s) => s.parse().ok(),
            Value::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to u64.
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            Value::Decimal(s) => s.parse().ok(),
            Value::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Decimal(s) => s.parse().ok(),
            Value::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Try to get the value as a date and time.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            _ => None,
        }
    }

    /// Try to get the value as a TIME duration.
    pub fn as_time(&self) -> Option<TimeDelta> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(s) => write!(f, "{}", s),
            Value::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "<BINARY: {} bytes>", b.len()),
            },
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Time(t) => {
                let sign = if *t < TimeDelta::zero() { "-" } else { "" };
                let total = t.num_seconds().unsigned_abs();
                let micros = t.subsec_nanos().unsigned_abs() / 1_000;
                write!(
                    f,
                    "{}{:02}:{:02}:{:02}",
                    sign,
                    total / 3600,
                    (total % 3600) / 60,
                    total % 60
                )?;
                if micros != 0 {
                    write!(f, ".{:06}", micros)?;
                }
                Ok(())
            }
        }
    }
}
