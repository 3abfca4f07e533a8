//! Numeric decoders for bound output buffers.
//!
//! Integer and floating point columns are written by the engine in native
//! byte order at their fixed width: 1 byte for TINYINT, 2 for SMALLINT and
//! YEAR, 4 for MEDIUMINT and INT, 8 for BIGINT, 4/8 for FLOAT/DOUBLE.

use crate::error::{Error, Result};
use crate::protocol::types::{ServerType, Value};

fn take<const N: usize>(data: &[u8], server_type: ServerType) -> Result<[u8; N]> {
    data.get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            Error::type_conversion(format!(
                "{} value must be {} bytes, got {}",
                server_type,
                N,
                data.len()
            ))
        })
}

/// Decode a native integer. `unsigned` selects `Value::UInt`.
pub fn decode_native_integer(
    server_type: ServerType,
    unsigned: bool,
    data: &[u8],
) -> Result<Value> {
    let value = match (server_type, unsigned) {
        (ServerType::Tiny, false) => {
            Value::Int(i8::from_ne_bytes(take::<1>(data, server_type)?) as i64)
        }
        (ServerType::Tiny, true) => {
            Value::UInt(u8::from_ne_bytes(take::<1>(data, server_type)?) as u64)
        }
        (ServerType::Short, false) => {
            Value::Int(i16::from_ne_bytes(take::<2>(data, server_type)?) as i64)
        }
        // YEAR is always non-negative.
        (ServerType::Short, true) | (ServerType::Year, _) => {
            Value::UInt(u16::from_ne_bytes(take::<2>(data, server_type)?) as u64)
        }
        (ServerType::Int24 | ServerType::Long, false) => {
            Value::Int(i32::from_ne_bytes(take::<4>(data, server_type)?) as i64)
        }
        (ServerType::Int24 | ServerType::Long, true) => {
            Value::UInt(u32::from_ne_bytes(take::<4>(data, server_type)?) as u64)
        }
        (ServerType::LongLong, false) => {
            Value::Int(i64::from_ne_bytes(take::<8>(data, server_type)?))
        }
        (ServerType::LongLong, true) => {
            Value::UInt(u64::from_ne_bytes(take::<8>(data, server_type)?))
        }
        _ => {
            return Err(Error::type_conversion(format!(
                "{} is not an integer type",
                server_type
            )))
        }
    };
    Ok(value)
}

/// Decode a native FLOAT or DOUBLE.
pub fn decode_native_float(server_type: ServerType, data: &[u8]) -> Result<Value> {
    match server_type {
        ServerType::Float => Ok(Value::Float(
            f32::from_ne_bytes(take::<4>(data, server_type)?) as f64,
        )),
        ServerType::Double => Ok(Value::Float(f64::from_ne_bytes(take::<8>(
            data,
            server_type,
        )?))),
        _ => Err(Error::type_conversion(format!(
            "{} is not a floating point type",
            server_type
        ))),
    }
}

/// Parse a textual integer.
pub fn parse_text_integer(text: &str, unsigned: bool) -> Result<Value> {
    let invalid = || Error::type_conversion(format!("Invalid integer '{}'", text));
    if unsigned {
        text.parse::<u64>().map(Value::UInt).map_err(|_| invalid())
    } else {
        text.parse::<i64>().map(Value::Int).map_err(|_| invalid())
    }
}

/// Parse a textual FLOAT or DOUBLE.
pub fn parse_text_float(text: &str) -> Result<Value> {
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| Error::type_conversion(format!("Invalid float '{}'", text)))
}
