//! Value decoders for text-protocol and bound-buffer rows.
//!
//! | Server type | Text row | Bound row |
//! |-------------|----------|-----------|
//! | integers, YEAR | `number::parse_text_integer` | `number::decode_native_integer` |
//! | FLOAT, DOUBLE | `number::parse_text_float` | `number::decode_native_float` |
//! | DATE | `date::parse_text_date` | `date::NativeTime` |
//! | DATETIME, TIMESTAMP | `date::parse_text_datetime` | `date::NativeTime` |
//! | TIME | `date::parse_text_time` | `date::NativeTime` |
//! | DECIMAL | UTF-8 text | UTF-8 text |
//!
//! Everything else is returned as raw bytes.

mod date;
mod number;

pub use date::{parse_text_date, parse_text_datetime, parse_text_time, NativeTime, TimeKind};
pub use number::{decode_native_float, decode_native_integer, parse_text_float, parse_text_integer};

use crate::error::{Error, Result};
use crate::protocol::types::{ColumnMetadata, ServerType, Value};

fn utf8<'a>(column: &ColumnMetadata, data: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(data).map_err(|_| {
        Error::type_conversion(format!("column {} is not valid UTF-8", column.name))
    })
}

/// Decode a text-protocol cell.
pub fn decode_text_value(column: &ColumnMetadata, data: Option<&[u8]>) -> Result<Value> {
    let Some(data) = data else {
        return Ok(Value::Null);
    };
    let t = column.server_type;

    if t.is_integer() {
        parse_text_integer(utf8(column, data)?, column.flags.is_unsigned() || t == ServerType::Year)
    } else if t.is_float() {
        parse_text_float(utf8(column, data)?)
    } else if t.is_decimal() {
        Ok(Value::Decimal(utf8(column, data)?.to_string()))
    } else {
        match t {
            ServerType::Date | ServerType::NewDate => {
                parse_text_date(utf8(column, data)?).map(Value::Date)
            }
            ServerType::DateTime | ServerType::Timestamp => {
                parse_text_datetime(utf8(column, data)?).map(Value::DateTime)
            }
            ServerType::Time => parse_text_time(utf8(column, data)?).map(Value::Time),
            _ => Ok(Value::Bytes(data.to_vec())),
        }
    }
}

/// Decode a bound output buffer.
pub fn decode_bound_value(column: &ColumnMetadata, data: Option<&[u8]>) -> Result<Value> {
    let Some(data) = data else {
        return Ok(Value::Null);
    };
    let t = column.server_type;

    if t.is_integer() {
        decode_native_integer(t, column.flags.is_unsigned(), data)
    } else if t.is_float() {
        decode_native_float(t, data)
    } else if t.is_decimal() {
        Ok(Value::Decimal(utf8(column, data)?.to_string()))
    } else if t.is_temporal() {
        let native = NativeTime::from_bytes(data)?;
        match t {
            ServerType::Date => native.to_date().map(Value::Date),
            ServerType::Time => Ok(Value::Time(native.to_duration())),
            _ => native.to_datetime().map(Value::DateTime),
        }
    } else {
        // NEWDATE is bound as variable-length text.
        match t {
            ServerType::NewDate => parse_text_date(utf8(column, data)?).map(Value::Date),
            _ => Ok(Value::Bytes(data.to_vec())),
        }
    }
}
