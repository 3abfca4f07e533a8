//! Server column type enum and buffer sizing.
//!
//! `ServerType` mirrors the type code reported in field metadata. Each
//! variant knows how large a bound output buffer must be: fixed-width types
//! get an exact size, everything else is sized at fetch time.

use crate::protocol::constants::*;

/// Buffer requirement for a bound output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSize {
    /// Exactly this many bytes, allocated once.
    Fixed(usize),
    /// Length is known only once a row has been fetched.
    Variable,
}

impl BufferSize {
    /// Byte size, or 0 for variable-length columns.
    pub fn bytes(self) -> usize {
        match self {
            BufferSize::Fixed(n) => n,
            BufferSize::Variable => 0,
        }
    }

    pub fn is_variable(self) -> bool {
        matches!(self, BufferSize::Variable)
    }
}

/// Column type reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerType {
    /// TINYINT.
    Tiny,
    /// SMALLINT.
    Short,
    /// MEDIUMINT.
    Int24,
    /// INT.
    Long,
    /// BIGINT.
    LongLong,
    /// FLOAT.
    Float,
    /// DOUBLE, REAL.
    Double,
    /// YEAR.
    Year,
    /// TIME.
    Time,
    /// DATE.
    Date,
    /// DATETIME.
    DateTime,
    /// TIMESTAMP.
    Timestamp,
    /// Legacy DECIMAL.
    Decimal,
    /// Precision math DECIMAL, NUMERIC.
    NewDecimal,
    /// Internal date type.
    NewDate,
    /// CHAR, BINARY.
    String,
    /// VARCHAR as sent in binary-protocol metadata.
    Varchar,
    /// VARCHAR, VARBINARY.
    VarString,
    /// TINYBLOB, TINYTEXT.
    TinyBlob,
    /// BLOB, TEXT.
    Blob,
    /// MEDIUMBLOB, MEDIUMTEXT.
    MediumBlob,
    /// LONGBLOB, LONGTEXT.
    LongBlob,
    /// BIT(n).
    Bit,
    /// JSON.
    Json,
    /// ENUM.
    Enum,
    /// SET.
    Set,
    /// Spatial types.
    Geometry,
    /// NULL literal column.
    Null,
    /// A code this crate does not know about.
    Unknown(u8),
}

impl ServerType {
    /// Map a raw type code. Unrecognized codes become `Unknown` rather than
    /// failing.
    pub fn from_raw(code: u8) -> Self {
        match code {
            MYSQL_TYPE_TINY => ServerType::Tiny,
            MYSQL_TYPE_SHORT => ServerType::Short,
            MYSQL_TYPE_INT24 => ServerType::Int24,
            MYSQL_TYPE_LONG => ServerType::Long,
            MYSQL_TYPE_LONGLONG => ServerType::LongLong,
            MYSQL_TYPE_FLOAT => ServerType::Float,
            MYSQL_TYPE_DOUBLE => ServerType::Double,
            MYSQL_TYPE_YEAR => ServerType::Year,
            MYSQL_TYPE_TIME => ServerType::Time,
            MYSQL_TYPE_DATE => ServerType::Date,
            MYSQL_TYPE_DATETIME => ServerType::DateTime,
            MYSQL_TYPE_TIMESTAMP => ServerType::Timestamp,
            MYSQL_TYPE_DECIMAL => ServerType::Decimal,
            MYSQL_TYPE_NEWDECIMAL => ServerType::NewDecimal,
            MYSQL_TYPE_NEWDATE => ServerType::NewDate,
            MYSQL_TYPE_STRING => ServerType::String,
            MYSQL_TYPE_VARCHAR => ServerType::Varchar,
            MYSQL_TYPE_VAR_STRING => ServerType::VarString,
            MYSQL_TYPE_TINY_BLOB => ServerType::TinyBlob,
            MYSQL_TYPE_BLOB => ServerType::Blob,
            MYSQL_TYPE_MEDIUM_BLOB => ServerType::MediumBlob,
            MYSQL_TYPE_LONG_BLOB => ServerType::LongBlob,
            MYSQL_TYPE_BIT => ServerType::Bit,
            MYSQL_TYPE_JSON => ServerType::Json,
            MYSQL_TYPE_ENUM => ServerType::Enum,
            MYSQL_TYPE_SET => ServerType::Set,
            MYSQL_TYPE_GEOMETRY => ServerType::Geometry,
            MYSQL_TYPE_NULL => ServerType::Null,
            other => ServerType::Unknown(other),
        }
    }

    /// Get the raw type code.
    pub fn type_code(&self) -> u8 {
        match self {
            ServerType::Tiny => MYSQL_TYPE_TINY,
            ServerType::Short => MYSQL_TYPE_SHORT,
            ServerType::Int24 => MYSQL_TYPE_INT24,
            ServerType::Long => MYSQL_TYPE_LONG,
            ServerType::LongLong => MYSQL_TYPE_LONGLONG,
            ServerType::Float => MYSQL_TYPE_FLOAT,
            ServerType::Double => MYSQL_TYPE_DOUBLE,
            ServerType::Year => MYSQL_TYPE_YEAR,
            ServerType::Time => MYSQL_TYPE_TIME,
            ServerType::Date => MYSQL_TYPE_DATE,
            ServerType::DateTime => MYSQL_TYPE_DATETIME,
            ServerType::Timestamp => MYSQL_TYPE_TIMESTAMP,
            ServerType::Decimal => MYSQL_TYPE_DECIMAL,
            ServerType::NewDecimal => MYSQL_TYPE_NEWDECIMAL,
            ServerType::NewDate => MYSQL_TYPE_NEWDATE,
            ServerType::String => MYSQL_TYPE_STRING,
            ServerType::Varchar => MYSQL_TYPE_VARCHAR,
            ServerType::VarString => MYSQL_TYPE_VAR_STRING,
            ServerType::TinyBlob => MYSQL_TYPE_TINY_BLOB,
            ServerType::Blob => MYSQL_TYPE_BLOB,
            ServerType::MediumBlob => MYSQL_TYPE_MEDIUM_BLOB,
            ServerType::LongBlob => MYSQL_TYPE_LONG_BLOB,
            ServerType::Bit => MYSQL_TYPE_BIT,
            ServerType::Json => MYSQL_TYPE_JSON,
            ServerType::Enum => MYSQL_TYPE_ENUM,
            ServerType::Set => MYSQL_TYPE_SET,
            ServerType::Geometry => MYSQL_TYPE_GEOMETRY,
            ServerType::Null => MYSQL_TYPE_NULL,
            ServerType::Unknown(code) => *code,
        }
    }

    /// Output buffer size needed to bind a column of this type.
    ///
    /// Integers and floats use their native width and temporal types use the
    /// native time record. Decimals, strings, blobs, bit fields and any type
    /// not listed are variable-length.
    pub fn buffer_size(&self) -> BufferSize {
        match self {
            ServerType::Tiny => BufferSize::Fixed(1),
            ServerType::Short | ServerType::Year => BufferSize::Fixed(2),
            ServerType::Int24 | ServerType::Long => BufferSize::Fixed(4),
            ServerType::LongLong => BufferSize::Fixed(8),
            ServerType::Float => BufferSize::Fixed(4),
            ServerType::Double => BufferSize::Fixed(8),
            ServerType::Time | ServerType::Date | ServerType::DateTime | ServerType::Timestamp => {
                BufferSize::Fixed(NATIVE_TIME_SIZE)
            }
            _ => BufferSize::Variable,
        }
    }

    /// Whether values are integers.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ServerType::Tiny
                | ServerType::Short
                | ServerType::Int24
                | ServerType::Long
                | ServerType::LongLong
                | ServerType::Year
        )
    }

    /// Whether values are floating point.
    pub fn is_float(&self) -> bool {
        matches!(self, ServerType::Float | ServerType::Double)
    }

    /// Whether values are dates, times or timestamps.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ServerType::Time | ServerType::Date | ServerType::DateTime | ServerType::Timestamp
        )
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, ServerType::Decimal | ServerType::NewDecimal)
    }
}

impl std::fmt::Display for ServerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerType::Tiny => write!(f, "TINYINT"),
            ServerType::Short => write!(f, "SMALLINT"),
            ServerType::Int24 => write!(f, "MEDIUMINT"),
            ServerType::Long => write!(f, "INT"),
            ServerType::LongLong => write!(f, "BIGINT"),
            ServerType::Float => write!(f, "FLOAT"),
            ServerType::Double => write!(f, "DOUBLE"),
            ServerType::Year => write!(f, "YEAR"),
            ServerType::Time => write!(f, "TIME"),
            ServerType::Date | ServerType::NewDate => write!(f, "DATE"),
            ServerType::DateTime => write!(f, "DATETIME"),
            ServerType::Timestamp => write!(f, "TIMESTAMP"),
            ServerType::Decimal | ServerType::NewDecimal => write!(f, "DECIMAL"),
            ServerType::String => write!(f, "CHAR"),
            ServerType::Varchar | ServerType::VarString => write!(f, "VARCHAR"),
            ServerType::TinyBlob => write!(f, "TINYBLOB"),
            ServerType::Blob => write!(f, "BLOB"),
            ServerType::MediumBlob => write!(f, "MEDIUMBLOB"),
            ServerType::LongBlob => write!(f, "LONGBLOB"),
            ServerType::Bit => write!(f, "BIT"),
            ServerType::Json => write!(f, "JSON"),
            ServerType::Enum => write!(f, "ENUM"),
            ServerType::Set => write!(f, "SET"),
            ServerType::Geometry => write!(f, "GEOMETRY"),
            ServerType::Null => write!(f, "NULL"),
            ServerType::Unknown(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}
