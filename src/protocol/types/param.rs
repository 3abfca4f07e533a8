//! Input parameter values for prepared statements.

use super::server_type::ServerType;

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Tiny(i8),
    Short(i16),
    Long(i32),
    LongLong(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl ParamValue {
    /// Server type the value is sent as.
    pub fn server_type(&self) -> ServerType {
        match self {
            ParamValue::Null => ServerType::Null,
            ParamValue::Tiny(_) => ServerType::Tiny,
            ParamValue::Short(_) => ServerType::Short,
            ParamValue::Long(_) => ServerType::Long,
            ParamValue::LongLong(_) => ServerType::LongLong,
            ParamValue::Float(_) => ServerType::Float,
            ParamValue::Double(_) => ServerType::Double,
            ParamValue::Text(_) => ServerType::VarString,
            ParamValue::Blob(_) => ServerType::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// Native-endian encoding of the value, as an engine sends it in a
    /// binary-protocol execute.
    pub fn to_native_bytes(&self) -> Vec<u8> {
        match self {
            ParamValue::Null => Vec::new(),
            ParamValue::Tiny(v) => v.to_ne_bytes().to_vec(),
            ParamValue::Short(v) => v.to_ne_bytes().to_vec(),
            ParamValue::Long(v) => v.to_ne_bytes().to_vec(),
            ParamValue::LongLong(v) => v.to_ne_bytes().to_vec(),
            ParamValue::Float(v) => v.to_ne_bytes().to_vec(),
            ParamValue::Double(v) => v.to_ne_bytes().to_vec(),
            ParamValue::Text(s) => s.as_bytes().to_vec(),
            ParamValue::Blob(b) => b.clone(),
        }
    }
}

macro_rules! impl_from_param {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(v: $ty) -> Self {
                    ParamValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_param! {
    i8 => Tiny,
    i16 => Short,
    i32 => Long,
    i64 => LongLong,
    f32 => Float,
    f64 => Double,
    String => Text,
    &str => Text,
    Vec<u8> => Blob,
    &[u8] => Blob,
}

impl From<isize> for ParamValue {
    fn from(v: isize) -> Self {
        ParamValue::LongLong(v as i64)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::Null, Into::into)
    }
}
