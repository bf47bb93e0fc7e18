//! [`HostValue`], the dynamic host-language value model.

use crate::{BinData, Code, ObjectId, Regex, UtcDate};

/// A value as seen by the host language's dynamic object model.
///
/// Documents are ordered name/value pairs; field order is preserved through
/// encoding and decoding. `Bytes` is a host-side convenience for raw binary
/// payloads: it encodes as generic [`BinData`] and never comes back out of
/// a decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<HostValue>),
    Document(Vec<(String, HostValue)>),
    ObjectId(ObjectId),
    Date(UtcDate),
    BinData(BinData),
    Regex(Regex),
    Code(Code),
}

impl HostValue {
    /// Short human-readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Str(_) => "string",
            HostValue::Bytes(_) => "bytes",
            HostValue::Array(_) => "array",
            HostValue::Document(_) => "document",
            HostValue::ObjectId(_) => "object id",
            HostValue::Date(_) => "date",
            HostValue::BinData(_) => "binary data",
            HostValue::Regex(_) => "regex",
            HostValue::Code(_) => "code",
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.to_owned())
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Int(n)
    }
}
