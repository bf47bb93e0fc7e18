//! Opaque binary payloads with a subtype tag.

use std::fmt;

use crate::{HostValue, MarshalError};

/// Binary subtype tags.
pub mod subtype {
    pub const GENERIC: u8 = 0x00;
    pub const FUNCTION: u8 = 0x01;
    pub const BINARY_OLD: u8 = 0x02;
    pub const UUID_OLD: u8 = 0x03;
    pub const UUID: u8 = 0x04;
    pub const MD5: u8 = 0x05;
    pub const USER_DEFINED: u8 = 0x80;
}

/// A byte payload plus its subtype tag.
///
/// The stored length is always the payload's true length; a payload with
/// embedded NUL bytes is never truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinData {
    bytes: Vec<u8>,
    subtype: u8,
}

impl BinData {
    pub fn new(bytes: Vec<u8>, subtype: u8) -> BinData {
        BinData { bytes, subtype }
    }

    /// A payload with the generic byte-array tag.
    pub fn generic(bytes: Vec<u8>) -> BinData {
        BinData::new(bytes, subtype::GENERIC)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn subtype(&self) -> u8 {
        self.subtype
    }

    /// Host construction entry point.
    ///
    /// One payload argument defaults the subtype to generic; a second
    /// integer argument sets it explicitly. Any other arity is fatal.
    pub fn from_args(args: &[HostValue]) -> Result<BinData, MarshalError> {
        match args {
            [payload] => Ok(BinData::generic(payload_bytes(payload, "(bytes)")?)),
            [payload, HostValue::Int(tag)] => {
                if !(0..=255).contains(tag) {
                    return Err(MarshalError::InvalidSubtype(*tag));
                }
                Ok(BinData::new(payload_bytes(payload, "(bytes, int)")?, *tag as u8))
            }
            [_, other] => Err(MarshalError::ArgumentType {
                expected: "(bytes, int)",
                got: other.kind(),
            }),
            _ => Err(MarshalError::ArgumentArity {
                expected: "1 or 2",
                got: args.len(),
            }),
        }
    }
}

impl fmt::Display for BinData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the payload itself is never rendered
        f.write_str("<binary data>")
    }
}

fn payload_bytes(value: &HostValue, expected: &'static str) -> Result<Vec<u8>, MarshalError> {
    match value {
        HostValue::Bytes(bytes) => Ok(bytes.clone()),
        HostValue::Str(s) => Ok(s.clone().into_bytes()),
        other => Err(MarshalError::ArgumentType {
            expected,
            got: other.kind(),
        }),
    }
}
