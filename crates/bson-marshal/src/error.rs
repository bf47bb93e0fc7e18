//! Marshaling error type.

use thiserror::Error;

/// Error type for special-type construction and wire encoding/decoding.
///
/// Construction failures (`ArgumentArity`, `ArgumentType`, malformed input)
/// are caller errors and abort the construction; no partially-initialized
/// value is returned. Decode failures are terminal for the single call that
/// raised them. Nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarshalError {
    #[error("expected {expected} arguments, got {got}")]
    ArgumentArity { expected: &'static str, got: usize },
    #[error("incorrect argument types, expected {expected}, got {got}")]
    ArgumentType {
        expected: &'static str,
        got: &'static str,
    },
    #[error("object id is not a 24-digit hex string: {0:?}")]
    InvalidObjectId(String),
    #[error("regular expression literal is not of the form /pattern/flags: {0:?}")]
    InvalidRegexLiteral(String),
    #[error("{0} must not contain NUL bytes")]
    EmbeddedNul(&'static str),
    #[error("binary subtype out of range: {0}")]
    InvalidSubtype(i64),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unsupported element type: 0x{0:02x}")]
    UnsupportedType(u8),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("invalid document size: {0}")]
    InvalidSize(i32),
    #[error("invalid {0} wrapper")]
    InvalidExtendedJson(&'static str),
}
