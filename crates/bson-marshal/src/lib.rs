//! Marshaling between a dynamic host value model and BSON special types.
//!
//! Five value types cover the BSON leaves that need bespoke handling:
//! [`ObjectId`] (12-byte identifiers, 24-hex external form), [`UtcDate`]
//! (microsecond timestamps with a millisecond wire form), [`BinData`]
//! (tagged binary payloads), [`Regex`] (pattern/flags pairs parsed from
//! `/pattern/flags` literals), and [`Code`] (code fragments with a
//! variable-binding scope). Each type offers construction from dynamic
//! host arguments (`from_args`), a `Display` rendering, and its leaf wire
//! conversion; [`BsonEncoder`]/[`BsonDecoder`] tie the leaves into whole
//! documents.
//!
//! # Example
//!
//! ```
//! use bson_marshal::{BsonDecoder, BsonEncoder, HostValue, ObjectId};
//!
//! let id = ObjectId::parse("4af9f23d8ead0e1d32000000")?;
//! let doc = vec![("_id".to_owned(), HostValue::ObjectId(id))];
//!
//! let bytes = BsonEncoder::new().encode(&doc)?;
//! assert_eq!(BsonDecoder::new().decode(&bytes)?, doc);
//! # Ok::<(), bson_marshal::MarshalError>(())
//! ```

mod bindata;
mod code;
mod date;
mod document;
mod error;
mod host_value;
mod oid;
mod regex;

pub mod ejson;

pub use bindata::{subtype, BinData};
pub use code::Code;
pub use date::UtcDate;
pub use document::{BsonDecoder, BsonEncoder, DocumentDecoder, DocumentEncoder};
pub use error::MarshalError;
pub use host_value::HostValue;
pub use oid::{ObjectId, OidGenerator};
pub use regex::Regex;
