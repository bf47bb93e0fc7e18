//! Object identifiers and their process-wide generator.
//!
//! An [`ObjectId`] is 12 raw bytes, externally a 24-character lowercase hex
//! string. The wire layout is 4 big-endian bytes of epoch seconds, 5
//! process-specific bytes, and a 3-byte big-endian counter.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::{HostValue, MarshalError};

/// A 12-byte document identifier.
///
/// Immutable once constructed. [`ObjectId::parse`] accepts hex digits of
/// either case; the canonical rendering is always lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    bytes: [u8; 12],
}

impl ObjectId {
    /// Parses a 24-character hex string into an id.
    ///
    /// Anything that is not exactly 24 hex digits fails with
    /// [`MarshalError::InvalidObjectId`].
    pub fn parse(hex: &str) -> Result<ObjectId, MarshalError> {
        let raw = hex.as_bytes();
        if raw.len() != 24 {
            return Err(MarshalError::InvalidObjectId(hex.to_owned()));
        }
        let mut bytes = [0u8; 12];
        for (i, pair) in raw.chunks_exact(2).enumerate() {
            match (hex_digit(pair[0]), hex_digit(pair[1])) {
                (Some(hi), Some(lo)) => bytes[i] = (hi << 4) | lo,
                _ => return Err(MarshalError::InvalidObjectId(hex.to_owned())),
            }
        }
        Ok(ObjectId { bytes })
    }

    /// Wraps 12 raw bytes read off the wire.
    pub fn from_bytes(bytes: [u8; 12]) -> ObjectId {
        ObjectId { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// The 24-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// Host construction entry point.
    ///
    /// No arguments generates a fresh id from `generator`; a single string
    /// argument is parsed as hex.
    pub fn from_args(
        args: &[HostValue],
        generator: &OidGenerator,
    ) -> Result<ObjectId, MarshalError> {
        match args {
            [] => Ok(generator.generate()),
            [HostValue::Str(hex)] => ObjectId::parse(hex),
            [other] => Err(MarshalError::ArgumentType {
                expected: "(string)",
                got: other.kind(),
            }),
            _ => Err(MarshalError::ArgumentArity {
                expected: "0 or 1",
                got: args.len(),
            }),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Identifier generator with process-wide state.
///
/// The 5 process bytes are fixed at creation; the counter is atomic, so a
/// shared `&OidGenerator` can be hit from multiple threads without two
/// calls ever producing the same id within one process.
pub struct OidGenerator {
    process: [u8; 5],
    counter: AtomicU32,
}

impl OidGenerator {
    /// Creates a generator seeded from the thread RNG and the process id.
    pub fn new() -> OidGenerator {
        let mut rng = rand::thread_rng();
        let mut process = [0u8; 5];
        rng.fill(&mut process[..]);
        let pid = std::process::id();
        process[3] ^= (pid >> 8) as u8;
        process[4] ^= pid as u8;
        OidGenerator {
            process,
            counter: AtomicU32::new(rng.gen()),
        }
    }

    /// Creates a generator with pinned state, for deterministic ids.
    pub fn with_state(process: [u8; 5], counter: u32) -> OidGenerator {
        OidGenerator {
            process,
            counter: AtomicU32::new(counter),
        }
    }

    /// Generates a fresh id: epoch seconds, process bytes, next counter.
    pub fn generate(&self) -> ObjectId {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0) as u32;
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process);
        bytes[9] = (count >> 16) as u8;
        bytes[10] = (count >> 8) as u8;
        bytes[11] = count as u8;
        ObjectId { bytes }
    }
}

impl Default for OidGenerator {
    fn default() -> Self {
        Self::new()
    }
}
