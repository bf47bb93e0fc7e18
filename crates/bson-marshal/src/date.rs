//! UTC timestamps with microsecond precision.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{HostValue, MarshalError};

/// A UTC timestamp as an `(epoch seconds, microseconds)` pair.
///
/// The wire form is a single signed 64-bit epoch-milliseconds integer, so
/// only millisecond granularity survives a round trip; sub-millisecond
/// precision present before encoding is always lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcDate {
    sec: i64,
    usec: u32,
}

impl UtcDate {
    /// Builds a timestamp, carrying microsecond overflow into seconds so
    /// `usec` always lands in `0..1_000_000`.
    pub fn new(sec: i64, usec: u32) -> UtcDate {
        UtcDate {
            sec: sec + (usec / 1_000_000) as i64,
            usec: usec % 1_000_000,
        }
    }

    /// The current wall-clock time.
    pub fn now() -> UtcDate {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => UtcDate {
                sec: elapsed.as_secs() as i64,
                usec: elapsed.subsec_micros(),
            },
            Err(before_epoch) => {
                let behind = before_epoch.duration();
                UtcDate::from_millis(-(behind.as_millis() as i64))
            }
        }
    }

    /// An explicit epoch-seconds value; microseconds default to zero.
    pub fn from_seconds(sec: i64) -> UtcDate {
        UtcDate { sec, usec: 0 }
    }

    pub fn sec(&self) -> i64 {
        self.sec
    }

    pub fn usec(&self) -> u32 {
        self.usec
    }

    /// Wire encoding: truncating millisecond conversion.
    pub fn to_millis(&self) -> i64 {
        self.sec * 1000 + (self.usec / 1000) as i64
    }

    /// Wire decoding. The euclidean split keeps `usec` in range even for
    /// pre-epoch (negative) inputs.
    pub fn from_millis(millis: i64) -> UtcDate {
        UtcDate {
            sec: millis.div_euclid(1000),
            usec: (millis.rem_euclid(1000) * 1000) as u32,
        }
    }

    /// Host construction entry point: no arguments for the current time,
    /// one integer argument for explicit epoch seconds.
    pub fn from_args(args: &[HostValue]) -> Result<UtcDate, MarshalError> {
        match args {
            [] => Ok(UtcDate::now()),
            [HostValue::Int(sec)] => Ok(UtcDate::from_seconds(*sec)),
            [other] => Err(MarshalError::ArgumentType {
                expected: "(int)",
                got: other.kind(),
            }),
            _ => Err(MarshalError::ArgumentArity {
                expected: "0 or 1",
                got: args.len(),
            }),
        }
    }
}

impl fmt::Display for UtcDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.8} {}", self.usec as f64 / 1_000_000.0, self.sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_roundtrip_is_lossy_below_milliseconds() {
        let date = UtcDate::new(1, 500_000);
        assert_eq!(date.to_millis(), 1500);
        assert_eq!(UtcDate::from_millis(1500), date);

        // 123 microseconds truncate away entirely
        let date = UtcDate::new(10, 123);
        assert_eq!(date.to_millis(), 10_000);
        assert_eq!(UtcDate::from_millis(10_000), UtcDate::new(10, 0));
    }

    #[test]
    fn millis_roundtrip_is_idempotent_at_millisecond_granularity() {
        for (sec, usec) in [(0, 0), (1, 999_999), (1_262_304_000, 250_500)] {
            let date = UtcDate::new(sec, usec);
            let decoded = UtcDate::from_millis(date.to_millis());
            assert_eq!(decoded.sec(), sec);
            assert_eq!(decoded.usec(), (usec / 1000) * 1000);
            // a second trip changes nothing
            assert_eq!(UtcDate::from_millis(decoded.to_millis()), decoded);
        }
    }

    #[test]
    fn negative_millis_keep_usec_in_range() {
        let date = UtcDate::from_millis(-1500);
        assert_eq!(date.sec(), -2);
        assert_eq!(date.usec(), 500_000);
        assert_eq!(date.to_millis(), -1500);
    }

    #[test]
    fn new_carries_microsecond_overflow() {
        let date = UtcDate::new(5, 2_250_000);
        assert_eq!(date.sec(), 7);
        assert_eq!(date.usec(), 250_000);
    }

    #[test]
    fn stringify_fractional_seconds_to_eight_places() {
        assert_eq!(UtcDate::new(1, 500_000).to_string(), "0.50000000 1");
        assert_eq!(UtcDate::from_seconds(1_262_304_000).to_string(), "0.00000000 1262304000");
    }

    #[test]
    fn now_is_recent_and_in_range() {
        let date = UtcDate::now();
        assert!(date.sec() > 1_500_000_000);
        assert!(date.usec() < 1_000_000);
    }

    #[test]
    fn from_args_dispatch() {
        assert_eq!(
            UtcDate::from_args(&[HostValue::Int(42)]).unwrap(),
            UtcDate::from_seconds(42)
        );
        assert!(UtcDate::from_args(&[]).unwrap().sec() > 0);
        assert!(matches!(
            UtcDate::from_args(&[HostValue::from("42")]),
            Err(MarshalError::ArgumentType { .. })
        ));
        assert!(matches!(
            UtcDate::from_args(&[HostValue::Int(1), HostValue::Int(2)]),
            Err(MarshalError::ArgumentArity { got: 2, .. })
        ));
    }
}
