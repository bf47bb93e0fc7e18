//! Regular expression values: a pattern string and a flags string.

use std::fmt;

use crate::{HostValue, MarshalError};

/// A regular expression as a pattern/flags pair.
///
/// Both fields travel as C-strings on the wire, so neither may contain a
/// NUL byte; this is enforced at construction. The canonical textual form
/// is `/pattern/flags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Regex {
    pattern: String,
    flags: String,
}

impl Regex {
    pub fn new(
        pattern: impl Into<String>,
        flags: impl Into<String>,
    ) -> Result<Regex, MarshalError> {
        let pattern = pattern.into();
        let flags = flags.into();
        if pattern.as_bytes().contains(&0) {
            return Err(MarshalError::EmbeddedNul("regex pattern"));
        }
        if flags.as_bytes().contains(&0) {
            return Err(MarshalError::EmbeddedNul("regex flags"));
        }
        Ok(Regex { pattern, flags })
    }

    /// Parses a `/pattern/flags` literal.
    ///
    /// The **last** `/` delimits pattern from flags, so a pattern may itself
    /// contain `/` characters; a trailing `/` yields empty flags. A literal
    /// that does not start with `/`, or whose only `/` is the leading one,
    /// fails with [`MarshalError::InvalidRegexLiteral`].
    pub fn parse(literal: &str) -> Result<Regex, MarshalError> {
        if !literal.starts_with('/') {
            return Err(MarshalError::InvalidRegexLiteral(literal.to_owned()));
        }
        let delimiter = match literal.rfind('/') {
            Some(at) if at > 0 => at,
            _ => return Err(MarshalError::InvalidRegexLiteral(literal.to_owned())),
        };
        Regex::new(&literal[1..delimiter], &literal[delimiter + 1..])
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Host construction entry point: no arguments for an empty value, one
    /// string argument for a `/pattern/flags` literal.
    pub fn from_args(args: &[HostValue]) -> Result<Regex, MarshalError> {
        match args {
            [] => Ok(Regex::default()),
            [HostValue::Str(literal)] => Regex::parse(literal),
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

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pattern_and_flags() {
        let re = Regex::parse("/foo/i").unwrap();
        assert_eq!(re.pattern(), "foo");
        assert_eq!(re.flags(), "i");
        assert_eq!(re.to_string(), "/foo/i");
    }

    #[test]
    fn last_slash_is_the_delimiter() {
        let re = Regex::parse(r"/a\/b/").unwrap();
        assert_eq!(re.pattern(), r"a\/b");
        assert_eq!(re.flags(), "");

        let re = Regex::parse("/x/y/gi").unwrap();
        assert_eq!(re.pattern(), "x/y");
        assert_eq!(re.flags(), "gi");
    }

    #[test]
    fn trailing_slash_yields_empty_flags() {
        let re = Regex::parse("/foo/").unwrap();
        assert_eq!(re.pattern(), "foo");
        assert_eq!(re.flags(), "");
    }

    #[test]
    fn empty_pattern_is_allowed() {
        let re = Regex::parse("//").unwrap();
        assert_eq!(re.pattern(), "");
        assert_eq!(re.flags(), "");
    }

    #[test]
    fn malformed_literals_are_rejected() {
        for bad in ["foo", "a/b", "/", ""] {
            assert!(matches!(
                Regex::parse(bad),
                Err(MarshalError::InvalidRegexLiteral(_))
            ));
        }
    }

    #[test]
    fn embedded_nul_is_rejected() {
        assert!(matches!(
            Regex::new("a\0b", ""),
            Err(MarshalError::EmbeddedNul("regex pattern"))
        ));
        assert!(matches!(
            Regex::new("ab", "i\0"),
            Err(MarshalError::EmbeddedNul("regex flags"))
        ));
    }

    #[test]
    fn from_args_dispatch() {
        let empty = Regex::from_args(&[]).unwrap();
        assert_eq!(empty.to_string(), "//");

        let re = Regex::from_args(&[HostValue::from("/foo/i")]).unwrap();
        assert_eq!(re.pattern(), "foo");

        assert!(matches!(
            Regex::from_args(&[HostValue::Int(1)]),
            Err(MarshalError::ArgumentType { .. })
        ));
        assert!(matches!(
            Regex::from_args(&[HostValue::Null, HostValue::Null]),
            Err(MarshalError::ArgumentArity { got: 2, .. })
        ));
    }

    #[test]
    fn multibyte_patterns_split_cleanly() {
        let re = Regex::parse("/é|ü/u").unwrap();
        assert_eq!(re.pattern(), "é|ü");
        assert_eq!(re.flags(), "u");
    }
}
