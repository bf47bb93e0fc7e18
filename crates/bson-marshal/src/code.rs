//! Code fragments paired with a variable-binding scope.

use std::fmt;

use crate::document::DocumentEncoder;
use crate::{HostValue, MarshalError};

/// A source-code string plus an ordered name-to-value binding scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    code: String,
    scope: Vec<(String, HostValue)>,
}

impl Code {
    /// A code fragment with an empty scope.
    pub fn new(code: impl Into<String>) -> Code {
        Code {
            code: code.into(),
            scope: Vec::new(),
        }
    }

    pub fn with_scope(code: impl Into<String>, scope: Vec<(String, HostValue)>) -> Code {
        Code {
            code: code.into(),
            scope,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn scope(&self) -> &[(String, HostValue)] {
        &self.scope
    }

    /// Produces the scope's wire document through the given encoder.
    ///
    /// The code component does not know how documents are encoded; it only
    /// holds the capability seam.
    pub fn encode_scope(
        &self,
        encoder: &mut dyn DocumentEncoder,
    ) -> Result<Vec<u8>, MarshalError> {
        encoder.encode_document(&self.scope)
    }

    /// Host construction entry point: a code string, optionally followed by
    /// a scope document.
    pub fn from_args(args: &[HostValue]) -> Result<Code, MarshalError> {
        match args {
            [HostValue::Str(code)] => Ok(Code::new(code.clone())),
            [HostValue::Str(code), HostValue::Document(scope)] => {
                Ok(Code::with_scope(code.clone(), scope.clone()))
            }
            [HostValue::Str(_), other] => Err(MarshalError::ArgumentType {
                expected: "(string, document)",
                got: other.kind(),
            }),
            [other] | [other, _] => Err(MarshalError::ArgumentType {
                expected: "(string, document)",
                got: other.kind(),
            }),
            _ => Err(MarshalError::ArgumentArity {
                expected: "1 or 2",
                got: args.len(),
            }),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_defaults_to_empty() {
        let code = Code::from_args(&[HostValue::from("return 1;")]).unwrap();
        assert_eq!(code.code(), "return 1;");
        assert!(code.scope().is_empty());
    }

    #[test]
    fn explicit_scope_is_kept_in_order() {
        let scope = vec![
            ("x".to_owned(), HostValue::Int(5)),
            ("y".to_owned(), HostValue::from("z")),
        ];
        let code = Code::from_args(&[
            HostValue::from("return x;"),
            HostValue::Document(scope.clone()),
        ])
        .unwrap();
        assert_eq!(code.scope(), &scope[..]);
    }

    #[test]
    fn arity_errors_carry_the_actual_count() {
        let err = Code::from_args(&[]).unwrap_err();
        assert_eq!(err.to_string(), "expected 1 or 2 arguments, got 0");

        let args = vec![HostValue::Null; 4];
        let err = Code::from_args(&args).unwrap_err();
        assert_eq!(err.to_string(), "expected 1 or 2 arguments, got 4");
    }

    #[test]
    fn non_string_code_is_rejected() {
        assert!(matches!(
            Code::from_args(&[HostValue::Int(1)]),
            Err(MarshalError::ArgumentType { .. })
        ));
        assert!(matches!(
            Code::from_args(&[HostValue::from("f"), HostValue::Int(1)]),
            Err(MarshalError::ArgumentType { .. })
        ));
    }

    #[test]
    fn stringify_returns_the_code() {
        assert_eq!(Code::new("function() {}").to_string(), "function() {}");
    }
}
