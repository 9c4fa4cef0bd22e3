use thiserror::Error;

use crate::value::ScalarType;

/// Errors raised by a single parse call.
///
/// Every variant aborts the current parse; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("invalid value '{token}': expected {expected}")]
    ValueDecode { token: String, expected: ScalarType },

    #[error("syntax error: received '{token}' but expected '{expected}'")]
    InvalidEntrySyntax { token: String, expected: String },

    #[error("syntax error: received '{found}' but expected value or '{expected}'")]
    MismatchedClosingDelimiter { found: String, expected: String },

    #[error("unterminated literal: expected '{expected}' before end of input")]
    UnterminatedLiteral { expected: String },

    #[error("argument '{name}' declares choices of more than one type")]
    MixedChoiceTypes { name: String },

    #[error("literal nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },

    #[error("unexpected argument with name '{name}'")]
    UnknownKeyword { name: String },

    #[error("unexpected argument '{token}'")]
    UnexpectedPositional { token: String },

    #[error("missing required {}: {}", plural(.names.len()), .names.join(", "))]
    MissingArguments { names: Vec<String> },
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "argument" } else { "arguments" }
}

impl ParseError {
    /// Whether the error comes from malformed composite literal syntax.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::InvalidEntrySyntax { .. }
                | Self::MismatchedClosingDelimiter { .. }
                | Self::UnterminatedLiteral { .. }
                | Self::NestingTooDeep { .. }
        )
    }

    /// The offending token, when the error carries one.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::ValueDecode { token, .. }
            | Self::InvalidEntrySyntax { token, .. }
            | Self::UnexpectedPositional { token } => Some(token),
            Self::MismatchedClosingDelimiter { found, .. } => Some(found),
            _ => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_token() {
        let err = ParseError::InvalidEntrySyntax {
            token: "abc".to_string(),
            expected: "key:value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "syntax error: received 'abc' but expected 'key:value'"
        );
        assert!(err.is_syntax());
        assert_eq!(err.token(), Some("abc"));
    }

    #[test]
    fn missing_arguments_pluralizes() {
        let one = ParseError::MissingArguments {
            names: vec!["ifile".to_string()],
        };
        assert_eq!(one.to_string(), "missing required argument: ifile");

        let two = ParseError::MissingArguments {
            names: vec!["ifile".to_string(), "ofile".to_string()],
        };
        assert_eq!(two.to_string(), "missing required arguments: ifile, ofile");
        assert!(!two.is_syntax());
    }

    #[test]
    fn decode_error_names_expected_type() {
        let err = ParseError::ValueDecode {
            token: "0xZZ".to_string(),
            expected: ScalarType::Int,
        };
        assert_eq!(err.to_string(), "invalid value '0xZZ': expected int");
    }
}
