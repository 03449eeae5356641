//! Parse errors for DepSet strings

use thiserror::Error;

/// Boxed cause reported by a leaf constructor.
pub type ElementCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised when a DepSet string cannot be parsed.
///
/// Every variant carries the original input so callers can report it
/// without threading the string around themselves.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unbalanced or empty group in \"{depset}\"")]
    UnbalancedGroup { depset: String },

    #[error("Expected \"(\" after \"{token}\" in \"{depset}\"")]
    ExpectedOpenParen { depset: String, token: String },

    #[error("Illegal token \"{token}\" in \"{depset}\"")]
    IllegalToken { depset: String, token: String },

    #[error("Unexpected end of input after \"{token}\" in \"{depset}\"")]
    UnexpectedEnd { depset: String, token: String },

    #[error("Unclosed group in \"{depset}\"")]
    UnclosedGroup { depset: String },

    #[error("Bare \"(\" is not allowed without an AND operator in \"{depset}\"")]
    MissingOperator { depset: String },

    #[error("Nesting deeper than {limit} levels at \"{token}\" in \"{depset}\"")]
    TooDeep {
        depset: String,
        token: String,
        limit: usize,
    },

    #[error("Invalid element \"{token}\" in \"{depset}\": {source}")]
    Element {
        depset: String,
        token: String,
        #[source]
        source: ElementCause,
    },
}

impl ParseError {
    /// The input string that failed to parse
    pub fn depset(&self) -> &str {
        match self {
            ParseError::UnbalancedGroup { depset }
            | ParseError::ExpectedOpenParen { depset, .. }
            | ParseError::IllegalToken { depset, .. }
            | ParseError::UnexpectedEnd { depset, .. }
            | ParseError::UnclosedGroup { depset }
            | ParseError::MissingOperator { depset }
            | ParseError::TooDeep { depset, .. }
            | ParseError::Element { depset, .. } => depset,
        }
    }

    /// The offending token, when the failure is tied to one
    pub fn token(&self) -> Option<&str> {
        match self {
            ParseError::ExpectedOpenParen { token, .. }
            | ParseError::IllegalToken { token, .. }
            | ParseError::UnexpectedEnd { token, .. }
            | ParseError::TooDeep { token, .. }
            | ParseError::Element { token, .. } => Some(token),
            ParseError::UnbalancedGroup { .. }
            | ParseError::UnclosedGroup { .. }
            | ParseError::MissingOperator { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_accessors() {
        let err = ParseError::IllegalToken {
            depset: "a | b".to_string(),
            token: "|".to_string(),
        };
        assert_eq!(err.depset(), "a | b");
        assert_eq!(err.token(), Some("|"));

        let err = ParseError::UnclosedGroup {
            depset: "( a".to_string(),
        };
        assert_eq!(err.token(), None);
    }

    #[test]
    fn test_element_source_is_preserved() {
        let cause: ElementCause = "bad atom".into();
        let err = ParseError::Element {
            depset: "=foo".to_string(),
            token: "=foo".to_string(),
            source: cause,
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("bad atom".to_string()));
        assert!(err.to_string().contains("bad atom"));
    }
}
