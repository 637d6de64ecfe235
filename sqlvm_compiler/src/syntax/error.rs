//! Template parser errors with error code mapping

use crate::logging::{codes, Code};
use crate::tokens::TokenStreamError;
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unexpected token: expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEndOfInput { expected: String, span: Span },

    #[error("Unknown tag '{name}' at {span}")]
    UnknownTag { name: String, span: Span },

    #[error("Unexpected nested sqlvm block at {span}")]
    NestedRegion { span: Span },

    #[error("Unexpected endsqlvm block at {span}")]
    UnmatchedRegionClose { span: Span },

    #[error("sqlvm block opened at {span} is never closed")]
    UnclosedRegion { span: Span },

    #[error("Maximum nesting depth exceeded at {span}")]
    MaxNestingDepth { span: Span },
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::UnknownTag { .. } => codes::syntax::UNKNOWN_TAG,
            Self::NestedRegion { .. } => codes::preprocess::NESTED_REGION,
            Self::UnmatchedRegionClose { .. } => codes::preprocess::UNMATCHED_CLOSE,
            Self::UnclosedRegion { .. } => codes::preprocess::UNCLOSED_REGION,
            Self::MaxNestingDepth { .. } => codes::syntax::MAX_NESTING_DEPTH,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfInput { span, .. }
            | Self::UnknownTag { span, .. }
            | Self::NestedRegion { span }
            | Self::UnmatchedRegionClose { span }
            | Self::UnclosedRegion { span }
            | Self::MaxNestingDepth { span } => *span,
        }
    }
}

impl From<TokenStreamError> for SyntaxError {
    fn from(error: TokenStreamError) -> Self {
        match error {
            TokenStreamError::UnexpectedToken {
                expected,
                found,
                span,
            } => Self::UnexpectedToken {
                expected,
                found,
                span,
            },
            TokenStreamError::UnexpectedEndOfStream { expected, span } => {
                Self::UnexpectedEndOfInput { expected, span }
            }
        }
    }
}
