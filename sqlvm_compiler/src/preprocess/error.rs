//! Region instrumentation errors

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type PreprocessResult<T> = Result<T, PreprocessError>;

/// Structural errors at region boundaries. All are fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreprocessError {
    #[error("Unexpected nested sqlvm block at {} (region already open since {})", .span.start, .open.start)]
    NestedRegion { span: Span, open: Span },

    #[error("Unexpected endsqlvm block at {}", .span.start)]
    UnmatchedClose { span: Span },

    #[error("sqlvm block opened at {} is never closed", .span.start)]
    UnclosedRegion { span: Span },

    #[error("Unexpected token in sqlvm block at {} (wanted {expected} but got {found})", .span.start)]
    MalformedBoundary {
        expected: String,
        found: String,
        span: Span,
    },
}

impl PreprocessError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::NestedRegion { .. } => codes::preprocess::NESTED_REGION,
            Self::UnmatchedClose { .. } => codes::preprocess::UNMATCHED_CLOSE,
            Self::UnclosedRegion { .. } => codes::preprocess::UNCLOSED_REGION,
            Self::MalformedBoundary { .. } => codes::preprocess::MALFORMED_BOUNDARY,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::NestedRegion { span, .. }
            | Self::UnmatchedClose { span }
            | Self::UnclosedRegion { span }
            | Self::MalformedBoundary { span, .. } => *span,
        }
    }
}
