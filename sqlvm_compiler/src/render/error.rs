//! Template evaluation errors

use crate::dialect::DialectError;
use crate::logging::{codes, Code};
use crate::resolve::ResolveError;
use crate::utils::Span;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Unknown function '{name}' at {span}")]
    UnknownFunction { name: String, span: Span },

    #[error("{function}() takes {expected} argument(s), {found} given at {span}")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("Undefined variable '{name}' at {span}")]
    UndefinedVariable { name: String, span: Span },

    #[error("Argument to {function}() is not known until the region ends (at {span})")]
    DeferredArgument { function: String, span: Span },

    #[error("{source} at {span}")]
    Dialect { source: DialectError, span: Span },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl RenderError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownFunction { .. } => codes::render::UNKNOWN_FUNCTION,
            Self::ArgumentCount { .. } => codes::render::ARGUMENT_COUNT,
            Self::UndefinedVariable { .. } => codes::render::UNDEFINED_VARIABLE,
            Self::DeferredArgument { .. } => codes::render::DEFERRED_ARGUMENT,
            Self::Dialect { source, .. } => source.error_code(),
            Self::Resolve(error) => error.error_code(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnknownFunction { span, .. }
            | Self::ArgumentCount { span, .. }
            | Self::UndefinedVariable { span, .. }
            | Self::DeferredArgument { span, .. }
            | Self::Dialect { span, .. } => *span,
            Self::Resolve(error) => error.span(),
        }
    }
}
