use crate::dialect::DialectError;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::Code;
use crate::preprocess::PreprocessError;
use crate::render::RenderError;
use crate::resolve::ResolveError;
use crate::syntax::SyntaxError;
use crate::utils::Span;

/// Broad classification of a compilation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NestedRegion,
    UnmatchedClose,
    UnclosedRegion,
    MalformedBoundary,
    DuplicateLabel,
    UndefinedLabel,
    UnknownDialect,
    Lexical,
    Syntax,
    Evaluation,
    FileProcessing,
}

/// Pipeline processing errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Region instrumentation failed: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    #[error("{0}")]
    Dialect(#[from] DialectError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Thunk resolution failed: {0}")]
    Resolve(#[from] ResolveError),
}

fn dialect_kind(error: &DialectError) -> ErrorKind {
    match error {
        DialectError::UnknownDialect { .. } => ErrorKind::UnknownDialect,
        DialectError::DuplicateLabel { .. } => ErrorKind::DuplicateLabel,
        _ => ErrorKind::Evaluation,
    }
}

fn resolve_kind(error: &ResolveError) -> ErrorKind {
    match error {
        ResolveError::UndefinedLabel { .. } => ErrorKind::UndefinedLabel,
        ResolveError::Dialect { source, .. } => dialect_kind(source),
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileProcessing(_) => ErrorKind::FileProcessing,
            Self::LexicalAnalysis(_) => ErrorKind::Lexical,
            Self::Preprocess(error) => match error {
                PreprocessError::NestedRegion { .. } => ErrorKind::NestedRegion,
                PreprocessError::UnmatchedClose { .. } => ErrorKind::UnmatchedClose,
                PreprocessError::UnclosedRegion { .. } => ErrorKind::UnclosedRegion,
                PreprocessError::MalformedBoundary { .. } => ErrorKind::MalformedBoundary,
            },
            Self::SyntaxAnalysis(error) => match error {
                SyntaxError::NestedRegion { .. } => ErrorKind::NestedRegion,
                SyntaxError::UnmatchedRegionClose { .. } => ErrorKind::UnmatchedClose,
                SyntaxError::UnclosedRegion { .. } => ErrorKind::UnclosedRegion,
                _ => ErrorKind::Syntax,
            },
            Self::Dialect(error) => dialect_kind(error),
            Self::Render(error) => match error {
                RenderError::Dialect { source, .. } => dialect_kind(source),
                RenderError::Resolve(error) => resolve_kind(error),
                _ => ErrorKind::Evaluation,
            },
            Self::Resolve(error) => resolve_kind(error),
        }
    }

    /// Source location, when the failure has one
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::FileProcessing(_) | Self::Dialect(_) => None,
            Self::LexicalAnalysis(error) => Some(error.span()),
            Self::Preprocess(error) => Some(error.span()),
            Self::SyntaxAnalysis(error) => Some(error.span()),
            Self::Render(error) => Some(error.span()),
            Self::Resolve(error) => Some(error.span()),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(error) => error.error_code(),
            Self::LexicalAnalysis(error) => error.error_code(),
            Self::Preprocess(error) => error.error_code(),
            Self::SyntaxAnalysis(error) => error.error_code(),
            Self::Dialect(error) => error.error_code(),
            Self::Render(error) => error.error_code(),
            Self::Resolve(error) => error.error_code(),
        }
    }
}
