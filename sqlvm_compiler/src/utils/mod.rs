//! Shared source-location types used by every compilation stage

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
