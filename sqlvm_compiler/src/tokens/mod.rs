//! Token system for template lexical analysis
//!
//! The lexer turns template text into a flat sequence of [`Token`]s:
//! literal [`Token::Data`] runs interleaved with the content of `{{ }}` and
//! `{% %}` tags. The region preprocessor rewrites that sequence and the
//! parser consumes it through a [`TokenStream`].
//!
//! All tokens carry span information so later stages can report precise
//! source locations.

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenClass};
pub use token_stream::{SpannedToken, TokenStream, TokenStreamError};

pub use crate::utils::{Position, SourceMap, Span, Spanned};
