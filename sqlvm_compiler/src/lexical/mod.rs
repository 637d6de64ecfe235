//! Lexical analysis of host templates
//!
//! Produces the raw token sequence that the region preprocessor instruments
//! and the template parser consumes.

pub mod analyzer;

use crate::config::compile_time::lexical::*;
use crate::logging::codes;
use crate::tokens::SpannedToken;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

/// Tokenize template text with a fresh analyzer
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

/// Check that every lexical error code is registered and the limits are usable
pub fn validate_tokenization() -> Result<(), String> {
    let lexical_codes = [
        codes::lexical::INVALID_CHARACTER,
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::INVALID_NUMBER,
        codes::lexical::IDENTIFIER_TOO_LONG,
        codes::lexical::STRING_TOO_LARGE,
        codes::lexical::UNTERMINATED_TAG,
        codes::lexical::UNTERMINATED_COMMENT,
        codes::lexical::TOO_MANY_TOKENS,
    ];

    for code in lexical_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code
            ));
        }
    }

    if MAX_TOKEN_COUNT < 2 {
        return Err("max_token_count must allow at least one token plus end of input".into());
    }

    crate::log_debug!("Lexical limits",
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT
    );

    Ok(())
}
