//! Template syntax analysis - token sequence to [`Template`]

pub mod ast;
mod error;
mod parser;

pub use ast::{Expr, Node, Template};
pub use error::{SyntaxError, SyntaxResult};
pub use parser::TemplateParser;

use crate::logging::codes;
use crate::tokens::SpannedToken;
use crate::{log_debug, log_error};

/// Parse an (instrumented) token sequence
pub fn parse_template(tokens: Vec<SpannedToken>) -> SyntaxResult<Template> {
    log_debug!("Starting syntax analysis", "tokens" => tokens.len());

    let result = TemplateParser::new(tokens).parse_template();

    match &result {
        Ok(template) => {
            log_debug!("Template parsed",
                "nodes" => template.nodes.len(),
                "regions" => template.region_count()
            );
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string(), span = error.span());
        }
    }

    result
}

pub fn validate_syntax() -> Result<(), String> {
    for code in [
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::UNEXPECTED_END_OF_INPUT,
        codes::syntax::UNKNOWN_TAG,
        codes::syntax::MAX_NESTING_DEPTH,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Syntax error code {} has no metadata", code));
        }
    }
    Ok(())
}
