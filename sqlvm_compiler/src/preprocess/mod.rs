//! Region instrumentation
//!
//! Rewrites the lexed template so that every `{% sqlvm %}` region calls the
//! dialect's bookkeeping hooks:
//!
//! - `prologue()` right after the opening tag,
//! - `statement()` at every line boundary that ends an effectful line,
//! - `epilogue()` right before the closing tag.
//!
//! Whitespace-only lines inside a region are dropped. Everything outside a
//! region passes through untouched.

mod error;
mod instrumenter;

pub use error::{PreprocessError, PreprocessResult};
pub use instrumenter::{CompilationState, InstrumentationSummary, Preprocessor};

use crate::dialect::Operation;
use crate::logging::codes;
use crate::tokens::SpannedToken;
use crate::{log_debug, log_error};

/// Tag name that opens a region
pub const REGION_OPEN_TAG: &str = "sqlvm";
/// Tag name that closes a region
pub const REGION_CLOSE_TAG: &str = "endsqlvm";

/// Names of the functions called at injected call-sites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookNames {
    pub prologue: String,
    pub statement: String,
    pub epilogue: String,
}

impl Default for HookNames {
    fn default() -> Self {
        Self {
            prologue: Operation::Prologue.name().to_string(),
            statement: Operation::Statement.name().to_string(),
            epilogue: Operation::Epilogue.name().to_string(),
        }
    }
}

/// Instrumented token sequence
#[derive(Debug, Clone)]
pub struct Instrumented {
    pub tokens: Vec<SpannedToken>,
    pub summary: InstrumentationSummary,
}

/// Instrument a whole token sequence
pub fn instrument(tokens: Vec<SpannedToken>, hooks: &HookNames) -> PreprocessResult<Instrumented> {
    let mut preprocessor = Preprocessor::new(tokens, hooks);
    let mut output = Vec::new();

    for token in preprocessor.by_ref() {
        match token {
            Ok(token) => output.push(token),
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(), span = error.span());
                return Err(error);
            }
        }
    }

    let summary = preprocessor.summary().clone();
    log_debug!("Template instrumented",
        "regions" => summary.regions,
        "statement_sites" => summary.statement_sites,
        "injected_tokens" => summary.injected_tokens
    );

    Ok(Instrumented {
        tokens: output,
        summary,
    })
}

/// Check that the region error codes are registered
pub fn validate_preprocessing() -> Result<(), String> {
    for code in [
        codes::preprocess::NESTED_REGION,
        codes::preprocess::UNMATCHED_CLOSE,
        codes::preprocess::UNCLOSED_REGION,
        codes::preprocess::MALFORMED_BOUNDARY,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Region error code {} has no metadata", code));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::tokens::Token;
    use crate::utils::Position;
    use assert_matches::assert_matches;

    fn run(source: &str) -> PreprocessResult<Instrumented> {
        instrument(tokenize(source).unwrap(), &HookNames::default())
    }

    fn flatten(tokens: &[SpannedToken]) -> String {
        tokens.iter().map(|t| t.value.as_template_string()).collect()
    }

    #[test]
    fn test_two_statements_then_close() {
        let result = run("{% sqlvm %}\nA\nB{% endsqlvm %}").unwrap();
        assert_eq!(
            flatten(&result.tokens),
            "{%sqlvm%}{{prologue()}}{{statement()}}A{{statement()}}B{{epilogue()}}{%endsqlvm%}"
        );
        assert_eq!(result.summary.regions, 1);
        assert_eq!(result.summary.statement_sites, 2);
    }

    #[test]
    fn test_whitespace_lines_are_dropped() {
        let result = run("{% sqlvm %}\n   \nA\n\t\n{% endsqlvm %}").unwrap();
        assert_eq!(
            flatten(&result.tokens),
            "{%sqlvm%}{{prologue()}}{{statement()}}A{{statement()}}{{epilogue()}}{%endsqlvm%}"
        );
    }

    #[test]
    fn test_interpolation_marks_statement() {
        let result = run("{% sqlvm %}\n{{ nop() }}\n{% endsqlvm %}").unwrap();
        assert_eq!(
            flatten(&result.tokens),
            "{%sqlvm%}{{prologue()}}{{statement()}}{{nop()}}{{statement()}}{{epilogue()}}{%endsqlvm%}"
        );
    }

    #[test]
    fn test_block_tags_inside_region_do_not_count() {
        let result = run("{% sqlvm %}\n{% set x = 1 %}\n{% endsqlvm %}").unwrap();
        assert_eq!(result.summary.statement_sites, 1);
    }

    #[test]
    fn test_text_outside_region_is_untouched() {
        let source = "before\nline\n{% sqlvm %}A{% endsqlvm %}\nafter\n";
        let result = run(source).unwrap();
        let flat = flatten(&result.tokens);
        assert!(flat.starts_with("before\nline\n{%sqlvm%}"));
        assert!(flat.ends_with("{%endsqlvm%}\nafter\n"));
    }

    #[test]
    fn test_each_region_starts_fresh() {
        let result = run("{% sqlvm %}A\n{% endsqlvm %}{% sqlvm %}\nB{% endsqlvm %}").unwrap();
        assert_eq!(
            flatten(&result.tokens),
            "{%sqlvm%}{{prologue()}}A{{statement()}}{{epilogue()}}{%endsqlvm%}\
             {%sqlvm%}{{prologue()}}{{statement()}}B{{epilogue()}}{%endsqlvm%}"
        );
        assert_eq!(result.summary.regions, 2);
    }

    #[test]
    fn test_injected_calls_carry_trigger_position() {
        let result = run("{% sqlvm %}\nA\n{% endsqlvm %}").unwrap();
        let prologue = result
            .tokens
            .iter()
            .find(|t| t.value.is_name("prologue"))
            .unwrap();
        assert_eq!(prologue.span.start, Position::new(11, 1, 12));
        assert_eq!(prologue.span.end, prologue.span.start);

        let epilogue = result
            .tokens
            .iter()
            .find(|t| t.value.is_name("epilogue"))
            .unwrap();
        assert_eq!(epilogue.span.start.line, 3);
    }

    #[test]
    fn test_nested_region_reports_inner_opening() {
        let error = run("{% sqlvm %}\nA\n  {% sqlvm %}\n{% endsqlvm %}").unwrap_err();
        assert_matches!(error, PreprocessError::NestedRegion { span, open } => {
            assert_eq!(span.start, Position::new(16, 3, 3));
            assert_eq!(span.end.column, 14);
            assert_eq!(open.start.line, 1);
        });
    }

    #[test]
    fn test_unmatched_close() {
        let error = run("text\n{% endsqlvm %}").unwrap_err();
        assert_matches!(error, PreprocessError::UnmatchedClose { span } => {
            assert_eq!(span.start.line, 2);
        });
    }

    #[test]
    fn test_unclosed_region_points_at_opening() {
        let error = run("x\n{% sqlvm %}\nA\n").unwrap_err();
        assert_matches!(error, PreprocessError::UnclosedRegion { span } => {
            assert_eq!(span.start.line, 2);
        });
    }

    #[test]
    fn test_malformed_boundary() {
        let error = run("{% sqlvm now %}\n{% endsqlvm %}").unwrap_err();
        assert_matches!(error, PreprocessError::MalformedBoundary { expected, found, .. } => {
            assert_eq!(expected, Token::BlockEnd.describe());
            assert_eq!(found, "name 'now'");
        });
    }

    #[test]
    fn test_custom_hook_names() {
        let hooks = HookNames {
            prologue: "begin".into(),
            statement: "step".into(),
            epilogue: "end".into(),
        };
        let result = instrument(tokenize("{% sqlvm %}\nA{% endsqlvm %}").unwrap(), &hooks).unwrap();
        assert_eq!(
            flatten(&result.tokens),
            "{%sqlvm%}{{begin()}}{{step()}}A{{end()}}{%endsqlvm%}"
        );
    }

    #[test]
    fn test_codes_registered() {
        assert!(validate_preprocessing().is_ok());
    }
}
