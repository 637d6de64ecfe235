mod error;
mod result;
mod validation;

pub use error::{ErrorKind, PipelineError};
pub use result::CompileResult;
pub use validation::validate_pipeline;

use crate::config::CompilerPreferences;
use crate::dialect::{Dialect, DialectRegistry, DialectState};
use crate::lexical::LexicalAnalyzer;
use crate::logging::{self, codes};
use crate::preprocess::{self, HookNames};
use crate::resolve::ThunkResolver;
use crate::{log_error, log_info, log_success};
use std::path::Path;
use std::time::Instant;

/// Compile a template file (file -> lexical -> instrument -> syntax -> render/resolve)
pub fn compile_file(path: &Path, dialect_name: &str) -> Result<CompileResult, PipelineError> {
    compile_file_with_preferences(path, dialect_name, &CompilerPreferences::default())
}

/// Compile a template file. The dialect is looked up before the file is read.
pub fn compile_file_with_preferences(
    path: &Path,
    dialect_name: &str,
    preferences: &CompilerPreferences,
) -> Result<CompileResult, PipelineError> {
    let registry = DialectRegistry::with_builtin()?;
    let dialect = registry.get(dialect_name).map_err(|error| {
        log_error!(error.error_code(), &error.to_string(), "dialect" => dialect_name);
        error
    })?;

    let file = crate::file_processor::process_file(path)?;
    compile_source(&file.source, &file.display_name(), dialect.as_ref(), preferences)
}

/// Compile template text already in memory
pub fn compile_source(
    source: &str,
    source_name: &str,
    dialect: &dyn Dialect,
    preferences: &CompilerPreferences,
) -> Result<CompileResult, PipelineError> {
    logging::with_template_context(source_name, || -> Result<CompileResult, PipelineError> {
        let start = Instant::now();
        log_info!("Compiling template",
            "template" => source_name,
            "dialect" => dialect.name(),
            "strict_labels" => preferences.strict_labels
        );

        // Stage 1: Lexical analysis
        let mut analyzer = LexicalAnalyzer::new();
        let tokens = analyzer.tokenize(source).map_err(|error| {
            log_error!(error.error_code(), &error.to_string(), span = error.span());
            error
        })?;
        let token_count = tokens.len();
        let lexical_metrics = analyzer.metrics().clone();
        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization complete",
            "tokens" => token_count
        );

        // Stage 2: Region instrumentation
        let instrumented = preprocess::instrument(tokens, &HookNames::default())?;
        let instrumentation = instrumented.summary.clone();
        log_success!(codes::success::INSTRUMENTATION_COMPLETE, "Regions instrumented",
            "regions" => instrumentation.regions,
            "statement_sites" => instrumentation.statement_sites
        );

        // Stage 3: Syntax analysis
        let template = crate::syntax::parse_template(instrumented.tokens)?;
        log_success!(codes::success::TEMPLATE_PARSED, "Template parsed",
            "nodes" => template.nodes.len()
        );

        // Stage 4: Render and resolve
        let mut state = DialectState::new();
        let rendered = crate::render::render_template(
            &template,
            dialect,
            &mut state,
            ThunkResolver::from_preferences(preferences),
        )?;

        let output = if preferences.trim_output {
            rendered.text.trim().to_string()
        } else {
            rendered.text
        };
        let regions = if preferences.collect_region_reports {
            rendered.regions
        } else {
            Vec::new()
        };

        let result = CompileResult {
            output,
            regions,
            token_count,
            duration: start.elapsed(),
            source_name: source_name.to_string(),
            lexical_metrics,
            instrumentation,
        };
        result.log_success(dialect.name());

        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySqlDialect;
    use crate::utils::Position;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn preferences() -> CompilerPreferences {
        CompilerPreferences {
            default_dialect: "mysql".to_string(),
            strict_labels: false,
            trim_output: true,
            collect_region_reports: true,
        }
    }

    fn compile(source: &str) -> Result<CompileResult, PipelineError> {
        compile_source(source, "test.sql", &MySqlDialect, &preferences())
    }

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_two_statements_compile_to_two_branches() {
        let result = compile("{% sqlvm %}\nA\nB{% endsqlvm %}").unwrap();
        assert!(result.output.starts_with("SELECT o FROM ("));
        assert!(result.output.ends_with("ORDER BY v DESC LIMIT 1"));
        assert_eq!(result.output.matches(" THEN ").count(), 2);
        assert_eq!(result.region_count(), 1);
        assert_eq!(result.regions[0].instruction_count(), 2);
    }

    #[test]
    fn test_jump_targets_label_counter() {
        let result = compile(
            "{% sqlvm %}\n{{ label(\"loop\") }}\n@out:=CONCAT(@out,'x')\n{{ jump(\"loop\") }}\n{% endsqlvm %}\n",
        )
        .unwrap();
        let address = result.regions[0].labels["loop"];
        assert!(result.output.contains(&format!("THEN @pc:={}", address)));
    }

    #[test]
    fn test_nested_region_is_rejected() {
        let error = compile("{% sqlvm %}\nA\n{% sqlvm %}\nB\n{% endsqlvm %}\n{% endsqlvm %}")
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NestedRegion);
        assert_eq!(error.span().map(|s| s.start), Some(Position::new(14, 3, 1)));
    }

    #[test]
    fn test_undefined_label_falls_back_to_name() {
        let result = compile("{% sqlvm %}\n{{ jump(\"done\") }}\n{% endsqlvm %}").unwrap();
        assert!(result.output.contains("@pc:=done"));
    }

    #[test]
    fn test_last_line_without_newline_shares_epilogue_filler() {
        let result = compile("{% sqlvm %}\nA\n{{ exit() }}{% endsqlvm %}").unwrap();
        assert_eq!(result.regions[0].final_counter, 1);
        assert_eq!(result.regions[0].instruction_count(), 2);
        assert!(result
            .output
            .contains("WHEN 0 THEN A\n        WHEN 1 THEN @pc:=10\n    ELSE @out END"));
    }

    #[test]
    fn test_strict_labels() {
        let strict = CompilerPreferences {
            strict_labels: true,
            ..preferences()
        };
        let error = compile_source(
            "{% sqlvm %}\n{{ jump(\"done\") }}\n{% endsqlvm %}",
            "strict.sql",
            &MySqlDialect,
            &strict,
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UndefinedLabel);
        assert_eq!(error.error_code(), codes::resolve::UNDEFINED_LABEL);
    }

    #[test]
    fn test_error_kinds() {
        let kind = |source: &str| compile(source).unwrap_err().kind();
        assert_eq!(kind("{% endsqlvm %}"), ErrorKind::UnmatchedClose);
        assert_eq!(kind("{% sqlvm %}\nA\n"), ErrorKind::UnclosedRegion);
        assert_eq!(kind("{% sqlvm x %}{% endsqlvm %}"), ErrorKind::MalformedBoundary);
        assert_eq!(
            kind("{% sqlvm %}\n{{ label(\"a\") }}\n{{ label(\"a\") }}\n{% endsqlvm %}"),
            ErrorKind::DuplicateLabel
        );
        assert_eq!(kind("{{ 'open"), ErrorKind::Lexical);
        assert_eq!(kind("{% if x %}"), ErrorKind::Syntax);
        assert_eq!(kind("{{ nothing() }}"), ErrorKind::Evaluation);
    }

    #[test]
    fn test_untrimmed_output_keeps_surrounding_text() {
        let keep = CompilerPreferences {
            trim_output: false,
            collect_region_reports: false,
            ..preferences()
        };
        let result =
            compile_source("\n{% sqlvm %}\nA\n{% endsqlvm %}\n", "t", &MySqlDialect, &keep)
                .unwrap();
        assert!(result.output.starts_with("\nSELECT"));
        assert!(result.output.ends_with("LIMIT 1\n"));
        assert!(result.regions.is_empty());
    }

    #[test]
    fn test_compile_file() {
        let mut file = tempfile::Builder::new().suffix(".sql").tempfile().unwrap();
        write!(file, "{{% sqlvm %}}\n@out:='hi'\n{{{{ exit() }}}}\n{{% endsqlvm %}}\n").unwrap();

        let result = compile_file_with_preferences(file.path(), "mysql", &preferences()).unwrap();
        assert!(result.output.contains("WHEN 0 THEN @out:='hi'"));
        assert!(result.output.contains("WHEN 1 THEN @pc:=2"));
        assert_eq!(result.source_name, file.path().display().to_string());
    }

    #[test]
    fn test_unknown_dialect_checked_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let error = compile_file(&dir.path().join("missing.sql"), "oracle").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownDialect);
        assert_matches!(error, PipelineError::Dialect(_));

        let error =
            compile_file_with_preferences(&dir.path().join("missing.sql"), "mysql", &preferences())
                .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FileProcessing);
    }
}
