//! # SQLVM CLI
//!
//! Translates a template file into one SQL statement and prints it to stdout.
//! Diagnostics and log events go to stderr.

use clap::Parser;
use sqlvm_compiler::config::{CompilerPreferences, LoggingPreferences};
use sqlvm_compiler::dialect::DialectRegistry;
use sqlvm_compiler::logging::{self, LogLevel};
use sqlvm_compiler::utils::SourceMap;
use sqlvm_compiler::{file_processor, log_info, pipeline, CompileResult, PipelineError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sqlvm")]
#[command(version)]
#[command(about = "Convert a SQL-like template language to a single SQL statement")]
struct Cli {
    /// SQL language to generate (default: $SQLVM_DEFAULT_DIALECT, else mysql)
    #[arg(short, long, value_name = "NAME")]
    language: Option<String>,

    /// The file to translate
    #[arg(required_unless_present = "list_languages")]
    filename: Option<PathBuf>,

    /// Print the available languages and exit
    #[arg(long)]
    list_languages: bool,

    /// Fail on jumps to undefined labels
    #[arg(long)]
    strict_labels: bool,

    /// Debug logging and a per-region summary on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut logging_preferences = LoggingPreferences::default();
    if cli.verbose {
        logging_preferences.min_log_level = LogLevel::Debug;
    }
    logging::init_global_logging(logging_preferences)?;
    pipeline::validate_pipeline()?;

    let registry = DialectRegistry::with_builtin().map_err(|e| format!("error: {}", e))?;
    if cli.list_languages {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut preferences = CompilerPreferences::default();
    preferences.strict_labels |= cli.strict_labels;

    let language = cli
        .language
        .unwrap_or_else(|| preferences.default_dialect.clone());
    let dialect = registry
        .get(&language)
        .map_err(|e| format!("error: {}", e))?;

    let filename = cli
        .filename
        .ok_or_else(|| "error: no template file given".to_string())?;
    let file = file_processor::process_file(&filename).map_err(|e| format!("error: {}", e))?;
    let name = file.display_name();

    let result = pipeline::compile_source(&file.source, &name, dialect.as_ref(), &preferences)
        .map_err(|error| format_error(&error, &SourceMap::new(name.as_str(), file.source.as_str())))?;

    println!("{}", result.output);

    if cli.verbose {
        print_summary(&result);
    }
    log_info!("Template translated", "template" => name.as_str(), "language" => language.as_str());
    Ok(())
}

fn format_error(error: &PipelineError, source: &SourceMap) -> String {
    match error.span() {
        Some(span) => source.format_error(&span, &format!("[{}] {}", error.error_code(), error)),
        None => format!("error: [{}] {}", error.error_code(), error),
    }
}

fn print_summary(result: &CompileResult) {
    eprintln!(
        "{}: {} region(s), {} tokens, {:.2} ms",
        result.source_name,
        result.region_count(),
        result.token_count,
        result.duration.as_secs_f64() * 1000.0
    );
    for (index, region) in result.regions.iter().enumerate() {
        eprintln!(
            "  region {} at {}: {} instruction(s), {} label(s), {} thunk(s) resolved",
            index + 1,
            region.span,
            region.instruction_count(),
            region.labels.len(),
            region.thunks_resolved
        );
        for label in &region.fallbacks {
            eprintln!("    undefined label '{}' used as jump target", label);
        }
    }
}
