use crate::dialect::DialectRegistry;
use crate::logging::codes;

/// Check every stage's error codes and the built-in dialects at start-up
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::lexical::validate_tokenization()?;
    crate::preprocess::validate_preprocessing()?;
    crate::syntax::validate_syntax()?;

    for code in [
        codes::dialect::UNKNOWN_DIALECT,
        codes::dialect::DUPLICATE_LABEL,
        codes::render::UNKNOWN_FUNCTION,
        codes::render::DEFERRED_ARGUMENT,
        codes::resolve::UNDEFINED_LABEL,
        codes::resolve::UNDEFINED_LABEL_FALLBACK,
        codes::file_processing::FILE_TOO_LARGE,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Error code {} has no metadata", code));
        }
    }

    let registry = DialectRegistry::with_builtin()
        .map_err(|e| format!("Built-in dialect registration failed: {}", e))?;

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "dialects" => registry.names().join(",")
    );

    Ok(())
}
