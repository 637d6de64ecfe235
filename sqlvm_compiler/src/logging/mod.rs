//! Global logging module for the SQLVM compiler
//!
//! Provides a thread-safe global logger, per-thread template context and
//! the macro support functions behind `log_error!` and friends.

pub mod codes;
pub mod config;
pub mod events;
#[macro_use]
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, Logger, LoggingService, MemoryLogger, NullLogger, StructuredLogger,
};

use crate::config::runtime::LoggingPreferences;
use crate::utils::Span;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static TEMPLATE_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the given preferences
pub fn init_global_logging(preferences: LoggingPreferences) -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;
    config::init_runtime_preferences(preferences)?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::preprocess::NESTED_REGION,
        codes::dialect::UNKNOWN_DIALECT,
        codes::resolve::UNDEFINED_LABEL,
    ] {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with a custom service (embedders and tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// TEMPLATE CONTEXT MANAGEMENT
// ============================================================================

/// Set the template being compiled on the current thread
pub fn set_template_context(template_name: &str) {
    TEMPLATE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(template_name.to_string());
    });
}

pub fn clear_template_context() {
    TEMPLATE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Execute function with template context, restoring the previous one afterwards
pub fn with_template_context<F, R>(template_name: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_template_context();
    set_template_context(template_name);
    let result = f();
    match previous {
        Some(name) => set_template_context(&name),
        None => clear_template_context(),
    }
    result
}

pub fn get_current_template_context() -> Option<String> {
    TEMPLATE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Attach template context and hand the event to the global logger
pub fn dispatch(mut event: LogEvent) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    if !logger.should_log(event.level) {
        return;
    }
    if config::include_file_context() {
        if let Some(template) = get_current_template_context() {
            event = event.with_context("template", &template);
        }
    }
    logger.log_event(event);
}

fn build_event(
    mut event: LogEvent,
    span: Option<Span>,
    context: Vec<(&str, &str)>,
) -> LogEvent {
    if let Some(s) = span {
        event = event.with_span(s);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

/// Used by `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<Span>,
    context: Vec<(&str, &str)>,
) {
    dispatch(build_event(LogEvent::error(code, message), span, context));
}

/// Used by `log_warning!`
pub fn log_warning_with_context(
    code: Code,
    message: &str,
    span: Option<Span>,
    context: Vec<(&str, &str)>,
) {
    dispatch(build_event(
        LogEvent::warning_with_code(code, message),
        span,
        context,
    ));
}

/// Used by `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(build_event(LogEvent::success(code, message), None, context));
}

/// Used by `log_info!`
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(build_event(LogEvent::info(message), None, context));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_context_management() {
        clear_template_context();
        assert!(get_current_template_context().is_none());

        set_template_context("report.sql.j2");
        assert_eq!(
            get_current_template_context().as_deref(),
            Some("report.sql.j2")
        );

        clear_template_context();
        assert!(get_current_template_context().is_none());
    }

    #[test]
    fn test_with_template_context_restores_previous() {
        set_template_context("outer");
        let inner = with_template_context("inner", get_current_template_context);
        assert_eq!(inner.as_deref(), Some("inner"));
        assert_eq!(get_current_template_context().as_deref(), Some("outer"));
        clear_template_context();
    }

    #[test]
    fn test_support_functions_are_safe_without_logger() {
        log_error_with_context(codes::system::INTERNAL_ERROR, "no logger", None, vec![]);
        log_info_with_context("still fine", vec![("key", "value")]);
    }

    // The only test that installs the global service; other tests may log
    // into it concurrently.
    #[test]
    fn test_injected_memory_service_captures_pipeline_warnings() {
        use crate::config::CompilerPreferences;
        use crate::dialect::MySqlDialect;

        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(Arc::new(memory.clone()), LogLevel::Warning);
        init_global_logging_with_service(Arc::new(service)).unwrap();

        let preferences = CompilerPreferences {
            default_dialect: "mysql".to_string(),
            strict_labels: false,
            trim_output: true,
            collect_region_reports: true,
        };
        crate::pipeline::compile_source(
            "{% sqlvm %}\n{{ jump(\"captured_target\") }}\n{% endsqlvm %}",
            "captured.sql",
            &MySqlDialect,
            &preferences,
        )
        .unwrap();

        let fallbacks = memory.get_events_with_code(codes::resolve::UNDEFINED_LABEL_FALLBACK);
        assert!(fallbacks.iter().any(|event| event.is_warning()
            && event.context.get("label").map(String::as_str) == Some("captured_target")));

        let second = LoggingService::new(Arc::new(NullLogger), LogLevel::Error);
        assert!(init_global_logging_with_service(Arc::new(second)).is_err());
    }
}
