//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification functions.
//! Codes are grouped by the compilation stage that raises them.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Template loading error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const TOO_MANY_LINES: Code = Code::new("E012");
}

/// Template lexer error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const UNTERMINATED_TAG: Code = Code::new("E025");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Template parser error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E041");
    pub const UNKNOWN_TAG: Code = Code::new("E042");
    pub const MAX_NESTING_DEPTH: Code = Code::new("E043");
}

/// Region instrumentation error codes
pub mod preprocess {
    use super::Code;

    pub const NESTED_REGION: Code = Code::new("E060");
    pub const UNMATCHED_CLOSE: Code = Code::new("E061");
    pub const UNCLOSED_REGION: Code = Code::new("E062");
    pub const MALFORMED_BOUNDARY: Code = Code::new("E063");
}

/// Dialect error codes
pub mod dialect {
    use super::Code;

    pub const UNKNOWN_DIALECT: Code = Code::new("E100");
    pub const DUPLICATE_LABEL: Code = Code::new("E101");
    pub const SHADOWED_OPERATION: Code = Code::new("E102");
    pub const DUPLICATE_DIALECT: Code = Code::new("E103");
    pub const INVALID_ARGUMENT: Code = Code::new("E104");
    pub const STEP_BUDGET_OUT_OF_RANGE: Code = Code::new("E105");
    pub const TOO_MANY_LABELS: Code = Code::new("E106");
}

/// Template evaluation error codes
pub mod render {
    use super::Code;

    pub const UNKNOWN_FUNCTION: Code = Code::new("E120");
    pub const ARGUMENT_COUNT: Code = Code::new("E121");
    pub const UNDEFINED_VARIABLE: Code = Code::new("E122");
    pub const DEFERRED_ARGUMENT: Code = Code::new("E123");
}

/// Thunk resolution error and warning codes
pub mod resolve {
    use super::Code;

    pub const UNDEFINED_LABEL: Code = Code::new("E140");
    pub const UNDEFINED_LABEL_FALLBACK: Code = Code::new("W140");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const TEMPLATE_PARSED: Code = Code::new("I040");
    pub const INSTRUMENTATION_COMPLETE: Code = Code::new("I060");
    pub const REGION_COMPILED: Code = Code::new("I070");
    pub const COMPILATION_COMPLETE: Code = Code::new("I080");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// (code, category, severity, recoverable, requires_halt, description, action)
type RegistryRow = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

const REGISTRY_ROWS: &[RegistryRow] = &[
    // System
    ("ERR001", "System", Severity::Critical, false, true,
        "Critical internal compiler error",
        "File a bug report with the template that triggered it"),
    ("ERR002", "System", Severity::Critical, false, true,
        "Compiler initialization failure",
        "Check build configuration and environment variables"),
    // File processing
    ("E005", "FileProcessing", Severity::Medium, false, true,
        "Template file not found",
        "Check the template path"),
    ("E007", "FileProcessing", Severity::High, false, true,
        "Template file exceeds the maximum size",
        "Split the template or raise max_file_size in the build profile"),
    ("E009", "FileProcessing", Severity::Medium, false, true,
        "Permission denied reading template",
        "Check file permissions"),
    ("E010", "FileProcessing", Severity::Medium, false, true,
        "Template is not valid UTF-8",
        "Re-encode the template as UTF-8"),
    ("E011", "FileProcessing", Severity::Medium, false, true,
        "I/O error reading template",
        "Retry or check the underlying storage"),
    ("E012", "FileProcessing", Severity::High, false, true,
        "Template exceeds the maximum line count",
        "Split the template or raise max_line_count in the build profile"),
    // Lexical
    ("E020", "Lexical", Severity::High, false, true,
        "Unexpected character inside a template tag",
        "Remove the character or quote it inside a string literal"),
    ("E021", "Lexical", Severity::High, false, true,
        "Unterminated string literal",
        "Close the string with a matching quote"),
    ("E022", "Lexical", Severity::High, false, true,
        "Integer literal out of range",
        "Use a value that fits in a signed 64-bit integer"),
    ("E023", "Lexical", Severity::Medium, false, true,
        "Identifier exceeds the maximum length",
        "Shorten the identifier"),
    ("E024", "Lexical", Severity::Medium, false, true,
        "String literal exceeds the maximum size",
        "Shorten the string literal"),
    ("E025", "Lexical", Severity::High, false, true,
        "Template tag is never closed",
        "Close the tag with '}}' or '%}'"),
    ("E026", "Lexical", Severity::High, false, true,
        "Template comment is never closed",
        "Close the comment with '#}'"),
    ("E027", "Lexical", Severity::High, false, true,
        "Template produces too many tokens",
        "Split the template into smaller files"),
    // Syntax
    ("E040", "Syntax", Severity::High, false, true,
        "Unexpected token in template",
        "Check the tag or expression near the reported position"),
    ("E041", "Syntax", Severity::High, false, true,
        "Template ended inside a tag or expression",
        "Complete the tag or expression"),
    ("E042", "Syntax", Severity::High, false, true,
        "Unknown block tag",
        "Use one of: sqlvm, endsqlvm, set"),
    ("E043", "Syntax", Severity::High, false, true,
        "Template nesting exceeds the maximum depth",
        "Flatten nested expressions"),
    // Preprocess
    ("E060", "Region", Severity::High, false, true,
        "Region opened inside another region",
        "Close the outer region before opening a new one"),
    ("E061", "Region", Severity::High, false, true,
        "Region closed without being opened",
        "Remove the stray endsqlvm tag or add the matching sqlvm tag"),
    ("E062", "Region", Severity::High, false, true,
        "Region opened but never closed",
        "Add a matching endsqlvm tag"),
    ("E063", "Region", Severity::High, false, true,
        "Malformed region boundary tag",
        "Write the opening tag exactly as {% sqlvm %}"),
    // Dialect
    ("E100", "Dialect", Severity::Critical, false, true,
        "Unknown target dialect",
        "Pick one of the registered dialects"),
    ("E101", "Dialect", Severity::High, false, true,
        "Label defined more than once in a region",
        "Rename one of the labels"),
    ("E102", "Dialect", Severity::Critical, false, true,
        "Dialect extension shadows a core operation",
        "Rename the extension"),
    ("E103", "Dialect", Severity::Critical, false, true,
        "Dialect registered twice",
        "Register each dialect name once"),
    ("E104", "Dialect", Severity::High, false, true,
        "Invalid argument to a dialect operation",
        "Check the operation's argument types"),
    ("E105", "Dialect", Severity::High, false, true,
        "Step budget exponent out of range",
        "Use a step exponent within the configured maximum"),
    ("E106", "Dialect", Severity::High, false, true,
        "Region defines too many labels",
        "Split the program or raise max_labels_per_region"),
    // Render
    ("E120", "Evaluation", Severity::High, false, true,
        "Call to an unknown function",
        "Check the dialect's operation names"),
    ("E121", "Evaluation", Severity::High, false, true,
        "Wrong number of arguments",
        "Check the operation's arity"),
    ("E122", "Evaluation", Severity::High, false, true,
        "Reference to an undefined variable",
        "Define the variable with {% set %} before use"),
    ("E123", "Evaluation", Severity::High, false, true,
        "Deferred value passed as an argument",
        "Emit jump/exit results directly instead of passing them to another call"),
    // Resolve
    ("E140", "Resolution", Severity::High, false, true,
        "Jump to an undefined label",
        "Define the label or disable strict label checking"),
    ("W140", "Resolution", Severity::Low, true, false,
        "Jump to an undefined label fell back to the literal label name",
        "Define the label; the generated program will not jump where intended"),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ROWS
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
