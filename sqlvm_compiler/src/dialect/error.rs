//! Dialect errors

use crate::config::compile_time::dialect::{MAX_LABELS_PER_REGION, MAX_STEP_BITS};
use crate::logging::{codes, Code};

pub type DialectResult<T> = Result<T, DialectError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DialectError {
    #[error("Unknown dialect '{name}' (available: {})", .available.join(", "))]
    UnknownDialect { name: String, available: Vec<String> },

    #[error("Duplicate label '{name}' (first defined at program counter {address})")]
    DuplicateLabel { name: String, address: i64 },

    #[error("Dialect '{dialect}' extension '{name}' shadows a core operation")]
    ShadowedOperation { dialect: String, name: String },

    #[error("Dialect '{name}' is already registered")]
    DuplicateDialect { name: String },

    #[error("Invalid argument to {operation}: {message}")]
    InvalidArgument { operation: String, message: String },

    #[error("Cannot allocate a negative number of cells ({count})")]
    NegativeAllocation { count: i64 },

    #[error("Step budget exponent {requested} out of range (0..={max})", max = MAX_STEP_BITS)]
    StepBudgetOutOfRange { requested: i64 },

    #[error("Too many labels in one region (max {max})", max = MAX_LABELS_PER_REGION)]
    TooManyLabels,
}

impl DialectError {
    pub fn invalid_argument(operation: &str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownDialect { .. } => codes::dialect::UNKNOWN_DIALECT,
            Self::DuplicateLabel { .. } => codes::dialect::DUPLICATE_LABEL,
            Self::ShadowedOperation { .. } => codes::dialect::SHADOWED_OPERATION,
            Self::DuplicateDialect { .. } => codes::dialect::DUPLICATE_DIALECT,
            Self::InvalidArgument { .. } | Self::NegativeAllocation { .. } => {
                codes::dialect::INVALID_ARGUMENT
            }
            Self::StepBudgetOutOfRange { .. } => codes::dialect::STEP_BUDGET_OUT_OF_RANGE,
            Self::TooManyLabels => codes::dialect::TOO_MANY_LABELS,
        }
    }
}
