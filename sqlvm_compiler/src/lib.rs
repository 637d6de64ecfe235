//! SQLVM compiler
//!
//! Compiles templates whose `{% sqlvm %}` regions describe a line-oriented
//! program into a single SQL statement for the selected dialect.

#[macro_use]
pub mod logging;

pub mod config;
pub mod dialect;
pub mod file_processor;
pub mod lexical;
pub mod pipeline;
pub mod preprocess;
pub mod render;
pub mod resolve;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use dialect::{Dialect, DialectRegistry, DialectState};
pub use pipeline::{compile_file, compile_source, CompileResult, ErrorKind, PipelineError};
