//! Template file loading

mod processor;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

use std::path::Path;

/// Load a template with default settings
pub fn process_file(path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(path)
}

