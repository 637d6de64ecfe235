//! Template file loading with compile-time size limits

use crate::config::compile_time::file_processing::{MAX_FILE_SIZE, MAX_LINE_COUNT};
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading {path}: {message}")]
    IoError { path: String, message: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    fn from_io(error: &io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::InvalidData => Self::InvalidEncoding { path },
            _ => Self::IoError {
                path,
                message: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub line_count: usize,
}

/// Template source plus what was learned while loading it
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    /// Name used for diagnostics
    pub fn display_name(&self) -> String {
        self.metadata.path.display().to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileProcessor {
    /// Log a success event for every loaded file
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            enable_performance_logging: true,
        }
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn process_file(&self, path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
        let start = Instant::now();
        let shown = path.display().to_string();
        log_debug!("Loading template", "file" => shown.as_str());

        let result = self.load(path, start);
        match &result {
            Ok(loaded) if self.enable_performance_logging => {
                log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Template loaded",
                    "file" => shown.as_str(),
                    "size_bytes" => loaded.metadata.size,
                    "lines" => loaded.metadata.line_count,
                    "duration_ms" => format!("{:.2}", loaded.processing_duration.as_secs_f64() * 1000.0)
                );
            }
            Ok(_) => {}
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(), "file" => shown.as_str());
            }
        }
        result
    }

    fn load(&self, path: &Path, start: Instant) -> Result<FileProcessingResult, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| FileProcessorError::from_io(&e, path))?;
        if !metadata.is_file() {
            return Err(FileProcessorError::IoError {
                path: path.display().to_string(),
                message: "not a regular file".to_string(),
            });
        }

        let size = metadata.len();
        if size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size,
                max_size: MAX_FILE_SIZE,
            });
        }

        let source = fs::read_to_string(path).map_err(|e| FileProcessorError::from_io(&e, path))?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            return Err(FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            });
        }

        Ok(FileProcessingResult {
            source,
            metadata: FileMetadata {
                path: path.to_path_buf(),
                size,
                line_count,
            },
            processing_duration: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_loads_template() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{% sqlvm %}}\nA\n{{% endsqlvm %}}\n").unwrap();

        let result = FileProcessor::new().process_file(file.path()).unwrap();
        assert_eq!(result.source, "{% sqlvm %}\nA\n{% endsqlvm %}\n");
        assert_eq!(result.metadata.line_count, 3);
        assert_eq!(result.metadata.size, result.source.len() as u64);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = FileProcessor::new()
            .process_file(&dir.path().join("missing.sql"))
            .unwrap_err();
        assert_matches!(error, FileProcessorError::FileNotFound { .. });
        assert_eq!(error.error_code(), codes::file_processing::FILE_NOT_FOUND);
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            FileProcessor::new().process_file(dir.path()),
            Err(FileProcessorError::IoError { .. })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x66, 0xff, 0xfe, 0x0a]).unwrap();
        assert_matches!(
            FileProcessor::new().process_file(file.path()),
            Err(FileProcessorError::InvalidEncoding { .. })
        );
    }

    #[test]
    fn test_empty_template_is_allowed() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = FileProcessor::new()
            .with_performance_logging(false)
            .process_file(file.path())
            .unwrap();
        assert!(result.source.is_empty());
    }
}
