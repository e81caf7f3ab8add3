//! File processor with size, encoding and line-count limits

use crate::config::constants::compile_time::file_processing::{
    LEGACY_EXTENSIONS, MAX_FILE_SIZE, MAX_LINE_COUNT, STRUCTURED_EXTENSIONS,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("Unsupported file extension: {extension:?}")]
    UnsupportedExtension { extension: Option<String> },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            FileProcessorError::UnsupportedExtension { .. } => {
                codes::file_processing::UNSUPPORTED_EXTENSION
            }
            FileProcessorError::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
        }
    }
}

/// Input flavour inferred from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Legacy,
    Json,
    Toml,
    Unknown,
}

impl InputFormat {
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some("json") => InputFormat::Json,
            Some("toml") => InputFormat::Toml,
            Some(ext) if LEGACY_EXTENSIONS.contains(&ext) => InputFormat::Legacy,
            _ => InputFormat::Unknown,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, InputFormat::Json | InputFormat::Toml)
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased extension, if any
    pub extension: Option<String>,
    pub line_count: usize,
    pub format: InputFormat,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", self.size, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: std::time::Duration,
}

pub struct FileProcessor {
    pub max_file_size: u64,
    pub require_known_extension: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            require_known_extension: false,
            enable_performance_logging: false,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        let mut processor = Self::new()
            .with_max_file_size(prefs.max_file_size)
            .with_known_extension_required(prefs.require_known_extension);
        processor.enable_performance_logging = prefs.enable_performance_logging;
        processor
    }

    pub fn with_known_extension_required(mut self, required: bool) -> Self {
        self.require_known_extension = required;
        self
    }

    /// Lower the size cap; the compile-time limit still applies
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size.min(MAX_FILE_SIZE);
        self
    }

    /// Read a file and return its contents with metadata
    pub fn process_file(
        &self,
        file_path: &str,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = std::time::Instant::now();

        log_debug!("Starting file processing", "file" => file_path);

        let path = self.validate_path(file_path)?;
        let metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata, file_path)?;
        let source = self.read_file(&path, file_path)?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            };
            log_error!(error.error_code(), "File exceeds maximum line count",
                "file" => file_path,
                "lines" => line_count,
                "max_lines" => MAX_LINE_COUNT);
            return Err(error);
        }

        let mut final_metadata = metadata;
        final_metadata.line_count = line_count;

        let result = FileProcessingResult {
            source,
            metadata: final_metadata,
            processing_duration: start_time.elapsed(),
        };

        if self.enable_performance_logging {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File read",
                "file" => file_path,
                "size" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "duration_ms" => format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0)
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File read",
                "file" => file_path,
                "lines" => result.metadata.line_count
            );
        }

        Ok(result)
    }

    fn validate_path(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        if file_path.is_empty() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        let path = Path::new(file_path);

        if !path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File not found", "path" => file_path);
            return Err(error);
        }

        if !path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => file_path);
            return Err(error);
        }

        Ok(path.to_path_buf())
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| {
            let error = match e.kind() {
                std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                    path: path.display().to_string(),
                },
                _ => FileProcessorError::IoError {
                    message: format!("Failed to read metadata for '{}': {}", path.display(), e),
                },
            };
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path.display(),
                "io_error" => e);
            error
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        let format = InputFormat::from_extension(extension.as_deref());

        Ok(FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            line_count: 0,
            format,
        })
    }

    fn validate_file(
        &self,
        metadata: &FileMetadata,
        file_path: &str,
    ) -> Result<(), FileProcessorError> {
        if metadata.size > self.max_file_size {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: self.max_file_size,
            };
            log_error!(error.error_code(), "File exceeds maximum size",
                "file" => file_path,
                "size_bytes" => metadata.size,
                "limit_bytes" => self.max_file_size);
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        if self.require_known_extension && metadata.format == InputFormat::Unknown {
            let error = FileProcessorError::UnsupportedExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File extension is not a recognised input format",
                "file" => file_path,
                "extension" => metadata.extension.as_deref().unwrap_or("none"),
                "accepted" => format!("{:?}", [LEGACY_EXTENSIONS, STRUCTURED_EXTENSIONS].concat()));
            return Err(error);
        }

        Ok(())
    }

    fn read_file(&self, path: &Path, file_path: &str) -> Result<String, FileProcessorError> {
        fs::read_to_string(path).map_err(|e| {
            let error = match e.kind() {
                std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                    path: path.display().to_string(),
                },
                std::io::ErrorKind::InvalidData => FileProcessorError::InvalidEncoding {
                    path: path.display().to_string(),
                },
                _ => FileProcessorError::IoError {
                    message: format!("Failed to read file '{}': {}", path.display(), e),
                },
            };
            log_error!(error.error_code(), "Failed to read file",
                "file" => file_path,
                "io_error" => e);
            error
        })
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}
