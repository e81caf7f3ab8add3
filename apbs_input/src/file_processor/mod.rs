//! Bounded, UTF-8 checked reading of input files

mod processor;

use crate::config::runtime::FileProcessorPreferences;
pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, InputFormat,
};

/// Read a file with preferences taken from the environment
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::from_preferences(&FileProcessorPreferences::default()).process_file(file_path)
}
