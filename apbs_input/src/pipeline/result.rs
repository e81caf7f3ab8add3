use crate::file_processor::FileMetadata;
use crate::model::ApbsInput;
use crate::syntax::DecodedInput;
use std::time::Duration;

/// Legacy input decoded from disk
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub decoded: DecodedInput,
    pub file_metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl DecodedFile {
    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            crate::logging::codes::success::FILE_PROCESSING_SUCCESS,
            "Legacy input file decoded",
            "file" => file_path,
            "sections" => self.decoded.mapping.total_sections(),
            "warnings" => self.decoded.warnings.len(),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}

/// Structured input loaded from disk and validated
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub input: ApbsInput,
    pub file_metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl LoadedInput {
    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            crate::logging::codes::success::FILE_PROCESSING_SUCCESS,
            "Structured input file loaded",
            "file" => file_path,
            "calculations" => self.input.calculate.len(),
            "size" => self.file_metadata.human_readable_size(),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}
