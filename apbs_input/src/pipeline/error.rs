use crate::file_processor::FileProcessorError;
use crate::logging::{codes, Code};
use crate::model::ModelError;
use crate::syntax::Diagnostic;

/// Errors from any stage of loading an input file
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    /// Legacy decoding failure; displays as the diagnostic banner
    #[error("{0}")]
    Decode(Box<Diagnostic>),

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("Unsupported input format for {path}: expected {expected}")]
    UnsupportedFormat { path: String, expected: &'static str },
}

impl From<Diagnostic> for PipelineError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::Decode(Box::new(diagnostic))
    }
}

impl PipelineError {
    pub fn unsupported_format(path: &str, expected: &'static str) -> Self {
        Self::UnsupportedFormat {
            path: path.to_string(),
            expected,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(error) => error.error_code(),
            Self::Decode(diagnostic) => diagnostic.code,
            Self::Model(error) => error.error_code(),
            Self::UnsupportedFormat { .. } => codes::file_processing::UNSUPPORTED_EXTENSION,
        }
    }
}
