//! File-level entry points: legacy decoding and structured loading

mod error;
mod result;

pub use error::PipelineError;
pub use result::{DecodedFile, LoadedInput};

use crate::file_processor::InputFormat;
use crate::logging;
use crate::model::{validate_logged, ApbsInput, InputFile};
use std::path::PathBuf;
use std::time::Instant;

/// Decode a legacy input file (file -> tokens -> sections -> mapping)
pub fn decode_file(file_path: &str) -> Result<DecodedFile, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(file_path), || {
        crate::log_info!("Decoding legacy input file", "file" => file_path);

        let file_result = crate::file_processor::process_file(file_path)?;
        if file_result.metadata.format.is_structured() {
            return Err(PipelineError::unsupported_format(
                file_path,
                "a legacy input file",
            ));
        }

        let decoded = crate::syntax::parse_string_named(&file_result.source, file_path)?;
        let result = DecodedFile {
            decoded,
            file_metadata: file_result.metadata,
            processing_duration: start_time.elapsed(),
        };
        result.log_success(file_path);
        Ok(result)
    })
}

/// Load a JSON or TOML document into a validated [`ApbsInput`]
pub fn load_structured_file(file_path: &str) -> Result<LoadedInput, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(file_path), || {
        crate::log_info!("Loading structured input file", "file" => file_path);

        let file_result = crate::file_processor::process_file(file_path)?;
        let input = match file_result.metadata.format {
            InputFormat::Json => ApbsInput::from_json(&file_result.source)?,
            InputFormat::Toml => ApbsInput::from_toml(&file_result.source)?,
            InputFormat::Legacy | InputFormat::Unknown => {
                return Err(PipelineError::unsupported_format(
                    file_path,
                    "a .json or .toml file",
                ))
            }
        };
        validate_logged(&input, "apbs input")?;

        let result = LoadedInput {
            input,
            file_metadata: file_result.metadata,
            processing_duration: start_time.elapsed(),
        };
        result.log_success(file_path);
        Ok(result)
    })
}

/// Check that every stage's error codes are registered
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::lexical::init_lexical_analysis_logging()?;
    crate::syntax::init_syntax_logging()?;
    crate::model::init_model_logging()?;

    crate::log_success!(
        crate::logging::codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "stages_validated" => 3
    );
    Ok(())
}

/// Encode a document as JSON or TOML
pub fn encode(input: &ApbsInput, format: InputFormat) -> Result<String, PipelineError> {
    match format {
        InputFormat::Json => Ok(input.to_json()?),
        InputFormat::Toml => Ok(input.to_toml()?),
        InputFormat::Legacy | InputFormat::Unknown => {
            Err(PipelineError::unsupported_format("<output>", "json or toml"))
        }
    }
}
