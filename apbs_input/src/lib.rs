#[macro_use]
pub mod logging;

pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
pub mod mapping;
pub mod model;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use mapping::{InputMapping, Value};
pub use model::{ApbsInput, InputFile, ModelError};
pub use pipeline::{decode_file, load_structured_file, PipelineError};
pub use syntax::{emit, parse_string, parse_string_named, DecodedInput, Diagnostic};
