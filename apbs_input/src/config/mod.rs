//! Configuration for the APBS input front end
//!
//! Hard limits live in [`constants`] and are fixed at compile time. User
//! preferences live in [`runtime`] and are read from `APBS_*` environment
//! variables.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{
    DecoderPreferences, FileProcessorPreferences, LogLevel, LoggingPreferences, RuntimeConfig,
};
