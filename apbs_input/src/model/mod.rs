//! Typed configuration model for structured APBS inputs
//!
//! Records are built empty, filled from a mapping or through checked setters,
//! then validated. Cross-record links are aliases resolved by name during
//! validation of the enclosing [`ApbsInput`].

pub mod apbs_input;
pub mod boundary_element;
pub mod calculate;
pub mod error;
pub mod fields;
pub mod finite_difference;
pub mod finite_element;
pub mod generic;
pub mod nonpolar;
pub mod polar;
pub mod process;
pub mod read;

pub use apbs_input::ApbsInput;
pub use boundary_element::{BoundaryElement, Mesh, TabiParameters};
pub use calculate::{Calculate, CalculationParameters};
pub use error::{ModelError, ModelResult, Violations};
pub use fields::Mapping;
pub use finite_difference::{
    adjust_counts, find_count, FiniteDifference, FiniteDifferenceMethod, Focus, GridCenter,
    GridDimensions, Manual, ParallelFocus,
};
pub use finite_element::FiniteElement;
pub use generic::{Ion, MobileIons, UseMap, WriteMap};
pub use nonpolar::Nonpolar;
pub use polar::{BoundaryCondition, PolarSettings};
pub use process::{Element, Operation, Process};
pub use read::{DielectricMapGroup, Map, Molecule, Parameter, Read};

use crate::logging::codes;
use crate::{log_error, log_success};
use serde_json::Value as JsonValue;

/// Capability shared by every typed record
pub trait InputFile: Sized {
    /// Populate a record from a mapping; absent required keys are errors
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self>;

    /// Mapping with the schema `from_mapping` accepts
    fn to_mapping(&self) -> Mapping;

    /// Check every invariant, reporting all violations together
    fn validate(&self) -> ModelResult<()>;

    fn from_json(text: &str) -> ModelResult<Self> {
        let value: JsonValue = serde_json::from_str(text)?;
        Self::from_mapping(fields::expect_object("<document>", &value)?)
    }

    fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(&JsonValue::Object(
            self.to_mapping(),
        ))?)
    }

    fn from_toml(text: &str) -> ModelResult<Self> {
        let value: JsonValue = toml::from_str(text)?;
        Self::from_mapping(fields::expect_object("<document>", &value)?)
    }

    fn to_toml(&self) -> ModelResult<String> {
        Ok(toml::to_string(&JsonValue::Object(self.to_mapping()))?)
    }
}

/// Validate a record and log the outcome with the model codes
pub fn validate_logged<T: InputFile>(record: &T, name: &str) -> ModelResult<()> {
    match record.validate() {
        Ok(()) => {
            log_success!(
                codes::success::MODEL_VALIDATION_PASSED,
                "Model validation passed",
                "record" => name
            );
            Ok(())
        }
        Err(error) => {
            log_error!(error.error_code(), "Model validation failed",
                "record" => name,
                "message" => error.message()
            );
            Err(error)
        }
    }
}

/// Check that every model error code has registry metadata
pub fn init_model_logging() -> Result<(), String> {
    let model_codes = [
        codes::model::MISSING_KEY,
        codes::model::TYPE_MISMATCH,
        codes::model::OUT_OF_DOMAIN,
        codes::model::VALIDATION_FAILED,
        codes::model::ENCODING_FAILED,
    ];

    for code in &model_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Model error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}
