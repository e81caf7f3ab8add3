//! Failures of the typed configuration model

use crate::logging::{codes, Code};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Missing required key '{key}'")]
    MissingKey { key: String },

    #[error("Wrong type for '{key}': {message}")]
    TypeMismatch { key: String, message: String },

    /// A setter rejected a value
    #[error("{message}")]
    OutOfDomain { message: String },

    /// Every violation found by `validate`, sentences joined with a space
    #[error("{message}")]
    Invalid { message: String },

    #[error("JSON error: {message}")]
    Json { message: String },

    #[error("TOML error: {message}")]
    Toml { message: String },
}

impl ModelError {
    pub fn missing_key(key: &str) -> Self {
        Self::MissingKey {
            key: key.to_string(),
        }
    }

    pub fn type_mismatch(key: &str, expected: &str, found: &serde_json::Value) -> Self {
        Self::TypeMismatch {
            key: key.to_string(),
            message: format!("expected {}, found {}", expected, found),
        }
    }

    pub fn out_of_domain(message: impl Into<String>) -> Self {
        Self::OutOfDomain {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Message without the variant prefix, used when nesting violations
    pub fn message(&self) -> String {
        match self {
            Self::OutOfDomain { message } | Self::Invalid { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::MissingKey { .. } => codes::model::MISSING_KEY,
            Self::TypeMismatch { .. } => codes::model::TYPE_MISMATCH,
            Self::OutOfDomain { .. } => codes::model::OUT_OF_DOMAIN,
            Self::Invalid { .. } => codes::model::VALIDATION_FAILED,
            Self::Json { .. } | Self::Toml { .. } => codes::model::ENCODING_FAILED,
        }
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for ModelError {
    fn from(error: toml::de::Error) -> Self {
        Self::Toml {
            message: error.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ModelError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Toml {
            message: error.to_string(),
        }
    }
}

/// Accumulates violations so `validate` can report all of them at once
#[derive(Debug, Default)]
pub struct Violations {
    messages: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn check(&mut self, condition: bool, message: impl FnOnce() -> String) {
        if !condition {
            self.messages.push(message());
        }
    }

    /// A required attribute: unset or out of domain are both violations
    pub fn require<T, U>(
        &mut self,
        name: &str,
        value: Option<T>,
        check: impl FnOnce(&str, T) -> Result<U, String>,
    ) {
        match value {
            None => self.push(format!("{} is not set.", name)),
            Some(value) => self.optional(name, Some(value), check),
        }
    }

    pub fn optional<T, U>(
        &mut self,
        name: &str,
        value: Option<T>,
        check: impl FnOnce(&str, T) -> Result<U, String>,
    ) {
        if let Some(value) = value {
            if let Err(message) = check(name, value) {
                self.push(message);
            }
        }
    }

    pub fn present<T>(&mut self, name: &str, value: &Option<T>) {
        if value.is_none() {
            self.push(format!("{} is not set.", name));
        }
    }

    /// Fold a child's validation result into this one
    pub fn nested(&mut self, result: ModelResult<()>) {
        if let Err(error) = result {
            self.push(error.message());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn finish(self) -> ModelResult<()> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ModelError::invalid(self.messages.join(" ")))
        }
    }
}
