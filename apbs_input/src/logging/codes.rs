//! Error, warning and success codes with their classification metadata
//!
//! Every failure the decoder or the typed model can raise maps to exactly one
//! code here. Metadata is looked up lazily from a process-wide registry.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Code wrapper shared by errors, warnings and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
            recommended_action,
        }
    }
}

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E001");
    pub const FILE_TOO_LARGE: Code = Code::new("E002");
    pub const EMPTY_FILE: Code = Code::new("E003");
    pub const PERMISSION_DENIED: Code = Code::new("E004");
    pub const INVALID_ENCODING: Code = Code::new("E005");
    pub const IO_ERROR: Code = Code::new("E006");
    pub const INVALID_PATH: Code = Code::new("E007");
    pub const UNSUPPORTED_EXTENSION: Code = Code::new("E008");
    pub const TOO_MANY_LINES: Code = Code::new("E009");
}

pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const INVALID_NUMBER: Code = Code::new("E021");
    pub const WORD_TOO_LONG: Code = Code::new("E022");
    pub const TOO_MANY_TOKENS: Code = Code::new("E023");
    pub const COMMENT_TOO_LONG: Code = Code::new("E024");
}

pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E041");
    pub const MISSING_END: Code = Code::new("E042");
    pub const MISSING_QUIT: Code = Code::new("E043");
    pub const MISSING_REQUIRED_DIRECTIVE: Code = Code::new("E044");
    pub const DUPLICATE_DIRECTIVE: Code = Code::new("E045");
    pub const INVALID_CHOICE: Code = Code::new("E046");
    pub const VALUE_OUT_OF_RANGE: Code = Code::new("E047");
    pub const DIRECTIVE_NOT_ALLOWED: Code = Code::new("E048");
    pub const MISSING_SECTION: Code = Code::new("E049");
    pub const TOO_MANY_SECTIONS: Code = Code::new("E050");

    pub const DEPRECATED_KEYWORD: Code = Code::new("W040");
}

pub mod model {
    use super::Code;

    pub const MISSING_KEY: Code = Code::new("E060");
    pub const TYPE_MISMATCH: Code = Code::new("E061");
    pub const OUT_OF_DOMAIN: Code = Code::new("E062");
    pub const VALIDATION_FAILED: Code = Code::new("E063");
    pub const ENCODING_FAILED: Code = Code::new("E064");
}

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I010");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const DECODE_COMPLETE: Code = Code::new("I040");
    pub const EMIT_COMPLETE: Code = Code::new("I041");
    pub const MODEL_VALIDATION_PASSED: Code = Code::new("I060");
}

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        "Internal error in the input front end",
        "File a bug report with the offending input",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        "Logging or configuration initialization failure",
        "Check APBS_* environment variables",
    ),
    ErrorMetadata::new(
        "E001",
        "FileProcessing",
        Severity::Medium,
        false,
        "Input file not found",
        "Check the file path",
    ),
    ErrorMetadata::new(
        "E002",
        "FileProcessing",
        Severity::High,
        false,
        "Input file exceeds the maximum size",
        "Split the input or raise APBS_MAX_FILE_SIZE within the compile-time cap",
    ),
    ErrorMetadata::new(
        "E003",
        "FileProcessing",
        Severity::Low,
        false,
        "Input file is empty",
        "Provide a READ section and at least one calculation",
    ),
    ErrorMetadata::new(
        "E004",
        "FileProcessing",
        Severity::Medium,
        false,
        "Permission denied while reading input",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::Medium,
        false,
        "Input file is not valid UTF-8",
        "Re-save the file as UTF-8 or ASCII",
    ),
    ErrorMetadata::new(
        "E006",
        "FileProcessing",
        Severity::Medium,
        true,
        "I/O error while reading input",
        "Retry the operation",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::Medium,
        false,
        "Path does not name a regular file",
        "Pass a file rather than a directory",
    ),
    ErrorMetadata::new(
        "E008",
        "FileProcessing",
        Severity::Low,
        true,
        "File extension is not a recognised input format",
        "Use .in for legacy decks, .json or .toml for structured input",
    ),
    ErrorMetadata::new(
        "E009",
        "FileProcessing",
        Severity::High,
        false,
        "Input file has too many lines",
        "Split the input",
    ),
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::High,
        false,
        "Control character in input",
        "Remove non-printable characters",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::High,
        false,
        "Malformed numeric literal",
        "Write numbers as 12, -3.5 or 1.0e-6",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::High,
        false,
        "Word exceeds the maximum length",
        "Shorten the path or identifier",
    ),
    ErrorMetadata::new(
        "E023",
        "Lexical",
        Severity::High,
        false,
        "Input contains too many tokens",
        "Split the input",
    ),
    ErrorMetadata::new(
        "E024",
        "Lexical",
        Severity::Medium,
        false,
        "Comment exceeds the maximum length",
        "Shorten the comment",
    ),
    ErrorMetadata::new(
        "E040",
        "Syntax",
        Severity::High,
        false,
        "Unrecognized token",
        "Check the keyword against the section grammar",
    ),
    ErrorMetadata::new(
        "E041",
        "Syntax",
        Severity::High,
        false,
        "Input ended in the middle of a directive",
        "Complete the directive",
    ),
    ErrorMetadata::new(
        "E042",
        "Syntax",
        Severity::High,
        false,
        "Section is not terminated by END",
        "Add END after the last directive of the section",
    ),
    ErrorMetadata::new(
        "E043",
        "Syntax",
        Severity::High,
        false,
        "Input is not terminated by QUIT",
        "Add QUIT after the last section",
    ),
    ErrorMetadata::new(
        "E044",
        "Syntax",
        Severity::High,
        false,
        "Required directive missing",
        "Add the missing directive to the section",
    ),
    ErrorMetadata::new(
        "E045",
        "Syntax",
        Severity::High,
        false,
        "Directive may appear only once per section",
        "Remove the duplicate directive",
    ),
    ErrorMetadata::new(
        "E046",
        "Syntax",
        Severity::High,
        false,
        "Value is not one of the accepted choices",
        "Use one of the listed values",
    ),
    ErrorMetadata::new(
        "E047",
        "Syntax",
        Severity::High,
        false,
        "Numeric value outside its allowed range",
        "Use a value inside the documented bounds",
    ),
    ErrorMetadata::new(
        "E048",
        "Syntax",
        Severity::High,
        false,
        "Directive not valid for this calculation type",
        "Remove the directive or change the calculation type",
    ),
    ErrorMetadata::new(
        "E049",
        "Syntax",
        Severity::High,
        false,
        "Required section missing",
        "Provide a READ section and an ELEC or APOLAR section",
    ),
    ErrorMetadata::new(
        "E050",
        "Syntax",
        Severity::High,
        false,
        "Input contains too many sections",
        "Split the input",
    ),
    ErrorMetadata::new(
        "W040",
        "Syntax",
        Severity::Low,
        true,
        "Deprecated keyword replaced by its canonical form",
        "Update the input to use the canonical keyword",
    ),
    ErrorMetadata::new(
        "E060",
        "Model",
        Severity::High,
        false,
        "Required key missing from mapping",
        "Add the key, using null to leave it unset",
    ),
    ErrorMetadata::new(
        "E061",
        "Model",
        Severity::High,
        false,
        "Value has the wrong type",
        "Check the schema for the expected type",
    ),
    ErrorMetadata::new(
        "E062",
        "Model",
        Severity::High,
        false,
        "Value outside its allowed domain",
        "Use a value inside the documented bounds or enumeration",
    ),
    ErrorMetadata::new(
        "E063",
        "Model",
        Severity::High,
        false,
        "Typed record failed validation",
        "Fix every violation listed in the message",
    ),
    ErrorMetadata::new(
        "E064",
        "Model",
        Severity::Medium,
        false,
        "Structured text could not be encoded or decoded",
        "Check JSON or TOML syntax",
    ),
];

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_is_registered() {
        let codes = [
            system::INTERNAL_ERROR,
            file_processing::FILE_NOT_FOUND,
            file_processing::TOO_MANY_LINES,
            lexical::INVALID_NUMBER,
            syntax::UNEXPECTED_TOKEN,
            syntax::MISSING_END,
            syntax::DUPLICATE_DIRECTIVE,
            syntax::DEPRECATED_KEYWORD,
            model::MISSING_KEY,
            model::VALIDATION_FAILED,
        ];
        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification_lookup() {
        assert_eq!(get_category("E045"), "Syntax");
        assert_eq!(get_category("E063"), "Model");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(is_recoverable("W040"));
        assert_eq!(get_description("nope"), "Unknown error");
    }

    #[test]
    fn test_registry_codes_are_unique() {
        assert_eq!(get_error_registry().len(), REGISTRY_ENTRIES.len());
    }
}
