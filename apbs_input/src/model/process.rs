//! Post-processing of calculation results
//!
//! Operations are declarative; the solver evaluates them:
//!
//! - **sums**: `Σ coefficient_i * value(alias_i)`
//! - **products**: `Π coefficient_i * value(alias_i)`
//! - **exps**: `exp(coefficient * value(alias))` with a single element

use super::error::{ModelResult, Violations};
use super::fields::{accept, checks, duplicate_aliases, Fields, Mapping, MappingBuilder};
use super::InputFile;

/// Weighted reference to a calculation or operation result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub alias: Option<String>,
    pub coefficient: Option<f64>,
}

impl Element {
    pub fn new(alias: &str, coefficient: f64) -> ModelResult<Self> {
        let mut element = Self::default();
        element.set_alias(alias)?;
        element.coefficient = Some(coefficient);
        Ok(element)
    }

    pub fn set_alias(&mut self, value: &str) -> ModelResult<()> {
        self.alias = Some(accept(checks::non_empty("alias", value))?);
        Ok(())
    }
}

impl InputFile for Element {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut element = Self::default();
        if let Some(alias) = fields.string("alias")? {
            element.set_alias(&alias)?;
        }
        element.coefficient = fields.number("coefficient")?;
        Ok(element)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("alias", self.alias.clone())
            .opt("coefficient", self.coefficient)
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.check(self.alias.is_some(), || "Alias not set.".to_string());
        violations.check(self.coefficient.is_some(), || {
            "Coefficient not set.".to_string()
        });
        violations.finish()
    }
}

/// Named combination of elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub alias: Option<String>,
    pub elements: Vec<Element>,
}

impl Operation {
    pub fn set_alias(&mut self, value: &str) -> ModelResult<()> {
        self.alias = Some(accept(checks::non_empty("alias", value))?);
        Ok(())
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl InputFile for Operation {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut operation = Self::default();
        if let Some(alias) = fields.string("alias")? {
            operation.set_alias(&alias)?;
        }
        operation.elements = fields.records("elements", Element::from_mapping)?;
        Ok(operation)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("alias", self.alias.clone())
            .records(
                "elements",
                self.elements.iter().map(|e| e.to_mapping()).collect(),
            )
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.check(self.alias.is_some(), || {
            "Operation alias cannot be None.".to_string()
        });
        violations.check(!self.elements.is_empty(), || {
            format!("Operation {} has no elements.", self.alias().unwrap_or("<unnamed>"))
        });
        for element in &self.elements {
            violations.nested(element.validate());
        }
        violations.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Process {
    pub sums: Vec<Operation>,
    pub products: Vec<Operation>,
    pub exponentials: Vec<Operation>,
}

impl Process {
    /// Every operation in evaluation order: sums, products, exponentials
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.sums
            .iter()
            .chain(&self.products)
            .chain(&self.exponentials)
    }
}

impl InputFile for Process {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        Ok(Self {
            sums: fields.list("sums", Operation::from_mapping)?,
            products: fields.list("products", Operation::from_mapping)?,
            exponentials: fields.list("exps", Operation::from_mapping)?,
        })
    }

    fn to_mapping(&self) -> Mapping {
        fn dump(operations: &[Operation]) -> Vec<Mapping> {
            operations.iter().map(|o| o.to_mapping()).collect()
        }
        MappingBuilder::new()
            .list("sums", dump(&self.sums))
            .list("products", dump(&self.products))
            .list("exps", dump(&self.exponentials))
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        for operation in self.operations() {
            violations.nested(operation.validate());
        }
        for operation in &self.exponentials {
            violations.check(operation.elements.len() <= 1, || {
                format!(
                    "Exponential {} must have exactly one element.",
                    operation.alias().unwrap_or("<unnamed>")
                )
            });
        }
        for alias in duplicate_aliases(self.operations().filter_map(Operation::alias)) {
            violations.push(format!("Duplicate operation alias '{}'.", alias));
        }
        violations.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use assert_matches::assert_matches;

    const GOOD_PROCESS: &str = r#"
        [[sums]]
        alias = "my sum 1"
        elements = [
            {alias = "foo 1", coefficient = -2},
            {alias = "foo 2", coefficient = 3.14},
        ]

        [[sums]]
        alias = "my sum 2"
        elements = [
            {alias = "bar 1", coefficient = -3},
            {alias = "bar 2", coefficient = 1.12},
        ]

        [[products]]
        alias = "my product"
        elements = [
            {alias = "foo 1", coefficient = -20},
            {alias = "foo 2", coefficient = 3.14},
        ]

        [[exps]]
        alias = "my exponential"
        elements = [{alias = "foo 1", coefficient = 0.02}]
    "#;

    #[test]
    fn test_good_process() {
        let process = Process::from_toml(GOOD_PROCESS).unwrap();
        process.validate().unwrap();
        assert_eq!(process.sums.len(), 2);
        assert_eq!(process.sums[0].elements[0].coefficient, Some(-2.0));
        assert_eq!(process.operations().count(), 4);
        assert_eq!(Process::from_mapping(&process.to_mapping()).unwrap(), process);
    }

    #[test]
    fn test_unset_coefficient_and_alias() {
        let process = Process::from_json(
            r#"{
                "sums": [{"alias": "total", "elements": [
                    {"alias": "foo 1", "coefficient": null},
                    {"alias": null, "coefficient": -3}
                ]}],
                "products": [],
                "exps": []
            }"#,
        )
        .unwrap();
        assert_matches!(
            process.validate(),
            Err(ModelError::Invalid { message }) if message == "Coefficient not set. Alias not set."
        );
    }

    #[test]
    fn test_missing_keys() {
        let missing_coefficient = GOOD_PROCESS
            .replace("{alias = \"foo 1\", coefficient = -2}", "{alias = \"foo 1\"}");
        assert_matches!(
            Process::from_toml(&missing_coefficient),
            Err(ModelError::MissingKey { key }) if key == "coefficient"
        );

        let missing_alias = GOOD_PROCESS
            .replace("{alias = \"bar 1\", coefficient = -3}", "{coefficient = -3}");
        assert_matches!(
            Process::from_toml(&missing_alias),
            Err(ModelError::MissingKey { key }) if key == "alias"
        );

        assert_matches!(
            Process::from_json(r#"{"sums": [{"elements": []}], "products": [], "exps": []}"#),
            Err(ModelError::MissingKey { key }) if key == "alias"
        );

        for list in ["sums", "products", "exps"] {
            let mut mapping = Process::from_toml(GOOD_PROCESS).unwrap().to_mapping();
            mapping.remove(list);
            assert_matches!(
                Process::from_mapping(&mapping),
                Err(ModelError::MissingKey { key }) if key == list
            );
        }
    }

    #[test]
    fn test_empty_lists_are_written() {
        let mapping = Process::default().to_mapping();
        assert_eq!(
            serde_json::Value::Object(mapping.clone()),
            serde_json::json!({"sums": [], "products": [], "exps": []})
        );
        assert_eq!(Process::from_mapping(&mapping).unwrap(), Process::default());
        assert_eq!(
            Process::from_toml(&Process::default().to_toml().unwrap()).unwrap(),
            Process::default()
        );
    }

    #[test]
    fn test_operation_alias_required() {
        let mut process = Process::from_toml(GOOD_PROCESS).unwrap();
        process.products[0].alias = None;
        assert_eq!(
            process.validate().unwrap_err().to_string(),
            "Operation alias cannot be None."
        );
    }

    #[test]
    fn test_exponential_single_element() {
        let mut process = Process::from_toml(GOOD_PROCESS).unwrap();
        process.exponentials[0]
            .elements
            .push(Element::new("foo 2", 1.0).unwrap());
        assert_eq!(
            process.validate().unwrap_err().to_string(),
            "Exponential my exponential must have exactly one element."
        );
    }
}
