//! Finite-element polar solvation with adaptive mesh refinement

use super::error::{ModelResult, Violations};
use super::fields::{accept, checks, Fields, Mapping, MappingBuilder};
use super::polar::PolarSettings;
use super::InputFile;

pub const A_PRIORI_REFINEMENTS: &[&str] = &["geometric", "uniform"];

pub const ERROR_BASED_REFINEMENTS: &[&str] = &["global", "simplex", "fraction"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiniteElement {
    pub settings: PolarSettings,
    /// Refinement of the initial mesh before solving
    pub a_priori_refinement: Option<String>,
    /// Box lengths in Å of the problem domain
    pub domain_length: Option<[f64; 3]>,
    /// How simplices are chosen for error-driven refinement
    pub error_based_refinement: Option<String>,
    pub initial_mesh_resolution: Option<f64>,
    pub initial_mesh_vertices: Option<i64>,
    pub maximum_refinement_iterations: Option<i64>,
    pub maximum_vertices: Option<i64>,
    pub no_op: Option<bool>,
}

impl FiniteElement {
    pub fn set_a_priori_refinement(&mut self, value: &str) -> ModelResult<()> {
        self.a_priori_refinement = Some(accept(checks::choice(
            "a priori refinement",
            value,
            A_PRIORI_REFINEMENTS,
        ))?);
        Ok(())
    }

    pub fn set_domain_length(&mut self, value: [f64; 3]) -> ModelResult<()> {
        self.domain_length = Some(accept(checks::positive_triple("domain length", value))?);
        Ok(())
    }

    pub fn set_error_based_refinement(&mut self, value: &str) -> ModelResult<()> {
        self.error_based_refinement = Some(accept(checks::choice(
            "error based refinement",
            value,
            ERROR_BASED_REFINEMENTS,
        ))?);
        Ok(())
    }

    pub fn set_initial_mesh_resolution(&mut self, value: f64) -> ModelResult<()> {
        self.initial_mesh_resolution =
            Some(accept(checks::positive("initial mesh resolution", value))?);
        Ok(())
    }

    pub fn set_initial_mesh_vertices(&mut self, value: i64) -> ModelResult<()> {
        self.initial_mesh_vertices = Some(accept(checks::positive_integer(
            "initial mesh vertices",
            value,
        ))?);
        Ok(())
    }

    pub fn set_maximum_refinement_iterations(&mut self, value: i64) -> ModelResult<()> {
        self.maximum_refinement_iterations = Some(accept(checks::positive_integer(
            "maximum refinement iterations",
            value,
        ))?);
        Ok(())
    }

    pub fn set_maximum_vertices(&mut self, value: i64) -> ModelResult<()> {
        self.maximum_vertices = Some(accept(checks::positive_integer(
            "maximum vertices",
            value,
        ))?);
        Ok(())
    }
}

impl InputFile for FiniteElement {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut calculation = Self {
            settings: PolarSettings::from_mapping(mapping)?,
            ..Self::default()
        };
        if let Some(value) = fields.string("a priori refinement")? {
            calculation.set_a_priori_refinement(&value)?;
        }
        if let Some(value) = fields.triple("domain length")? {
            calculation.set_domain_length(value)?;
        }
        if let Some(value) = fields.string("error based refinement")? {
            calculation.set_error_based_refinement(&value)?;
        }
        if let Some(value) = fields.opt_number("initial mesh resolution")? {
            calculation.set_initial_mesh_resolution(value)?;
        }
        if let Some(value) = fields.opt_integer("initial mesh vertices")? {
            calculation.set_initial_mesh_vertices(value)?;
        }
        if let Some(value) = fields.integer("maximum refinement iterations")? {
            calculation.set_maximum_refinement_iterations(value)?;
        }
        if let Some(value) = fields.integer("maximum vertices")? {
            calculation.set_maximum_vertices(value)?;
        }
        calculation.no_op = fields.opt_boolean("no-op")?;
        Ok(calculation)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .merge(self.settings.to_mapping())
            .opt("a priori refinement", self.a_priori_refinement.clone())
            .opt_triple("domain length", self.domain_length)
            .opt("error based refinement", self.error_based_refinement.clone())
            .opt("initial mesh resolution", self.initial_mesh_resolution)
            .opt("initial mesh vertices", self.initial_mesh_vertices)
            .opt(
                "maximum refinement iterations",
                self.maximum_refinement_iterations,
            )
            .opt("maximum vertices", self.maximum_vertices)
            .opt("no-op", self.no_op)
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.nested(self.settings.validate());
        violations.require(
            "a priori refinement",
            self.a_priori_refinement.as_deref(),
            |name, value| checks::choice(name, value, A_PRIORI_REFINEMENTS),
        );
        violations.require(
            "domain length",
            self.domain_length,
            checks::positive_triple,
        );
        violations.require(
            "error based refinement",
            self.error_based_refinement.as_deref(),
            |name, value| checks::choice(name, value, ERROR_BASED_REFINEMENTS),
        );
        violations.optional(
            "initial mesh resolution",
            self.initial_mesh_resolution,
            checks::positive,
        );
        violations.optional(
            "initial mesh vertices",
            self.initial_mesh_vertices,
            checks::positive_integer,
        );
        violations.require(
            "maximum refinement iterations",
            self.maximum_refinement_iterations,
            checks::positive_integer,
        );
        violations.require(
            "maximum vertices",
            self.maximum_vertices,
            checks::positive_integer,
        );
        if let (Some(initial), Some(maximum)) = (self.initial_mesh_vertices, self.maximum_vertices)
        {
            violations.check(initial <= maximum, || {
                format!(
                    "Initial mesh vertices {} setting is greater than maximum mesh vertices setting {}.",
                    initial, maximum
                )
            });
        }
        violations.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::polar::testing::polar_settings;
    use crate::model::ModelError;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn finite_element_value() -> serde_json::Value {
        let mut value = polar_settings();
        let object = value.as_object_mut().unwrap();
        for (key, item) in [
            ("a priori refinement", json!("Geometric")),
            ("domain length", json!([50, 50, 50])),
            ("error based refinement", json!("fraction")),
            ("initial mesh resolution", json!(2.0)),
            ("initial mesh vertices", json!(20000)),
            ("maximum refinement iterations", json!(8)),
            ("maximum vertices", json!(400000)),
        ] {
            object.insert(key.to_string(), item);
        }
        value
    }

    #[test]
    fn test_finite_element_round_trip() {
        let value = finite_element_value();
        let calculation = FiniteElement::from_mapping(value.as_object().unwrap()).unwrap();
        calculation.validate().unwrap();
        assert_eq!(calculation.a_priori_refinement.as_deref(), Some("geometric"));
        assert_eq!(
            FiniteElement::from_mapping(&calculation.to_mapping()).unwrap(),
            calculation
        );
    }

    #[test]
    fn test_initial_vertices_above_maximum() {
        let mut value = finite_element_value();
        value["maximum vertices"] = json!(1000);
        let calculation = FiniteElement::from_mapping(value.as_object().unwrap()).unwrap();
        assert_eq!(
            calculation.validate().unwrap_err().to_string(),
            "Initial mesh vertices 20000 setting is greater than maximum mesh vertices setting 1000."
        );
    }

    #[test]
    fn test_refinement_vocabularies() {
        let mut calculation = FiniteElement::default();
        assert_matches!(
            calculation.set_error_based_refinement("local"),
            Err(ModelError::OutOfDomain { .. })
        );
        assert_matches!(
            calculation.set_domain_length([50.0, 0.0, 50.0]),
            Err(ModelError::OutOfDomain { .. })
        );
        let mut value = finite_element_value();
        value.as_object_mut().unwrap().remove("maximum vertices");
        assert_matches!(
            FiniteElement::from_mapping(value.as_object().unwrap()),
            Err(ModelError::MissingKey { key }) if key == "maximum vertices"
        );
    }
}
