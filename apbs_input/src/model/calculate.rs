//! Named calculation tagged by its type

use super::boundary_element::BoundaryElement;
use super::error::{ModelError, ModelResult, Violations};
use super::fields::{accept, checks, Fields, Mapping, MappingBuilder};
use super::finite_difference::FiniteDifference;
use super::finite_element::FiniteElement;
use super::generic::UseMap;
use super::nonpolar::Nonpolar;
use super::polar::BoundaryCondition;
use super::InputFile;

pub const CALCULATION_TYPES: &[&str] = &[
    "finite difference",
    "finite element",
    "boundary element",
    "nonpolar",
];

/// Parameters of one calculation; the type string is the tag
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationParameters {
    FiniteDifference(FiniteDifference),
    FiniteElement(FiniteElement),
    BoundaryElement(BoundaryElement),
    Nonpolar(Nonpolar),
}

impl CalculationParameters {
    pub fn from_parts(kind: &str, parameters: &Mapping) -> ModelResult<Self> {
        let kind = checks::choice("type", kind, CALCULATION_TYPES)
            .map_err(|_| ModelError::out_of_domain(format!("Unknown calculation type: {}.", kind)))?;
        Ok(match kind.as_str() {
            "finite difference" => Self::FiniteDifference(FiniteDifference::from_mapping(parameters)?),
            "finite element" => Self::FiniteElement(FiniteElement::from_mapping(parameters)?),
            "boundary element" => Self::BoundaryElement(BoundaryElement::from_mapping(parameters)?),
            _ => Self::Nonpolar(Nonpolar::from_mapping(parameters)?),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::FiniteDifference(_) => "finite difference",
            Self::FiniteElement(_) => "finite element",
            Self::BoundaryElement(_) => "boundary element",
            Self::Nonpolar(_) => "nonpolar",
        }
    }

    /// Alias of the molecule the calculation runs on
    pub fn molecule(&self) -> Option<&str> {
        match self {
            Self::FiniteDifference(fd) => fd.settings.molecule.as_deref(),
            Self::FiniteElement(fe) => fe.settings.molecule.as_deref(),
            Self::BoundaryElement(be) => be.molecule.as_deref(),
            Self::Nonpolar(np) => np.molecule.as_deref(),
        }
    }

    /// Every molecule alias the calculation names, grid centers included
    pub fn referenced_molecules(&self) -> Vec<&str> {
        let mut molecules: Vec<&str> = self.molecule().into_iter().collect();
        if let Self::FiniteDifference(fd) = self {
            if let Some(method) = &fd.method {
                molecules.extend(method.centered_molecules());
            }
        }
        molecules
    }

    pub fn boundary_condition(&self) -> Option<&BoundaryCondition> {
        match self {
            Self::FiniteDifference(fd) => fd.settings.boundary_condition.as_ref(),
            Self::FiniteElement(fe) => fe.settings.boundary_condition.as_ref(),
            Self::BoundaryElement(_) | Self::Nonpolar(_) => None,
        }
    }

    pub fn use_maps(&self) -> &[UseMap] {
        match self {
            Self::FiniteDifference(fd) => &fd.settings.use_maps,
            Self::FiniteElement(fe) => &fe.settings.use_maps,
            Self::BoundaryElement(_) | Self::Nonpolar(_) => &[],
        }
    }

    pub fn to_mapping(&self) -> Mapping {
        match self {
            Self::FiniteDifference(fd) => fd.to_mapping(),
            Self::FiniteElement(fe) => fe.to_mapping(),
            Self::BoundaryElement(be) => be.to_mapping(),
            Self::Nonpolar(np) => np.to_mapping(),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        match self {
            Self::FiniteDifference(fd) => fd.validate(),
            Self::FiniteElement(fe) => fe.validate(),
            Self::BoundaryElement(be) => be.validate(),
            Self::Nonpolar(np) => np.validate(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calculate {
    /// Name other calculations and post-processing refer to
    pub alias: Option<String>,
    pub parameters: Option<CalculationParameters>,
}

impl Calculate {
    pub fn set_alias(&mut self, value: &str) -> ModelResult<()> {
        self.alias = Some(accept(checks::non_empty("alias", value))?);
        Ok(())
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl InputFile for Calculate {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut calculation = Self::default();
        if let Some(alias) = fields.string("alias")? {
            calculation.set_alias(&alias)?;
        }
        if let Some(kind) = fields.string("type")? {
            calculation.parameters = fields.object("parameters", |parameters| {
                CalculationParameters::from_parts(&kind, parameters)
            })?;
        }
        Ok(calculation)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("alias", self.alias.clone())
            .opt("type", self.parameters.as_ref().map(|p| p.kind()))
            .opt_object(
                "parameters",
                self.parameters.as_ref().map(|p| p.to_mapping()),
            )
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.require("alias", self.alias.as_deref(), checks::non_empty);
        match &self.parameters {
            Some(parameters) => violations.nested(parameters.validate()),
            None => violations.push("type is not set."),
        }
        violations.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn nonpolar_calculation() -> serde_json::Value {
        json!({
            "alias": "apolar",
            "type": "Nonpolar",
            "parameters": {
                "calculate energy": true,
                "calculate forces": false,
                "grid spacings": [0.5, 0.5, 0.5],
                "molecule": "complex",
                "pressure": 0.0,
                "solvent density": 0.0,
                "solvent radius": 1.4,
                "surface density": 10.0,
                "surface method": "solvent-accessible",
                "surface tension": 0.0085,
                "temperature": 298.15
            }
        })
    }

    #[test]
    fn test_tagged_parameters() {
        let value = nonpolar_calculation();
        let calculation = Calculate::from_mapping(value.as_object().unwrap()).unwrap();
        calculation.validate().unwrap();
        assert_matches!(calculation.parameters, Some(CalculationParameters::Nonpolar(_)));
        assert_eq!(
            calculation.parameters.as_ref().and_then(|p| p.molecule()),
            Some("complex")
        );
        let dumped = calculation.to_mapping();
        assert_eq!(dumped["type"], json!("nonpolar"));
        assert_eq!(Calculate::from_mapping(&dumped).unwrap(), calculation);
    }

    #[test]
    fn test_unknown_type() {
        let mut value = nonpolar_calculation();
        value["type"] = json!("monte carlo");
        assert_matches!(
            Calculate::from_mapping(value.as_object().unwrap()),
            Err(ModelError::OutOfDomain { message }) if message == "Unknown calculation type: monte carlo."
        );
    }

    #[test]
    fn test_nested_violations_are_reported() {
        let mut value = nonpolar_calculation();
        value["parameters"]["temperature"] = serde_json::Value::Null;
        value["alias"] = serde_json::Value::Null;
        let calculation = Calculate::from_mapping(value.as_object().unwrap()).unwrap();
        assert_eq!(
            calculation.validate().unwrap_err().to_string(),
            "alias is not set. temperature is not set."
        );
    }
}
