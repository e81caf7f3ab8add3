//! Records shared by several calculation types

use super::error::{ModelResult, Violations};
use super::fields::{accept, checks, Fields, Mapping, MappingBuilder};
use super::InputFile;

pub const WRITE_MAP_PROPERTIES: &[&str] = &[
    "charge density",
    "potential",
    "atom potential",
    "solvent accessibility",
    "ion accessibility",
    "laplacian",
    "energy density",
    "ion number density",
    "ion charge density",
    "dielectric x",
    "dielectric y",
    "dielectric z",
];

pub const WRITE_MAP_FORMATS: &[&str] = &["dx", "dx.gz", "flat", "uhbd"];

pub const USE_MAP_PROPERTIES: &[&str] =
    &["dielectric", "ion accessibility", "charge density", "potential"];

/// Mobile ion species in electrolyte
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ion {
    /// Charge in electrons
    pub charge: Option<f64>,
    /// Radius in Å
    pub radius: Option<f64>,
    /// Concentration in M
    pub concentration: Option<f64>,
}

impl Ion {
    pub fn new(charge: f64, radius: f64, concentration: f64) -> ModelResult<Self> {
        let mut ion = Self::default();
        ion.set_charge(charge);
        ion.set_radius(radius)?;
        ion.set_concentration(concentration)?;
        Ok(ion)
    }

    pub fn set_charge(&mut self, value: f64) {
        self.charge = Some(value);
    }

    pub fn set_radius(&mut self, value: f64) -> ModelResult<()> {
        self.radius = Some(accept(checks::positive("radius", value))?);
        Ok(())
    }

    pub fn set_concentration(&mut self, value: f64) -> ModelResult<()> {
        self.concentration = Some(accept(checks::non_negative("concentration", value))?);
        Ok(())
    }
}

impl InputFile for Ion {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut ion = Self::default();
        if let Some(charge) = fields.number("charge")? {
            ion.set_charge(charge);
        }
        if let Some(radius) = fields.number("radius")? {
            ion.set_radius(radius)?;
        }
        if let Some(concentration) = fields.number("concentration")? {
            ion.set_concentration(concentration)?;
        }
        Ok(ion)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("charge", self.charge)
            .opt("radius", self.radius)
            .opt("concentration", self.concentration)
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.present("charge", &self.charge);
        violations.require("radius", self.radius, checks::positive);
        violations.require("concentration", self.concentration, checks::non_negative);
        violations.finish()
    }
}

/// Set of mobile ion species
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MobileIons {
    pub species: Vec<Ion>,
}

impl MobileIons {
    pub fn new(species: Vec<Ion>) -> Self {
        Self { species }
    }

    /// Signed, concentration-weighted charge of all species
    pub fn net_charge(&self) -> f64 {
        self.species
            .iter()
            .filter_map(|ion| Some(ion.charge? * ion.concentration?))
            .sum()
    }
}

impl InputFile for MobileIons {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        Ok(Self {
            species: fields.records("species", Ion::from_mapping)?,
        })
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .records(
                "species",
                self.species.iter().map(|ion| ion.to_mapping()).collect(),
            )
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        for ion in &self.species {
            violations.nested(ion.validate());
        }
        let net_charge = self.net_charge();
        if net_charge != 0.0 {
            violations.push(format!(
                "The net mobile ion charge ({} e) is not zero.",
                net_charge
            ));
        }
        violations.finish()
    }
}

/// Property of the system written out to a map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteMap {
    pub property: Option<String>,
    pub format: Option<String>,
    /// Path stem; the extension follows from the format
    pub path: Option<String>,
}

impl WriteMap {
    pub fn set_property(&mut self, value: &str) -> ModelResult<()> {
        self.property = Some(accept(checks::choice(
            "property",
            value,
            WRITE_MAP_PROPERTIES,
        ))?);
        Ok(())
    }

    pub fn set_format(&mut self, value: &str) -> ModelResult<()> {
        self.format = Some(accept(checks::choice("format", value, WRITE_MAP_FORMATS))?);
        Ok(())
    }

    pub fn set_path(&mut self, value: &str) -> ModelResult<()> {
        self.path = Some(accept(checks::non_empty("path", value))?);
        Ok(())
    }
}

impl InputFile for WriteMap {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut map = Self::default();
        if let Some(property) = fields.string("property")? {
            map.set_property(&property)?;
        }
        if let Some(format) = fields.string("format")? {
            map.set_format(&format)?;
        }
        if let Some(path) = fields.string("path")? {
            map.set_path(&path)?;
        }
        Ok(map)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("property", self.property.clone())
            .opt("format", self.format.clone())
            .opt("path", self.path.clone())
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.require("property", self.property.as_deref(), |name, value| {
            checks::choice(name, value, WRITE_MAP_PROPERTIES)
        });
        violations.require("format", self.format.as_deref(), |name, value| {
            checks::choice(name, value, WRITE_MAP_FORMATS)
        });
        violations.require("path", self.path.as_deref(), checks::non_empty);
        violations.finish()
    }
}

/// Property of the system taken from a previously read map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UseMap {
    pub property: Option<String>,
    /// Alias of a map in the read section
    pub alias: Option<String>,
}

impl UseMap {
    pub fn set_property(&mut self, value: &str) -> ModelResult<()> {
        self.property = Some(accept(checks::choice(
            "property",
            value,
            USE_MAP_PROPERTIES,
        ))?);
        Ok(())
    }

    pub fn set_alias(&mut self, value: &str) -> ModelResult<()> {
        self.alias = Some(accept(checks::non_empty("alias", value))?);
        Ok(())
    }
}

impl InputFile for UseMap {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut map = Self::default();
        if let Some(property) = fields.string("property")? {
            map.set_property(&property)?;
        }
        if let Some(alias) = fields.string("alias")? {
            map.set_alias(&alias)?;
        }
        Ok(map)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("property", self.property.clone())
            .opt("alias", self.alias.clone())
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.require("property", self.property.as_deref(), |name, value| {
            checks::choice(name, value, USE_MAP_PROPERTIES)
        });
        violations.require("alias", self.alias.as_deref(), checks::non_empty);
        violations.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use assert_matches::assert_matches;

    fn ions(pairs: &[(f64, f64)]) -> MobileIons {
        MobileIons::new(
            pairs
                .iter()
                .map(|&(charge, concentration)| Ion::new(charge, 2.0, concentration).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_electroneutrality() {
        let unbalanced = ions(&[(1.0, 0.1), (-1.0, 0.2)]);
        assert_matches!(
            unbalanced.validate(),
            Err(ModelError::Invalid { message }) if message.starts_with("The net mobile ion charge")
        );

        let balanced = ions(&[(1.0, 0.1), (-1.0, 0.1)]);
        balanced.validate().unwrap();

        let divalent = ions(&[(2.0, 0.05), (-1.0, 0.1)]);
        divalent.validate().unwrap();

        MobileIons::default().validate().unwrap();
    }

    #[test]
    fn test_ion_domains() {
        assert_matches!(Ion::new(1.0, 0.0, 0.1), Err(ModelError::OutOfDomain { .. }));
        assert_matches!(Ion::new(1.0, 2.0, -0.1), Err(ModelError::OutOfDomain { .. }));
        assert!(Ion::new(-1.0, 1.8, 0.0).is_ok());
    }

    #[test]
    fn test_mobile_ions_round_trip() {
        let json = r#"{"species": [
            {"charge": 1, "radius": 2.0, "concentration": 0.15},
            {"charge": -1, "radius": 1.8, "concentration": 0.15}
        ]}"#;
        let ions = MobileIons::from_json(json).unwrap();
        ions.validate().unwrap();
        assert_eq!(ions.species[1].charge, Some(-1.0));
        assert_eq!(MobileIons::from_mapping(&ions.to_mapping()).unwrap(), ions);
    }

    #[test]
    fn test_write_map_vocabulary() {
        let map = WriteMap::from_json(
            r#"{"property": "Dielectric X", "format": "dx.gz", "path": "dielx"}"#,
        )
        .unwrap();
        assert_eq!(map.property.as_deref(), Some("dielectric x"));
        map.validate().unwrap();

        let mut map = WriteMap::default();
        assert_matches!(map.set_format("png"), Err(ModelError::OutOfDomain { .. }));
        assert_eq!(
            map.validate().unwrap_err().to_string(),
            "property is not set. format is not set. path is not set."
        );
    }

    #[test]
    fn test_use_map() {
        let map = UseMap::from_json(r#"{"property": "potential", "alias": "boundary"}"#).unwrap();
        map.validate().unwrap();
        assert_matches!(
            UseMap::from_json(r#"{"property": "laplacian", "alias": "x"}"#),
            Err(ModelError::OutOfDomain { .. })
        );
    }
}
