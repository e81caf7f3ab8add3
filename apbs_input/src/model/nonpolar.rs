//! Nonpolar solvation: cavity, pressure-volume and dispersion terms

use super::error::{ModelResult, Violations};
use super::fields::{accept, checks, Fields, Mapping, MappingBuilder};
use super::InputFile;

pub const SURFACE_METHODS: &[&str] = &["solvent-accessible"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Nonpolar {
    pub calculate_energy: Option<bool>,
    pub calculate_forces: Option<bool>,
    /// Displacement in Å for finite-difference forces
    pub displacement: Option<f64>,
    /// Quadrature grid spacings in Å for the dispersion integral
    pub grid_spacings: Option<[f64; 3]>,
    pub molecule: Option<String>,
    /// Solvent pressure in kJ mol⁻¹ Å⁻³
    pub pressure: Option<f64>,
    /// Bulk solvent density in Å⁻³
    pub solvent_density: Option<f64>,
    pub solvent_radius: Option<f64>,
    /// Surface points per Å²
    pub surface_density: Option<f64>,
    pub surface_method: Option<String>,
    /// Surface tension in kJ mol⁻¹ Å⁻²
    pub surface_tension: Option<f64>,
    pub temperature: Option<f64>,
}

impl Nonpolar {
    pub fn set_displacement(&mut self, value: f64) -> ModelResult<()> {
        self.displacement = Some(accept(checks::positive("displacement", value))?);
        Ok(())
    }

    pub fn set_grid_spacings(&mut self, value: [f64; 3]) -> ModelResult<()> {
        self.grid_spacings = Some(accept(checks::positive_triple("grid spacings", value))?);
        Ok(())
    }

    pub fn set_molecule(&mut self, value: &str) -> ModelResult<()> {
        self.molecule = Some(accept(checks::non_empty("molecule", value))?);
        Ok(())
    }

    pub fn set_pressure(&mut self, value: f64) -> ModelResult<()> {
        self.pressure = Some(accept(checks::non_negative("pressure", value))?);
        Ok(())
    }

    pub fn set_solvent_density(&mut self, value: f64) -> ModelResult<()> {
        self.solvent_density = Some(accept(checks::non_negative("solvent density", value))?);
        Ok(())
    }

    pub fn set_solvent_radius(&mut self, value: f64) -> ModelResult<()> {
        self.solvent_radius = Some(accept(checks::non_negative("solvent radius", value))?);
        Ok(())
    }

    pub fn set_surface_density(&mut self, value: f64) -> ModelResult<()> {
        self.surface_density = Some(accept(checks::positive("surface density", value))?);
        Ok(())
    }

    pub fn set_surface_method(&mut self, value: &str) -> ModelResult<()> {
        self.surface_method = Some(accept(checks::choice(
            "surface method",
            value,
            SURFACE_METHODS,
        ))?);
        Ok(())
    }

    pub fn set_surface_tension(&mut self, value: f64) -> ModelResult<()> {
        self.surface_tension = Some(accept(checks::non_negative("surface tension", value))?);
        Ok(())
    }

    pub fn set_temperature(&mut self, value: f64) -> ModelResult<()> {
        self.temperature = Some(accept(checks::positive("temperature", value))?);
        Ok(())
    }
}

impl InputFile for Nonpolar {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut calculation = Self {
            calculate_energy: fields.boolean("calculate energy")?,
            calculate_forces: fields.boolean("calculate forces")?,
            ..Self::default()
        };
        if let Some(value) = fields.opt_number("displacement")? {
            calculation.set_displacement(value)?;
        }
        if let Some(value) = fields.triple("grid spacings")? {
            calculation.set_grid_spacings(value)?;
        }
        if let Some(value) = fields.string("molecule")? {
            calculation.set_molecule(&value)?;
        }
        if let Some(value) = fields.number("pressure")? {
            calculation.set_pressure(value)?;
        }
        if let Some(value) = fields.number("solvent density")? {
            calculation.set_solvent_density(value)?;
        }
        if let Some(value) = fields.number("solvent radius")? {
            calculation.set_solvent_radius(value)?;
        }
        if let Some(value) = fields.number("surface density")? {
            calculation.set_surface_density(value)?;
        }
        if let Some(value) = fields.string("surface method")? {
            calculation.set_surface_method(&value)?;
        }
        if let Some(value) = fields.number("surface tension")? {
            calculation.set_surface_tension(value)?;
        }
        if let Some(value) = fields.number("temperature")? {
            calculation.set_temperature(value)?;
        }
        Ok(calculation)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("calculate energy", self.calculate_energy)
            .opt("calculate forces", self.calculate_forces)
            .opt("displacement", self.displacement)
            .opt_triple("grid spacings", self.grid_spacings)
            .opt("molecule", self.molecule.clone())
            .opt("pressure", self.pressure)
            .opt("solvent density", self.solvent_density)
            .opt("solvent radius", self.solvent_radius)
            .opt("surface density", self.surface_density)
            .opt("surface method", self.surface_method.clone())
            .opt("surface tension", self.surface_tension)
            .opt("temperature", self.temperature)
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.present("calculate energy", &self.calculate_energy);
        violations.present("calculate forces", &self.calculate_forces);
        if self.calculate_forces == Some(true) {
            violations.require("displacement", self.displacement, checks::positive);
        } else {
            violations.optional("displacement", self.displacement, checks::positive);
        }
        violations.require("grid spacings", self.grid_spacings, checks::positive_triple);
        violations.require("molecule", self.molecule.as_deref(), checks::non_empty);
        violations.require("pressure", self.pressure, checks::non_negative);
        violations.require("solvent density", self.solvent_density, checks::non_negative);
        violations.require("solvent radius", self.solvent_radius, checks::non_negative);
        violations.require("surface density", self.surface_density, checks::positive);
        violations.require(
            "surface method",
            self.surface_method.as_deref(),
            |name, value| checks::choice(name, value, SURFACE_METHODS),
        );
        violations.require("surface tension", self.surface_tension, checks::non_negative);
        violations.require("temperature", self.temperature, checks::positive);
        violations.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use assert_matches::assert_matches;

    const NONPOLAR: &str = r#"
        "calculate energy" = true
        "calculate forces" = true
        displacement = 0.1
        "grid spacings" = [0.5, 0.5, 0.5]
        molecule = "complex"
        pressure = 0.008
        "solvent density" = 0.0334
        "solvent radius" = 1.4
        "surface density" = 10.0
        "surface method" = "solvent-accessible"
        "surface tension" = 0.0085
        temperature = 298.15
    "#;

    #[test]
    fn test_nonpolar_from_toml() {
        let calculation = Nonpolar::from_toml(NONPOLAR).unwrap();
        calculation.validate().unwrap();
        assert_eq!(calculation.grid_spacings, Some([0.5, 0.5, 0.5]));
        assert_eq!(
            Nonpolar::from_json(&calculation.to_json().unwrap()).unwrap(),
            calculation
        );
    }

    #[test]
    fn test_forces_need_displacement() {
        let mut calculation = Nonpolar::from_toml(NONPOLAR).unwrap();
        calculation.displacement = None;
        assert_eq!(
            calculation.validate().unwrap_err().to_string(),
            "displacement is not set."
        );
        calculation.calculate_forces = Some(false);
        calculation.validate().unwrap();
    }

    #[test]
    fn test_nonpolar_domains() {
        let mut calculation = Nonpolar::default();
        assert_matches!(calculation.set_pressure(-1.0), Err(ModelError::OutOfDomain { .. }));
        assert_matches!(
            calculation.set_surface_method("molecular surface"),
            Err(ModelError::OutOfDomain { .. })
        );
        assert_matches!(
            calculation.set_grid_spacings([0.5, 0.0, 0.5]),
            Err(ModelError::OutOfDomain { .. })
        );
        assert_matches!(
            Nonpolar::from_toml("\"calculate energy\" = true"),
            Err(ModelError::MissingKey { key }) if key == "calculate forces"
        );
    }
}
