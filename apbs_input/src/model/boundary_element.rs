//! Boundary-element linearized Poisson-Boltzmann calculation

use super::error::{ModelResult, Violations};
use super::fields::{accept, checks, Fields, Mapping, MappingBuilder};
use super::generic::MobileIons;
use super::InputFile;

pub const MESH_SOFTWARE: &[&str] = &["nanoshaper"];

pub const MESH_SURFACE_METHODS: &[&str] = &["molecular surface", "skin"];

pub const SOLVERS: &[&str] = &["tabi"];

/// How the molecular surface mesh is generated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub software: Option<String>,
    pub solvent_radius: Option<f64>,
    /// Vertices per Å²
    pub surface_density: Option<f64>,
    pub surface_method: Option<String>,
}

impl Mesh {
    pub fn set_software(&mut self, value: &str) -> ModelResult<()> {
        self.software = Some(accept(checks::choice("software", value, MESH_SOFTWARE))?);
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
            MESH_SURFACE_METHODS,
        ))?);
        Ok(())
    }
}

impl InputFile for Mesh {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut mesh = Self::default();
        if let Some(value) = fields.string("software")? {
            mesh.set_software(&value)?;
        }
        if let Some(value) = fields.number("solvent radius")? {
            mesh.set_solvent_radius(value)?;
        }
        if let Some(value) = fields.number("surface density")? {
            mesh.set_surface_density(value)?;
        }
        if let Some(value) = fields.string("surface method")? {
            mesh.set_surface_method(&value)?;
        }
        Ok(mesh)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("software", self.software.clone())
            .opt("solvent radius", self.solvent_radius)
            .opt("surface density", self.surface_density)
            .opt("surface method", self.surface_method.clone())
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.require("software", self.software.as_deref(), |name, value| {
            checks::choice(name, value, MESH_SOFTWARE)
        });
        violations.require("solvent radius", self.solvent_radius, checks::non_negative);
        violations.require("surface density", self.surface_density, checks::positive);
        violations.require(
            "surface method",
            self.surface_method.as_deref(),
            |name, value| checks::choice(name, value, MESH_SURFACE_METHODS),
        );
        violations.finish()
    }
}

/// Treecode settings for the TABI solver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabiParameters {
    /// Order of the Taylor expansion, typically 3
    pub tree_order: Option<i64>,
    /// Distance ratio below which clusters are approximated, typically 0.8
    pub multipole_acceptance_criterion: Option<f64>,
    /// Particles per tree leaf, typically 500
    pub maximum_particles: Option<i64>,
}

impl TabiParameters {
    pub fn set_tree_order(&mut self, value: i64) -> ModelResult<()> {
        self.tree_order = Some(accept(checks::positive_integer("tree order", value))?);
        Ok(())
    }

    pub fn set_multipole_acceptance_criterion(&mut self, value: f64) -> ModelResult<()> {
        self.multipole_acceptance_criterion = Some(accept(checks::unit_open(
            "multipole acceptance criterion",
            value,
        ))?);
        Ok(())
    }

    pub fn set_maximum_particles(&mut self, value: i64) -> ModelResult<()> {
        self.maximum_particles = Some(accept(checks::positive_integer(
            "maximum particles",
            value,
        ))?);
        Ok(())
    }
}

impl InputFile for TabiParameters {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut parameters = Self::default();
        if let Some(value) = fields.integer("tree order")? {
            parameters.set_tree_order(value)?;
        }
        if let Some(value) = fields.number("multipole acceptance criterion")? {
            parameters.set_multipole_acceptance_criterion(value)?;
        }
        if let Some(value) = fields.integer("maximum particles")? {
            parameters.set_maximum_particles(value)?;
        }
        Ok(parameters)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("tree order", self.tree_order)
            .opt(
                "multipole acceptance criterion",
                self.multipole_acceptance_criterion,
            )
            .opt("maximum particles", self.maximum_particles)
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.require("tree order", self.tree_order, checks::positive_integer);
        violations.require(
            "multipole acceptance criterion",
            self.multipole_acceptance_criterion,
            checks::unit_open,
        );
        violations.require(
            "maximum particles",
            self.maximum_particles,
            checks::positive_integer,
        );
        violations.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryElement {
    pub calculate_energy: Option<bool>,
    pub calculate_forces: Option<bool>,
    pub error_tolerance: Option<f64>,
    pub ions: Option<MobileIons>,
    pub mesh: Option<Mesh>,
    pub molecule: Option<String>,
    pub solute_dielectric: Option<f64>,
    pub solvent_dielectric: Option<f64>,
    pub solver: Option<String>,
    pub solver_parameters: Option<TabiParameters>,
    pub temperature: Option<f64>,
    pub write_atom_potentials: Option<String>,
}

impl BoundaryElement {
    pub fn set_error_tolerance(&mut self, value: f64) -> ModelResult<()> {
        self.error_tolerance = Some(accept(checks::unit_open("error tolerance", value))?);
        Ok(())
    }

    pub fn set_molecule(&mut self, value: &str) -> ModelResult<()> {
        self.molecule = Some(accept(checks::non_empty("molecule", value))?);
        Ok(())
    }

    pub fn set_solute_dielectric(&mut self, value: f64) -> ModelResult<()> {
        self.solute_dielectric = Some(accept(checks::at_least_one("solute dielectric", value))?);
        Ok(())
    }

    pub fn set_solvent_dielectric(&mut self, value: f64) -> ModelResult<()> {
        self.solvent_dielectric =
            Some(accept(checks::at_least_one("solvent dielectric", value))?);
        Ok(())
    }

    pub fn set_solver(&mut self, value: &str) -> ModelResult<()> {
        self.solver = Some(accept(checks::choice("solver", value, SOLVERS))?);
        Ok(())
    }

    pub fn set_temperature(&mut self, value: f64) -> ModelResult<()> {
        self.temperature = Some(accept(checks::positive("temperature", value))?);
        Ok(())
    }

    pub fn set_write_atom_potentials(&mut self, value: &str) -> ModelResult<()> {
        self.write_atom_potentials =
            Some(accept(checks::non_empty("write atom potentials", value))?);
        Ok(())
    }
}

impl InputFile for BoundaryElement {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut calculation = Self {
            calculate_energy: fields.boolean("calculate energy")?,
            calculate_forces: fields.boolean("calculate forces")?,
            ions: fields.opt_object("ions", MobileIons::from_mapping)?,
            mesh: fields.object("mesh", Mesh::from_mapping)?,
            ..Self::default()
        };
        if let Some(value) = fields.number("error tolerance")? {
            calculation.set_error_tolerance(value)?;
        }
        if let Some(value) = fields.string("molecule")? {
            calculation.set_molecule(&value)?;
        }
        if let Some(value) = fields.number("solute dielectric")? {
            calculation.set_solute_dielectric(value)?;
        }
        if let Some(value) = fields.number("solvent dielectric")? {
            calculation.set_solvent_dielectric(value)?;
        }
        if let Some(value) = fields.string("solver")? {
            calculation.set_solver(&value)?;
        }
        calculation.solver_parameters =
            fields.object("solver parameters", TabiParameters::from_mapping)?;
        if let Some(value) = fields.number("temperature")? {
            calculation.set_temperature(value)?;
        }
        if let Some(value) = fields.opt_string("write atom potentials")? {
            calculation.set_write_atom_potentials(&value)?;
        }
        Ok(calculation)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("calculate energy", self.calculate_energy)
            .opt("calculate forces", self.calculate_forces)
            .opt("error tolerance", self.error_tolerance)
            .opt_object("ions", self.ions.as_ref().map(|ions| ions.to_mapping()))
            .opt_object("mesh", self.mesh.as_ref().map(|mesh| mesh.to_mapping()))
            .opt("molecule", self.molecule.clone())
            .opt("solute dielectric", self.solute_dielectric)
            .opt("solvent dielectric", self.solvent_dielectric)
            .opt("solver", self.solver.clone())
            .opt_object(
                "solver parameters",
                self.solver_parameters.as_ref().map(|p| p.to_mapping()),
            )
            .opt("temperature", self.temperature)
            .opt("write atom potentials", self.write_atom_potentials.clone())
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.present("calculate energy", &self.calculate_energy);
        violations.present("calculate forces", &self.calculate_forces);
        violations.require("error tolerance", self.error_tolerance, checks::unit_open);
        if let Some(ions) = &self.ions {
            violations.nested(ions.validate());
        }
        match &self.mesh {
            Some(mesh) => violations.nested(mesh.validate()),
            None => violations.push("mesh is not set."),
        }
        violations.require("molecule", self.molecule.as_deref(), checks::non_empty);
        violations.require(
            "solute dielectric",
            self.solute_dielectric,
            checks::at_least_one,
        );
        violations.require(
            "solvent dielectric",
            self.solvent_dielectric,
            checks::at_least_one,
        );
        violations.require("solver", self.solver.as_deref(), |name, value| {
            checks::choice(name, value, SOLVERS)
        });
        match &self.solver_parameters {
            Some(parameters) => violations.nested(parameters.validate()),
            None => violations.push("solver parameters is not set."),
        }
        violations.require("temperature", self.temperature, checks::positive);
        violations.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use assert_matches::assert_matches;

    const TABI: &str = r#"{
        "calculate energy": true,
        "calculate forces": false,
        "error tolerance": 1e-4,
        "ions": {"species": [
            {"charge": 1, "radius": 2.0, "concentration": 0.1},
            {"charge": -1, "radius": 2.0, "concentration": 0.1}
        ]},
        "mesh": {
            "software": "NanoShaper",
            "solvent radius": 1.4,
            "surface density": 20.0,
            "surface method": "skin"
        },
        "molecule": "protein",
        "solute dielectric": 1.0,
        "solvent dielectric": 80.0,
        "solver": "tabi",
        "solver parameters": {
            "tree order": 3,
            "multipole acceptance criterion": 0.8,
            "maximum particles": 500
        },
        "temperature": 300.0,
        "write atom potentials": "protein-atoms.txt"
    }"#;

    #[test]
    fn test_boundary_element_round_trip() {
        let calculation = BoundaryElement::from_json(TABI).unwrap();
        calculation.validate().unwrap();
        assert_eq!(
            calculation.mesh.as_ref().and_then(|m| m.software.as_deref()),
            Some("nanoshaper")
        );
        assert_eq!(
            BoundaryElement::from_toml(&calculation.to_toml().unwrap()).unwrap(),
            calculation
        );
    }

    #[test]
    fn test_tabi_parameter_domains() {
        let mut parameters = TabiParameters::default();
        assert_matches!(
            parameters.set_multipole_acceptance_criterion(1.0),
            Err(ModelError::OutOfDomain { .. })
        );
        assert_matches!(parameters.set_tree_order(0), Err(ModelError::OutOfDomain { .. }));
        assert_eq!(
            parameters.validate().unwrap_err().to_string(),
            "tree order is not set. multipole acceptance criterion is not set. \
             maximum particles is not set."
        );
    }

    #[test]
    fn test_mesh_domains() {
        let mut mesh = Mesh::default();
        assert_matches!(mesh.set_software("msms"), Err(ModelError::OutOfDomain { .. }));
        assert_matches!(mesh.set_surface_density(0.0), Err(ModelError::OutOfDomain { .. }));
        assert_matches!(
            mesh.set_surface_method("cubic spline"),
            Err(ModelError::OutOfDomain { .. })
        );
    }

    #[test]
    fn test_unknown_solver() {
        let text = TABI.replace(r#""solver": "tabi""#, r#""solver": "pygbe""#);
        assert_matches!(
            BoundaryElement::from_json(&text),
            Err(ModelError::OutOfDomain { .. })
        );
    }
}
