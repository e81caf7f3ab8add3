//! Settings shared by the finite-difference and finite-element polar solvers

use super::error::{ModelResult, Violations};
use super::fields::{accept, checks, Fields, Mapping, MappingBuilder};
use super::generic::{MobileIons, UseMap, WriteMap};
use super::InputFile;
use std::fmt;

pub const EQUATIONS: &[&str] = &[
    "linearized pbe",
    "nonlinear pbe",
    "linearized regularized pbe",
    "nonlinear regularized pbe",
];

pub const SURFACE_METHODS: &[&str] = &[
    "molecular surface",
    "smoothed molecular surface",
    "cubic spline",
    "septic spline",
];

pub const CHARGE_DISCRETIZATIONS: &[&str] = &["linear", "cubic", "quintic"];

/// Dirichlet boundary condition for the Poisson-Boltzmann equation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryCondition {
    Zero,
    SingleSphere,
    MultipleSphere,
    /// Potential from the earlier calculation with this alias
    Focus(String),
    /// Potential read from the potential map with this alias
    Map(String),
}

impl BoundaryCondition {
    /// Parse `zero`, `single sphere`, `multiple sphere`, `focus <alias>` or
    /// `map <alias>`; keywords are case-insensitive, aliases are kept as written
    pub fn parse(value: &str) -> Result<Self, String> {
        let words: Vec<&str> = value.split_whitespace().collect();
        let keywords: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let keywords: Vec<&str> = keywords.iter().map(String::as_str).collect();
        match keywords.as_slice() {
            ["zero"] => Ok(Self::Zero),
            ["single", "sphere"] => Ok(Self::SingleSphere),
            ["multiple", "sphere"] => Ok(Self::MultipleSphere),
            ["focus", _] => Ok(Self::Focus(words[1].to_string())),
            ["map", _] => Ok(Self::Map(words[1].to_string())),
            _ => Err(format!("Unknown boundary condition: {}.", value)),
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "zero"),
            Self::SingleSphere => write!(f, "single sphere"),
            Self::MultipleSphere => write!(f, "multiple sphere"),
            Self::Focus(alias) => write!(f, "focus {}", alias),
            Self::Map(alias) => write!(f, "map {}", alias),
        }
    }
}

/// Physical and output settings common to grid- and mesh-based polar solvers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarSettings {
    pub boundary_condition: Option<BoundaryCondition>,
    pub calculate_energy: Option<bool>,
    pub calculate_forces: Option<bool>,
    pub charge_discretization: Option<String>,
    pub equation: Option<String>,
    pub error_tolerance: Option<f64>,
    pub ions: Option<MobileIons>,
    /// Alias of the molecule in the read section
    pub molecule: Option<String>,
    pub solute_dielectric: Option<f64>,
    pub solvent_dielectric: Option<f64>,
    /// Radius in Å of the solvent probe
    pub solvent_radius: Option<f64>,
    pub surface_method: Option<String>,
    pub surface_spline_window: Option<f64>,
    /// Temperature in K
    pub temperature: Option<f64>,
    pub use_maps: Vec<UseMap>,
    pub write_maps: Vec<WriteMap>,
    /// Path for per-atom potentials
    pub write_atom_potentials: Option<String>,
}

impl PolarSettings {
    pub fn set_boundary_condition(&mut self, value: &str) -> ModelResult<()> {
        self.boundary_condition = Some(accept(BoundaryCondition::parse(value))?);
        Ok(())
    }

    pub fn set_charge_discretization(&mut self, value: &str) -> ModelResult<()> {
        self.charge_discretization = Some(accept(checks::choice(
            "charge discretization",
            value,
            CHARGE_DISCRETIZATIONS,
        ))?);
        Ok(())
    }

    pub fn set_equation(&mut self, value: &str) -> ModelResult<()> {
        self.equation = Some(accept(checks::choice("equation", value, EQUATIONS))?);
        Ok(())
    }

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

    pub fn set_solvent_radius(&mut self, value: f64) -> ModelResult<()> {
        self.solvent_radius = Some(accept(checks::non_negative("solvent radius", value))?);
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

    pub fn set_surface_spline_window(&mut self, value: f64) -> ModelResult<()> {
        self.surface_spline_window =
            Some(accept(checks::positive("surface spline window", value))?);
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

impl InputFile for PolarSettings {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut settings = Self::default();
        if let Some(value) = fields.string("boundary condition")? {
            settings.set_boundary_condition(&value)?;
        }
        settings.calculate_energy = fields.boolean("calculate energy")?;
        settings.calculate_forces = fields.boolean("calculate forces")?;
        if let Some(value) = fields.opt_string("charge discretization")? {
            settings.set_charge_discretization(&value)?;
        }
        if let Some(value) = fields.string("equation")? {
            settings.set_equation(&value)?;
        }
        if let Some(value) = fields.opt_number("error tolerance")? {
            settings.set_error_tolerance(value)?;
        }
        settings.ions = fields.opt_object("ions", MobileIons::from_mapping)?;
        if let Some(value) = fields.string("molecule")? {
            settings.set_molecule(&value)?;
        }
        if let Some(value) = fields.number("solute dielectric")? {
            settings.set_solute_dielectric(value)?;
        }
        if let Some(value) = fields.number("solvent dielectric")? {
            settings.set_solvent_dielectric(value)?;
        }
        if let Some(value) = fields.opt_number("solvent radius")? {
            settings.set_solvent_radius(value)?;
        }
        if let Some(value) = fields.opt_string("surface method")? {
            settings.set_surface_method(&value)?;
        }
        if let Some(value) = fields.opt_number("surface spline window")? {
            settings.set_surface_spline_window(value)?;
        }
        if let Some(value) = fields.number("temperature")? {
            settings.set_temperature(value)?;
        }
        settings.use_maps = fields.records("use maps", UseMap::from_mapping)?;
        settings.write_maps = fields.records("write maps", WriteMap::from_mapping)?;
        if let Some(value) = fields.opt_string("write atom potentials")? {
            settings.set_write_atom_potentials(&value)?;
        }
        Ok(settings)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt(
                "boundary condition",
                self.boundary_condition.as_ref().map(ToString::to_string),
            )
            .opt("calculate energy", self.calculate_energy)
            .opt("calculate forces", self.calculate_forces)
            .opt("charge discretization", self.charge_discretization.clone())
            .opt("equation", self.equation.clone())
            .opt("error tolerance", self.error_tolerance)
            .opt_object("ions", self.ions.as_ref().map(|ions| ions.to_mapping()))
            .opt("molecule", self.molecule.clone())
            .opt("solute dielectric", self.solute_dielectric)
            .opt("solvent dielectric", self.solvent_dielectric)
            .opt("solvent radius", self.solvent_radius)
            .opt("surface method", self.surface_method.clone())
            .opt("surface spline window", self.surface_spline_window)
            .opt("temperature", self.temperature)
            .records(
                "use maps",
                self.use_maps.iter().map(|map| map.to_mapping()).collect(),
            )
            .records(
                "write maps",
                self.write_maps.iter().map(|map| map.to_mapping()).collect(),
            )
            .opt("write atom potentials", self.write_atom_potentials.clone())
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.present("boundary condition", &self.boundary_condition);
        violations.present("calculate energy", &self.calculate_energy);
        violations.present("calculate forces", &self.calculate_forces);
        violations.optional(
            "charge discretization",
            self.charge_discretization.as_deref(),
            |name, value| checks::choice(name, value, CHARGE_DISCRETIZATIONS),
        );
        violations.require("equation", self.equation.as_deref(), |name, value| {
            checks::choice(name, value, EQUATIONS)
        });
        violations.optional("error tolerance", self.error_tolerance, checks::unit_open);
        if let Some(ions) = &self.ions {
            violations.nested(ions.validate());
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
        violations.optional("solvent radius", self.solvent_radius, checks::non_negative);
        violations.optional(
            "surface method",
            self.surface_method.as_deref(),
            |name, value| checks::choice(name, value, SURFACE_METHODS),
        );
        violations.optional(
            "surface spline window",
            self.surface_spline_window,
            checks::positive,
        );
        violations.require("temperature", self.temperature, checks::positive);
        for map in &self.use_maps {
            violations.nested(map.validate());
        }
        for map in &self.write_maps {
            violations.nested(map.validate());
        }
        violations.finish()
    }
}
