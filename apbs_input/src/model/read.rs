//! Registry of molecules, maps and parameter files read by a calculation

use super::error::{ModelResult, Violations};
use super::fields::{accept, checks, duplicate_aliases, Fields, Mapping, MappingBuilder};
use super::InputFile;

pub const MOLECULE_FORMATS: &[&str] = &["pdb", "pqr"];
pub const MAP_FORMATS: &[&str] = &["dx", "dx.gz"];
pub const PARAMETER_FORMATS: &[&str] = &["flat", "xml"];

/// Generates an `{alias, format, path}` entry type for one read kind
macro_rules! read_entry {
    ($(#[$meta:meta])* $name:ident, $formats:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub alias: Option<String>,
            pub format: Option<String>,
            pub path: Option<String>,
        }

        impl $name {
            pub fn new(alias: &str, format: &str, path: &str) -> ModelResult<Self> {
                let mut entry = Self::default();
                entry.set_alias(alias)?;
                entry.set_format(format)?;
                entry.set_path(path)?;
                Ok(entry)
            }

            pub fn set_alias(&mut self, value: &str) -> ModelResult<()> {
                self.alias = Some(accept(checks::non_empty("alias", value))?);
                Ok(())
            }

            pub fn set_format(&mut self, value: &str) -> ModelResult<()> {
                self.format = Some(accept(checks::choice("format", value, $formats))?);
                Ok(())
            }

            pub fn set_path(&mut self, value: &str) -> ModelResult<()> {
                self.path = Some(accept(checks::non_empty("path", value))?);
                Ok(())
            }

            pub fn alias(&self) -> Option<&str> {
                self.alias.as_deref()
            }
        }

        impl InputFile for $name {
            fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
                let fields = Fields::new(mapping);
                let mut entry = Self::default();
                if let Some(alias) = fields.string("alias")? {
                    entry.set_alias(&alias)?;
                }
                if let Some(format) = fields.string("format")? {
                    entry.set_format(&format)?;
                }
                if let Some(path) = fields.string("path")? {
                    entry.set_path(&path)?;
                }
                Ok(entry)
            }

            fn to_mapping(&self) -> Mapping {
                MappingBuilder::new()
                    .opt("alias", self.alias.clone())
                    .opt("format", self.format.clone())
                    .opt("path", self.path.clone())
                    .build()
            }

            fn validate(&self) -> ModelResult<()> {
                let mut violations = Violations::new();
                violations.require("alias", self.alias.as_deref(), checks::non_empty);
                violations.require("format", self.format.as_deref(), |name, value| {
                    checks::choice(name, value, $formats)
                        .map_err(|_| format!("{} is not a valid format.", value))
                });
                violations.require("path", self.path.as_deref(), checks::non_empty);
                violations.finish()
            }
        }
    };
}

read_entry!(
    /// Molecular structure in PQR or PDB format
    Molecule,
    MOLECULE_FORMATS
);

read_entry!(
    /// Scalar map on a grid: potential, charge density or ion accessibility
    Map,
    MAP_FORMATS
);

read_entry!(
    /// Force-field parameter file
    Parameter,
    PARAMETER_FORMATS
);

/// Dielectric maps shifted along each axis, read as one group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DielectricMapGroup {
    pub alias: Option<String>,
    pub format: Option<String>,
    pub x_shifted_path: Option<String>,
    pub y_shifted_path: Option<String>,
    pub z_shifted_path: Option<String>,
}

const SHIFTED_PATH_KEYS: [&str; 3] = ["x-shifted path", "y-shifted path", "z-shifted path"];

impl DielectricMapGroup {
    pub fn set_alias(&mut self, value: &str) -> ModelResult<()> {
        self.alias = Some(accept(checks::non_empty("alias", value))?);
        Ok(())
    }

    pub fn set_format(&mut self, value: &str) -> ModelResult<()> {
        self.format = Some(accept(checks::choice("format", value, MAP_FORMATS))?);
        Ok(())
    }

    pub fn set_paths(&mut self, x: &str, y: &str, z: &str) -> ModelResult<()> {
        self.x_shifted_path = Some(accept(checks::non_empty(SHIFTED_PATH_KEYS[0], x))?);
        self.y_shifted_path = Some(accept(checks::non_empty(SHIFTED_PATH_KEYS[1], y))?);
        self.z_shifted_path = Some(accept(checks::non_empty(SHIFTED_PATH_KEYS[2], z))?);
        Ok(())
    }

    fn paths(&self) -> [Option<&str>; 3] {
        [
            self.x_shifted_path.as_deref(),
            self.y_shifted_path.as_deref(),
            self.z_shifted_path.as_deref(),
        ]
    }
}

impl InputFile for DielectricMapGroup {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut group = Self::default();
        if let Some(alias) = fields.string("alias")? {
            group.set_alias(&alias)?;
        }
        if let Some(format) = fields.string("format")? {
            group.set_format(&format)?;
        }
        let x = fields.string(SHIFTED_PATH_KEYS[0])?;
        let y = fields.string(SHIFTED_PATH_KEYS[1])?;
        let z = fields.string(SHIFTED_PATH_KEYS[2])?;
        if let (Some(x), Some(y), Some(z)) = (&x, &y, &z) {
            group.set_paths(x, y, z)?;
        } else {
            group.x_shifted_path = x;
            group.y_shifted_path = y;
            group.z_shifted_path = z;
        }
        Ok(group)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("alias", self.alias.clone())
            .opt("format", self.format.clone())
            .opt(SHIFTED_PATH_KEYS[0], self.x_shifted_path.clone())
            .opt(SHIFTED_PATH_KEYS[1], self.y_shifted_path.clone())
            .opt(SHIFTED_PATH_KEYS[2], self.z_shifted_path.clone())
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.require("alias", self.alias.as_deref(), checks::non_empty);
        violations.require("format", self.format.as_deref(), |name, value| {
            checks::choice(name, value, MAP_FORMATS)
                .map_err(|_| format!("{} is not a valid format.", value))
        });
        for (key, path) in SHIFTED_PATH_KEYS.iter().zip(self.paths()) {
            violations.require(key, path, checks::non_empty);
        }
        violations.finish()
    }
}

/// Everything a calculation may read, grouped by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Read {
    pub molecules: Vec<Molecule>,
    pub potential_maps: Vec<Map>,
    pub charge_density_maps: Vec<Map>,
    pub ion_accessibility_maps: Vec<Map>,
    pub dielectric_maps: Vec<DielectricMapGroup>,
    pub parameters: Vec<Parameter>,
}

impl Read {
    pub fn has_molecule(&self, alias: &str) -> bool {
        self.molecules.iter().any(|m| m.alias() == Some(alias))
    }

    pub fn has_potential_map(&self, alias: &str) -> bool {
        self.potential_maps.iter().any(|m| m.alias() == Some(alias))
    }

    /// Aliases of the maps a use-map property can draw from
    pub fn map_aliases(&self, property: &str) -> Vec<&str> {
        let maps = match property {
            "dielectric" => {
                return self
                    .dielectric_maps
                    .iter()
                    .filter_map(|g| g.alias.as_deref())
                    .collect()
            }
            "ion accessibility" => &self.ion_accessibility_maps,
            "charge density" => &self.charge_density_maps,
            "potential" => &self.potential_maps,
            _ => return Vec::new(),
        };
        maps.iter().filter_map(Map::alias).collect()
    }

    fn check_unique(violations: &mut Violations, kind: &str, aliases: Vec<&str>) {
        for alias in duplicate_aliases(aliases) {
            violations.push(format!("Duplicate {} alias '{}'.", kind, alias));
        }
    }
}

impl InputFile for Read {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        Ok(Self {
            molecules: fields.records("molecules", Molecule::from_mapping)?,
            potential_maps: fields.records("potential maps", Map::from_mapping)?,
            charge_density_maps: fields.records("charge density maps", Map::from_mapping)?,
            ion_accessibility_maps: fields.records("ion accessibility maps", Map::from_mapping)?,
            dielectric_maps: fields.records("dielectric maps", DielectricMapGroup::from_mapping)?,
            parameters: fields.records("parameters", Parameter::from_mapping)?,
        })
    }

    fn to_mapping(&self) -> Mapping {
        fn dump<T: InputFile>(records: &[T]) -> Vec<Mapping> {
            records.iter().map(|record| record.to_mapping()).collect()
        }
        MappingBuilder::new()
            .records("molecules", dump(&self.molecules))
            .records("potential maps", dump(&self.potential_maps))
            .records("charge density maps", dump(&self.charge_density_maps))
            .records("ion accessibility maps", dump(&self.ion_accessibility_maps))
            .records("dielectric maps", dump(&self.dielectric_maps))
            .records("parameters", dump(&self.parameters))
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        for molecule in &self.molecules {
            violations.nested(molecule.validate());
        }
        for map in self
            .potential_maps
            .iter()
            .chain(&self.charge_density_maps)
            .chain(&self.ion_accessibility_maps)
        {
            violations.nested(map.validate());
        }
        for group in &self.dielectric_maps {
            violations.nested(group.validate());
        }
        for parameter in &self.parameters {
            violations.nested(parameter.validate());
        }

        if self.molecules.is_empty() {
            if self.charge_density_maps.is_empty() {
                violations.push(
                    "No molecule input provided and no charge density map specified.",
                );
            }
            if self.dielectric_maps.is_empty() {
                violations.push("No molecule input provided and no dielectric maps specified.");
            }
        }
        let has_pdb = self
            .molecules
            .iter()
            .any(|m| m.format.as_deref() == Some("pdb"));
        if has_pdb && self.parameters.is_empty() {
            violations.push("Have PDB-format molecule but no parameters.");
        }

        Self::check_unique(
            &mut violations,
            "molecule",
            self.molecules.iter().filter_map(Molecule::alias).collect(),
        );
        Self::check_unique(
            &mut violations,
            "map",
            self.potential_maps
                .iter()
                .chain(&self.charge_density_maps)
                .chain(&self.ion_accessibility_maps)
                .filter_map(Map::alias)
                .chain(self.dielectric_maps.iter().filter_map(|g| g.alias.as_deref()))
                .collect(),
        );
        Self::check_unique(
            &mut violations,
            "parameter",
            self.parameters.iter().filter_map(Parameter::alias).collect(),
        );
        violations.finish()
    }
}
