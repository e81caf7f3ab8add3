//! Top-level structured input document

use super::calculate::Calculate;
use super::error::{ModelResult, Violations};
use super::fields::{duplicate_aliases, Fields, Mapping, MappingBuilder};
use super::polar::BoundaryCondition;
use super::process::Process;
use super::read::Read;
use super::InputFile;

/// Inputs, calculations and post-processing of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApbsInput {
    pub read: Option<Read>,
    pub calculate: Vec<Calculate>,
    pub process: Option<Process>,
}

impl ApbsInput {
    pub fn calculation(&self, alias: &str) -> Option<&Calculate> {
        self.calculate.iter().find(|c| c.alias() == Some(alias))
    }

    fn check_calculations(&self, read: &Read, violations: &mut Violations) {
        for alias in duplicate_aliases(self.calculate.iter().filter_map(Calculate::alias)) {
            violations.push(format!("Duplicate calculation alias '{}'.", alias));
        }

        for (index, calculation) in self.calculate.iter().enumerate() {
            let Some(parameters) = &calculation.parameters else {
                continue;
            };
            let name = calculation.alias().unwrap_or("<unnamed>");

            for molecule in parameters.referenced_molecules() {
                violations.check(read.has_molecule(molecule), || {
                    format!("Calculation {} refers to unknown molecule {}.", name, molecule)
                });
            }

            match parameters.boundary_condition() {
                Some(BoundaryCondition::Focus(target)) => {
                    let preceding = self.calculate[..index]
                        .iter()
                        .any(|c| c.alias() == Some(target.as_str()));
                    violations.check(preceding, || {
                        format!(
                            "Calculation {} focuses on {}, which is not a preceding calculation.",
                            name, target
                        )
                    });
                }
                Some(BoundaryCondition::Map(map)) => {
                    violations.check(read.has_potential_map(map), || {
                        format!(
                            "Calculation {} boundary condition refers to unknown potential map {}.",
                            name, map
                        )
                    });
                }
                _ => {}
            }

            for use_map in parameters.use_maps() {
                let (Some(property), Some(alias)) = (&use_map.property, &use_map.alias) else {
                    continue;
                };
                violations.check(read.map_aliases(property).contains(&alias.as_str()), || {
                    format!(
                        "Calculation {} uses unknown {} map {}.",
                        name, property, alias
                    )
                });
            }
        }
    }

    fn check_process(&self, process: &Process, violations: &mut Violations) {
        let mut known: Vec<&str> = self.calculate.iter().filter_map(Calculate::alias).collect();
        for operation in process.operations() {
            let name = operation.alias().unwrap_or("<unnamed>");
            for element in &operation.elements {
                let Some(alias) = element.alias.as_deref() else {
                    continue;
                };
                violations.check(known.contains(&alias), || {
                    format!("Operation {} refers to unknown result {}.", name, alias)
                });
            }
            if let Some(alias) = operation.alias() {
                known.push(alias);
            }
        }
    }
}

impl InputFile for ApbsInput {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        Ok(Self {
            read: fields.object("read", Read::from_mapping)?,
            calculate: fields.records("calculate", Calculate::from_mapping)?,
            process: fields.opt_object("process", Process::from_mapping)?,
        })
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt_object("read", self.read.as_ref().map(|r| r.to_mapping()))
            .records(
                "calculate",
                self.calculate.iter().map(|c| c.to_mapping()).collect(),
            )
            .opt_object("process", self.process.as_ref().map(|p| p.to_mapping()))
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        match &self.read {
            Some(read) => violations.nested(read.validate()),
            None => violations.push("read is not set."),
        }
        violations.check(!self.calculate.is_empty(), || {
            "No calculations specified.".to_string()
        });
        for calculation in &self.calculate {
            violations.nested(calculation.validate());
        }
        if let Some(process) = &self.process {
            violations.nested(process.validate());
        }

        if let Some(read) = &self.read {
            self.check_calculations(read, &mut violations);
        }
        if let Some(process) = &self.process {
            self.check_process(process, &mut violations);
        }
        violations.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::calculate::CalculationParameters;
    use crate::model::polar::testing::polar_settings;
    use crate::model::ModelError;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn manual_calculation(alias: &str, boundary_condition: &str) -> serde_json::Value {
        let mut parameters = polar_settings();
        parameters["boundary condition"] = json!(boundary_condition);
        parameters["calculation type"] = json!("manual");
        parameters["calculation parameters"] = json!({
            "grid center": {"molecule": "complex"},
            "grid dimensions": {"counts": [97, 97, 97], "lengths": [60, 60, 60]}
        });
        json!({"alias": alias, "type": "finite difference", "parameters": parameters})
    }

    fn document() -> serde_json::Value {
        json!({
            "read": {
                "molecules": [{"alias": "complex", "format": "pqr", "path": "complex.pqr"}],
                "potential maps": [{"alias": "boundary", "format": "dx", "path": "pot.dx"}],
                "charge density maps": [{"alias": "charges", "format": "dx.gz", "path": "chg.dx.gz"}]
            },
            "calculate": [
                manual_calculation("coarse", "single sphere"),
                manual_calculation("fine", "focus coarse"),
                manual_calculation("bounded", "map boundary")
            ],
            "process": {
                "sums": [{"alias": "difference", "elements": [
                    {"alias": "fine", "coefficient": 1},
                    {"alias": "bounded", "coefficient": -1}
                ]}],
                "products": [],
                "exps": [{"alias": "boltzmann", "elements": [
                    {"alias": "difference", "coefficient": -0.4}
                ]}]
            }
        })
    }

    fn load(value: &serde_json::Value) -> ApbsInput {
        ApbsInput::from_mapping(value.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_complete_document() {
        let input = load(&document());
        input.validate().unwrap();
        assert_eq!(input.calculate.len(), 3);
        assert_matches!(
            input.calculation("fine").and_then(|c| c.parameters.as_ref()),
            Some(CalculationParameters::FiniteDifference(_))
        );
        assert!(input.calculation("missing").is_none());
    }

    #[test]
    fn test_json_and_toml_round_trips() {
        let input = load(&document());
        assert_eq!(ApbsInput::from_json(&input.to_json().unwrap()).unwrap(), input);
        assert_eq!(ApbsInput::from_toml(&input.to_toml().unwrap()).unwrap(), input);
    }

    #[test]
    fn test_focus_must_refer_to_preceding_calculation() {
        let mut value = document();
        value["calculate"][0] = manual_calculation("coarse", "focus fine");
        assert_eq!(
            load(&value).validate().unwrap_err().to_string(),
            "Calculation coarse focuses on fine, which is not a preceding calculation."
        );
    }

    #[test]
    fn test_unknown_references() {
        let mut value = document();
        value["calculate"][2] = manual_calculation("bounded", "map elsewhere");
        value["calculate"][1]["parameters"]["molecule"] = json!("ligand");
        value["calculate"][0]["parameters"]["use maps"] =
            json!([{"property": "dielectric", "alias": "charges"}]);
        let message = load(&value).validate().unwrap_err().to_string();
        assert!(message.contains("Calculation coarse uses unknown dielectric map charges."));
        assert!(message.contains("Calculation fine refers to unknown molecule ligand."));
        assert!(message
            .contains("Calculation bounded boundary condition refers to unknown potential map elsewhere."));
    }

    #[test]
    fn test_use_map_of_matching_kind() {
        let mut value = document();
        value["calculate"][0]["parameters"]["use maps"] =
            json!([{"property": "charge density", "alias": "charges"}]);
        load(&value).validate().unwrap();
    }

    #[test]
    fn test_duplicate_calculation_alias() {
        let mut value = document();
        value["calculate"][2]["alias"] = json!("coarse");
        value["process"]["sums"][0]["elements"][1]["alias"] = json!("coarse");
        assert_eq!(
            load(&value).validate().unwrap_err().to_string(),
            "Duplicate calculation alias 'coarse'."
        );
    }

    #[test]
    fn test_process_references() {
        let mut value = document();
        value["process"]["sums"][0]["elements"][0]["alias"] = json!("boltzmann");
        assert_eq!(
            load(&value).validate().unwrap_err().to_string(),
            "Operation difference refers to unknown result boltzmann."
        );
    }

    #[test]
    fn test_missing_sections() {
        assert_matches!(
            ApbsInput::from_json(r#"{"calculate": []}"#),
            Err(ModelError::MissingKey { key }) if key == "read"
        );
        let input = ApbsInput::from_json(r#"{"read": null}"#).unwrap();
        assert_eq!(
            input.validate().unwrap_err().to_string(),
            "read is not set. No calculations specified."
        );
    }
}
