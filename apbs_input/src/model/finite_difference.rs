//! Finite-difference polar solvation: grids, focusing and the top-level record

use super::error::{ModelError, ModelResult, Violations};
use super::fields::{accept, checks, Fields, Mapping, MappingBuilder};
use super::polar::PolarSettings;
use super::InputFile;
use crate::config::constants::compile_time::grid::MIN_LEVEL;
use crate::log_debug;

pub const CALCULATION_TYPES: &[&str] = &["focus", "manual"];

const AXES: [&str; 3] = ["x", "y", "z"];

/// Relative tolerance when counts, spacings and lengths are all given
const GRID_TOLERANCE: f64 = 1e-6;

/// Largest grid size `c * 2^p + 1` not above `target`, with `p >= min_level`
///
/// Returns the count and the highest level it admits, or `None` when even
/// `2^min_level + 1` exceeds the target.
pub fn find_count(target: i64, min_level: u32) -> Option<(i64, u32)> {
    let step = 1_i64.checked_shl(min_level)?;
    let intervals = (target - 1).max(0) / step * step;
    if intervals == 0 {
        return None;
    }
    Some((intervals + 1, intervals.trailing_zeros()))
}

/// Shrink target counts so all three axes share a multigrid level of at
/// least `MIN_LEVEL`
///
/// The shared level is the smallest of the per-axis best levels; each axis
/// then takes the largest count at that level not above its target.
pub fn adjust_counts(targets: [i64; 3]) -> Option<([i64; 3], u32)> {
    let mut levels = u32::MAX;
    for &target in &targets {
        let (_, level) = find_count(target, MIN_LEVEL)?;
        levels = levels.min(level);
    }

    let mut counts = [0; 3];
    for (count, &target) in counts.iter_mut().zip(&targets) {
        *count = find_count(target, levels)?.0;
    }

    log_debug!("Adjusted grid counts",
        "targets" => format!("{:?}", targets),
        "counts" => format!("{:?}", counts),
        "levels" => levels
    );
    Some((counts, levels))
}

/// Smallest count that admits `MIN_LEVEL`
pub fn min_count() -> i64 {
    (1_i64 << MIN_LEVEL) + 1
}

/// Grid point counts, spacings and lengths; any two determine the third
///
/// When all three are given they must agree: `length = spacing * (count - 1)`
/// on every axis, using the adjusted counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridDimensions {
    counts: Option<[i64; 3]>,
    spacings: Option<[f64; 3]>,
    lengths: Option<[f64; 3]>,
    levels: Option<u32>,
}

impl GridDimensions {
    /// Set target counts, adjusted down to multigrid-compatible values
    pub fn set_counts(&mut self, targets: [i64; 3]) -> ModelResult<()> {
        let minimum = min_count();
        if let Some(&small) = targets.iter().find(|&&count| count < minimum) {
            return Err(ModelError::out_of_domain(format!(
                "Grid count {} is less than the minimum of {}.",
                small, minimum
            )));
        }
        let (counts, levels) = adjust_counts(targets).ok_or_else(|| {
            ModelError::out_of_domain(format!("Grid counts {:?} cannot be adjusted.", targets))
        })?;
        self.counts = Some(counts);
        self.levels = Some(levels);
        Ok(())
    }

    pub fn set_spacings(&mut self, value: [f64; 3]) -> ModelResult<()> {
        self.spacings = Some(accept(checks::positive_triple("spacings", value))?);
        Ok(())
    }

    pub fn set_lengths(&mut self, value: [f64; 3]) -> ModelResult<()> {
        self.lengths = Some(accept(checks::positive_triple("lengths", value))?);
        Ok(())
    }

    fn derived_counts(&self) -> Option<([i64; 3], u32)> {
        if let (Some(counts), Some(levels)) = (self.counts, self.levels) {
            return Some((counts, levels));
        }
        let (lengths, spacings) = (self.lengths?, self.spacings?);
        let mut targets = [0; 3];
        for i in 0..3 {
            targets[i] = ((lengths[i] / spacings[i] + 0.5) as i64).saturating_add(1);
        }
        adjust_counts(targets)
    }

    pub fn counts(&self) -> Option<[i64; 3]> {
        self.derived_counts().map(|(counts, _)| counts)
    }

    /// Multigrid levels admitted by the counts
    pub fn levels(&self) -> Option<u32> {
        self.derived_counts().map(|(_, levels)| levels)
    }

    pub fn spacings(&self) -> Option<[f64; 3]> {
        if self.spacings.is_some() {
            return self.spacings;
        }
        let (counts, lengths) = (self.counts?, self.lengths?);
        let mut spacings = [0.0; 3];
        for i in 0..3 {
            spacings[i] = lengths[i] / (counts[i] - 1) as f64;
        }
        Some(spacings)
    }

    /// Axes where given lengths disagree with given spacings and counts
    fn inconsistent_axes(&self) -> Vec<&'static str> {
        let (Some(counts), Some(spacings), Some(lengths)) =
            (self.counts, self.spacings, self.lengths)
        else {
            return Vec::new();
        };
        AXES.iter()
            .enumerate()
            .filter(|&(i, _)| {
                let expected = spacings[i] * (counts[i] - 1) as f64;
                (lengths[i] - expected).abs() > GRID_TOLERANCE * lengths[i].abs().max(expected.abs())
            })
            .map(|(_, &axis)| axis)
            .collect()
    }

    pub fn lengths(&self) -> Option<[f64; 3]> {
        if self.lengths.is_some() {
            return self.lengths;
        }
        let (counts, spacings) = (self.counts?, self.spacings?);
        let mut lengths = [0.0; 3];
        for i in 0..3 {
            lengths[i] = spacings[i] * (counts[i] - 1) as f64;
        }
        Some(lengths)
    }
}

impl InputFile for GridDimensions {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut grid = Self::default();
        if let Some(counts) = fields.opt_int_triple("counts")? {
            grid.set_counts(counts)?;
        }
        if let Some(spacings) = fields.opt_triple("spacings")? {
            grid.set_spacings(spacings)?;
        }
        if let Some(lengths) = fields.opt_triple("lengths")? {
            grid.set_lengths(lengths)?;
        }
        Ok(grid)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt_triple("counts", self.counts)
            .opt_triple("spacings", self.spacings)
            .opt_triple("lengths", self.lengths)
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        let given = [
            self.counts.is_some(),
            self.spacings.is_some(),
            self.lengths.is_some(),
        ];
        violations.check(given.iter().filter(|&&g| g).count() >= 2, || {
            "Grid dimensions need two of counts, spacings and lengths.".to_string()
        });
        violations.optional("counts", self.counts, checks::positive_int_triple);
        violations.optional("spacings", self.spacings, checks::positive_triple);
        violations.optional("lengths", self.lengths, checks::positive_triple);
        let inconsistent = self.inconsistent_axes();
        violations.check(inconsistent.is_empty(), || {
            format!(
                "Grid lengths {:?} do not match spacings {:?} and counts {:?} along {}.",
                self.lengths.unwrap_or_default(),
                self.spacings.unwrap_or_default(),
                self.counts.unwrap_or_default(),
                inconsistent.join(", ")
            )
        });
        if self.counts.is_none() && self.spacings.is_some() && self.lengths.is_some() {
            violations.check(self.counts().is_some(), || {
                format!(
                    "Grid lengths {:?} and spacings {:?} give fewer than {} points.",
                    self.lengths.unwrap_or_default(),
                    self.spacings.unwrap_or_default(),
                    min_count()
                )
            });
        }
        violations.finish()
    }
}

/// Center of a finite-difference grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridCenter {
    /// Center of the molecule with this alias
    Molecule(String),
    /// Explicit coordinates in Å
    Position([f64; 3]),
}

impl InputFile for GridCenter {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let molecule = fields.opt_string("molecule")?;
        let position = fields.opt_triple("position")?;
        match (molecule, position) {
            (Some(alias), None) => Ok(Self::Molecule(accept(checks::non_empty(
                "molecule", &alias,
            ))?)),
            (None, Some(position)) => Ok(Self::Position(position)),
            (Some(_), Some(_)) => Err(ModelError::out_of_domain(
                "Grid center has both a molecule and a position.",
            )),
            (None, None) => Err(ModelError::missing_key("molecule")),
        }
    }

    fn to_mapping(&self) -> Mapping {
        let builder = MappingBuilder::new();
        let builder = match self {
            Self::Molecule(alias) => builder.set("molecule", alias.as_str()),
            Self::Position(position) => builder.opt_triple("position", Some(*position)),
        };
        builder.build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        match self {
            Self::Molecule(alias) => {
                violations.optional("molecule", Some(alias.as_str()), checks::non_empty)
            }
            Self::Position(position) => violations.check(
                position.iter().all(|c| c.is_finite()),
                || format!("Grid center {:?} is not a finite position.", position),
            ),
        }
        violations.finish()
    }
}

/// Single-grid calculation with explicit center and dimensions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manual {
    pub grid_center: Option<GridCenter>,
    pub grid_dimensions: Option<GridDimensions>,
}

impl InputFile for Manual {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        Ok(Self {
            grid_center: fields.object("grid center", GridCenter::from_mapping)?,
            grid_dimensions: fields.object("grid dimensions", GridDimensions::from_mapping)?,
        })
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt_object("grid center", self.grid_center.as_ref().map(|c| c.to_mapping()))
            .opt_object(
                "grid dimensions",
                self.grid_dimensions.as_ref().map(|d| d.to_mapping()),
            )
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        match &self.grid_center {
            Some(center) => violations.nested(center.validate()),
            None => violations.push("grid center is not set."),
        }
        match &self.grid_dimensions {
            Some(dimensions) => violations.nested(dimensions.validate()),
            None => violations.push("grid dimensions is not set."),
        }
        violations.finish()
    }
}

fn overlap_fraction(name: &str, value: f64) -> checks::CheckResult<f64> {
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "Value {} for {} is not a positive number no greater than 1.",
            value, name
        ))
    }
}

/// Processor layout for a parallel focusing run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallelFocus {
    pub overlap_fraction: Option<f64>,
    pub processor_array: Option<[i64; 3]>,
    /// Run only the subdomain of this processor
    pub asynchronous_rank: Option<i64>,
}

impl ParallelFocus {
    pub fn set_overlap_fraction(&mut self, value: f64) -> ModelResult<()> {
        self.overlap_fraction = Some(accept(overlap_fraction("overlap fraction", value))?);
        Ok(())
    }

    pub fn set_processor_array(&mut self, value: [i64; 3]) -> ModelResult<()> {
        self.processor_array = Some(accept(checks::positive_int_triple("processor array", value))?);
        Ok(())
    }

    pub fn set_asynchronous_rank(&mut self, value: i64) -> ModelResult<()> {
        self.asynchronous_rank = Some(accept(checks::positive_integer(
            "asynchronous rank",
            value,
        ))?);
        Ok(())
    }

    pub fn processor_count(&self) -> Option<i64> {
        self.processor_array.map(|array| array.iter().product())
    }
}

impl InputFile for ParallelFocus {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let mut parallel = Self::default();
        if let Some(value) = fields.number("overlap fraction")? {
            parallel.set_overlap_fraction(value)?;
        }
        if let Some(value) = fields.int_triple("processor array")? {
            parallel.set_processor_array(value)?;
        }
        if let Some(value) = fields.opt_integer("asynchronous rank")? {
            parallel.set_asynchronous_rank(value)?;
        }
        Ok(parallel)
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .opt("overlap fraction", self.overlap_fraction)
            .opt_triple("processor array", self.processor_array)
            .opt("asynchronous rank", self.asynchronous_rank)
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.require("overlap fraction", self.overlap_fraction, overlap_fraction);
        violations.require(
            "processor array",
            self.processor_array,
            checks::positive_int_triple,
        );
        violations.optional(
            "asynchronous rank",
            self.asynchronous_rank,
            checks::positive_integer,
        );
        if let (Some(rank), Some(count)) = (self.asynchronous_rank, self.processor_count()) {
            violations.check(rank <= count, || {
                format!(
                    "Asynchronous rank {} exceeds the {} processors in the processor array.",
                    rank, count
                )
            });
        }
        violations.finish()
    }
}

/// Coarse grid solution used as the boundary of a finer grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Focus {
    pub coarse_grid_center: Option<GridCenter>,
    pub coarse_grid_dimensions: Option<GridDimensions>,
    pub fine_grid_center: Option<GridCenter>,
    pub fine_grid_dimensions: Option<GridDimensions>,
    pub parallel: Option<bool>,
    pub parallel_parameters: Option<ParallelFocus>,
}

impl Focus {
    fn check_lengths(&self, violations: &mut Violations) {
        let coarse = self.coarse_grid_dimensions.as_ref().and_then(GridDimensions::lengths);
        let fine = self.fine_grid_dimensions.as_ref().and_then(GridDimensions::lengths);
        let (Some(coarse), Some(fine)) = (coarse, fine) else {
            return;
        };
        for ((axis, fine), coarse) in AXES.iter().zip(fine).zip(coarse) {
            violations.check(fine <= coarse, || {
                format!(
                    "Fine grid length {} exceeds coarse grid length {} along the {} axis.",
                    fine, coarse, axis
                )
            });
        }
    }
}

impl InputFile for Focus {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        Ok(Self {
            coarse_grid_center: fields.object("coarse grid center", GridCenter::from_mapping)?,
            coarse_grid_dimensions: fields
                .object("coarse grid dimensions", GridDimensions::from_mapping)?,
            fine_grid_center: fields.object("fine grid center", GridCenter::from_mapping)?,
            fine_grid_dimensions: fields
                .object("fine grid dimensions", GridDimensions::from_mapping)?,
            parallel: fields.opt_boolean("parallel")?,
            parallel_parameters: fields
                .opt_object("parallel parameters", ParallelFocus::from_mapping)?,
        })
    }

    fn to_mapping(&self) -> Mapping {
        fn dump<T: InputFile>(record: &Option<T>) -> Option<Mapping> {
            record.as_ref().map(|r| r.to_mapping())
        }
        MappingBuilder::new()
            .opt_object("coarse grid center", dump(&self.coarse_grid_center))
            .opt_object("coarse grid dimensions", dump(&self.coarse_grid_dimensions))
            .opt_object("fine grid center", dump(&self.fine_grid_center))
            .opt_object("fine grid dimensions", dump(&self.fine_grid_dimensions))
            .opt("parallel", self.parallel)
            .opt_object("parallel parameters", dump(&self.parallel_parameters))
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        let parts: [(&str, Option<ModelResult<()>>); 4] = [
            (
                "coarse grid center",
                self.coarse_grid_center.as_ref().map(|c| c.validate()),
            ),
            (
                "coarse grid dimensions",
                self.coarse_grid_dimensions.as_ref().map(|d| d.validate()),
            ),
            (
                "fine grid center",
                self.fine_grid_center.as_ref().map(|c| c.validate()),
            ),
            (
                "fine grid dimensions",
                self.fine_grid_dimensions.as_ref().map(|d| d.validate()),
            ),
        ];
        for (name, result) in parts {
            match result {
                Some(result) => violations.nested(result),
                None => violations.push(format!("{} is not set.", name)),
            }
        }
        self.check_lengths(&mut violations);

        match (&self.parallel_parameters, self.parallel) {
            (Some(parameters), _) => violations.nested(parameters.validate()),
            (None, Some(true)) => {
                violations.push("The 'parallel parameters' object has not been provided.")
            }
            (None, _) => {}
        }
        violations.finish()
    }
}

/// Grid layout of a finite-difference calculation, tagged by calculation type
#[derive(Debug, Clone, PartialEq)]
pub enum FiniteDifferenceMethod {
    Manual(Manual),
    Focus(Focus),
}

impl FiniteDifferenceMethod {
    pub fn from_parts(kind: &str, parameters: &Mapping) -> ModelResult<Self> {
        match checks::choice("calculation type", kind, CALCULATION_TYPES).as_deref() {
            Ok("manual") => Ok(Self::Manual(Manual::from_mapping(parameters)?)),
            Ok(_) => Ok(Self::Focus(Focus::from_mapping(parameters)?)),
            Err(_) => Err(ModelError::out_of_domain(format!(
                "Unknown calculation type: {}.",
                kind
            ))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Manual(_) => "manual",
            Self::Focus(_) => "focus",
        }
    }

    /// Molecule aliases the grids are centered on
    pub fn centered_molecules(&self) -> Vec<&str> {
        let centers = match self {
            Self::Manual(manual) => vec![manual.grid_center.as_ref()],
            Self::Focus(focus) => vec![
                focus.coarse_grid_center.as_ref(),
                focus.fine_grid_center.as_ref(),
            ],
        };
        centers
            .into_iter()
            .flatten()
            .filter_map(|center| match center {
                GridCenter::Molecule(alias) => Some(alias.as_str()),
                GridCenter::Position(_) => None,
            })
            .collect()
    }

    fn parameters(&self) -> Mapping {
        match self {
            Self::Manual(manual) => manual.to_mapping(),
            Self::Focus(focus) => focus.to_mapping(),
        }
    }

    fn validate(&self) -> ModelResult<()> {
        match self {
            Self::Manual(manual) => manual.validate(),
            Self::Focus(focus) => focus.validate(),
        }
    }
}

/// Finite-difference polar solvation Poisson-Boltzmann calculation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiniteDifference {
    pub settings: PolarSettings,
    pub method: Option<FiniteDifferenceMethod>,
    /// Set up the problem without running the solver
    pub no_op: Option<bool>,
}

impl InputFile for FiniteDifference {
    fn from_mapping(mapping: &Mapping) -> ModelResult<Self> {
        let fields = Fields::new(mapping);
        let settings = PolarSettings::from_mapping(mapping)?;
        let method = match fields.string("calculation type")? {
            Some(kind) => fields.object("calculation parameters", |parameters| {
                FiniteDifferenceMethod::from_parts(&kind, parameters)
            })?,
            None => None,
        };
        Ok(Self {
            settings,
            method,
            no_op: fields.opt_boolean("no-op")?,
        })
    }

    fn to_mapping(&self) -> Mapping {
        MappingBuilder::new()
            .merge(self.settings.to_mapping())
            .opt("calculation type", self.method.as_ref().map(|m| m.kind()))
            .opt_object(
                "calculation parameters",
                self.method.as_ref().map(|m| m.parameters()),
            )
            .opt("no-op", self.no_op)
            .build()
    }

    fn validate(&self) -> ModelResult<()> {
        let mut violations = Violations::new();
        violations.nested(self.settings.validate());
        match &self.method {
            Some(method) => violations.nested(method.validate()),
            None => violations.push("calculation type is not set."),
        }
        violations.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::polar::testing::polar_settings;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn grid(value: serde_json::Value) -> ModelResult<GridDimensions> {
        GridDimensions::from_mapping(value.as_object().unwrap())
    }

    #[test]
    fn test_adjust_counts_targets() {
        let cases = [
            ([33, 33, 33], [33, 33, 33], 5),
            ([34, 35, 36], [33, 33, 33], 5),
            ([65, 65, 65], [65, 65, 65], 6),
            ([97, 97, 97], [97, 97, 97], 5),
            ([129, 129, 129], [129, 129, 129], 7),
            ([161, 172, 166], [161, 161, 161], 5),
            ([225, 225, 225], [225, 225, 225], 5),
            ([257, 257, 257], [257, 257, 257], 8),
            ([321, 321, 321], [321, 321, 321], 6),
        ];
        for (targets, counts, levels) in cases {
            let grid = grid(json!({"counts": targets, "lengths": [1, 1, 1]})).unwrap();
            assert_eq!(grid.counts(), Some(counts), "targets {:?}", targets);
            assert_eq!(grid.levels(), Some(levels), "targets {:?}", targets);
        }
    }

    #[test]
    fn test_adjusted_counts_are_multigrid_compatible() {
        for nx in (17..300).step_by(13) {
            for ny in (17..300).step_by(29) {
                for nz in [17, 64, 97, 161, 290] {
                    let targets = [nx, ny, nz];
                    let (counts, levels) = adjust_counts(targets).unwrap();
                    assert!(levels >= MIN_LEVEL);
                    for (count, target) in counts.iter().zip(targets) {
                        assert!(*count <= target);
                        assert!(*count > 1);
                        assert_eq!((count - 1) % (1 << levels), 0);
                    }
                    assert_eq!(adjust_counts(counts), Some((counts, levels)));
                }
            }
        }
    }

    #[test]
    fn test_compatible_targets_unchanged() {
        assert_eq!(adjust_counts([17, 33, 65]), Some(([17, 33, 65], 4)));
        assert_eq!(adjust_counts([129, 65, 193]), Some(([129, 65, 193], 6)));
    }

    #[test]
    fn test_imputation() {
        let grid1 = grid(json!({"spacings": [0.5, 0.5, 0.5], "lengths": [32, 48, 224]})).unwrap();
        assert_eq!(grid1.counts(), Some([65, 97, 449]));
        assert_eq!(grid1.levels(), Some(5));

        let grid2 = grid(json!({"spacings": [0.1, 0.05, 0.1], "lengths": [14.4, 14.4, 57.6]}))
            .unwrap();
        assert_eq!(grid2.counts(), Some([145, 289, 577]));

        let grid3 = grid(json!({"counts": [65, 97, 449], "lengths": [32, 48, 224]})).unwrap();
        assert_eq!(grid3.spacings(), Some([0.5, 0.5, 0.5]));

        let grid4 = grid(json!({"counts": [65, 97, 449], "spacings": [0.5, 0.5, 0.5]})).unwrap();
        assert_eq!(grid4.lengths(), Some([32.0, 48.0, 224.0]));
        grid4.validate().unwrap();
    }

    #[test]
    fn test_all_three_dimensions_must_agree() {
        let consistent = grid(json!({
            "counts": [65, 97, 449],
            "spacings": [0.5, 0.5, 0.5],
            "lengths": [32, 48, 224]
        }))
        .unwrap();
        consistent.validate().unwrap();

        let inconsistent = grid(json!({
            "counts": [65, 97, 449],
            "spacings": [0.5, 0.5, 0.5],
            "lengths": [32, 60, 100]
        }))
        .unwrap();
        assert_eq!(
            inconsistent.validate().unwrap_err().to_string(),
            "Grid lengths [32.0, 60.0, 100.0] do not match spacings [0.5, 0.5, 0.5] \
             and counts [65, 97, 449] along y, z."
        );

        // 34 is adjusted down to 33, so 0.5 * 32 is the only matching length
        let adjusted = grid(json!({
            "counts": [34, 33, 33],
            "spacings": [0.5, 0.5, 0.5],
            "lengths": [16.5, 16, 16]
        }))
        .unwrap();
        assert_matches!(
            adjusted.validate(),
            Err(ModelError::Invalid { message }) if message.ends_with("along x.")
        );
    }

    #[test]
    fn test_bad_grids() {
        for counts in [[97, 161, -1], [0, 0, 65], [9, 33, 129]] {
            assert_matches!(
                grid(json!({"counts": counts})),
                Err(ModelError::OutOfDomain { .. })
            );
        }
        for spacings in [[1.0, 1.2, 0.0], [3.14, -22.0, 1.5]] {
            assert_matches!(
                grid(json!({"spacings": spacings})),
                Err(ModelError::OutOfDomain { .. })
            );
        }
        let lonely = grid(json!({"lengths": [10, 10, 10]})).unwrap();
        assert_eq!(
            lonely.validate().unwrap_err().to_string(),
            "Grid dimensions need two of counts, spacings and lengths."
        );
    }

    #[test]
    fn test_grid_center() {
        let center =
            GridCenter::from_mapping(json!({"molecule": "complex"}).as_object().unwrap()).unwrap();
        assert_eq!(center, GridCenter::Molecule("complex".to_string()));
        let center =
            GridCenter::from_mapping(json!({"position": [1, 2.5, -3]}).as_object().unwrap())
                .unwrap();
        assert_eq!(center, GridCenter::Position([1.0, 2.5, -3.0]));
        assert_eq!(GridCenter::from_mapping(&center.to_mapping()).unwrap(), center);
        assert_matches!(
            GridCenter::from_mapping(json!({}).as_object().unwrap()),
            Err(ModelError::MissingKey { .. })
        );
    }

    fn focus(coarse: [f64; 3], fine: [f64; 3]) -> Focus {
        let value = json!({
            "coarse grid center": {"molecule": "complex"},
            "coarse grid dimensions": {"counts": [97, 97, 97], "lengths": coarse},
            "fine grid center": {"molecule": "complex"},
            "fine grid dimensions": {"counts": [97, 97, 97], "lengths": fine},
            "parallel": false
        });
        Focus::from_mapping(value.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_focus_fine_length_exceeds_coarse() {
        let bad = focus([60.0, 60.0, 60.0], [90.0, 60.0, 60.0]);
        let message = bad.validate().unwrap_err().to_string();
        assert!(message.contains("x axis"), "{}", message);
        assert!(!message.contains("y axis"));

        focus([60.0, 60.0, 60.0], [40.0, 60.0, 20.0]).validate().unwrap();
    }

    #[test]
    fn test_focus_parallel_parameters() {
        let mut parallel = focus([60.0, 60.0, 60.0], [40.0, 40.0, 40.0]);
        parallel.parallel = Some(true);
        assert_eq!(
            parallel.validate().unwrap_err().to_string(),
            "The 'parallel parameters' object has not been provided."
        );

        let mut parameters = ParallelFocus::default();
        parameters.set_overlap_fraction(0.1).unwrap();
        parameters.set_processor_array([2, 2, 1]).unwrap();
        parameters.set_asynchronous_rank(5).unwrap();
        parallel.parallel_parameters = Some(parameters);
        assert_eq!(
            parallel.validate().unwrap_err().to_string(),
            "Asynchronous rank 5 exceeds the 4 processors in the processor array."
        );
    }

    #[test]
    fn test_parallel_focus_domains() {
        let mut parameters = ParallelFocus::default();
        assert_matches!(parameters.set_overlap_fraction(1.5), Err(ModelError::OutOfDomain { .. }));
        assert_matches!(parameters.set_overlap_fraction(0.0), Err(ModelError::OutOfDomain { .. }));
        parameters.set_overlap_fraction(1.0).unwrap();
        assert_matches!(
            parameters.set_processor_array([2, 0, 1]),
            Err(ModelError::OutOfDomain { .. })
        );
    }

    fn finite_difference_value() -> serde_json::Value {
        let mut value = polar_settings();
        let object = value.as_object_mut().unwrap();
        object.insert("calculation type".to_string(), json!("focus"));
        object.insert(
            "calculation parameters".to_string(),
            json!({
                "coarse grid center": {"molecule": "complex"},
                "coarse grid dimensions": {"counts": [97, 97, 97], "lengths": [80, 80, 80]},
                "fine grid center": {"position": [0.0, 1.5, -2.0]},
                "fine grid dimensions": {"spacings": [0.25, 0.25, 0.25], "lengths": [24, 24, 24]},
                "parallel": true,
                "parallel parameters": {
                    "overlap fraction": 0.1,
                    "processor array": [2, 2, 2],
                    "asynchronous rank": 3
                }
            }),
        );
        value
    }

    #[test]
    fn test_finite_difference_round_trip() {
        let value = finite_difference_value();
        let calculation = FiniteDifference::from_mapping(value.as_object().unwrap()).unwrap();
        calculation.validate().unwrap();
        assert_matches!(calculation.method, Some(FiniteDifferenceMethod::Focus(_)));
        assert_eq!(
            FiniteDifference::from_mapping(&calculation.to_mapping()).unwrap(),
            calculation
        );

        let toml = calculation.to_toml().unwrap();
        assert_eq!(FiniteDifference::from_toml(&toml).unwrap(), calculation);
        let json = calculation.to_json().unwrap();
        assert_eq!(FiniteDifference::from_json(&json).unwrap(), calculation);
    }

    #[test]
    fn test_unknown_calculation_type() {
        let mut value = finite_difference_value();
        value["calculation type"] = json!("multigrid");
        assert_matches!(
            FiniteDifference::from_mapping(value.as_object().unwrap()),
            Err(ModelError::OutOfDomain { message }) if message == "Unknown calculation type: multigrid."
        );

        value.as_object_mut().unwrap().remove("calculation parameters");
        value["calculation type"] = json!("manual");
        assert_matches!(
            FiniteDifference::from_mapping(value.as_object().unwrap()),
            Err(ModelError::MissingKey { key }) if key == "calculation parameters"
        );
    }
}
