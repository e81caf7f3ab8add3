//! Keyword tables for the legacy input language
//!
//! Everything the section grammars need to know about a directive lives in
//! these tables: its payload shape, range constraint, enumerated values,
//! whether it may repeat, and which calculation types accept it. The
//! deprecated-alias rewrites are data here as well.

use std::fmt;

pub const END: &str = "end";
pub const QUIT: &str = "quit";

/// Key under which the ELEC calculation type is stored
pub const TYPE_KEY: &str = "type";
/// Key under which the equation keyword is stored
pub const EQUATION_KEY: &str = "pbe";
pub const NAME_KEY: &str = "name";

/// Top-level sections of an input deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Read,
    Elec,
    Apolar,
    Print,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [Self::Read, Self::Elec, Self::Apolar, Self::Print];

    /// Uppercase name used as the canonical mapping key
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Elec => "ELEC",
            Self::Apolar => "APOLAR",
            Self::Print => "PRINT",
        }
    }

    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// ELEC calculation types, discriminated by their leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElecVariant {
    MgAuto,
    MgManual,
    MgPara,
    MgDummy,
    FeManual,
    GeoflowAuto,
    PbamAuto,
    PbsamAuto,
    Tabi,
    Pygbe,
}

const MG_AUTO: &[&str] = &[
    "name", "bcfl", "calcenergy", "calcforce", "cgcent", "cglen", "chgm", "dime", "etol",
    "fgcent", "fglen", "ion", "pbe", "mol", "pdie", "sdens", "sdie", "srad", "srfm", "swin",
    "temp", "usemap", "write", "writemat",
];

const MG_MANUAL: &[&str] = &[
    "name", "bcfl", "calcenergy", "calcforce", "chgm", "dime", "etol", "gcent", "glen", "grid",
    "ion", "pbe", "mol", "nlev", "pdie", "sdens", "sdie", "srad", "srfm", "swin", "temp",
    "usemap", "write", "writemat",
];

const MG_PARA: &[&str] = &[
    "name", "async", "bcfl", "calcenergy", "calcforce", "cgcent", "cglen", "chgm", "dime",
    "etol", "fgcent", "fglen", "ion", "pbe", "mol", "ofrac", "pdie", "pdime", "sdens", "sdie",
    "srad", "srfm", "swin", "temp", "usemap", "write", "writemat",
];

const MG_DUMMY: &[&str] = &[
    "name", "bcfl", "calcenergy", "calcforce", "chgm", "dime", "gcent", "glen", "grid", "ion",
    "nlev", "pbe", "mol", "pdie", "sdens", "sdie", "srad", "srfm", "swin", "temp", "write",
];

const FE_MANUAL: &[&str] = &[
    "name", "akeypre", "akeysolve", "async", "bcfl", "calcenergy", "calcforce", "chgm",
    "domainlength", "ekey", "etol", "ion", "pbe", "maxsolve", "maxvert", "mol", "pdie", "sdens",
    "sdie", "srad", "srfm", "swin", "targetnum", "targetres", "temp", "usemap", "usemesh",
    "write",
];

const GEOFLOW_AUTO: &[&str] = &[
    "name", "bcfl", "bconc", "etol", "gamma", "grid", "pbe", "mol", "pdie", "press", "sdie",
    "vdwdisp",
];

const TABI: &[&str] = &[
    "name", "ion", "mac", "mesh", "mol", "outdata", "pdie", "sdens", "sdie", "srad", "temp",
    "tree_n0", "tree_order",
];

const PBAM_AUTO: &[&str] = &[
    "name", "3dmap", "diff", "dx", "grid2d", "gridpts", "mol", "ntraj", "pbc", "pdie",
    "randorient", "runname", "runtype", "salt", "sdie", "temp", "term", "termcombine", "units",
    "xyz",
];

const PBSAM_AUTO: &[&str] = &[
    "name", "3dmap", "diff", "dx", "exp", "grid2d", "imat", "ntraj", "pbc", "pdie",
    "randorient", "runname", "runtype", "salt", "sdie", "surf", "temp", "term", "termcombine",
    "tolsp", "units", "xyz",
];

const PYGBE: &[&str] = &["name"];

impl ElecVariant {
    pub const ALL: [ElecVariant; 10] = [
        Self::MgAuto,
        Self::MgManual,
        Self::MgPara,
        Self::MgDummy,
        Self::FeManual,
        Self::GeoflowAuto,
        Self::PbamAuto,
        Self::PbsamAuto,
        Self::Tabi,
        Self::Pygbe,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MgAuto => "mg-auto",
            Self::MgManual => "mg-manual",
            Self::MgPara => "mg-para",
            Self::MgDummy => "mg-dummy",
            Self::FeManual => "fe-manual",
            Self::GeoflowAuto => "geoflow-auto",
            Self::PbamAuto => "pbam-auto",
            Self::PbsamAuto => "pbsam-auto",
            Self::Tabi => "tabi",
            Self::Pygbe => "pygbe",
        }
    }

    /// Canonical keyword lookup; deprecated spellings go through [`deprecated_type`]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str().eq_ignore_ascii_case(keyword))
    }

    /// Mapping keys this variant accepts, `pbe` standing for the equation keyword
    pub const fn allowed_keys(self) -> &'static [&'static str] {
        match self {
            Self::MgAuto => MG_AUTO,
            Self::MgManual => MG_MANUAL,
            Self::MgPara => MG_PARA,
            Self::MgDummy => MG_DUMMY,
            Self::FeManual => FE_MANUAL,
            Self::GeoflowAuto => GEOFLOW_AUTO,
            Self::PbamAuto => PBAM_AUTO,
            Self::PbsamAuto => PBSAM_AUTO,
            Self::Tabi => TABI,
            Self::Pygbe => PYGBE,
        }
    }

    pub fn allows(self, key: &str) -> bool {
        self.allowed_keys().contains(&key)
    }
}

impl fmt::Display for ElecVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single-choice equation keywords, stored under [`EQUATION_KEY`]
pub const EQUATIONS: &[&str] = &["lpbe", "lrpbe", "npbe", "nrpbe"];

pub fn is_equation(word: &str) -> bool {
    EQUATIONS.iter().any(|eq| eq.eq_ignore_ascii_case(word))
}

/// Numeric constraint attached to a directive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtLeast(f64),
    GreaterThan(f64),
    /// Open interval
    Between(f64, f64),
}

impl Bound {
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Self::AtLeast(min) => value >= min,
            Self::GreaterThan(min) => value > min,
            Self::Between(min, max) => value > min && value < max,
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            Self::AtLeast(min) => format!("at least {}", min),
            Self::GreaterThan(min) => format!("greater than {}", min),
            Self::Between(min, max) => format!("between {} and {} (exclusive)", min, max),
        }
    }
}

/// Shape of the words following a directive keyword
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    Integer,
    Number,
    Bounded(Bound),
    /// Alias: a word or a bare integer
    Identifier,
    /// Any printable run, case preserved
    Path,
    Choice(&'static [&'static str]),
    IntegerTriple,
    NumberTriple,
    /// `mol <id>` or three numbers
    Center,
    /// `charge <n> conc <n> radius <n>` in any order
    Ion,
    /// `<property> <format> <path>`
    Write,
    /// `<kind> <integer-id>`
    Usemap,
    /// `poisson <path>`
    Writemat,
    /// No payload; presence decodes to integer 1
    Flag,
    /// `stat` | `move <n> <n>` | `rot <n>`
    Diff,
    /// `<path> <x|y|z> <n>`
    Grid2d,
    /// `contact <path>` | `time <n>` | `<axis-op> <n> <id>`
    Term,
    /// `<id> <path>`
    Xyz,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectiveSpec {
    pub keyword: &'static str,
    pub payload: Payload,
    pub repeatable: bool,
}

const fn once(keyword: &'static str, payload: Payload) -> DirectiveSpec {
    DirectiveSpec {
        keyword,
        payload,
        repeatable: false,
    }
}

const fn many(keyword: &'static str, payload: Payload) -> DirectiveSpec {
    DirectiveSpec {
        keyword,
        payload,
        repeatable: true,
    }
}

pub const BCFL_VALUES: &[&str] = &["zero", "sdh", "mdh", "focus", "map"];
pub const CALC_VALUES: &[&str] = &["no", "total", "comps"];
pub const CHGM_VALUES: &[&str] = &["spl0", "spl2", "spl4"];
pub const ELEC_SRFM_VALUES: &[&str] = &["mol", "smol", "spl2", "spl4"];
pub const APOLAR_SRFM_VALUES: &[&str] = &["sacc"];
pub const USEMAP_VALUES: &[&str] = &["diel", "kappa", "charge", "pot"];
pub const WRITE_PROPERTIES: &[&str] = &[
    "charge", "pot", "atompot", "smol", "sspl", "vdw", "ivdw", "lap", "edens", "ndens", "qdens",
    "dielx", "diely", "dielz", "kappa",
];
pub const WRITE_FORMATS: &[&str] = &["avs", "dx", "flat", "gz", "uhbd"];
pub const WRITEMAT_VALUES: &[&str] = &["poisson"];
pub const AKEYPRE_VALUES: &[&str] = &["unif", "geom"];
pub const AKEYSOLVE_VALUES: &[&str] = &["resi"];
pub const EKEY_VALUES: &[&str] = &["simp", "global", "frac"];
pub const BINARY_VALUES: &[&str] = &["0", "1"];
pub const TABI_MESH_VALUES: &[&str] = &["0", "1", "2", "ses", "skin"];
pub const RUNTYPE_VALUES: &[&str] = &["energyforce", "electrostatics", "dynamics"];
pub const TERMCOMBINE_VALUES: &[&str] = &["and", "or"];
pub const UNITS_VALUES: &[&str] = &["kcalmol", "jmol", "kt"];
pub const GRID2D_AXES: &[&str] = &["x", "y", "z"];
pub const TERM_POSITION_OPERATORS: &[&str] =
    &["x<=", "x>=", "y<=", "y>=", "z<=", "z>=", "r<=", "r>="];
pub const DIFF_MODES: &[&str] = &["stat", "move", "rot"];

/// Every directive an ELEC section can carry; variants narrow this set
pub const ELEC_DIRECTIVES: &[DirectiveSpec] = &[
    once("name", Payload::Identifier),
    once("async", Payload::Integer),
    once("bcfl", Payload::Choice(BCFL_VALUES)),
    once("calcenergy", Payload::Choice(CALC_VALUES)),
    once("calcforce", Payload::Choice(CALC_VALUES)),
    once("cgcent", Payload::Center),
    once("fgcent", Payload::Center),
    once("gcent", Payload::Center),
    once("cglen", Payload::NumberTriple),
    once("fglen", Payload::NumberTriple),
    once("glen", Payload::NumberTriple),
    once("grid", Payload::NumberTriple),
    once("dime", Payload::IntegerTriple),
    once("pdime", Payload::IntegerTriple),
    once("domainlength", Payload::NumberTriple),
    once("etol", Payload::Bounded(Bound::GreaterThan(0.0))),
    once("nlev", Payload::Integer),
    once("mol", Payload::Integer),
    once("ofrac", Payload::Number),
    once("pdie", Payload::Bounded(Bound::AtLeast(1.0))),
    once("sdie", Payload::Bounded(Bound::AtLeast(1.0))),
    once("sdens", Payload::Bounded(Bound::AtLeast(0.0))),
    once("srad", Payload::Bounded(Bound::AtLeast(0.0))),
    once("swin", Payload::Bounded(Bound::AtLeast(0.0))),
    once("temp", Payload::Bounded(Bound::GreaterThan(0.0))),
    once("srfm", Payload::Choice(ELEC_SRFM_VALUES)),
    once("chgm", Payload::Choice(CHGM_VALUES)),
    many("ion", Payload::Ion),
    many("usemap", Payload::Usemap),
    many("write", Payload::Write),
    many("writemat", Payload::Writemat),
    // fe-manual
    once("akeypre", Payload::Choice(AKEYPRE_VALUES)),
    once("akeysolve", Payload::Choice(AKEYSOLVE_VALUES)),
    once("ekey", Payload::Choice(EKEY_VALUES)),
    once("maxsolve", Payload::Number),
    once("maxvert", Payload::Number),
    once("targetnum", Payload::Integer),
    once("targetres", Payload::Number),
    once("usemesh", Payload::Identifier),
    // geoflow-auto
    once("bconc", Payload::Number),
    once("gamma", Payload::Number),
    once("press", Payload::Number),
    once("vdwdisp", Payload::Choice(BINARY_VALUES)),
    // tabi
    once("mac", Payload::Bounded(Bound::Between(0.0, 1.0))),
    once("mesh", Payload::Choice(TABI_MESH_VALUES)),
    once("outdata", Payload::Choice(BINARY_VALUES)),
    once("tree_n0", Payload::Integer),
    once("tree_order", Payload::Integer),
    // pbam-auto and pbsam-auto
    once("3dmap", Payload::Path),
    many("diff", Payload::Diff),
    once("dx", Payload::Path),
    many("grid2d", Payload::Grid2d),
    once("gridpts", Payload::Integer),
    once("ntraj", Payload::Integer),
    once("pbc", Payload::Number),
    once("randorient", Payload::Flag),
    once("runname", Payload::Identifier),
    once("runtype", Payload::Choice(RUNTYPE_VALUES)),
    once("salt", Payload::Number),
    many("term", Payload::Term),
    once("termcombine", Payload::Choice(TERMCOMBINE_VALUES)),
    once("units", Payload::Choice(UNITS_VALUES)),
    many("xyz", Payload::Xyz),
    many("exp", Payload::Path),
    many("imat", Payload::Path),
    many("surf", Payload::Path),
    once("tolsp", Payload::Number),
];

pub const APOLAR_DIRECTIVES: &[DirectiveSpec] = &[
    once("name", Payload::Identifier),
    once("bconc", Payload::Number),
    once("calcenergy", Payload::Choice(CALC_VALUES)),
    once("calcforce", Payload::Choice(CALC_VALUES)),
    once("dpos", Payload::Bounded(Bound::GreaterThan(0.0))),
    once("gamma", Payload::Number),
    once("grid", Payload::NumberTriple),
    once("mol", Payload::Integer),
    once("press", Payload::Number),
    once("sdens", Payload::Bounded(Bound::AtLeast(0.0))),
    once("srad", Payload::Bounded(Bound::AtLeast(0.0))),
    once("srfm", Payload::Choice(APOLAR_SRFM_VALUES)),
    once("swin", Payload::Bounded(Bound::AtLeast(0.0))),
    once("temp", Payload::Bounded(Bound::GreaterThan(0.0))),
];

fn find(table: &'static [DirectiveSpec], keyword: &str) -> Option<&'static DirectiveSpec> {
    table
        .iter()
        .find(|spec| spec.keyword.eq_ignore_ascii_case(keyword))
}

pub fn elec_directive(keyword: &str) -> Option<&'static DirectiveSpec> {
    find(ELEC_DIRECTIVES, keyword)
}

pub fn apolar_directive(keyword: &str) -> Option<&'static DirectiveSpec> {
    find(APOLAR_DIRECTIVES, keyword)
}

/// Look up a directive for the section it appears in
pub fn directive_for(section: SectionKind, keyword: &str) -> Option<&'static DirectiveSpec> {
    match section {
        SectionKind::Elec => elec_directive(keyword),
        SectionKind::Apolar => apolar_directive(keyword),
        SectionKind::Read | SectionKind::Print => None,
    }
}

/// READ directive: `<keyword> <format> <path>{arity}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSpec {
    pub keyword: &'static str,
    pub formats: &'static [&'static str],
    pub arity: usize,
}

const MAP_FORMATS: &[&str] = &["dx", "gz"];

pub const READ_DIRECTIVES: &[ReadSpec] = &[
    ReadSpec { keyword: "mol", formats: &["pqr", "pdb"], arity: 1 },
    ReadSpec { keyword: "parm", formats: &["flat", "xml"], arity: 1 },
    ReadSpec { keyword: "diel", formats: MAP_FORMATS, arity: 3 },
    ReadSpec { keyword: "kappa", formats: MAP_FORMATS, arity: 1 },
    ReadSpec { keyword: "charge", formats: MAP_FORMATS, arity: 1 },
    ReadSpec { keyword: "pot", formats: MAP_FORMATS, arity: 1 },
    ReadSpec { keyword: "mesh", formats: &["mcsf"], arity: 1 },
];

pub fn read_directive(keyword: &str) -> Option<&'static ReadSpec> {
    READ_DIRECTIVES
        .iter()
        .find(|spec| spec.keyword.eq_ignore_ascii_case(keyword))
}

pub const PRINT_KINDS: &[&str] = &["elecenergy", "elecforce", "apolenergy", "apolforce"];

/// A deprecated spelling and its canonical replacement.
///
/// `directive` is `None` for calculation type keywords and otherwise names
/// the directive whose value is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deprecation {
    pub directive: Option<&'static str>,
    pub word: &'static str,
    pub replacement: &'static str,
}

pub const DEPRECATIONS: &[Deprecation] = &[
    Deprecation { directive: Some("ekey"), word: "glob", replacement: "global" },
    Deprecation { directive: Some("bcfl"), word: "mem", replacement: "mdh" },
    Deprecation { directive: None, word: "geoflow", replacement: "geoflow-auto" },
    Deprecation { directive: None, word: "pbam", replacement: "pbam-auto" },
    Deprecation { directive: None, word: "pbsam", replacement: "pbsam-auto" },
];

/// Replacement for a deprecated directive value
pub fn deprecated_value(directive: &str, word: &str) -> Option<&'static str> {
    DEPRECATIONS
        .iter()
        .find(|d| d.directive == Some(directive) && d.word.eq_ignore_ascii_case(word))
        .map(|d| d.replacement)
}

/// Replacement for a deprecated calculation type keyword
pub fn deprecated_type(word: &str) -> Option<&'static str> {
    DEPRECATIONS
        .iter()
        .find(|d| d.directive.is_none() && d.word.eq_ignore_ascii_case(word))
        .map(|d| d.replacement)
}

/// Words that may not begin a directive because they delimit sections
pub fn is_structural(word: &str) -> bool {
    word.eq_ignore_ascii_case(END)
        || word.eq_ignore_ascii_case(QUIT)
        || SectionKind::from_word(word).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_lookup() {
        assert_eq!(SectionKind::from_word("elec"), Some(SectionKind::Elec));
        assert_eq!(SectionKind::from_word("Read"), Some(SectionKind::Read));
        assert_eq!(SectionKind::from_word("quit"), None);
    }

    #[test]
    fn test_variant_sets_reference_known_directives() {
        for variant in ElecVariant::ALL {
            for key in variant.allowed_keys() {
                assert!(
                    *key == EQUATION_KEY || elec_directive(key).is_some(),
                    "{} allows unknown directive {}",
                    variant,
                    key
                );
            }
        }
    }

    #[test]
    fn test_variant_restrictions() {
        assert!(ElecVariant::MgAuto.allows("fglen"));
        assert!(!ElecVariant::MgManual.allows("fglen"));
        assert!(ElecVariant::MgPara.allows("pdime"));
        assert!(!ElecVariant::PbsamAuto.allows("gridpts"));
        assert!(ElecVariant::PbsamAuto.allows("tolsp"));
        assert!(!ElecVariant::Tabi.allows(EQUATION_KEY));
        assert_eq!(ElecVariant::Pygbe.allowed_keys(), &["name"]);
    }

    #[test]
    fn test_deprecations() {
        assert_eq!(deprecated_value("ekey", "GLOB"), Some("global"));
        assert_eq!(deprecated_value("bcfl", "mem"), Some("mdh"));
        assert_eq!(deprecated_value("bcfl", "glob"), None);
        assert_eq!(deprecated_type("pbam"), Some("pbam-auto"));
        assert_eq!(deprecated_type("mg-auto"), None);
    }

    #[test]
    fn test_bounds() {
        assert!(Bound::AtLeast(1.0).contains(1.0));
        assert!(!Bound::GreaterThan(0.0).contains(0.0));
        assert!(!Bound::Between(0.0, 1.0).contains(1.0));
        assert_eq!(Bound::AtLeast(1.0).describe(), "at least 1");
    }

    #[test]
    fn test_apolar_srfm_differs_from_elec() {
        let apolar = directive_for(SectionKind::Apolar, "srfm").map(|s| s.payload);
        assert_eq!(apolar, Some(Payload::Choice(APOLAR_SRFM_VALUES)));
        assert!(directive_for(SectionKind::Apolar, "ion").is_none());
    }
}
