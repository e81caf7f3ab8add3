//! Grammar of the legacy input language
//!
//! [`keywords`] holds the directive tables as data; [`builders`] turns a
//! token stream into the canonical mapping using them.

pub mod builders;
pub mod keywords;

pub use builders::*;
pub use keywords::{ElecVariant, SectionKind};
