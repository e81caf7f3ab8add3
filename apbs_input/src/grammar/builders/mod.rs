//! Builder functions for legacy grammar productions

pub mod atomic;
pub mod directives;
pub mod sections;

pub use atomic::{
    expect_keyword, expect_value_token, is_identifier, parse_bounded, parse_choice,
    parse_identifier, parse_integer, parse_number, parse_path, Parser,
};

pub use directives::{
    parse_center, parse_diff, parse_grid2d, parse_ion, parse_payload, parse_term, parse_triple,
    parse_usemap, parse_write, parse_writemat, parse_xyz,
};

pub use sections::{
    parse_input, parse_keyword_section, parse_print_section, parse_read_section,
    parse_section_body,
};
