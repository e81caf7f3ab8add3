//! Payload builders for ELEC and APOLAR directives
//!
//! `parse_payload` dispatches on the [`Payload`] shape from the keyword
//! tables. Compound payloads become lists in declared order; the ion
//! descriptor becomes a record keyed by its sub-field names.

use super::atomic::{
    expect_value_token, parse_bounded, parse_choice, parse_identifier, parse_integer,
    parse_number, parse_path, Parser,
};
use crate::grammar::keywords::{
    DirectiveSpec, Payload, DIFF_MODES, GRID2D_AXES, TERM_POSITION_OPERATORS, USEMAP_VALUES,
    WRITEMAT_VALUES, WRITE_FORMATS, WRITE_PROPERTIES,
};
use crate::mapping::Value;
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::Token;
use std::collections::BTreeMap;

const ION_FIELDS: [&str; 3] = ["charge", "conc", "radius"];

pub fn parse_payload(parser: &mut dyn Parser, spec: &DirectiveSpec) -> SyntaxResult<Value> {
    let directive = spec.keyword;
    match spec.payload {
        Payload::Integer => parse_integer(parser, directive).map(Value::Integer),
        Payload::Number => parse_number(parser, directive),
        Payload::Bounded(bound) => parse_bounded(parser, directive, bound),
        Payload::Identifier => parse_identifier(parser),
        Payload::Path => parse_path(parser),
        Payload::Choice(allowed) => parse_choice(parser, directive, allowed),
        Payload::IntegerTriple => parse_triple(parser, directive, true),
        Payload::NumberTriple => parse_triple(parser, directive, false),
        Payload::Center => parse_center(parser, directive),
        Payload::Ion => parse_ion(parser),
        Payload::Write => parse_write(parser),
        Payload::Usemap => parse_usemap(parser),
        Payload::Writemat => parse_writemat(parser),
        Payload::Flag => Ok(Value::Integer(1)),
        Payload::Diff => parse_diff(parser),
        Payload::Grid2d => parse_grid2d(parser),
        Payload::Term => parse_term(parser),
        Payload::Xyz => parse_xyz(parser),
    }
}

/// Three integers or three numbers
pub fn parse_triple(parser: &mut dyn Parser, directive: &str, integers: bool) -> SyntaxResult<Value> {
    let mut items = Vec::with_capacity(3);
    for _ in 0..3 {
        let item = if integers {
            Value::Integer(parse_integer(parser, directive)?)
        } else {
            parse_number(parser, directive)?
        };
        items.push(item);
    }
    Ok(Value::List(items))
}

/// `mol <id>` becomes `["mol", id]`, otherwise a coordinate triple
pub fn parse_center(parser: &mut dyn Parser, directive: &str) -> SyntaxResult<Value> {
    if parser.at_keyword("mol") {
        parser.advance();
        let id = parse_integer(parser, directive)?;
        return Ok(Value::List(vec![Value::from("mol"), Value::Integer(id)]));
    }
    parse_triple(parser, directive, false)
}

/// `charge <n> conc <n> radius <n>` in any order, or the positional
/// `<charge> <conc> <radius>` form.
pub fn parse_ion(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    let start = parser.current_span();
    let mut fields = BTreeMap::new();

    if matches!(parser.current_token(), Some(Token::Integer(_) | Token::Float(_))) {
        for field in ION_FIELDS {
            fields.insert(field.to_string(), parse_number(parser, "ion")?);
        }
        return Ok(Value::Record(fields));
    }

    while let Some(keyword) = parser.current_keyword() {
        if !ION_FIELDS.contains(&keyword.as_str()) {
            break;
        }
        let span = parser.current_span();
        if fields.contains_key(&keyword) {
            return Err(SyntaxError::duplicate_directive(&format!("ion {}", keyword), span));
        }
        parser.advance();
        let value = parse_number(parser, &format!("ion {}", keyword))?;
        fields.insert(keyword, value);
    }

    if let Some(missing) = ION_FIELDS.iter().find(|f| !fields.contains_key(**f)) {
        let span = if fields.is_empty() { start } else { parser.current_span() };
        return Err(SyntaxError::missing_required("ion", missing, span));
    }

    Ok(Value::Record(fields))
}

/// `<property> <format> <path>`
pub fn parse_write(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    let property = parse_choice(parser, "write", WRITE_PROPERTIES)?;
    let format = parse_choice(parser, "write", WRITE_FORMATS)?;
    let path = parse_path(parser)?;
    Ok(Value::List(vec![property, format, path]))
}

/// `<kind> <integer-id>`
pub fn parse_usemap(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    let kind = parse_choice(parser, "usemap", USEMAP_VALUES)?;
    let id = parse_integer(parser, "usemap")?;
    Ok(Value::List(vec![kind, Value::Integer(id)]))
}

/// `poisson <path>`
pub fn parse_writemat(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    let kind = parse_choice(parser, "writemat", WRITEMAT_VALUES)?;
    let path = parse_path(parser)?;
    Ok(Value::List(vec![kind, path]))
}

/// `stat`, `move <translation> <rotation>` or `rot <rotation>`
pub fn parse_diff(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    let mode = parse_choice(parser, "diff", DIFF_MODES)?;
    match mode.as_str() {
        Some("move") => {
            let translation = parse_number(parser, "diff move")?;
            let rotation = parse_number(parser, "diff move")?;
            Ok(Value::List(vec![mode, translation, rotation]))
        }
        Some("rot") => {
            let rotation = parse_number(parser, "diff rot")?;
            Ok(Value::List(vec![mode, rotation]))
        }
        _ => Ok(mode),
    }
}

/// `<path> <x|y|z> <position>`
pub fn parse_grid2d(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    let path = parse_path(parser)?;
    let axis = parse_choice(parser, "grid2d", GRID2D_AXES)?;
    let position = parse_number(parser, "grid2d")?;
    Ok(Value::List(vec![path, axis, position]))
}

/// `contact <path>`, `time <n>` or `<axis-op> <n> <molecule>`
pub fn parse_term(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    let span = parser.current_span();
    let token = expect_value_token(parser, "termination condition")?;
    let word = parser.lexeme(&token).to_ascii_lowercase();

    match word.as_str() {
        "contact" => {
            let path = parse_path(parser)?;
            Ok(Value::List(vec![Value::Text(word), path]))
        }
        "time" => {
            let limit = parse_number(parser, "term time")?;
            Ok(Value::List(vec![Value::Text(word), limit]))
        }
        op if TERM_POSITION_OPERATORS.contains(&op) => {
            let position = parse_number(parser, "term")?;
            let molecule = parse_identifier(parser)?;
            Ok(Value::List(vec![Value::Text(word), position, molecule]))
        }
        _ => {
            let mut allowed = vec!["contact", "time"];
            allowed.extend_from_slice(TERM_POSITION_OPERATORS);
            Err(SyntaxError::invalid_choice("term", &word, &allowed, span))
        }
    }
}

/// `<molecule> <path>`
pub fn parse_xyz(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    let molecule = parse_identifier(parser)?;
    let path = parse_path(parser)?;
    Ok(Value::List(vec![molecule, path]))
}

#[cfg(test)]
mod tests {
    use super::super::atomic::testing::StreamParser;
    use super::*;
    use crate::grammar::keywords::elec_directive;
    use assert_matches::assert_matches;

    fn parse(keyword: &str, source: &str) -> SyntaxResult<Value> {
        let mut p = StreamParser::new(source);
        let spec = elec_directive(keyword).unwrap();
        parse_payload(&mut p, spec)
    }

    #[test]
    fn test_ion_fields_in_any_order() {
        let value = parse("ion", "radius 2.0 charge -1 conc 0.050").unwrap();
        assert_eq!(value.get("charge"), Some(&Value::Integer(-1)));
        assert_eq!(value.get("conc"), Some(&Value::Float(0.05)));
        assert_eq!(value.get("radius"), Some(&Value::Float(2.0)));
    }

    #[test]
    fn test_ion_positional_form() {
        let value = parse("ion", "1 0.150 2.0").unwrap();
        assert_eq!(value.to_string(), "charge 1 conc 0.15 radius 2.0");
    }

    #[test]
    fn test_ion_missing_and_duplicate_fields() {
        assert_matches!(
            parse("ion", "charge 1 conc 0.1 END"),
            Err(SyntaxError::MissingRequiredDirective { ref directive, .. }) if directive == "radius"
        );
        assert_matches!(
            parse("ion", "charge 1 charge 2"),
            Err(SyntaxError::DuplicateDirective { .. })
        );
    }

    #[test]
    fn test_center_forms() {
        assert_eq!(
            parse("cgcent", "mol 3").unwrap(),
            Value::List(vec![Value::from("mol"), Value::Integer(3)])
        );
        assert_eq!(
            parse("gcent", "0 1.5 -2").unwrap(),
            Value::List(vec![Value::Integer(0), Value::Float(1.5), Value::Integer(-2)])
        );
    }

    #[test]
    fn test_dime_requires_integers() {
        assert_matches!(parse("dime", "65 65.0 65"), Err(SyntaxError::UnexpectedToken { .. }));
        assert_matches!(parse("dime", "65 65"), Err(SyntaxError::UnexpectedEndOfInput { .. }));
    }

    #[test]
    fn test_write_and_usemap() {
        assert_eq!(
            parse("write", "POT dx Output/Pot").unwrap(),
            Value::List(vec![Value::from("pot"), Value::from("dx"), Value::from("Output/Pot")])
        );
        assert_eq!(
            parse("usemap", "diel 1").unwrap(),
            Value::List(vec![Value::from("diel"), Value::Integer(1)])
        );
        assert_matches!(parse("write", "pot pdf out"), Err(SyntaxError::InvalidChoice { .. }));
    }

    #[test]
    fn test_pb_compound_directives() {
        assert_eq!(parse("diff", "stat").unwrap(), Value::from("stat"));
        assert_eq!(
            parse("diff", "move 0.1 0.01").unwrap(),
            Value::List(vec![Value::from("move"), Value::Float(0.1), Value::Float(0.01)])
        );
        assert_eq!(
            parse("term", "x>= 20.0 1").unwrap(),
            Value::List(vec![Value::from("x>="), Value::Float(20.0), Value::Integer(1)])
        );
        assert_eq!(
            parse("grid2d", "plane.dat z 0.0").unwrap(),
            Value::List(vec![Value::from("plane.dat"), Value::from("z"), Value::Float(0.0)])
        );
        assert_eq!(parse("randorient", "").unwrap(), Value::Integer(1));
        assert_matches!(parse("term", "sometime 3"), Err(SyntaxError::InvalidChoice { .. }));
    }

    #[test]
    fn test_tabi_mesh_choice_keeps_integers() {
        assert_eq!(parse("mesh", "2").unwrap(), Value::Integer(2));
        assert_eq!(parse("mesh", "SES").unwrap(), Value::from("ses"));
    }
}
