//! Section grammars
//!
//! Sections are unordered keyword sets: directives are consumed greedily
//! until `END`, and cardinality, required presence and calculation-type
//! membership are checked as each directive arrives. The first violation
//! wins and carries the span of the token that caused it.

use super::atomic::{expect_keyword, parse_choice, parse_identifier, parse_path, Parser};
use super::directives::parse_payload;
use crate::config::constants::compile_time::syntax::{MAX_DIRECTIVES_PER_SECTION, MAX_SECTIONS};
use crate::grammar::keywords::{
    deprecated_type, directive_for, is_equation, is_structural, read_directive, ElecVariant,
    SectionKind, END, EQUATION_KEY, PRINT_KINDS, QUIT, READ_DIRECTIVES, TYPE_KEY,
};
use crate::mapping::{Directives, InputMapping, Value};
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::Token;
use crate::utils::Span;
use std::collections::BTreeMap;

const SECTION_EXPECTATION: &str = "section keyword (READ, ELEC, APOLAR, PRINT) or QUIT";

/// Parse a whole deck: `section* QUIT`.
///
/// Text after `QUIT` is never looked at.
pub fn parse_input(parser: &mut dyn Parser) -> SyntaxResult<InputMapping> {
    let mut mapping = InputMapping::new();

    let quit_span = loop {
        let span = parser.current_span();

        if parser.at_end_of_input() {
            return Err(SyntaxError::MissingQuit { span });
        }

        let Some(word) = parser.current_keyword() else {
            return Err(unexpected(parser, SECTION_EXPECTATION));
        };

        if word == QUIT {
            parser.advance();
            break span;
        }

        let Some(kind) = SectionKind::from_word(&word) else {
            return Err(unexpected(parser, SECTION_EXPECTATION));
        };

        if mapping.total_sections() >= MAX_SECTIONS {
            return Err(SyntaxError::TooManySections {
                what: "sections".to_string(),
                limit: MAX_SECTIONS,
                span,
            });
        }

        parser.advance();
        let directives = parse_section_body(parser, kind)?;
        mapping.push_section(kind.as_str(), directives);
    };

    check_required_sections(&mapping, quit_span)?;
    Ok(mapping)
}

fn check_required_sections(mapping: &InputMapping, span: Span) -> SyntaxResult<()> {
    if mapping.section(SectionKind::Read.as_str()).is_none() {
        return Err(SyntaxError::MissingSection {
            requirement: "at least one READ section".to_string(),
            span,
        });
    }

    let has_calculation = [SectionKind::Elec, SectionKind::Apolar]
        .iter()
        .any(|kind| mapping.section(kind.as_str()).is_some());
    if !has_calculation {
        return Err(SyntaxError::MissingSection {
            requirement: "at least one ELEC or APOLAR section".to_string(),
            span,
        });
    }

    Ok(())
}

/// Parse the body of a section whose keyword has already been consumed
pub fn parse_section_body(parser: &mut dyn Parser, kind: SectionKind) -> SyntaxResult<Directives> {
    match kind {
        SectionKind::Read => parse_read_section(parser),
        SectionKind::Elec | SectionKind::Apolar => parse_keyword_section(parser, kind),
        SectionKind::Print => parse_print_section(parser),
    }
}

fn unexpected(parser: &dyn Parser, expected: &str) -> SyntaxError {
    let found = parser
        .current_token()
        .map_or_else(|| "end of input".to_string(), Token::describe);
    SyntaxError::unexpected_token(expected, &found, parser.current_span())
}

fn check_directive_limit(count: usize, section: SectionKind, span: Span) -> SyntaxResult<()> {
    if count >= MAX_DIRECTIVES_PER_SECTION {
        return Err(SyntaxError::TooManySections {
            what: format!("directives in {} section", section),
            limit: MAX_DIRECTIVES_PER_SECTION,
            span,
        });
    }
    Ok(())
}

/// `READ (<directive> <format> <path>+)+ END`
///
/// Every READ directive may repeat; paths accumulate under
/// `{directive: {format: [...]}}`.
pub fn parse_read_section(parser: &mut dyn Parser) -> SyntaxResult<Directives> {
    let mut directives = Directives::new();
    let mut count = 0;

    loop {
        let span = parser.current_span();
        let word = parser.current_keyword();

        match word.as_deref() {
            Some(END) => {
                parser.advance();
                break;
            }
            Some(w) if is_structural(w) => {
                return Err(SyntaxError::missing_end(SectionKind::Read.as_str(), span));
            }
            None if parser.at_end_of_input() => {
                return Err(SyntaxError::missing_end(SectionKind::Read.as_str(), span));
            }
            _ => {}
        }

        let Some(spec) = word.as_deref().and_then(read_directive) else {
            let keywords: Vec<&str> = READ_DIRECTIVES.iter().map(|s| s.keyword).collect();
            return Err(unexpected(
                parser,
                &format!("READ directive ({}) or END", keywords.join(", ")),
            ));
        };

        check_directive_limit(count, SectionKind::Read, span)?;
        parser.advance();

        let format = parse_choice(parser, spec.keyword, spec.formats)?;
        let value = if spec.arity == 1 {
            parse_path(parser)?
        } else {
            let mut paths = Vec::with_capacity(spec.arity);
            for _ in 0..spec.arity {
                paths.push(parse_path(parser)?);
            }
            Value::List(paths)
        };

        let formats = directives
            .entry(spec.keyword.to_string())
            .or_insert_with(|| Value::Record(BTreeMap::new()));
        if let Value::Record(formats) = formats {
            let paths = formats
                .entry(format.to_string())
                .or_insert_with(|| Value::List(Vec::new()));
            if let Value::List(paths) = paths {
                paths.push(value);
            }
        }
        count += 1;
    }

    if directives.is_empty() {
        return Err(SyntaxError::missing_required(
            SectionKind::Read.as_str(),
            "mol",
            parser.current_span(),
        ));
    }

    Ok(directives)
}

/// Membership check for ELEC directives against the calculation type
struct VariantGate {
    variant: Option<ElecVariant>,
    /// Keys seen before the type keyword, with their spans
    pending: Vec<(String, Span)>,
}

impl VariantGate {
    fn new() -> Self {
        Self {
            variant: None,
            pending: Vec::new(),
        }
    }

    fn admit(&mut self, key: &str, span: Span) -> SyntaxResult<()> {
        match self.variant {
            Some(variant) if !variant.allows(key) => {
                Err(SyntaxError::not_allowed(key, variant.as_str(), span))
            }
            Some(_) => Ok(()),
            None => {
                self.pending.push((key.to_string(), span));
                Ok(())
            }
        }
    }

    fn set_variant(&mut self, variant: ElecVariant) -> SyntaxResult<()> {
        self.variant = Some(variant);
        for (key, span) in std::mem::take(&mut self.pending) {
            if !variant.allows(&key) {
                return Err(SyntaxError::not_allowed(&key, variant.as_str(), span));
            }
        }
        Ok(())
    }
}

/// Recognise a calculation type keyword, rewriting deprecated spellings
fn calculation_type(parser: &mut dyn Parser, word: &str, span: Span) -> Option<ElecVariant> {
    if let Some(variant) = ElecVariant::from_keyword(word) {
        return Some(variant);
    }
    let replacement = deprecated_type(word)?;
    let variant = ElecVariant::from_keyword(replacement)?;
    parser.report_deprecation(word, replacement, span);
    Some(variant)
}

/// `ELEC ... END` and `APOLAR ... END`: an unordered set of directives.
///
/// ELEC additionally takes a calculation type keyword stored under `type`
/// and an equation keyword stored under `pbe`. The type may appear anywhere
/// in the section; directives are checked against it as soon as both are
/// known.
pub fn parse_keyword_section(
    parser: &mut dyn Parser,
    kind: SectionKind,
) -> SyntaxResult<Directives> {
    let mut directives = Directives::new();
    let mut gate = VariantGate::new();
    let mut count = 0;
    let section = kind.as_str();

    loop {
        let span = parser.current_span();

        let Some(word) = parser.current_keyword() else {
            if parser.at_end_of_input() {
                return Err(SyntaxError::missing_end(section, span));
            }
            return Err(unexpected(parser, &format!("{} directive or END", section)));
        };

        if word == END {
            parser.advance();
            break;
        }
        if is_structural(&word) {
            return Err(SyntaxError::missing_end(section, span));
        }

        check_directive_limit(count, kind, span)?;
        count += 1;

        if kind == SectionKind::Elec {
            if let Some(variant) = calculation_type(parser, &word, span) {
                if directives.contains_key(TYPE_KEY) {
                    return Err(SyntaxError::duplicate_directive(TYPE_KEY, span));
                }
                parser.advance();
                directives.insert(TYPE_KEY.to_string(), Value::from(variant.as_str()));
                gate.set_variant(variant)?;
                continue;
            }

            if is_equation(&word) {
                if directives.contains_key(EQUATION_KEY) {
                    return Err(SyntaxError::duplicate_directive(EQUATION_KEY, span));
                }
                gate.admit(EQUATION_KEY, span)?;
                parser.advance();
                directives.insert(EQUATION_KEY.to_string(), Value::Text(word));
                continue;
            }
        }

        let Some(spec) = directive_for(kind, &word) else {
            return Err(unexpected(parser, &format!("{} directive or END", section)));
        };

        if !spec.repeatable && directives.contains_key(spec.keyword) {
            return Err(SyntaxError::duplicate_directive(spec.keyword, span));
        }
        if kind == SectionKind::Elec {
            gate.admit(spec.keyword, span)?;
        }

        parser.advance();
        let value = parse_payload(parser, spec)?;

        if spec.repeatable {
            let occurrences = directives
                .entry(spec.keyword.to_string())
                .or_insert_with(|| Value::Indexed(BTreeMap::new()));
            if let Value::Indexed(occurrences) = occurrences {
                Value::push_indexed(occurrences, value);
            }
        } else {
            directives.insert(spec.keyword.to_string(), value);
        }
    }

    if kind == SectionKind::Elec && !directives.contains_key(TYPE_KEY) {
        return Err(SyntaxError::missing_required(
            section,
            TYPE_KEY,
            parser.current_span(),
        ));
    }

    Ok(directives)
}

/// `PRINT <kind> <alias> ((+|-) <alias>)* END`
///
/// The expression is stored as a flat list with the operators kept as
/// `"+"`/`"-"` text.
pub fn parse_print_section(parser: &mut dyn Parser) -> SyntaxResult<Directives> {
    let span = parser.current_span();
    let kind = match parser.current_keyword() {
        Some(word) if PRINT_KINDS.contains(&word.as_str()) => word,
        Some(word) if !is_structural(&word) => {
            return Err(SyntaxError::invalid_choice("PRINT", &word, PRINT_KINDS, span));
        }
        _ if parser.at_end_of_input() => {
            return Err(SyntaxError::unexpected_end_of_input("PRINT kind", span));
        }
        _ => {
            let expected = format!("one of {}", PRINT_KINDS.join(", "));
            return Err(unexpected(parser, &expected));
        }
    };
    parser.advance();

    let mut terms = vec![parse_identifier(parser)?];

    loop {
        let operator = match parser.current_token() {
            Some(Token::Plus) => "+",
            Some(Token::Minus) => "-",
            _ => break,
        };
        parser.advance();
        terms.push(Value::from(operator));
        terms.push(parse_identifier(parser)?);
    }

    if parser.at_end_of_input() {
        return Err(SyntaxError::missing_end(
            SectionKind::Print.as_str(),
            parser.current_span(),
        ));
    }
    if !parser.at_keyword(END) {
        return Err(unexpected(parser, "'+', '-' or END"));
    }
    expect_keyword(parser, END)?;

    let mut directives = Directives::new();
    directives.insert(kind, Value::List(terms));
    Ok(directives)
}

#[cfg(test)]
mod tests {
    use super::super::atomic::testing::StreamParser;
    use super::*;
    use assert_matches::assert_matches;

    fn section(kind: SectionKind, body: &str) -> SyntaxResult<Directives> {
        let mut p = StreamParser::new(body);
        parse_section_body(&mut p, kind)
    }

    #[test]
    fn test_read_accumulates_by_directive_and_format() {
        let read = section(
            SectionKind::Read,
            "mol pqr A.pqr mol PQR b.pqr parm flat parm.dat diel dx x.dx y.dx z.dx END",
        )
        .unwrap();
        assert_eq!(read["mol"].to_string(), "pqr A.pqr b.pqr");
        assert_eq!(
            read["diel"].get("dx"),
            Some(&Value::List(vec![Value::List(vec![
                Value::from("x.dx"),
                Value::from("y.dx"),
                Value::from("z.dx"),
            ])]))
        );
        assert!(read.contains_key("parm"));
    }

    #[test]
    fn test_read_errors() {
        assert_matches!(
            section(SectionKind::Read, "END"),
            Err(SyntaxError::MissingRequiredDirective { .. })
        );
        assert_matches!(
            section(SectionKind::Read, "mol pqr a.pqr ELEC"),
            Err(SyntaxError::MissingEnd { .. })
        );
        assert_matches!(
            section(SectionKind::Read, "mol xyz a.xyz END"),
            Err(SyntaxError::InvalidChoice { .. })
        );
        assert_matches!(
            section(SectionKind::Read, "molecule pqr a.pqr END"),
            Err(SyntaxError::UnexpectedToken { .. })
        );
    }

    #[test]
    fn test_elec_directives_in_any_order() {
        let a = section(SectionKind::Elec, "mg-auto lpbe pdie 2.0 sdie 78.4 END").unwrap();
        let b = section(SectionKind::Elec, "sdie 78.4 pdie 2.0 LPBE MG-AUTO END").unwrap();
        assert_eq!(a, b);
        assert_eq!(a[TYPE_KEY], Value::from("mg-auto"));
        assert_eq!(a[EQUATION_KEY], Value::from("lpbe"));
    }

    #[test]
    fn test_elec_repeatable_directives_are_indexed() {
        let elec = section(
            SectionKind::Elec,
            "mg-auto write pot dx a write charge dx b END",
        )
        .unwrap();
        let writes = elec["write"].as_indexed().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[&1].to_string(), "charge dx b");
    }

    #[test]
    fn test_elec_cardinality_and_membership() {
        assert_matches!(
            section(SectionKind::Elec, "mg-auto pdie 2 pdie 3 END"),
            Err(SyntaxError::DuplicateDirective { ref directive, .. }) if directive == "pdie"
        );
        assert_matches!(
            section(SectionKind::Elec, "mg-auto tabi END"),
            Err(SyntaxError::DuplicateDirective { ref directive, .. }) if directive == "type"
        );
        assert_matches!(
            section(SectionKind::Elec, "mg-auto mac 0.5 END"),
            Err(SyntaxError::DirectiveNotAllowed { ref directive, .. }) if directive == "mac"
        );
        assert_matches!(
            section(SectionKind::Elec, "ntraj 3 mg-manual END"),
            Err(SyntaxError::DirectiveNotAllowed { ref directive, .. }) if directive == "ntraj"
        );
        assert_matches!(
            section(SectionKind::Elec, "pdie 2 END"),
            Err(SyntaxError::MissingRequiredDirective { ref directive, .. }) if directive == "type"
        );
        assert_matches!(
            section(SectionKind::Elec, "mg-auto pdie 2"),
            Err(SyntaxError::MissingEnd { .. })
        );
    }

    #[test]
    fn test_deprecated_type_is_rewritten() {
        let mut p = StreamParser::new("pbam randorient END");
        let elec = parse_section_body(&mut p, SectionKind::Elec).unwrap();
        assert_eq!(elec[TYPE_KEY], Value::from("pbam-auto"));
        assert_eq!(elec["randorient"], Value::Integer(1));
        assert_eq!(p.deprecations, vec![("pbam".to_string(), "pbam-auto".to_string())]);
    }

    #[test]
    fn test_apolar_has_no_type() {
        let apolar = section(SectionKind::Apolar, "name np srfm sacc dpos 0.2 END").unwrap();
        assert_eq!(apolar["name"], Value::from("np"));
        assert!(!apolar.contains_key(TYPE_KEY));
        assert_matches!(
            section(SectionKind::Apolar, "mg-auto END"),
            Err(SyntaxError::UnexpectedToken { .. })
        );
    }

    #[test]
    fn test_print_expression() {
        let print = section(SectionKind::Print, "elecEnergy complex - mol2 - mol1 END").unwrap();
        assert_eq!(print["elecenergy"].to_string(), "complex - mol2 - mol1");
        assert_matches!(
            section(SectionKind::Print, "energy a END"),
            Err(SyntaxError::InvalidChoice { .. })
        );
        assert_matches!(
            section(SectionKind::Print, "elecenergy a b END"),
            Err(SyntaxError::UnexpectedToken { .. })
        );
        assert_matches!(
            section(SectionKind::Print, "elecenergy a +"),
            Err(SyntaxError::UnexpectedEndOfInput { .. })
        );
    }

    #[test]
    fn test_input_requires_quit_and_sections() {
        let mut p = StreamParser::new("READ mol pqr a.pqr END");
        assert_matches!(parse_input(&mut p), Err(SyntaxError::MissingQuit { .. }));

        let mut p = StreamParser::new("READ mol pqr a.pqr END QUIT");
        assert_matches!(parse_input(&mut p), Err(SyntaxError::MissingSection { .. }));

        let mut p = StreamParser::new("ELEC mg-auto END QUIT");
        assert_matches!(parse_input(&mut p), Err(SyntaxError::MissingSection { .. }));

        let mut p = StreamParser::new("READ mol pqr a.pqr END bogus QUIT");
        assert_matches!(parse_input(&mut p), Err(SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_input_ignores_text_after_quit() {
        let mut p = StreamParser::new("READ mol pqr a.pqr END APOLAR END QUIT trailing words");
        let mapping = parse_input(&mut p).unwrap();
        assert_eq!(mapping.total_sections(), 2);
    }
}
