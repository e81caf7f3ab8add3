//! Canonical mapping back to legacy input text
//!
//! Sections come out in the order they were decoded. Inside a section the
//! calculation type and equation lead, the other directives follow in key
//! order, and each occurrence of a repeatable directive gets its own line.

use crate::grammar::keywords::{
    directive_for, Payload, SectionKind, EQUATION_KEY, NAME_KEY, TYPE_KEY,
};
use crate::logging::codes;
use crate::log_success;
use crate::mapping::{Directives, InputMapping, Value};

const INDENT: &str = "    ";

pub fn emit(mapping: &InputMapping) -> String {
    let mut lines = Vec::new();

    for (name, _, directives) in mapping.iter_in_order() {
        match SectionKind::from_word(name) {
            Some(SectionKind::Read) => emit_read(directives, &mut lines),
            Some(kind @ (SectionKind::Elec | SectionKind::Apolar)) => {
                emit_keyword_section(kind, directives, &mut lines)
            }
            Some(SectionKind::Print) => emit_print(directives, &mut lines),
            None => continue,
        }
    }
    lines.push("QUIT".to_string());

    log_success!(codes::success::EMIT_COMPLETE, "Legacy input emitted",
        "sections" => mapping.total_sections(),
        "lines" => lines.len()
    );

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn emit_read(directives: &Directives, lines: &mut Vec<String>) {
    lines.push(SectionKind::Read.as_str().to_string());
    for (keyword, formats) in directives {
        let Some(formats) = formats.as_record() else {
            lines.push(format!("{}{} {}", INDENT, keyword, formats));
            continue;
        };
        for (format, values) in formats {
            match values {
                Value::List(values) => {
                    for value in values {
                        lines.push(format!("{}{} {} {}", INDENT, keyword, format, value));
                    }
                }
                value => lines.push(format!("{}{} {} {}", INDENT, keyword, format, value)),
            }
        }
    }
    lines.push("END".to_string());
}

fn is_flag(kind: SectionKind, keyword: &str) -> bool {
    directive_for(kind, keyword).map_or(false, |spec| spec.payload == Payload::Flag)
}

fn directive_line(kind: SectionKind, keyword: &str, value: &Value) -> String {
    if is_flag(kind, keyword) {
        format!("{}{}", INDENT, keyword)
    } else {
        format!("{}{} {}", INDENT, keyword, value)
    }
}

fn emit_keyword_section(kind: SectionKind, directives: &Directives, lines: &mut Vec<String>) {
    match directives.get(NAME_KEY) {
        Some(name) => lines.push(format!("{} {} {}", kind, NAME_KEY, name)),
        None => lines.push(kind.as_str().to_string()),
    }

    for key in [TYPE_KEY, EQUATION_KEY] {
        if let Some(value) = directives.get(key) {
            lines.push(format!("{}{}", INDENT, value));
        }
    }

    let rest = directives
        .iter()
        .filter(|(key, _)| ![NAME_KEY, TYPE_KEY, EQUATION_KEY].contains(&key.as_str()));
    for (keyword, value) in rest {
        match value {
            Value::Indexed(occurrences) => {
                for occurrence in occurrences.values() {
                    lines.push(directive_line(kind, keyword, occurrence));
                }
            }
            value => lines.push(directive_line(kind, keyword, value)),
        }
    }

    lines.push("END".to_string());
}

fn emit_print(directives: &Directives, lines: &mut Vec<String>) {
    for (kind, expression) in directives {
        lines.push(format!("{} {} {} END", SectionKind::Print, kind, expression));
    }
}
