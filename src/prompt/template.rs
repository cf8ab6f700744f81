//! `{{KEY}}` placeholder interpolation

use std::collections::HashMap;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a template into literal text and placeholders.
///
/// Anything between braces that is not a valid name stays literal, as does
/// an opening `{{` without a matching `}}`.
fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };

        let name = &after_open[..end];
        if is_placeholder_name(name) {
            if start > 0 {
                out.push(Segment::Text(&rest[..start]));
            }
            out.push(Segment::Placeholder(name));
            rest = &after_open[end + CLOSE.len()..];
        } else {
            // Keep the first brace literal and rescan from the next one so
            // that "{{{NAME}}" still resolves NAME.
            out.push(Segment::Text(&rest[..start + 1]));
            rest = &rest[start + 1..];
        }
    }

    if !rest.is_empty() {
        out.push(Segment::Text(rest));
    }
    out
}

/// Replace every known `{{KEY}}` with its value.
///
/// Unknown keys are left in place. Substituted values are not rescanned.
pub fn interpolate(template: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());

    for segment in segments(template) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(name) => match values.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push_str(OPEN);
                    out.push_str(name);
                    out.push_str(CLOSE);
                }
            },
        }
    }

    out
}

/// Distinct placeholder names in order of first appearance
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for segment in segments(template) {
        if let Segment::Placeholder(name) = segment {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Placeholders of `template` that `values` does not cover
pub fn unresolved(template: &str, values: &HashMap<String, String>) -> Vec<String> {
    placeholders(template)
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect()
}
