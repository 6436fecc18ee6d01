use crate::error::{ConvertError, Result};
use crate::netlist::GROUND_NET;

/// A classified logical line, with every field the conversion needs already
/// pulled out of the token list.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    /// `*` or `;` line; the text after the marker
    Comment(&'a str),
    Subckt { name: &'a str, pins: Vec<&'a str> },
    Ends,
    /// Any other `.` directive
    Directive,
    Resistor { name: &'a str, pos: &'a str, neg: &'a str, value: &'a str },
    Capacitor { name: &'a str, pos: &'a str, neg: &'a str, value: &'a str },
    Diode { name: &'a str, anode: &'a str, cathode: &'a str, model: &'a str },
    Bjt { name: &'a str, collector: &'a str, base: &'a str, emitter: &'a str, model: &'a str },
    /// Voltage source with its negative side on net `0`
    GroundedSource { name: &'a str, node: &'a str, value: &'a str },
    UngroundedSource { name: &'a str },
    /// `X` instance from a schematic-capture export: nets, then the package
    Dip { name: &'a str, nets: Vec<&'a str>, package: &'a str },
    Ignored { name: &'a str },
}

/// Decide whether field 4 of a `Q` line is a substrate net rather than the
/// model. Numeric nets (including `0`) and `N`-prefixed nets as written by
/// LTspice count as nets, but only if a model follows them.
pub fn has_fourth_terminal(field: &str, token_count: usize) -> bool {
    (field.parse::<i64>().is_ok() || field.starts_with('N')) && token_count > 5
}

fn field<'a>(tokens: &[&'a str], index: usize) -> Result<&'a str> {
    tokens.get(index).copied().ok_or_else(|| ConvertError::MissingField {
        device: tokens.first().copied().unwrap_or_default().to_string(),
        index,
    })
}

/// Classify a trimmed, upper-cased logical line. Empty lines yield `None`.
pub fn classify(line: &str) -> Result<Option<LineKind<'_>>> {
    let line = line.trim();
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&name) = tokens.first() else {
        return Ok(None);
    };

    let kind = match name.chars().next() {
        Some(';') | Some('*') => LineKind::Comment(&line[1..]),
        Some('.') => match name {
            ".SUBCKT" => LineKind::Subckt {
                name: field(&tokens, 1)?,
                pins: tokens[2..].to_vec(),
            },
            ".ENDS" => LineKind::Ends,
            _ => LineKind::Directive,
        },
        Some('R') => LineKind::Resistor {
            name,
            pos: field(&tokens, 1)?,
            neg: field(&tokens, 2)?,
            value: field(&tokens, 3)?,
        },
        Some('C') => LineKind::Capacitor {
            name,
            pos: field(&tokens, 1)?,
            neg: field(&tokens, 2)?,
            value: field(&tokens, 3)?,
        },
        Some('D') => LineKind::Diode {
            name,
            anode: field(&tokens, 1)?,
            cathode: field(&tokens, 2)?,
            model: field(&tokens, 3)?,
        },
        Some('Q') => {
            let fourth = field(&tokens, 4)?;
            let model = if has_fourth_terminal(fourth, tokens.len()) {
                field(&tokens, 5)?
            } else {
                fourth
            };
            LineKind::Bjt {
                name,
                collector: field(&tokens, 1)?,
                base: field(&tokens, 2)?,
                emitter: field(&tokens, 3)?,
                model,
            }
        }
        Some('V') => {
            let node = field(&tokens, 1)?;
            if field(&tokens, 2)? == GROUND_NET {
                let mut index = 3;
                if field(&tokens, index)? == "DC" {
                    index += 1;
                }
                LineKind::GroundedSource { name, node, value: field(&tokens, index)? }
            } else {
                LineKind::UngroundedSource { name }
            }
        }
        Some('X') => {
            // the last token is the package, not a net
            field(&tokens, 1)?;
            let last = tokens.len() - 1;
            LineKind::Dip {
                name,
                nets: tokens[1..last].to_vec(),
                package: tokens[last],
            }
        }
        _ => LineKind::Ignored { name },
    };

    Ok(Some(kind))
}
