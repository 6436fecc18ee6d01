use lazy_static::lazy_static;
use nom::{combinator::all_consuming, number::complete::double};
use regex::Regex;
use log::debug;

use crate::error::{ConvertError, Diagnostic, Result};

lazy_static! {
    // Mantissa runs up to the last digit, everything after it is the unit suffix.
    static ref VALUE_PATTERN: Regex = Regex::new(r"(?s)^(.*?)([^0-9]*)$").unwrap();
}

/// SPICE engineering suffixes and their multipliers, in lookup order.
pub const SPICE_UNITS: &[(&str, f64)] = &[
    ("T", 1.0e12),
    ("G", 1.0e9),
    ("MEG", 1.0e6),
    ("K", 1.0e3),
    ("", 1.0),
    ("M", 1.0e-3),
    ("U", 1.0e-6),
    ("µ", 1.0e-6),
    ("N", 1.0e-9),
    ("P", 1.0e-12),
    ("F", 1.0e-15),
    ("MIL", 25.4e-6),
];

/// A scaled output form: values at or above `threshold` are divided by it
/// and wrapped in `prefix`/`suffix`.
#[derive(Debug, Clone, Copy)]
pub struct NlScale {
    pub threshold: f64,
    pub prefix: &'static str,
    pub suffix: &'static str,
}

/// Output constructors, largest threshold first.
pub const NL_SCALES: &[NlScale] = &[
    NlScale { threshold: 1.0e6, prefix: "RES_M(", suffix: ")" },
    NlScale { threshold: 1.0e3, prefix: "RES_K(", suffix: ")" },
    NlScale { threshold: 1.0, prefix: "", suffix: "" },
    NlScale { threshold: 1.0e-3, prefix: "CAP_M(", suffix: ")" },
    NlScale { threshold: 1.0e-6, prefix: "CAP_U(", suffix: ")" },
    NlScale { threshold: 1.0e-9, prefix: "CAP_N(", suffix: ")" },
    NlScale { threshold: 1.0e-12, prefix: "CAP_P(", suffix: ")" },
    NlScale { threshold: 1.0e-15, prefix: "", suffix: "e-15" },
];

/// Multiplier for a unit suffix, `None` if the suffix is unknown.
pub fn unit_multiplier(unit: &str) -> Option<f64> {
    SPICE_UNITS
        .iter()
        .find(|(suffix, _)| *suffix == unit)
        .map(|&(_, mult)| mult)
}

/// Split a value token into mantissa and unit suffix.
pub fn split_value(token: &str) -> (&str, &str) {
    match VALUE_PATTERN.captures(token) {
        Some(captures) => {
            let mantissa = captures.get(1).map_or("", |m| m.as_str());
            let unit = captures.get(2).map_or("", |m| m.as_str());
            (mantissa, unit)
        }
        None => (token, ""),
    }
}

/// Parse value with engineering suffix (e.g., 4.7K, 10U, 1.5MEG, 2MIL).
///
/// An unknown suffix is not fatal: it is reported in `diagnostics` and the
/// multiplier is taken as zero. A mantissa that is not a number is an error
/// for the line.
pub fn parse_value(token: &str, diagnostics: &mut Vec<Diagnostic>) -> Result<f64> {
    let (mantissa, unit) = split_value(token);

    let (_, value) = all_consuming(double::<&str, nom::error::Error<&str>>)(mantissa)
        .map_err(|_| ConvertError::InvalidNumber { token: token.to_string() })?;

    let multiplier = match unit_multiplier(unit) {
        Some(mult) => mult,
        None => {
            debug!("Unit {} unknown in value '{}'", unit, token);
            diagnostics.push(Diagnostic::UnknownUnit { unit: unit.to_string() });
            0.0
        }
    };

    Ok(value * multiplier)
}

/// Render a value with the largest output constructor that fits its magnitude.
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    match NL_SCALES.iter().find(|scale| scale.threshold <= magnitude) {
        Some(scale) => format!(
            "{}{}{}",
            scale.prefix,
            format_g(value / scale.threshold),
            scale.suffix
        ),
        None => format_g(value),
    }
}

/// Format like C's `%g`: six significant digits, trailing zeros removed,
/// exponent notation only for very large or very small magnitudes.
pub fn format_g(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let sci = format!("{:.5e}", value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (5 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
