use serde::Serialize;
use thiserror::Error;

/// Failures while converting a single logical line, or while writing output.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{device} is missing field {index}")]
    MissingField { device: String, index: usize },
    #[error("invalid number '{token}'")]
    InvalidNumber { token: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Non-fatal findings written to the error channel.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("Unit {unit} unknown")]
    UnknownUnit { unit: String },
    #[error("Voltage Source {name} not connected to GND")]
    UngroundedSource { name: String },
    #[error("Skipping line '{line}': {reason}")]
    MalformedLine { line: String, reason: String },
    #[error("Subcircuit {name} opened while {open} is still open")]
    NestedSubcircuit { open: String, name: String },
    #[error(".ENDS without matching .SUBCKT")]
    UnmatchedEnds,
    #[error("Subcircuit {name} not closed before end of input")]
    UnterminatedSubcircuit { name: String },
    #[error("Pin {alias} is not connected to anything")]
    UnconnectedPin { alias: String },
}

impl Diagnostic {
    /// Wrap a per-line failure so that translation can carry on.
    pub fn malformed(line: &str, err: &ConvertError) -> Self {
        Diagnostic::MalformedLine {
            line: line.to_string(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_messages() {
        let d = Diagnostic::UngroundedSource { name: "V1".to_string() };
        assert_eq!(d.to_string(), "Voltage Source V1 not connected to GND");

        let d = Diagnostic::UnknownUnit { unit: "X".to_string() };
        assert_eq!(d.to_string(), "Unit X unknown");
    }

    #[test]
    fn test_malformed_wraps_reason() {
        let err = ConvertError::MissingField { device: "R1".to_string(), index: 3 };
        let d = Diagnostic::malformed("R1 1 0", &err);
        assert_eq!(
            d,
            Diagnostic::MalformedLine {
                line: "R1 1 0".to_string(),
                reason: "R1 is missing field 3".to_string(),
            }
        );
    }

    #[test]
    fn test_diagnostic_json_is_tagged() {
        let d = Diagnostic::UngroundedSource { name: "V2".to_string() };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "ungrounded_source");
        assert_eq!(json["name"], "V2");
    }
}
