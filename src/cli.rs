use clap::ArgMatches;
use anyhow::{anyhow, Context, Result};
use colored::*;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};

use crate::converter::{ConverterConfig, NestedPolicy};
use crate::error::Diagnostic;

/// Input path meaning "read standard input"
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub input_file: String,
    pub output_file: Option<String>,
    pub output_format: OutputFormat,
    pub config: ConverterConfig,
    pub verbose_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Netlist,
    Json,
}

impl CliArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let input_file = matches
            .get_one::<String>("file")
            .cloned()
            .unwrap_or_else(|| STDIN_PATH.to_string());

        let output_file = matches.get_one::<String>("output").cloned();

        let verbose_level = matches.get_count("verbose");

        let output_format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("nl") | None => OutputFormat::Netlist,
            Some("json") => OutputFormat::Json,
            Some(other) => return Err(anyhow!("Invalid output format: {}", other)),
        };

        let nested_subcircuits = match matches.get_one::<String>("nested").map(String::as_str) {
            Some("flatten") | None => NestedPolicy::Flatten,
            Some("reject") => NestedPolicy::Reject,
            Some(other) => return Err(anyhow!("Invalid nested subcircuit policy: {}", other)),
        };

        let config = ConverterConfig {
            nested_subcircuits,
            prune_single_terminal_nets: matches.get_flag("prune-single-nets"),
        };

        Ok(CliArgs {
            input_file,
            output_file,
            output_format,
            config,
            verbose_level,
        })
    }
}

/// Default log filter for a `-v` count
pub fn log_level(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Read the whole netlist into one buffer, from a file or from stdin (`-`)
pub fn read_input(path: &str) -> Result<String> {
    if path == STDIN_PATH {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read netlist from stdin")?;
        return Ok(content);
    }

    fs::read_to_string(path).map_err(|e| anyhow!("Failed to read file '{}': {}", path, e))
}

/// Output sink: the named file, or stdout
pub fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| anyhow!("Failed to create output file '{}': {}", path, e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Print each diagnostic once, one line apiece
pub fn write_diagnostics<W: Write>(mut out: W, diagnostics: &[Diagnostic]) -> Result<()> {
    for diagnostic in diagnostics {
        writeln!(out, "{}", diagnostic.to_string().yellow())?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::convert;

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(2), "debug");
        assert_eq!(log_level(9), "trace");
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "R1 1 0 4.7K").unwrap();

        let content = read_input(file.path().to_str().unwrap()).unwrap();
        assert_eq!(content, "R1 1 0 4.7K\n");
    }

    #[test]
    fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.cir");
        let err = read_input(missing.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_open_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nl");
        {
            let mut out = open_output(path.to_str()).unwrap();
            writeln!(out, "NET_C(R1.1, C1.1)").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "NET_C(R1.1, C1.1)\n");
    }

    #[test]
    fn test_each_diagnostic_is_one_line() {
        let translation = convert("V1 5 1 10\nR1 1 0 10Q\n");
        let mut out = Vec::new();
        write_diagnostics(&mut out, &translation.diagnostics).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.iter().filter(|line| line.contains("V1")).count(), 1);
        assert!(lines[0].contains("Voltage Source V1 not connected to GND"));
        assert!(lines[1].contains("Unit Q unknown"));
    }
}
