use std::io::Write;
use log::{debug, info};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::emitter::{dump_scope, render, DumpOptions, Statement};
use crate::error::{Diagnostic, Result};
use crate::netlist::{Device, DeviceKind, Scope};
use crate::parser::{classify, LineKind};
use crate::preprocess::logical_lines;
use crate::units::parse_value;

/// What to do with a `.SUBCKT` that appears before the open one is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestedPolicy {
    /// Close the open subcircuit first, then open the new one
    #[default]
    Flatten,
    /// Drop the nested `.SUBCKT` line; its body lands in the open subcircuit
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct ConverterConfig {
    pub nested_subcircuits: NestedPolicy,
    pub prune_single_terminal_nets: bool,
}

/// Result of converting one netlist: the output statements and every
/// diagnostic raised along the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Translation {
    pub statements: Vec<Statement>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Translation {
    /// The converted netlist as text
    pub fn to_netlist(&self) -> String {
        render(&self.statements)
    }

    /// Write the converted netlist in the requested format
    pub fn export<W: Write>(&self, out: W, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Netlist => self.export_netlist(out),
            OutputFormat::Json => self.export_json(out),
        }
    }

    fn export_netlist<W: Write>(&self, mut out: W) -> Result<()> {
        for statement in &self.statements {
            writeln!(out, "{}", statement)?;
        }
        out.flush()?;
        Ok(())
    }

    fn export_json<W: Write>(&self, mut out: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut out, self)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

/// SPICE to netlist converter
pub struct Converter {
    config: ConverterConfig,
    scope: Scope,
    /// Top-level scope held aside while a subcircuit is open
    suspended: Option<Scope>,
    statements: Vec<Statement>,
    diagnostics: Vec<Diagnostic>,
}

impl Converter {
    /// Create a new converter with default configuration
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    /// Create a new converter with custom configuration
    pub fn with_config(config: ConverterConfig) -> Self {
        Converter {
            config,
            scope: Scope::top_level(),
            suspended: None,
            statements: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Convert a whole netlist buffer.
    ///
    /// Never fails: problems with individual lines end up in
    /// [`Translation::diagnostics`] and the rest of the input is still
    /// converted.
    pub fn convert(&mut self, content: &str) -> Translation {
        self.scope = Scope::top_level();
        self.suspended = None;

        let mut line_count = 0;
        for line in logical_lines(content) {
            self.process_line(&line);
            line_count += 1;
        }
        self.finish();

        let translation = Translation {
            statements: std::mem::take(&mut self.statements),
            diagnostics: std::mem::take(&mut self.diagnostics),
        };
        info!(
            "Converted {} lines into {} statements ({} diagnostics)",
            line_count,
            translation.statements.len(),
            translation.diagnostics.len()
        );
        translation
    }

    /// Diagnostics reach the user through [`Translation::diagnostics`]; the
    /// log only traces them.
    fn report(&mut self, diagnostic: Diagnostic) {
        debug!("Diagnostic: {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn process_line(&mut self, line: &str) {
        let result = match classify(line) {
            Ok(Some(kind)) => {
                debug!("{:?}", kind);
                self.apply(line, kind)
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            self.report(Diagnostic::malformed(line, &e));
        }
    }

    /// Values are parsed before anything is added, so a failing line leaves
    /// the scope untouched.
    fn apply(&mut self, line: &str, kind: LineKind<'_>) -> Result<()> {
        match kind {
            LineKind::Comment(text) => {
                self.statements.push(Statement::Comment { text: text.to_string() });
            }
            LineKind::Directive => {
                self.statements.push(Statement::Comment { text: line.to_string() });
            }
            LineKind::Ignored { name } => {
                self.statements.push(Statement::Ignored {
                    name: name.to_string(),
                    line: line.to_string(),
                });
            }
            LineKind::Subckt { name, pins } => {
                self.open_subcircuit(name, pins.into_iter().map(String::from).collect());
            }
            LineKind::Ends => self.close_subcircuit(),
            LineKind::Resistor { name, pos, neg, value } => {
                let value = parse_value(value, &mut self.diagnostics)?;
                self.scope.add_device(Device::with_value(DeviceKind::Resistor, name.to_string(), value));
                self.scope.bind(pos, name, "1");
                self.scope.bind(neg, name, "2");
            }
            LineKind::Capacitor { name, pos, neg, value } => {
                let value = parse_value(value, &mut self.diagnostics)?;
                self.scope.add_device(Device::with_value(DeviceKind::Capacitor, name.to_string(), value));
                self.scope.bind(pos, name, "1");
                self.scope.bind(neg, name, "2");
            }
            LineKind::Diode { name, anode, cathode, model } => {
                // diode models are names, not values
                self.scope.add_device(Device::with_model(DeviceKind::Diode, name.to_string(), model.to_string()));
                self.scope.bind(anode, name, "A");
                self.scope.bind(cathode, name, "K");
            }
            LineKind::Bjt { name, collector, base, emitter, model } => {
                self.scope.add_device(Device::with_model(DeviceKind::Bjt, name.to_string(), model.to_string()));
                self.scope.bind(collector, name, "C");
                self.scope.bind(base, name, "B");
                self.scope.bind(emitter, name, "E");
            }
            LineKind::GroundedSource { name, node, value } => {
                let value = parse_value(value, &mut self.diagnostics)?;
                self.scope.add_device(Device::with_value(DeviceKind::AnalogInput, name.to_string(), value));
                self.scope.bind(node, name, "Q");
            }
            LineKind::UngroundedSource { name } => {
                self.report(Diagnostic::UngroundedSource { name: name.to_string() });
            }
            LineKind::Dip { name, nets, package } => {
                let kind = DeviceKind::TtlDip { package: package.to_string() };
                self.scope.add_device(Device::bare(kind, name.to_string()));
                for (i, net) in nets.iter().enumerate() {
                    self.scope.bind(net, name, &(i + 1).to_string());
                }
            }
        }
        Ok(())
    }

    fn open_subcircuit(&mut self, name: &str, pins: Vec<String>) {
        if let Some(open) = self.scope.name.clone() {
            self.report(Diagnostic::NestedSubcircuit {
                open,
                name: name.to_string(),
            });
            match self.config.nested_subcircuits {
                NestedPolicy::Flatten => self.close_subcircuit(),
                NestedPolicy::Reject => return,
            }
        }

        info!("Opening subcircuit {}", name);
        self.statements.push(Statement::NetlistStart { name: name.to_string() });
        let top = std::mem::replace(&mut self.scope, Scope::subcircuit(name.to_string(), pins));
        self.suspended = Some(top);
    }

    fn close_subcircuit(&mut self) {
        if !self.scope.is_subcircuit() {
            self.report(Diagnostic::UnmatchedEnds);
        }

        let next = self.suspended.take().unwrap_or_else(Scope::top_level);
        let scope = std::mem::replace(&mut self.scope, next);
        self.emit_scope(scope);
        self.statements.push(Statement::NetlistEnd);
    }

    fn finish(&mut self) {
        if let Some(name) = self.scope.name.clone() {
            self.report(Diagnostic::UnterminatedSubcircuit { name });
            self.close_subcircuit();
        }

        let scope = std::mem::take(&mut self.scope);
        self.emit_scope(scope);
    }

    fn emit_scope(&mut self, scope: Scope) {
        if scope.is_empty() {
            return;
        }
        scope.log_summary();
        let options = DumpOptions {
            prune_single_terminal_nets: self.config.prune_single_terminal_nets,
        };
        let statements = dump_scope(scope, options, &mut self.diagnostics);
        self.statements.extend(statements);
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a netlist buffer with the default configuration.
pub fn convert(content: &str) -> Translation {
    Converter::new().convert(content)
}
