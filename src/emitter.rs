use std::fmt;
use log::debug;
use serde::Serialize;

use crate::error::Diagnostic;
use crate::netlist::{DeviceParam, Scope};
use crate::units::format_value;

/// One line of output in the target netlist language.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    Comment { text: String },
    Ignored { name: String, line: String },
    NetlistStart { name: String },
    NetlistEnd,
    Alias { alias: String, terminal: String },
    Device { tag: String, name: String, param: DeviceParam },
    NetC { terminals: Vec<String> },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Comment { text } => write!(f, "// {}", text),
            Statement::Ignored { name, line } => write!(f, "// IGNORED {}: {}", name, line),
            Statement::NetlistStart { name } => write!(f, "NETLIST_START({})", name),
            Statement::NetlistEnd => write!(f, "NETLIST_END()"),
            Statement::Alias { alias, terminal } => write!(f, "ALIAS({}, {})", alias, terminal),
            Statement::Device { tag, name, param } => match param {
                DeviceParam::Value(value) => write!(f, "{}({}, {})", tag, name, format_value(*value)),
                DeviceParam::Model(model) => write!(f, "{}({}, \"{}\")", tag, name, model),
                DeviceParam::None => write!(f, "{}({})", tag, name),
            },
            Statement::NetC { terminals } => write!(f, "NET_C({})", terminals.join(", ")),
        }
    }
}

/// Options for dumping a scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpOptions {
    /// Leave out nets with at most one terminal
    pub prune_single_terminal_nets: bool,
}

/// Turn a finished scope into statements: aliases, then devices, then nets.
///
/// An alias binds to the first terminal recorded on its net. If that is the
/// only terminal, the net is not emitted again as `NET_C`. A ground net that
/// still holds nothing but `GND` is never emitted.
pub fn dump_scope(
    mut scope: Scope,
    options: DumpOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Statement> {
    let mut statements = Vec::new();

    for alias in &scope.aliases {
        let terminal = scope.nets.get_mut(alias).and_then(|net| {
            let terminal = net.first_terminal()?.to_string();
            if net.terminals.len() == 1 {
                net.no_export = true;
            }
            Some(terminal)
        });

        match terminal {
            Some(terminal) => {
                statements.push(Statement::Alias { alias: alias.clone(), terminal });
            }
            None => {
                debug!("Pin {} is not connected", alias);
                diagnostics.push(Diagnostic::UnconnectedPin { alias: alias.clone() });
            }
        }
    }

    for device in scope.devices.drain(..) {
        statements.push(Statement::Device {
            tag: device.kind.tag(),
            name: device.name,
            param: device.param,
        });
    }

    for net in scope.nets.iter() {
        if net.no_export || net.terminals.is_empty() || net.is_bare_ground() {
            continue;
        }
        if options.prune_single_terminal_nets && net.terminals.len() <= 1 {
            debug!("Pruning single-terminal net {}", net.name);
            continue;
        }
        statements.push(Statement::NetC {
            terminals: net.terminals.clone(),
        });
    }

    statements
}

/// Render statements as netlist text, one per line.
pub fn render(statements: &[Statement]) -> String {
    let mut out = String::new();
    for statement in statements {
        out.push_str(&statement.to_string());
        out.push('\n');
    }
    out
}
