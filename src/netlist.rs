use std::collections::{BTreeMap, HashMap};
use std::fmt;
use log::info;
use serde::{Deserialize, Serialize};

/// Name of the ground net in SPICE netlists.
pub const GROUND_NET: &str = "0";
/// Terminal every scope's ground net starts out with.
pub const GROUND_TERMINAL: &str = "GND";

/// Build a terminal identifier such as `R1.1` or `Q3.B`.
pub fn terminal_name(device: &str, pin: &str) -> String {
    format!("{}.{}", device, pin)
}

/// Represents a net: every terminal connected to it, in the order seen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    pub name: String,
    pub terminals: Vec<String>,
    pub no_export: bool,
}

impl Net {
    pub fn new(name: String) -> Self {
        Net {
            name,
            terminals: Vec::new(),
            no_export: false,
        }
    }

    pub fn is_ground(&self) -> bool {
        self.name == GROUND_NET
    }

    /// True if nothing but the pre-seeded `GND` terminal is on this net
    pub fn is_bare_ground(&self) -> bool {
        self.is_ground() && self.terminals.len() == 1 && self.terminals[0] == GROUND_TERMINAL
    }

    pub fn first_terminal(&self) -> Option<&str> {
        self.terminals.first().map(String::as_str)
    }
}

/// Stable index of a net inside its registry.
pub type NetId = usize;

/// Append-only net arena with a name index.
#[derive(Debug, Clone, Default)]
pub struct NetRegistry {
    nets: Vec<Net>,
    net_map: HashMap<String, NetId>,
}

impl NetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding net `0` with its `GND` terminal.
    pub fn with_ground() -> Self {
        let mut registry = Self::new();
        registry.add_terminal(GROUND_NET, GROUND_TERMINAL.to_string());
        registry
    }

    /// Add a net to the registry and return its ID; existing nets are reused
    pub fn ensure_net(&mut self, name: &str) -> NetId {
        if let Some(&existing_id) = self.net_map.get(name) {
            return existing_id;
        }

        let net_id = self.nets.len();
        self.nets.push(Net::new(name.to_string()));
        self.net_map.insert(name.to_string(), net_id);
        net_id
    }

    pub fn add_terminal(&mut self, net_name: &str, terminal: String) -> NetId {
        let net_id = self.ensure_net(net_name);
        self.nets[net_id].terminals.push(terminal);
        net_id
    }

    pub fn get(&self, name: &str) -> Option<&Net> {
        self.net_map.get(name).and_then(|&id| self.nets.get(id))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Net> {
        match self.net_map.get(name) {
            Some(&id) => self.nets.get_mut(id),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Net> {
        self.nets.iter()
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }
}

/// Types of devices the converter knows how to emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceKind {
    Resistor,
    Capacitor,
    Diode,
    Bjt,
    AnalogInput,
    /// A schematic-capture `X` instance; the package is the line's last token
    TtlDip { package: String },
}

impl DeviceKind {
    /// Device constructor name in the target netlist language
    pub fn tag(&self) -> String {
        match self {
            DeviceKind::Resistor => "RES".to_string(),
            DeviceKind::Capacitor => "CAP".to_string(),
            DeviceKind::Diode => "DIODE".to_string(),
            DeviceKind::Bjt => "QBJT".to_string(),
            DeviceKind::AnalogInput => "ANALOG_INPUT".to_string(),
            DeviceKind::TtlDip { package } => format!("TTL_{}_DIP", package),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// The single optional argument a device is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceParam {
    Value(f64),
    Model(String),
    None,
}

/// Device instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub kind: DeviceKind,
    pub param: DeviceParam,
}

impl Device {
    pub fn with_value(kind: DeviceKind, name: String, value: f64) -> Self {
        Device { name, kind, param: DeviceParam::Value(value) }
    }

    pub fn with_model(kind: DeviceKind, name: String, model: String) -> Self {
        let param = if model.is_empty() {
            DeviceParam::None
        } else {
            DeviceParam::Model(model)
        };
        Device { name, kind, param }
    }

    pub fn bare(kind: DeviceKind, name: String) -> Self {
        Device { name, kind, param: DeviceParam::None }
    }
}

/// Nets, devices and pin aliases collected between scope open and close.
#[derive(Debug, Clone)]
pub struct Scope {
    pub name: Option<String>,
    pub nets: NetRegistry,
    pub devices: Vec<Device>,
    pub aliases: Vec<String>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::top_level()
    }
}

impl Scope {
    pub fn top_level() -> Self {
        Scope {
            name: None,
            nets: NetRegistry::with_ground(),
            devices: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn subcircuit(name: String, pins: Vec<String>) -> Self {
        Scope {
            name: Some(name),
            aliases: pins,
            ..Self::top_level()
        }
    }

    pub fn is_subcircuit(&self) -> bool {
        self.name.is_some()
    }

    /// Connect `device.pin` to `net`
    pub fn bind(&mut self, net: &str, device: &str, pin: &str) {
        self.nets.add_terminal(net, terminal_name(device, pin));
    }

    pub fn add_device(&mut self, device: Device) {
        self.devices.push(device);
    }

    /// True if emitting this scope would produce nothing
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
            && self.aliases.is_empty()
            && self.nets.iter().all(|net| net.is_bare_ground() || net.terminals.is_empty())
    }

    pub fn log_summary(&self) {
        let label = self.name.as_deref().unwrap_or("<top>");
        info!(
            "Scope {}: {} devices, {} nets, {} aliases",
            label,
            self.devices.len(),
            self.nets.len(),
            self.aliases.len()
        );

        for (tag, count) in self.device_counts() {
            info!("  {}: {}", tag, count);
        }
    }

    /// Number of devices per constructor tag, ordered by tag
    pub fn device_counts(&self) -> BTreeMap<String, usize> {
        let mut type_counts = BTreeMap::new();
        for device in &self.devices {
            *type_counts.entry(device.kind.tag()).or_insert(0) += 1;
        }
        type_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_is_seeded() {
        let registry = NetRegistry::with_ground();
        let ground = registry.get(GROUND_NET).unwrap();
        assert_eq!(ground.terminals, vec!["GND"]);
        assert!(ground.is_bare_ground());
        assert!(NetRegistry::new().is_empty());
    }

    #[test]
    fn test_ensure_net_reuses_existing() {
        let mut registry = NetRegistry::new();
        let a = registry.ensure_net("1");
        let b = registry.ensure_net("2");
        let again = registry.ensure_net("1");

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(again, a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_terminals_keep_insertion_order() {
        let mut registry = NetRegistry::with_ground();
        registry.add_terminal("1", "R1.1".to_string());
        registry.add_terminal("0", "R1.2".to_string());
        registry.add_terminal("1", "C1.1".to_string());

        let names: Vec<&str> = registry.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["0", "1"]);
        assert_eq!(registry.get("1").unwrap().terminals, vec!["R1.1", "C1.1"]);
        assert_eq!(registry.get("0").unwrap().terminals, vec!["GND", "R1.2"]);
        assert!(!registry.get("0").unwrap().is_bare_ground());
    }

    #[test]
    fn test_device_kind_tags() {
        assert_eq!(DeviceKind::Resistor.tag(), "RES");
        assert_eq!(DeviceKind::Bjt.tag(), "QBJT");
        assert_eq!(DeviceKind::AnalogInput.to_string(), "ANALOG_INPUT");
        let dip = DeviceKind::TtlDip { package: "7400".to_string() };
        assert_eq!(dip.tag(), "TTL_7400_DIP");
    }

    #[test]
    fn test_empty_model_means_no_param() {
        let d = Device::with_model(DeviceKind::Diode, "D1".to_string(), String::new());
        assert_eq!(d.param, DeviceParam::None);
    }

    #[test]
    fn test_scope_binding() {
        let mut scope = Scope::subcircuit("AMP".to_string(), vec!["IN".to_string()]);
        assert!(scope.is_subcircuit());
        assert!(!scope.is_empty());

        scope.bind("IN", "R1", "1");
        assert_eq!(scope.nets.get("IN").unwrap().terminals, vec!["R1.1"]);
        assert!(Scope::top_level().is_empty());
    }

    #[test]
    fn test_device_counts_are_ordered() {
        let mut scope = Scope::top_level();
        scope.add_device(Device::with_value(DeviceKind::Resistor, "R1".to_string(), 1.0));
        scope.add_device(Device::with_model(DeviceKind::Bjt, "Q1".to_string(), "BC547".to_string()));
        scope.add_device(Device::with_value(DeviceKind::Capacitor, "C1".to_string(), 1e-9));
        scope.add_device(Device::with_value(DeviceKind::Resistor, "R2".to_string(), 2.0));

        let counts: Vec<(String, usize)> = scope.device_counts().into_iter().collect();
        assert_eq!(
            counts,
            vec![
                ("CAP".to_string(), 1),
                ("QBJT".to_string(), 1),
                ("RES".to_string(), 2),
            ]
        );
    }
}
