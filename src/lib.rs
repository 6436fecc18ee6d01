pub mod cli;
pub mod converter;
pub mod emitter;
pub mod error;
pub mod netlist;
pub mod parser;
pub mod preprocess;
pub mod units;

// Re-export commonly used types
pub use converter::{convert, Converter, ConverterConfig, NestedPolicy, Translation};
pub use emitter::Statement;
pub use error::{ConvertError, Diagnostic};
pub use netlist::{Device, DeviceKind, Net, NetRegistry, Scope};
pub use units::{format_value, parse_value};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
