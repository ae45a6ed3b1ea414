//! Core value types: validated ports, resolved targets, report identifiers.

mod port;
mod scan_id;
mod target;

pub use port::{Port, PortError, PortRange, PortSpec};
pub use scan_id::{ScanId, ScanIdError};
pub use target::{ResolutionError, ScanTarget};
