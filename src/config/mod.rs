//! Configuration management for NetTrackr.
//!
//! XDG-compliant application paths and the settings file that provides CLI
//! defaults for scans.

mod settings;

pub use settings::{AppSettings, Paths};
