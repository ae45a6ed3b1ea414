//! Port numbers and port list specifications.
//!
//! `Port` is always in 1-65535. `PortSpec` parses user input such as
//! `"22,80,443,8000-9000"` and normalizes it into the sorted, unique port set
//! the scan engine works from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated TCP port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 65535;

    /// Returns `None` for port 0.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(u32::from(value)))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Parse wide so "70000" reports as out of range rather than malformed.
        let value: u32 = s
            .parse()
            .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
        u16::try_from(value)
            .ok()
            .and_then(Port::new)
            .ok_or(PortError::OutOfRange(value))
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: '{0}'")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// An inclusive range of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start > end {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A port list made of single ports and ranges, in the order given.
///
/// Accepted forms:
/// - `"80"`
/// - `"80,443,8080"`
/// - `"1-1000"`
/// - `"22,80,443,8000-9000"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSpec {
    ranges: Vec<PortRange>,
}

impl PortSpec {
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn add_range(&mut self, range: PortRange) {
        self.ranges.push(range);
    }

    pub fn add_port(&mut self, port: Port) {
        self.ranges.push(PortRange::single(port));
    }

    /// All ports, sorted ascending with duplicates removed.
    pub fn to_ports(&self) -> Vec<Port> {
        let mut ports: Vec<Port> = self.ranges.iter().flat_map(PortRange::iter).collect();
        ports.sort_unstable();
        ports.dedup();
        ports
    }

    /// Number of distinct ports.
    pub fn count(&self) -> usize {
        self.to_ports().len()
    }
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut spec = Self::new();
        for part in s.split(',').map(str::trim) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let range = PortRange::new(start.parse()?, end.parse()?)?;
                    spec.add_range(range);
                }
                None => spec.add_port(part.parse()?),
            }
        }

        Ok(spec)
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ranges.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(spec: &str) -> Vec<u16> {
        spec.parse::<PortSpec>()
            .unwrap()
            .to_ports()
            .into_iter()
            .map(Port::as_u16)
            .collect()
    }

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
        assert_eq!("70000".parse::<Port>(), Err(PortError::OutOfRange(70000)));
        assert_eq!("0".parse::<Port>(), Err(PortError::OutOfRange(0)));
        assert!(matches!("http".parse::<Port>(), Err(PortError::InvalidFormat(_))));
    }

    #[test]
    fn test_port_range() {
        let range = PortRange::new(Port::new(1).unwrap(), Port::new(100).unwrap()).unwrap();
        assert_eq!(range.len(), 100);
        assert_eq!(range.to_string(), "1-100");

        let backwards = PortRange::new(Port::new(100).unwrap(), Port::new(50).unwrap());
        assert_eq!(backwards, Err(PortError::InvalidRange(100, 50)));
    }

    #[test]
    fn test_port_spec_parsing() {
        assert_eq!(ports("80"), vec![80]);
        assert_eq!(ports("80, 443"), vec![80, 443]);
        assert_eq!(ports("1-5"), vec![1, 2, 3, 4, 5]);
        assert_eq!(ports("22,80,100-102"), vec![22, 80, 100, 101, 102]);
        assert_eq!("22,80,443,8000-8010".parse::<PortSpec>().unwrap().count(), 14);
    }

    #[test]
    fn test_port_spec_sorts_and_dedups() {
        assert_eq!(ports("9999,80,22,80,21-23"), vec![21, 22, 23, 80, 9999]);
    }

    #[test]
    fn test_port_spec_rejects_bad_input() {
        assert_eq!("".parse::<PortSpec>(), Err(PortError::Empty));
        assert!("100-50".parse::<PortSpec>().is_err());
        assert!("abc".parse::<PortSpec>().is_err());
        assert!("80,".parse::<PortSpec>().is_err());
        assert!("1-2-3".parse::<PortSpec>().is_err());
        assert!("0-10".parse::<PortSpec>().is_err());
    }

    #[test]
    fn test_port_spec_display() {
        let spec: PortSpec = "22, 80,8000-8010".parse().unwrap();
        assert_eq!(spec.to_string(), "22,80,8000-8010");
    }

    #[test]
    fn test_port_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Port>("0").is_err());
        assert_eq!(serde_json::from_str::<Port>("443").unwrap().as_u16(), 443);
    }
}
