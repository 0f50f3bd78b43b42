// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::errors::HarnessError;
use crate::streams::Direction;

/// Handle to a registered component, used to name its ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    name: String,
}

impl ComponentRef {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self, port: &str) -> PortRef {
        PortRef::output(&self.name, port)
    }

    pub fn input(&self, port: &str) -> PortRef {
        PortRef::input(&self.name, port)
    }
}

/// A typed `component.port` descriptor.
///
/// Outputs are `Send` ports and inputs are `Receive` ports; the harness
/// rejects a connection whose ends have the wrong directions.
///
/// # Example
/// ```
/// use the_harness::harness::PortRef;
/// use the_harness::streams::Direction;
///
/// let port = PortRef::parse("generator.output", Direction::Send).unwrap();
/// assert_eq!(port.component(), "generator");
/// assert_eq!(port.port(), "output");
/// assert_eq!(port.to_string(), "generator.output");
///
/// assert!(PortRef::parse("no_port", Direction::Send).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    component: String,
    port: String,
    direction: Direction,
}

impl PortRef {
    pub fn output(component: &str, port: &str) -> Self {
        Self {
            component: component.to_string(),
            port: port.to_string(),
            direction: Direction::Send,
        }
    }

    pub fn input(component: &str, port: &str) -> Self {
        Self {
            component: component.to_string(),
            port: port.to_string(),
            direction: Direction::Receive,
        }
    }

    /// Parse a `component.port` address. The split is at the first `.`.
    pub fn parse(address: &str, direction: Direction) -> Result<Self, HarnessError> {
        match address.split_once('.') {
            Some((component, port)) if !component.is_empty() && !port.is_empty() => Ok(Self {
                component: component.to_string(),
                port: port.to_string(),
                direction,
            }),
            _ => Err(HarnessError::InvalidPortAddress(address.to_string())),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}

/// One wired edge of the data-flow graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: PortRef,
    pub dest: PortRef,
    pub buffer_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_ref_names_ports() {
        let generator = ComponentRef::new("gen");
        assert_eq!(generator.output("out"), PortRef::output("gen", "out"));
        assert_eq!(generator.input("in").direction(), Direction::Receive);
    }

    #[test]
    fn test_parse_splits_on_first_dot() {
        let port = PortRef::parse("a.b.c", Direction::Receive).unwrap();
        assert_eq!(port.component(), "a");
        assert_eq!(port.port(), "b.c");
    }

    #[test]
    fn test_parse_rejects_missing_parts() {
        for address in ["", ".", "a.", ".b", "plain"] {
            assert!(
                matches!(PortRef::parse(address, Direction::Send), Err(HarnessError::InvalidPortAddress(_))),
                "{}",
                address
            );
        }
    }
}
