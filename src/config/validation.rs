// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline validation.
//!
//! Checks run in order and accumulate, so a user sees every problem at once:
//!
//! 1. **Settings**: buffer sizes and timeouts are greater than zero
//! 2. **Uniqueness**: component names are unique
//! 3. **Connections**: addresses parse as `component.port`, refer to declared
//!    components, and no port is wired twice
//!
//! A pipeline that passes can be built without wiring errors.
//!
//! # Example
//! ```rust
//! use the_harness::config::{validate_pipeline, PipelineConfig};
//! use the_harness::errors::ValidationError;
//!
//! let config: PipelineConfig = serde_yaml::from_str(r#"
//! components:
//!   - name: collector
//!     kind: sink
//! connections:
//!   - from: missing.output
//!     to: collector.input
//! "#).unwrap();
//!
//! let errors = validate_pipeline(&config).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::UnknownComponent {
//!         address: "missing.output".into(),
//!         component: "missing".into(),
//!     }]
//! );
//! ```

use std::collections::HashSet;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::errors::ValidationError;

/// Validate a pipeline, returning every problem found.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(setting_errors) = validate_settings(config) {
        errors.extend(setting_errors);
    }

    if let Err(duplicate_errors) = validate_unique_names(config) {
        errors.extend(duplicate_errors);
    }

    if let Err(connection_errors) = validate_connections(config) {
        errors.extend(connection_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_settings(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let harness = &config.harness;
    let mut errors = Vec::new();
    let mut require = |positive: bool, field: String| {
        if !positive {
            errors.push(ValidationError::NonPositiveValue { field });
        }
    };

    let durations: [(&str, Duration); 4] = [
        ("harness.startup_timeout", harness.startup_timeout),
        ("harness.shutdown_timeout", harness.shutdown_timeout),
        ("harness.health_check_interval", harness.health_check_interval),
        ("harness.send_timeout", harness.send_timeout),
    ];
    for (field, value) in durations {
        require(!value.is_zero(), field.to_string());
    }
    require(harness.stream_buffer_size > 0, "harness.stream_buffer_size".to_string());

    for connection in &config.connections {
        if let Some(size) = connection.buffer_size {
            require(
                size > 0,
                format!("connections[{} -> {}].buffer_size", connection.from, connection.to),
            );
        }
    }

    for component in &config.components {
        if component.settings.poll_interval_ms == Some(0) {
            require(false, format!("{}.settings.poll_interval_ms", component.name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_names(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for component in &config.components {
        if !seen.insert(component.name.as_str()) {
            errors.push(ValidationError::DuplicateComponentName {
                name: component.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Each address must name a declared component, and each port (per
/// direction) may appear in one connection only.
fn validate_connections(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let names: HashSet<&str> = config.components.iter().map(|c| c.name.as_str()).collect();
    let mut wired_outputs = HashSet::new();
    let mut wired_inputs = HashSet::new();
    let mut errors = Vec::new();

    for connection in &config.connections {
        let ends = [
            (&connection.from, &mut wired_outputs),
            (&connection.to, &mut wired_inputs),
        ];
        for (address, wired) in ends {
            let Some((component, port)) = split_address(address) else {
                errors.push(ValidationError::InvalidAddress {
                    address: address.clone(),
                });
                continue;
            };
            if !names.contains(component) {
                errors.push(ValidationError::UnknownComponent {
                    address: address.clone(),
                    component: component.to_string(),
                });
                continue;
            }
            if !wired.insert((component, port)) {
                errors.push(ValidationError::PortConnectedTwice {
                    address: address.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn split_address(address: &str) -> Option<(&str, &str)> {
    address
        .split_once('.')
        .filter(|(component, port)| !component.is_empty() && !port.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(yaml: &str) -> PipelineConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_pipeline_passes() {
        let config = pipeline(
            r#"
components:
  - { name: a, kind: generator, count: 1 }
  - { name: b, kind: sink }
connections:
  - { from: a.output, to: b.input }
"#,
        );
        assert_eq!(validate_pipeline(&config), Ok(()));
    }

    #[test]
    fn test_duplicate_names() {
        let config = pipeline(
            r#"
components:
  - { name: a, kind: sink }
  - { name: a, kind: sink }
  - { name: a, kind: sink }
"#,
        );
        let errors = validate_pipeline(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateComponentName { name: "a".into() },
                ValidationError::DuplicateComponentName { name: "a".into() },
            ]
        );
    }

    #[test]
    fn test_bad_addresses_and_double_wiring() {
        let config = pipeline(
            r#"
components:
  - { name: a, kind: generator, count: 1 }
  - { name: b, kind: sink }
  - { name: c, kind: sink }
connections:
  - { from: a.output, to: b.input }
  - { from: a.output, to: c.input }
  - { from: nodot, to: c.other }
"#,
        );
        let errors = validate_pipeline(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::PortConnectedTwice {
                    address: "a.output".into()
                },
                ValidationError::InvalidAddress {
                    address: "nodot".into()
                },
            ]
        );
    }

    #[test]
    fn test_non_positive_settings() {
        let config = pipeline(
            r#"
harness:
  shutdown_timeout: 0
  stream_buffer_size: 0
components:
  - { name: a, kind: generator, count: 1, settings: { poll_interval_ms: 0 } }
  - { name: b, kind: sink }
connections:
  - { from: a.output, to: b.input, buffer_size: 0 }
"#,
        );
        let fields: Vec<_> = validate_pipeline(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| match e {
                ValidationError::NonPositiveValue { field } => field,
                other => panic!("unexpected {other}"),
            })
            .collect();

        assert_eq!(
            fields,
            vec![
                "harness.shutdown_timeout",
                "harness.stream_buffer_size",
                "connections[a.output -> b.input].buffer_size",
                "a.settings.poll_interval_ms",
            ]
        );
    }
}
