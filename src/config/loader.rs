// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::components::{GeneratorConfig, SinkConfig, TransformerConfig};
use crate::config::{validate_pipeline, ComponentConfig, HarnessConfig};
use crate::errors::ConfigError;
use crate::observability::messages::config::{PipelineLoaded, PipelineValidationFailed};
use crate::observability::messages::StructuredLog;

/// A complete pipeline: harness settings, components and their wiring.
///
/// # Fields
/// * `harness` - Harness-wide settings (optional, all defaults)
/// * `components` - Component definitions, each with a unique name
/// * `connections` - Port-to-port wiring between components
///
/// # Example
/// ```yaml
/// harness:
///   shutdown_timeout: 2
/// components:
///   - name: numbers
///     kind: generator
///     count: 3
///   - name: collector
///     kind: sink
/// connections:
///   - from: numbers.output
///     to: collector.input
///     buffer_size: 8
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub harness: HarnessConfig,
    pub components: Vec<ComponentDefinition>,
    #[serde(default)]
    pub connections: Vec<ConnectionDefinition>,
}

/// One named component and its behaviour.
///
/// The behaviour's own fields sit beside `name` and `kind`; the settings
/// shared by every kind live under `settings`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentDefinition {
    pub name: String,
    #[serde(flatten)]
    pub behaviour: BuiltinComponent,
    #[serde(default)]
    pub settings: ComponentConfig,
}

/// Built-in behaviours, selected by the `kind` key.
///
/// # Variants
/// * `Generator` - Emits a fixed number of items
/// * `Transformer` - Applies an operation to each payload
/// * `Sink` - Collects payloads
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuiltinComponent {
    Generator(GeneratorConfig),
    Transformer(TransformerConfig),
    Sink(SinkConfig),
}

impl BuiltinComponent {
    pub fn kind(&self) -> &'static str {
        match self {
            BuiltinComponent::Generator(_) => "generator",
            BuiltinComponent::Transformer(_) => "transformer",
            BuiltinComponent::Sink(_) => "sink",
        }
    }
}

/// A connection between an output port and an input port.
///
/// Addresses are `"component.port"`. Without `buffer_size` the harness
/// default applies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionDefinition {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub buffer_size: Option<usize>,
}

/// Load a pipeline file. `.toml` files are read as TOML, anything else as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        Ok(toml::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Load a pipeline file and validate it.
///
/// Every validation problem is logged and returned together in
/// [`ConfigError::Invalid`].
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let path = path.as_ref();
    let config = load_config(path)?;

    if let Err(errors) = validate_pipeline(&config) {
        for error in &errors {
            PipelineValidationFailed { error }.log();
        }
        return Err(ConfigError::Invalid(errors));
    }

    PipelineLoaded {
        path: &path.display().to_string(),
        component_count: config.components.len(),
        connection_count: config.connections.len(),
    }
    .log();

    Ok(config)
}
