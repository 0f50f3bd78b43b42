// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::components::{Collected, ComponentFactory};
use crate::config::PipelineConfig;
use crate::errors::HarnessError;
use crate::harness::{PortRef, SystemExecutionHarness};
use crate::streams::Direction;

/// A harness wired from a pipeline file, ready to run.
pub struct BuiltPipeline {
    pub harness: SystemExecutionHarness,
    /// Collection handles of every sink, keyed by component name
    pub sinks: HashMap<String, Collected>,
}

/// Pipeline builder - turns a [`PipelineConfig`] into a running harness.
///
/// Each component definition is created through [`ComponentFactory`] and
/// registered with its settings; each connection becomes a bounded stream
/// using its own buffer size or the harness default.
///
/// # Examples
/// ```
/// use the_harness::config::{HarnessBuilder, PipelineConfig};
///
/// let config: PipelineConfig = serde_yaml::from_str(r#"
/// components:
///   - { name: numbers, kind: generator, count: 2 }
///   - { name: collector, kind: sink }
/// connections:
///   - { from: numbers.output, to: collector.input }
/// "#).unwrap();
///
/// let built = HarnessBuilder::from_config(&config).unwrap();
/// assert_eq!(built.harness.connections().len(), 1);
/// assert!(built.sinks.contains_key("collector"));
/// ```
pub struct HarnessBuilder;

impl HarnessBuilder {
    /// Build a wired harness from configuration.
    ///
    /// The configuration should already have passed validation; wiring
    /// problems that slip through surface as [`HarnessError`].
    pub fn from_config(config: &PipelineConfig) -> Result<BuiltPipeline, HarnessError> {
        let mut harness = SystemExecutionHarness::new(config.harness.clone());
        let mut sinks = HashMap::new();

        for definition in &config.components {
            let created = ComponentFactory::create_component(&definition.behaviour);
            harness.register_component(&definition.name, created.behaviour, definition.settings.clone())?;
            if let Some(collected) = created.collected {
                sinks.insert(definition.name.clone(), collected);
            }
        }

        for connection in &config.connections {
            let source = PortRef::parse(&connection.from, Direction::Send)?;
            let dest = PortRef::parse(&connection.to, Direction::Receive)?;
            let buffer_size = connection
                .buffer_size
                .unwrap_or(config.harness.stream_buffer_size);
            harness.connect_with_buffer(source, dest, buffer_size)?;
        }

        Ok(BuiltPipeline { harness, sinks })
    }
}
