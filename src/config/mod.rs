// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod builder;
mod component;
mod harness;
mod loader;
mod validation;

pub mod consts;

pub use builder::{BuiltPipeline, HarnessBuilder};
pub use component::ComponentConfig;
pub use harness::HarnessConfig;
pub use loader::{
    load_and_validate_config, load_config, BuiltinComponent, ComponentDefinition,
    ConnectionDefinition, PipelineConfig,
};
pub use validation::validate_pipeline;
