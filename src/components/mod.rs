// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in component behaviours.
//!
//! * [`Generator`] - emits a fixed number of items, then end-of-stream
//! * [`Transformer`] - applies an [`Operation`] to each payload
//! * [`Sink`] - collects payloads until every input has finished
//!
//! [`ComponentFactory`] builds them from pipeline definitions. The [`stub`]
//! module holds behaviours for exercising failure handling.

mod factory;
mod generator;
mod sink;
pub mod stub;
mod transformer;

/// Port a built-in component reads from
pub const DEFAULT_INPUT_PORT: &str = "input";
/// Port a built-in component writes to
pub const DEFAULT_OUTPUT_PORT: &str = "output";

pub use factory::{ComponentFactory, CreatedComponent};
pub use generator::{Generator, GeneratorConfig};
pub use sink::{Collected, Sink, SinkConfig};
pub use transformer::{Operation, Transformer, TransformerConfig};
