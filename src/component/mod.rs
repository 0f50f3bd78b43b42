// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Harness components: a behaviour, its context and its lifecycle driver.

mod context;
mod harness_component;
mod metrics;

pub use context::{Broadcast, ComponentContext};
pub use harness_component::HarnessComponent;
pub use metrics::PerformanceMetrics;
