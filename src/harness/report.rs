// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::component::PerformanceMetrics;
use crate::lifecycle::ComponentState;
use crate::streams::EndpointMetricsSnapshot;

/// Aggregate view of a harness, available while it runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarnessStatus {
    pub running: bool,
    pub components: BTreeMap<String, ComponentState>,
    /// Components not in the `error` state
    pub healthy_count: usize,
    pub connection_count: usize,
}

impl HarnessStatus {
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// Outcome of [`SystemExecutionHarness::run`](crate::harness::SystemExecutionHarness::run).
#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub started_at: DateTime<Utc>,
    /// From the start of the run until the last component finished setup
    pub startup_seconds: f64,
    pub runtime_seconds: f64,
    /// Per-component metrics; empty when performance monitoring is disabled
    pub components: Vec<PerformanceMetrics>,
    pub streams: Vec<EndpointMetricsSnapshot>,
    /// Components that ignored shutdown and were aborted
    pub forced: Vec<String>,
}

impl HarnessReport {
    pub fn component(&self, name: &str) -> Option<&PerformanceMetrics> {
        self.components.iter().find(|m| m.name == name)
    }

    pub fn total_messages(&self) -> u64 {
        self.components.iter().map(|m| m.message_count).sum()
    }
}
