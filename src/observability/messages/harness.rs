// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the system execution harness.
//!
//! This module contains message types for logging events related to:
//! * Component registration and port wiring
//! * Harness run start and completion
//! * Shutdown, forced cancellation and health monitoring

use crate::lifecycle::ComponentState;
use crate::observability::messages::{StructuredLog, StructuredSpan};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Component added to the harness registry.
///
/// # Log Level
/// `debug!`
pub struct ComponentRegistered<'a> {
    pub component: &'a str,
}

impl Display for ComponentRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Registered component '{}'", self.component)
    }
}

impl StructuredLog for ComponentRegistered<'_> {
    fn log(&self) {
        tracing::debug!(component = self.component, "{}", self);
    }
}

/// Two ports were wired together.
///
/// # Log Level
/// `info!`
///
/// # Example
/// ```
/// use the_harness::observability::messages::harness::PortsConnected;
///
/// let msg = PortsConnected {
///     source: "generator.output",
///     dest: "sink.input",
///     buffer_size: 100,
/// };
///
/// assert_eq!(msg.to_string(), "Connected generator.output -> sink.input (buffer 100)");
/// ```
pub struct PortsConnected<'a> {
    pub source: &'a str,
    pub dest: &'a str,
    pub buffer_size: usize,
}

impl Display for PortsConnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Connected {} -> {} (buffer {})",
            self.source, self.dest, self.buffer_size
        )
    }
}

impl StructuredLog for PortsConnected<'_> {
    fn log(&self) {
        tracing::info!(
            source = self.source,
            dest = self.dest,
            buffer_size = self.buffer_size,
            "{}", self
        );
    }
}

/// Harness run started.
///
/// # Log Level
/// `info!`
pub struct HarnessStarted {
    pub component_count: usize,
    pub connection_count: usize,
}

impl Display for HarnessStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting harness: {} components, {} connections",
            self.component_count, self.connection_count
        )
    }
}

impl StructuredLog for HarnessStarted {
    fn log(&self) {
        tracing::info!(
            component_count = self.component_count,
            connection_count = self.connection_count,
            "{}", self
        );
    }
}

impl StructuredSpan for HarnessStarted {
    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "harness_run",
            span_name = name,
            component_count = self.component_count,
            connection_count = self.connection_count,
        )
    }
}

/// Harness run finished and every component was cleaned up.
///
/// # Log Level
/// `info!`
pub struct HarnessCompleted {
    pub component_count: usize,
    pub forced_count: usize,
    /// Time until the last component finished setup
    pub startup: Duration,
    pub duration: Duration,
}

impl Display for HarnessCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Harness finished: {} components in {:?}, started in {:?} ({} force-cancelled)",
            self.component_count, self.duration, self.startup, self.forced_count
        )
    }
}

impl StructuredLog for HarnessCompleted {
    fn log(&self) {
        tracing::info!(
            component_count = self.component_count,
            forced_count = self.forced_count,
            startup_ms = self.startup.as_millis() as u64,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Shutdown was requested; components have until the deadline to drain.
///
/// # Log Level
/// `info!`
pub struct ShutdownRequested {
    pub pending_components: usize,
    pub timeout: Duration,
}

impl Display for ShutdownRequested {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Shutdown requested: waiting up to {:?} for {} components",
            self.timeout, self.pending_components
        )
    }
}

impl StructuredLog for ShutdownRequested {
    fn log(&self) {
        tracing::info!(
            pending_components = self.pending_components,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}

/// Component ignored shutdown past the deadline and was aborted.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ComponentForceCancelled<'a> {
    pub component: &'a str,
    pub timeout: Duration,
}

impl Display for ComponentForceCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}' did not stop within {:?}; force-cancelled and marked faulted",
            self.component, self.timeout
        )
    }
}

impl StructuredLog for ComponentForceCancelled<'_> {
    fn log(&self) {
        tracing::error!(
            component = self.component,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}

/// Health monitor found a degraded component.
///
/// # Log Level
/// `warn!`
pub struct UnhealthyComponent<'a> {
    pub component: &'a str,
    pub state: ComponentState,
}

impl Display for UnhealthyComponent<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Health check: component '{}' is in state {}",
            self.component, self.state
        )
    }
}

impl StructuredLog for UnhealthyComponent<'_> {
    fn log(&self) {
        tracing::warn!(
            component = self.component,
            state = self.state.as_str(),
            "{}", self
        );
    }
}

/// A component task ended abnormally (panic inside the component).
///
/// # Log Level
/// `error!`
pub struct ComponentTaskFailed<'a> {
    pub component: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ComponentTaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task for component '{}' failed: {}", self.component, self.error)
    }
}

impl StructuredLog for ComponentTaskFailed<'_> {
    fn log(&self) {
        tracing::error!(
            component = self.component,
            error = %self.error,
            "{}", self
        );
    }
}
