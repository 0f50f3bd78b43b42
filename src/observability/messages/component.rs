// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for component lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Lifecycle state transitions
//! * Errors recorded against a component and health degradation
//! * Setup, process loop and cleanup progress

use crate::lifecycle::ComponentState;
use crate::observability::messages::{StructuredLog, StructuredSpan};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Component moved along an edge of the lifecycle table.
///
/// # Log Level
/// `debug!` - Routine lifecycle bookkeeping
///
/// # Example
/// ```
/// use the_harness::lifecycle::ComponentState;
/// use the_harness::observability::messages::component::StateChanged;
///
/// let msg = StateChanged {
///     component: "generator",
///     from: ComponentState::Created,
///     to: ComponentState::Ready,
///     reason: Some("setup complete"),
/// };
///
/// assert_eq!(msg.to_string(), "Component 'generator' created -> ready (setup complete)");
/// ```
pub struct StateChanged<'a> {
    pub component: &'a str,
    pub from: ComponentState,
    pub to: ComponentState,
    pub reason: Option<&'a str>,
}

impl Display for StateChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Component '{}' {} -> {}", self.component, self.from, self.to)?;
        if let Some(reason) = self.reason {
            write!(f, " ({})", reason)?;
        }
        Ok(())
    }
}

impl StructuredLog for StateChanged<'_> {
    fn log(&self) {
        tracing::debug!(
            component = self.component,
            from = self.from.as_str(),
            to = self.to.as_str(),
            reason = self.reason,
            "{}", self
        );
    }
}

/// Error recorded against a component's status.
///
/// # Log Level
/// `warn!` - Contained failure; the component keeps running
pub struct ComponentErrorRecorded<'a> {
    pub component: &'a str,
    pub error: &'a str,
    pub error_count: u32,
    pub threshold: u32,
}

impl Display for ComponentErrorRecorded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}' recorded error {}/{}: {}",
            self.component, self.error_count, self.threshold, self.error
        )
    }
}

impl StructuredLog for ComponentErrorRecorded<'_> {
    fn log(&self) {
        tracing::warn!(
            component = self.component,
            error = self.error,
            error_count = self.error_count,
            threshold = self.threshold,
            "{}", self
        );
    }
}

/// Component exceeded its health threshold and is now permanently in `error`.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct HealthThresholdExceeded<'a> {
    pub component: &'a str,
    pub error_count: u32,
    pub threshold: u32,
}

impl Display for HealthThresholdExceeded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}' exceeded health threshold: {} errors (threshold {})",
            self.component, self.error_count, self.threshold
        )
    }
}

impl StructuredLog for HealthThresholdExceeded<'_> {
    fn log(&self) {
        tracing::error!(
            component = self.component,
            error_count = self.error_count,
            threshold = self.threshold,
            "{}", self
        );
    }
}

/// Component setup is about to run.
///
/// # Log Level
/// `debug!`
///
/// # Example
/// ```
/// use std::time::Duration;
/// use the_harness::observability::messages::component::SetupStarted;
///
/// let msg = SetupStarted {
///     component: "sink",
///     timeout: Some(Duration::from_secs(30)),
/// };
///
/// assert_eq!(msg.to_string(), "Setting up component 'sink' (timeout 30s)");
/// ```
pub struct SetupStarted<'a> {
    pub component: &'a str,
    pub timeout: Option<Duration>,
}

impl Display for SetupStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.timeout {
            Some(timeout) => write!(f, "Setting up component '{}' (timeout {:?})", self.component, timeout),
            None => write!(f, "Setting up component '{}'", self.component),
        }
    }
}

impl StructuredLog for SetupStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            component = self.component,
            timeout_ms = self.timeout.map(|t| t.as_millis() as u64),
            "{}", self
        );
    }
}

impl StructuredSpan for SetupStarted<'_> {
    fn span(&self, name: &str) -> Span {
        tracing::info_span!("setup", span_name = name, component = self.component)
    }
}

/// Component setup finished and the component is ready to run.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SetupCompleted<'a> {
    pub component: &'a str,
    pub duration: Duration,
}

impl Display for SetupCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Component '{}' ready after {:?}", self.component, self.duration)
    }
}

impl StructuredLog for SetupCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            component = self.component,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Component setup failed; the component will not be scheduled.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct SetupFailed<'a> {
    pub component: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for SetupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Component '{}' setup failed: {}", self.component, self.error)
    }
}

impl StructuredLog for SetupFailed<'_> {
    fn log(&self) {
        tracing::error!(
            component = self.component,
            error = %self.error,
            "{}", self
        );
    }
}

/// A single `process()` call returned an error.
///
/// # Log Level
/// `warn!` - Contained failure
pub struct ProcessFailed<'a> {
    pub component: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Component '{}' process failed: {}", self.component, self.error)
    }
}

impl StructuredLog for ProcessFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            component = self.component,
            error = %self.error,
            "{}", self
        );
    }
}

/// Why a component's process loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The component reported it has no more work.
    Completed,
    /// The shutdown signal was observed.
    ShutdownRequested,
    /// The component degraded into the `error` state.
    Degraded,
}

impl Display for LoopExit {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let text = match self {
            LoopExit::Completed => "completed",
            LoopExit::ShutdownRequested => "shutdown requested",
            LoopExit::Degraded => "degraded",
        };
        f.write_str(text)
    }
}

/// Process loop is starting.
///
/// # Log Level
/// `debug!`
pub struct ProcessLoopStarted<'a> {
    pub component: &'a str,
    pub kind: &'a str,
}

impl Display for ProcessLoopStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Component '{}' ({}) running", self.component, self.kind)
    }
}

impl StructuredLog for ProcessLoopStarted<'_> {
    fn log(&self) {
        tracing::debug!(component = self.component, kind = self.kind, "{}", self);
    }
}

impl StructuredSpan for ProcessLoopStarted<'_> {
    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "process_loop",
            span_name = name,
            component = self.component,
            kind = self.kind,
        )
    }
}

/// Process loop ended.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProcessLoopFinished<'a> {
    pub component: &'a str,
    pub iterations: u64,
    pub exit: LoopExit,
}

impl Display for ProcessLoopFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}' process loop finished after {} iterations: {}",
            self.component, self.iterations, self.exit
        )
    }
}

impl StructuredLog for ProcessLoopFinished<'_> {
    fn log(&self) {
        tracing::info!(
            component = self.component,
            iterations = self.iterations,
            exit = %self.exit,
            "{}", self
        );
    }
}

/// Component cleanup is about to run.
///
/// # Log Level
/// `debug!`
pub struct CleanupStarted<'a> {
    pub component: &'a str,
    pub state: ComponentState,
}

impl Display for CleanupStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cleaning up component '{}' from state {}", self.component, self.state)
    }
}

impl StructuredLog for CleanupStarted<'_> {
    fn log(&self) {
        tracing::debug!(component = self.component, state = self.state.as_str(), "{}", self);
    }
}

impl StructuredSpan for CleanupStarted<'_> {
    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("cleanup", span_name = name, component = self.component)
    }
}

/// Component cleanup ran.
///
/// # Log Level
/// `debug!`
pub struct CleanupCompleted<'a> {
    pub component: &'a str,
    pub final_state: ComponentState,
}

impl Display for CleanupCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}' cleaned up in state {}",
            self.component, self.final_state
        )
    }
}

impl StructuredLog for CleanupCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            component = self.component,
            final_state = self.final_state.as_str(),
            "{}", self
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_messages_open_named_spans() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let spans = [
                SetupStarted {
                    component: "sink",
                    timeout: None,
                }
                .span("component_setup"),
                ProcessLoopStarted {
                    component: "sink",
                    kind: "sink",
                }
                .span("process_loop"),
                CleanupStarted {
                    component: "sink",
                    state: ComponentState::Stopped,
                }
                .span("component_cleanup"),
            ];

            let names: Vec<_> = spans
                .iter()
                .map(|span| span.metadata().map(|m| m.name()))
                .collect();
            assert_eq!(names, vec![Some("setup"), Some("process_loop"), Some("cleanup")]);
        });
    }
}
