// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::component::{ComponentContext, PerformanceMetrics};
use crate::config::ComponentConfig;
use crate::errors::{ComponentError, ComponentResult, HarnessError};
use crate::lifecycle::{ComponentState, ComponentStatus};
use crate::observability::messages::component::{
    CleanupCompleted, CleanupStarted, LoopExit, ProcessFailed, ProcessLoopFinished,
    ProcessLoopStarted, SetupCompleted, SetupFailed, SetupStarted,
};
use crate::observability::messages::{StructuredLog, StructuredSpan};
use crate::streams::{Direction, Endpoint};
use crate::traits::{Component, ProcessOutcome};

/// A named unit of work: a [`Component`] behaviour driven through the
/// lifecycle state machine.
///
/// `setup` runs once, `run_process_with_lifecycle` loops over
/// [`Component::process`] until completion, shutdown or degradation, and
/// `cleanup` runs exactly once no matter how often it is called.
pub struct HarnessComponent {
    context: ComponentContext,
    behaviour: Box<dyn Component>,
    cleaned_up: bool,
}

impl std::fmt::Debug for HarnessComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessComponent")
            .field("name", &self.context.name())
            .field("kind", &self.behaviour.kind())
            .field("state", &self.context.status.state())
            .finish()
    }
}

impl HarnessComponent {
    pub fn new(name: impl Into<String>, config: ComponentConfig, behaviour: Box<dyn Component>) -> Self {
        Self {
            context: ComponentContext::new(name.into(), config),
            behaviour,
            cleaned_up: false,
        }
    }

    pub fn name(&self) -> &str {
        self.context.name()
    }

    pub fn kind(&self) -> &'static str {
        self.behaviour.kind()
    }

    pub fn status(&self) -> &ComponentStatus {
        &self.context.status
    }

    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    pub fn should_shutdown(&self) -> bool {
        self.context.should_shutdown()
    }

    /// Replace the shutdown token; the harness hands each component a child
    /// of its own token before scheduling.
    pub fn set_cancellation_token(&mut self, token: CancellationToken) {
        self.context.cancel = token;
    }

    pub fn connect_output_stream(&mut self, port: &str, endpoint: Arc<Endpoint>) -> Result<(), HarnessError> {
        self.check_port(port, &endpoint, Direction::Send)?;
        self.context.outputs.insert(port.to_string(), endpoint);
        Ok(())
    }

    pub fn connect_input_stream(&mut self, port: &str, endpoint: Arc<Endpoint>) -> Result<(), HarnessError> {
        self.check_port(port, &endpoint, Direction::Receive)?;
        self.context.inputs.insert(port.to_string(), endpoint);
        Ok(())
    }

    fn check_port(&self, port: &str, endpoint: &Endpoint, expected: Direction) -> Result<(), HarnessError> {
        if endpoint.direction() != expected {
            return Err(HarnessError::PortDirectionMismatch {
                component: self.name().to_string(),
                port: port.to_string(),
                expected,
                actual: endpoint.direction(),
            });
        }
        let wired = match expected {
            Direction::Send => self.context.outputs.contains_key(port),
            Direction::Receive => self.context.inputs.contains_key(port),
        };
        if wired {
            return Err(HarnessError::PortAlreadyConnected {
                component: self.name().to_string(),
                port: port.to_string(),
                direction: expected,
            });
        }
        Ok(())
    }

    /// Run the behaviour's setup hook and move to `ready`.
    ///
    /// A failing hook counts as an error and moves the component to `error`.
    pub async fn setup(&mut self) -> ComponentResult<()> {
        self.run_setup(None).await
    }

    async fn run_setup(&mut self, timeout: Option<Duration>) -> ComponentResult<()> {
        if self.context.status.state() != ComponentState::Created {
            return Err(crate::errors::InvalidStateTransition {
                from: self.context.status.state(),
                to: ComponentState::Ready,
            }
            .into());
        }

        let started = Instant::now();
        self.context.start_time = Some(started);

        let start_msg = SetupStarted {
            component: self.context.name(),
            timeout,
        };
        let span = start_msg.span("component_setup");
        start_msg.log();
        let result = self.behaviour.setup(&mut self.context).instrument(span).await;
        self.finish_setup(started);

        match result {
            Ok(()) => {
                self.context
                    .status
                    .transition_to(ComponentState::Ready, Some("setup complete"))?;
                SetupCompleted {
                    component: self.context.name(),
                    duration: started.elapsed(),
                }
                .log();
                Ok(())
            }
            Err(error) => {
                self.fail_setup(&error);
                Err(error)
            }
        }
    }

    /// [`HarnessComponent::setup`] bounded by `timeout`.
    pub async fn setup_with_timeout(&mut self, timeout: Duration) -> ComponentResult<()> {
        match tokio::time::timeout(timeout, self.run_setup(Some(timeout))).await {
            Ok(result) => result,
            Err(_elapsed) => {
                if let Some(started) = self.context.start_time {
                    self.finish_setup(started);
                }
                let error = ComponentError::SetupTimeout(timeout);
                self.fail_setup(&error);
                Err(error)
            }
        }
    }

    fn finish_setup(&mut self, started: Instant) {
        let finished = Instant::now();
        self.context.setup_finished_at = Some(finished);
        self.context.setup_duration = Some(finished.duration_since(started));
    }

    /// When setup ended, successfully or not
    pub fn setup_finished_at(&self) -> Option<Instant> {
        self.context.setup_finished_at
    }

    fn fail_setup(&mut self, error: &ComponentError) {
        SetupFailed {
            component: self.context.name(),
            error,
        }
        .log();

        let reason = format!("setup failed: {}", error);
        self.context.status.record_error(reason.clone());
        if self.context.status.state().can_transition_to(ComponentState::Error) {
            let _ = self
                .context
                .status
                .transition_to(ComponentState::Error, Some(&reason));
        }
    }

    /// Drive the process loop from `ready` to a terminal state.
    ///
    /// Errors from `process` are recorded against this component only. The
    /// loop ends when the behaviour completes, shutdown is signalled or the
    /// component degrades. A component still healthy at exit passes through
    /// `stopping` to `stopped`.
    pub async fn run_process_with_lifecycle(&mut self) -> ComponentResult<()> {
        self.context.status.transition_to(ComponentState::Running, None)?;

        let cancel = self.context.cancel.clone();
        let mut iterations: u64 = 0;
        let start_msg = ProcessLoopStarted {
            component: self.context.name(),
            kind: self.behaviour.kind(),
        };
        let span = start_msg.span("process_loop");
        start_msg.log();
        let exit = async {
            loop {
                if cancel.is_cancelled() {
                    break LoopExit::ShutdownRequested;
                }
                if self.context.status.state() == ComponentState::Error {
                    break LoopExit::Degraded;
                }

                // Cancellation is cooperative: the context's I/O observes the
                // token, a behaviour that never touches it runs until aborted
                let outcome = self.behaviour.process(&mut self.context).await;
                iterations += 1;

                match outcome {
                    Ok(ProcessOutcome::Continue) => {}
                    Ok(ProcessOutcome::Complete) => break LoopExit::Completed,
                    Err(ComponentError::Cancelled) if cancel.is_cancelled() => {
                        break LoopExit::ShutdownRequested
                    }
                    Err(error) => {
                        ProcessFailed {
                            component: self.context.name(),
                            error: &error,
                        }
                        .log();
                        self.context.status.record_error(error.to_string());
                    }
                }

                // Behaviours that never suspend must not starve their siblings
                tokio::task::yield_now().await;
            }
        }
        .instrument(span)
        .await;

        ProcessLoopFinished {
            component: self.context.name(),
            iterations,
            exit,
        }
        .log();

        if self.context.status.state() != ComponentState::Error {
            let reason = exit.to_string();
            self.context
                .status
                .transition_to(ComponentState::Stopping, Some(&reason))?;
            self.context.status.transition_to(ComponentState::Stopped, None)?;
        }
        Ok(())
    }

    /// Run the cleanup hook, close every endpoint and settle the state.
    ///
    /// Idempotent. A component in `error` stays in `error`; any other
    /// non-terminal state ends in `stopped`.
    pub async fn cleanup(&mut self) -> ComponentResult<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;

        let start_msg = CleanupStarted {
            component: self.context.name(),
            state: self.context.status.state(),
        };
        let span = start_msg.span("component_cleanup");
        start_msg.log();
        let result = self.behaviour.cleanup(&mut self.context).instrument(span).await;
        if let Err(error) = &result {
            self.context.status.record_error(format!("cleanup failed: {}", error));
        }

        for endpoint in self.context.outputs.values().chain(self.context.inputs.values()) {
            endpoint.close().await;
        }

        let status = &mut self.context.status;
        if matches!(
            status.state(),
            ComponentState::Created | ComponentState::Ready | ComponentState::Running
        ) {
            status.transition_to(ComponentState::Stopping, Some("cleanup"))?;
        }
        if status.state() == ComponentState::Stopping {
            status.transition_to(ComponentState::Stopped, Some("cleanup"))?;
        }

        CleanupCompleted {
            component: self.context.name(),
            final_state: self.context.status.state(),
        }
        .log();

        result
    }

    /// Close every endpoint once the component has stopped working.
    ///
    /// Downstream drains what is queued and then sees end of stream;
    /// upstream sends fail instead of waiting on a reader that is gone.
    /// `&mut self` keeps the future `Send`: behaviours are not `Sync`.
    pub async fn close_endpoints(&mut self) {
        for endpoint in self.context.outputs.values().chain(self.context.inputs.values()) {
            endpoint.close().await;
        }
    }

    /// Record a fault imposed from outside (force-cancellation) and move to
    /// `error` when the state allows it.
    pub fn mark_faulted(&mut self, reason: &str) {
        self.context.status.record_error(reason);
        if self.context.status.state().can_transition_to(ComponentState::Error) {
            let _ = self
                .context
                .status
                .transition_to(ComponentState::Error, Some(reason));
        }
    }

    pub fn get_performance_metrics(&self) -> PerformanceMetrics {
        PerformanceMetrics::from_context(&self.context)
    }
}
