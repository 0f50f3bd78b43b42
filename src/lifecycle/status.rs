// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::config::consts::DEFAULT_ERROR_THRESHOLD;
use crate::errors::InvalidStateTransition;
use crate::lifecycle::ComponentState;
use crate::observability::messages::component::{
    ComponentErrorRecorded, HealthThresholdExceeded, StateChanged,
};
use crate::observability::messages::StructuredLog;

/// One entry of a component's lifecycle audit log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTransition {
    pub from: ComponentState,
    pub to: ComponentState,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle state machine with transition history and error accounting.
///
/// State is only ever changed through [`ComponentStatus::transition_to`] and
/// [`ComponentStatus::record_error`]; every predicate (`is_running`,
/// `is_healthy`, ...) is derived from the current state and counters.
///
/// # Examples
/// ```
/// use the_harness::lifecycle::{ComponentState, ComponentStatus};
///
/// let mut status = ComponentStatus::new("worker");
/// status.transition_to(ComponentState::Ready, Some("setup complete")).unwrap();
/// assert!(status.can_start());
///
/// // Skipping straight to stopped is not an edge of the table
/// assert!(status.transition_to(ComponentState::Stopped, None).is_err());
/// assert_eq!(status.state(), ComponentState::Ready);
/// ```
#[derive(Debug)]
pub struct ComponentStatus {
    component: String,
    state: ComponentState,
    history: Vec<StateTransition>,
    error_count: u32,
    last_error: Option<String>,
    error_threshold: u32,
    publisher: watch::Sender<ComponentState>,
}

impl ComponentStatus {
    /// Create a status in the `created` state with the default health threshold
    pub fn new(component: impl Into<String>) -> Self {
        Self::with_threshold(component, DEFAULT_ERROR_THRESHOLD)
    }

    pub fn with_threshold(component: impl Into<String>, error_threshold: u32) -> Self {
        let (publisher, _) = watch::channel(ComponentState::Created);
        Self {
            component: component.into(),
            state: ComponentState::Created,
            history: Vec::new(),
            error_count: 0,
            last_error: None,
            error_threshold,
            publisher,
        }
    }

    /// Move to `new_state` if the edge exists, appending to the history.
    pub fn transition_to(
        &mut self,
        new_state: ComponentState,
        reason: Option<&str>,
    ) -> Result<(), InvalidStateTransition> {
        let from = self.state;
        if !from.can_transition_to(new_state) {
            return Err(InvalidStateTransition { from, to: new_state });
        }

        self.state = new_state;
        self.history.push(StateTransition {
            from,
            to: new_state,
            reason: reason.map(str::to_string),
            timestamp: Utc::now(),
        });
        self.publisher.send_replace(new_state);

        StateChanged {
            component: &self.component,
            from,
            to: new_state,
            reason,
        }
        .log();

        Ok(())
    }

    /// Count an error and degrade to `error` once the threshold is exceeded.
    ///
    /// Degradation is one-way. A component that already stopped keeps its
    /// state; the error is still counted.
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.error_count = self.error_count.saturating_add(1);

        ComponentErrorRecorded {
            component: &self.component,
            error: &message,
            error_count: self.error_count,
            threshold: self.error_threshold,
        }
        .log();

        self.last_error = Some(message);

        if self.error_count > self.error_threshold
            && self.state.can_transition_to(ComponentState::Error)
        {
            HealthThresholdExceeded {
                component: &self.component,
                error_count: self.error_count,
                threshold: self.error_threshold,
            }
            .log();

            let reason = format!(
                "error count {} exceeded threshold {}",
                self.error_count, self.error_threshold
            );
            // The edge was checked above, so this cannot fail.
            let _ = self.transition_to(ComponentState::Error, Some(&reason));
        }
    }

    pub fn state(&self) -> ComponentState {
        self.state
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn error_threshold(&self) -> u32 {
        self.error_threshold
    }

    pub fn is_healthy(&self) -> bool {
        self.state != ComponentState::Error && self.error_count < self.error_threshold
    }

    pub fn is_running(&self) -> bool {
        self.state == ComponentState::Running
    }

    pub fn is_stopped(&self) -> bool {
        self.state == ComponentState::Stopped
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn can_start(&self) -> bool {
        self.state == ComponentState::Ready
    }

    /// Ordered audit log of every accepted transition
    pub fn get_transition_history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Watch the state without holding a reference to the status.
    pub fn subscribe(&self) -> watch::Receiver<ComponentState> {
        self.publisher.subscribe()
    }
}
