// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::{ComponentError, ComponentResult};
use crate::traits::{Component, ComponentContext, ProcessOutcome};

/// A component that does nothing but wait for shutdown
pub struct IdleComponent;

#[async_trait]
impl Component for IdleComponent {
    async fn process(&mut self, ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome> {
        let interval = ctx.config().poll_interval();
        tokio::select! {
            _ = ctx.cancellation_token().cancelled() => {}
            _ = tokio::time::sleep(interval) => {}
        }
        Ok(ProcessOutcome::Continue)
    }

    fn kind(&self) -> &'static str {
        "idle"
    }
}

/// A component whose every `process` call fails, for failure-isolation tests
pub struct FailingComponent {
    pub reason: String,
}

impl FailingComponent {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Component for FailingComponent {
    async fn process(&mut self, _ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome> {
        Err(ComponentError::Processing(self.reason.clone()))
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}

/// A component that never checks the shutdown signal.
///
/// `process` sleeps for `stall` without looking at the cancellation token,
/// so only force-cancellation can stop it.
pub struct StallingComponent {
    pub stall: Duration,
}

impl StallingComponent {
    pub fn new(stall: Duration) -> Self {
        Self { stall }
    }
}

#[async_trait]
impl Component for StallingComponent {
    async fn process(&mut self, _ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome> {
        tokio::time::sleep(self.stall).await;
        Ok(ProcessOutcome::Continue)
    }

    fn kind(&self) -> &'static str {
        "stalling"
    }
}
