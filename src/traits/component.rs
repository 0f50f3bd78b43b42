// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::component::ComponentContext;
use crate::errors::ComponentResult;

/// Result of a single `process` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// More work may follow; the harness calls `process` again.
    Continue,
    /// The component has finished and should stop.
    Complete,
}

/// Behaviour plugged into a [`HarnessComponent`](crate::component::HarnessComponent).
///
/// The harness owns the lifecycle: it calls `setup` once, then `process` in a
/// loop until shutdown, completion or degradation, then `cleanup` once. All
/// I/O goes through the [`ComponentContext`], whose send/receive calls observe
/// the shutdown signal.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use the_harness::errors::ComponentResult;
/// use the_harness::traits::{Component, ComponentContext, ProcessOutcome};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Component for Echo {
///     async fn process(&mut self, ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome> {
///         if let Some(message) = ctx.receive_message("input", None).await? {
///             ctx.send_message("output", message.payload).await?;
///         }
///         Ok(ProcessOutcome::Continue)
///     }
///
///     fn kind(&self) -> &'static str {
///         "echo"
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send {
    async fn setup(&mut self, _ctx: &mut ComponentContext) -> ComponentResult<()> {
        Ok(())
    }

    async fn process(&mut self, ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome>;

    async fn cleanup(&mut self, _ctx: &mut ComponentContext) -> ComponentResult<()> {
        Ok(())
    }

    /// Short identifier for the behaviour, used in logs and reports.
    fn kind(&self) -> &'static str;
}
