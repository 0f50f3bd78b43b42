// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::ComponentResult;
use crate::protocol::ControlSignal;
use crate::traits::{Broadcast, Component, ComponentContext, ProcessOutcome};

/// Settings for a [`Generator`].
///
/// # Example
/// ```yaml
/// - name: numbers
///   kind: generator
///   count: 5
///   interval_ms: 10
///   prefix: item
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratorConfig {
    pub count: u64,
    #[serde(default)]
    pub interval_ms: u64,
    /// Emit `"{prefix}-{n}"` strings instead of bare numbers
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Emits `count` data messages on every output, then end-of-stream.
///
/// Items are numbered from 1. An item held up by a full output is retried on
/// the next call, and only on the ports that have not taken it yet.
pub struct Generator {
    config: GeneratorConfig,
    emitted: u64,
    pending: Option<Broadcast>,
    finished: bool,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            emitted: 0,
            pending: None,
            finished: false,
        }
    }

    fn item(&self, n: u64) -> Value {
        match &self.config.prefix {
            Some(prefix) => json!(format!("{}-{}", prefix, n)),
            None => json!(n),
        }
    }
}

#[async_trait]
impl Component for Generator {
    async fn process(&mut self, ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome> {
        if !ctx.flush(&mut self.pending).await? {
            return Ok(ProcessOutcome::Continue);
        }
        if self.finished {
            return Ok(ProcessOutcome::Complete);
        }

        if self.emitted >= self.config.count {
            self.finished = true;
            self.pending = Some(ctx.start_broadcast_control(ControlSignal::EndOfStream));
            let outcome = if ctx.flush(&mut self.pending).await? {
                ProcessOutcome::Complete
            } else {
                ProcessOutcome::Continue
            };
            return Ok(outcome);
        }

        self.emitted += 1;
        self.pending = Some(ctx.start_broadcast(self.item(self.emitted)));
        if !ctx.flush(&mut self.pending).await? {
            return Ok(ProcessOutcome::Continue);
        }

        if self.config.interval_ms > 0 {
            let pause = Duration::from_millis(self.config.interval_ms);
            tokio::select! {
                _ = ctx.cancellation_token().cancelled() => {}
                _ = tokio::time::sleep(pause) => {}
            }
        }
        Ok(ProcessOutcome::Continue)
    }

    fn kind(&self) -> &'static str {
        "generator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_use_prefix_when_set() {
        let plain = Generator::new(GeneratorConfig {
            count: 1,
            ..Default::default()
        });
        let prefixed = Generator::new(GeneratorConfig {
            count: 1,
            interval_ms: 0,
            prefix: Some("item".into()),
        });

        assert_eq!(plain.item(3), json!(3));
        assert_eq!(prefixed.item(3), json!("item-3"));
    }

    #[test]
    fn test_config_defaults() {
        let config: GeneratorConfig = serde_yaml::from_str("count: 4").unwrap();
        assert_eq!(config.count, 4);
        assert_eq!(config.interval_ms, 0);
        assert_eq!(config.prefix, None);
    }
}
