// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::{ComponentError, ComponentResult};
use crate::protocol::MessageType;
use crate::traits::{Component, ComponentContext, ProcessOutcome};

/// Settings for a [`Sink`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SinkConfig {
    /// Complete after collecting this many payloads
    #[serde(default)]
    pub max_items: Option<usize>,
}

/// Shared view of what a [`Sink`] has collected.
#[derive(Debug, Clone, Default)]
pub struct Collected(Arc<Mutex<Vec<Value>>>);

impl Collected {
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, value: Value) -> usize {
        let mut items = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        items.push(value);
        items.len()
    }
}

/// Collects data payloads from all of its inputs.
///
/// Completes once every input has delivered end-of-stream or closed, or when
/// `max_items` is reached. Heartbeats are skipped.
pub struct Sink {
    config: SinkConfig,
    collected: Collected,
    finished_ports: HashSet<String>,
}

impl Sink {
    pub fn new(config: SinkConfig) -> Self {
        Self {
            config,
            collected: Collected::default(),
            finished_ports: HashSet::new(),
        }
    }

    /// Handle that stays valid after the sink is moved into a harness.
    pub fn collected(&self) -> Collected {
        self.collected.clone()
    }
}

#[async_trait]
impl Component for Sink {
    async fn process(&mut self, ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome> {
        let poll = Some(ctx.config().poll_interval());
        let (port, message) = match ctx.receive_from_any(poll).await {
            Ok(Some(received)) => received,
            Ok(None) => return Ok(ProcessOutcome::Continue),
            Err(ComponentError::StreamClosed(_)) | Err(ComponentError::UnknownPort(_)) => {
                return Ok(ProcessOutcome::Complete)
            }
            Err(e) => return Err(e),
        };

        if message.is_end_of_stream() {
            self.finished_ports.insert(port);
            let all_done = ctx.input_ports().all(|p| self.finished_ports.contains(p));
            return Ok(if all_done {
                ProcessOutcome::Complete
            } else {
                ProcessOutcome::Continue
            });
        }

        if message.message_type == MessageType::Data {
            let count = self.collected.push(message.payload);
            if self.config.max_items.is_some_and(|max| count >= max) {
                return Ok(ProcessOutcome::Complete);
            }
        }
        Ok(ProcessOutcome::Continue)
    }

    fn kind(&self) -> &'static str {
        "sink"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collected_handle_is_shared() {
        let sink = Sink::new(SinkConfig::default());
        let handle = sink.collected();
        assert!(handle.is_empty());

        sink.collected.push(json!(1));
        sink.collected.push(json!("two"));
        assert_eq!(handle.snapshot(), vec![json!(1), json!("two")]);
    }
}
