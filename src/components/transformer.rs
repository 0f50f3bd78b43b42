// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::components::DEFAULT_INPUT_PORT;
use crate::errors::{ComponentError, ComponentResult};
use crate::protocol::{ControlSignal, MessageType};
use crate::traits::{Broadcast, Component, ComponentContext, ProcessOutcome};

/// Operation a [`Transformer`] applies to each data payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    #[default]
    Identity,
    Uppercase,
    Lowercase,
    /// Reverse a string's characters or an array's elements
    Reverse,
    /// Multiply a number by `factor`
    Scale,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Identity => "identity",
            Operation::Uppercase => "uppercase",
            Operation::Lowercase => "lowercase",
            Operation::Reverse => "reverse",
            Operation::Scale => "scale",
        }
    }
}

/// Settings for a [`Transformer`].
///
/// # Example
/// ```yaml
/// - name: doubler
///   kind: transformer
///   operation: scale
///   factor: 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransformerConfig {
    #[serde(default)]
    pub operation: Operation,
    #[serde(default = "default_factor")]
    pub factor: f64,
}

fn default_factor() -> f64 {
    1.0
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            operation: Operation::default(),
            factor: default_factor(),
        }
    }
}

/// Reads `input`, applies its operation and broadcasts the result.
///
/// End-of-stream (or a closed input) is forwarded to every output before the
/// transformer completes. Payloads the operation cannot handle are reported
/// as errors and dropped. No new input is read while a result is waiting on
/// a full output.
pub struct Transformer {
    config: TransformerConfig,
    pending: Option<Broadcast>,
    finished: bool,
}

impl Transformer {
    pub fn new(config: TransformerConfig) -> Self {
        Self {
            config,
            pending: None,
            finished: false,
        }
    }

    async fn finish(
        &mut self,
        ctx: &mut ComponentContext,
        signal: ControlSignal,
    ) -> ComponentResult<ProcessOutcome> {
        self.finished = true;
        self.pending = Some(ctx.start_broadcast_control(signal));
        if ctx.flush(&mut self.pending).await? {
            Ok(ProcessOutcome::Complete)
        } else {
            Ok(ProcessOutcome::Continue)
        }
    }

    pub fn apply(&self, payload: Value) -> ComponentResult<Value> {
        let operation = self.config.operation;
        let transformed = match (operation, payload) {
            (Operation::Identity, value) => Some(value),
            (Operation::Uppercase, Value::String(s)) => Some(Value::String(s.to_uppercase())),
            (Operation::Lowercase, Value::String(s)) => Some(Value::String(s.to_lowercase())),
            (Operation::Reverse, Value::String(s)) => Some(Value::String(s.chars().rev().collect())),
            (Operation::Reverse, Value::Array(mut items)) => {
                items.reverse();
                Some(Value::Array(items))
            }
            (Operation::Scale, Value::Number(n)) => n
                .as_f64()
                .map(|x| x * self.config.factor)
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            (_, other) => {
                return Err(ComponentError::Transform {
                    operation: operation.as_str().to_string(),
                    payload: other.to_string(),
                })
            }
        };

        transformed.ok_or_else(|| ComponentError::Transform {
            operation: operation.as_str().to_string(),
            payload: "non-finite result".to_string(),
        })
    }
}

#[async_trait]
impl Component for Transformer {
    async fn process(&mut self, ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome> {
        if !ctx.flush(&mut self.pending).await? {
            return Ok(ProcessOutcome::Continue);
        }
        if self.finished {
            return Ok(ProcessOutcome::Complete);
        }

        let poll = Some(ctx.config().poll_interval());
        let message = match ctx.receive_message(DEFAULT_INPUT_PORT, poll).await {
            Ok(Some(message)) => message,
            Ok(None) => return Ok(ProcessOutcome::Continue),
            Err(ComponentError::StreamClosed(_)) => {
                return self.finish(ctx, ControlSignal::EndOfStream).await;
            }
            Err(e) => return Err(e),
        };

        if let Some(signal) = message.control_signal() {
            return self.finish(ctx, signal).await;
        }

        match message.message_type {
            MessageType::Data => {
                let output = self.apply(message.payload)?;
                self.pending = Some(ctx.start_broadcast(output));
                ctx.flush(&mut self.pending).await?;
            }
            MessageType::Error => {
                self.pending = Some(ctx.start_broadcast_typed(message.payload, MessageType::Error));
                ctx.flush(&mut self.pending).await?;
            }
            MessageType::Control | MessageType::Heartbeat => {}
        }
        Ok(ProcessOutcome::Continue)
    }

    fn kind(&self) -> &'static str {
        "transformer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transformer(operation: Operation) -> Transformer {
        Transformer::new(TransformerConfig {
            operation,
            factor: 2.5,
        })
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(transformer(Operation::Uppercase).apply(json!("abc")).unwrap(), json!("ABC"));
        assert_eq!(transformer(Operation::Lowercase).apply(json!("AbC")).unwrap(), json!("abc"));
        assert_eq!(transformer(Operation::Reverse).apply(json!("abc")).unwrap(), json!("cba"));
        assert_eq!(
            transformer(Operation::Reverse).apply(json!([1, 2, 3])).unwrap(),
            json!([3, 2, 1])
        );
    }

    #[test]
    fn test_scale_multiplies_numbers() {
        assert_eq!(transformer(Operation::Scale).apply(json!(4)).unwrap(), json!(10.0));
    }

    #[test]
    fn test_identity_passes_anything() {
        let payload = json!({"nested": [null, true]});
        assert_eq!(transformer(Operation::Identity).apply(payload.clone()).unwrap(), payload);
    }

    #[test]
    fn test_mismatched_payload_is_a_transform_error() {
        let err = transformer(Operation::Uppercase).apply(json!(42)).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::Transform { ref operation, ref payload } if operation == "uppercase" && payload == "42"
        ));
    }

    #[test]
    fn test_config_parses_operation_names() {
        let config: TransformerConfig = serde_yaml::from_str("operation: scale\nfactor: 3").unwrap();
        assert_eq!(config.operation, Operation::Scale);
        assert_eq!(config.factor, 3.0);

        let config: TransformerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, TransformerConfig::default());
    }
}
