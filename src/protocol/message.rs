// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Unique message identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Data,
    Control,
    Error,
    Heartbeat,
}

/// Payload compression, chosen per message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    #[default]
    None,
    Gzip,
}

/// Signals carried by `CONTROL` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSignal {
    /// The producer will send nothing more on this stream.
    EndOfStream,
    /// The producer asks downstream components to stop.
    Shutdown,
}

const SIGNAL_KEY: &str = "signal";

/// A framed unit of data exchanged between components.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub message_type: MessageType,
    pub payload: Value,
    pub compression: CompressionType,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn with_compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }

    /// Build a `CONTROL` message carrying `signal`.
    pub fn control(signal: ControlSignal, sender: &str) -> Self {
        let payload = serde_json::json!({ SIGNAL_KEY: signal });
        create_message(payload, MessageType::Control, sender)
    }

    /// The control signal of a `CONTROL` message, if it carries one.
    pub fn control_signal(&self) -> Option<ControlSignal> {
        if self.message_type != MessageType::Control {
            return None;
        }
        self.payload
            .get(SIGNAL_KEY)
            .and_then(|signal| serde_json::from_value(signal.clone()).ok())
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.control_signal() == Some(ControlSignal::EndOfStream)
    }
}

/// Build a message with a fresh id and the current timestamp.
pub fn create_message(payload: Value, message_type: MessageType, sender: &str) -> Message {
    Message {
        id: MessageId::new(),
        message_type,
        payload,
        compression: CompressionType::None,
        sender: sender.to_string(),
        timestamp: Utc::now(),
    }
}
