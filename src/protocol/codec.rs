// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! JSON frame encoding for [`Message`].
//!
//! # Frame layout
//!
//! ```json
//! {
//!   "version": 1,
//!   "id": "6f0c3c8e-...",
//!   "type": "data",
//!   "sender": "generator",
//!   "timestamp": "2025-01-01T00:00:00.000000001Z",
//!   "compression": "gzip",
//!   "payload": "H4sIAAAAAAAA/..."
//! }
//! ```
//!
//! With `"compression": "none"` the payload is embedded as plain JSON. With
//! `"gzip"` the JSON-encoded payload is gzip-compressed and stored as a base64
//! string. Unknown fields are rejected so nothing is silently dropped.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};

use crate::errors::ProtocolError;
use crate::protocol::{CompressionType, Message, MessageId, MessageType};

/// Envelope version written by this build
pub const PROTOCOL_VERSION: u32 = 1;

/// Default cap on encoded frames and decompressed payloads (16 MiB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    version: u32,
    id: MessageId,
    #[serde(rename = "type")]
    message_type: MessageType,
    sender: String,
    timestamp: DateTime<Utc>,
    compression: CompressionType,
    payload: Value,
}

/// Encoder/decoder with a configurable frame size limit.
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    max_frame_size: usize,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(MAX_FRAME_SIZE)
    }
}

impl MessageCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    pub fn encode(&self, message: &Message) -> Result<Vec<u8>, ProtocolError> {
        let payload = match message.compression {
            CompressionType::None => message.payload.clone(),
            CompressionType::Gzip => Value::String(compress_payload(&message.payload)?),
        };

        let envelope = Envelope {
            version: PROTOCOL_VERSION,
            id: message.id,
            message_type: message.message_type,
            sender: message.sender.clone(),
            timestamp: message.timestamp,
            compression: message.compression,
            payload,
        };

        let frame = serde_json::to_vec(&envelope)?;
        self.check_size(frame.len())?;
        Ok(frame)
    }

    pub fn decode(&self, frame: &[u8]) -> Result<Message, ProtocolError> {
        self.check_size(frame.len())?;

        let envelope: Envelope = serde_json::from_slice(frame)?;
        if envelope.version != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedVersion {
                found: envelope.version,
                expected: PROTOCOL_VERSION,
            });
        }

        let payload = match envelope.compression {
            CompressionType::None => envelope.payload,
            CompressionType::Gzip => match envelope.payload {
                Value::String(encoded) => self.decompress_payload(&encoded)?,
                other => {
                    return Err(ProtocolError::MalformedFrame(format!(
                        "gzip payload must be a base64 string, found {}",
                        json_kind(&other)
                    )))
                }
            },
        };

        Ok(Message {
            id: envelope.id,
            message_type: envelope.message_type,
            payload,
            compression: envelope.compression,
            sender: envelope.sender,
            timestamp: envelope.timestamp,
        })
    }

    fn check_size(&self, size: usize) -> Result<(), ProtocolError> {
        if size > self.max_frame_size {
            return Err(ProtocolError::FrameTooLarge {
                size,
                max: self.max_frame_size,
            });
        }
        Ok(())
    }

    fn decompress_payload(&self, encoded: &str) -> Result<Value, ProtocolError> {
        let compressed = STANDARD.decode(encoded)?;

        // Read one byte past the limit so an oversized payload is detectable
        let limit = self.max_frame_size as u64 + 1;
        let mut raw = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .take(limit)
            .read_to_end(&mut raw)?;
        self.check_size(raw.len())?;

        Ok(serde_json::from_slice(&raw)?)
    }
}

fn compress_payload(payload: &Value) -> Result<String, ProtocolError> {
    let raw = serde_json::to_vec(payload)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Encode a message with the default codec.
pub fn serialize(message: &Message) -> Result<Vec<u8>, ProtocolError> {
    MessageCodec::default().encode(message)
}

/// Decode a frame with the default codec.
pub fn deserialize(frame: &[u8]) -> Result<Message, ProtocolError> {
    MessageCodec::default().decode(frame)
}
