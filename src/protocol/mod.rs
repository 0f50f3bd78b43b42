// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process message envelope and its wire encoding.
//!
//! A [`Message`] carries a JSON payload plus metadata (id, type, sender,
//! timestamp, compression). [`serialize`] turns it into a self-describing JSON
//! frame and [`deserialize`] is its exact inverse:
//!
//! ```
//! use serde_json::json;
//! use the_harness::protocol::{create_message, deserialize, serialize, CompressionType, MessageType};
//!
//! let message = create_message(json!({"reading": 42}), MessageType::Data, "sensor")
//!     .with_compression(CompressionType::Gzip);
//!
//! let frame = serialize(&message).unwrap();
//! let decoded = deserialize(&frame).unwrap();
//!
//! assert_eq!(decoded, message);
//! assert_eq!(serialize(&decoded).unwrap(), frame);
//! ```

mod codec;
mod message;

pub use codec::{deserialize, serialize, MessageCodec, MAX_FRAME_SIZE, PROTOCOL_VERSION};
pub use message::{create_message, CompressionType, ControlSignal, Message, MessageId, MessageType};
