// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while framing or unframing messages.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Envelope or payload could not be encoded/decoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Compressed payload was not valid base64.
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Compression or decompression of the payload failed.
    #[error("Compression error: {0}")]
    Compression(#[from] std::io::Error),

    /// Frame decoded but violates the envelope contract.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Envelope carries a protocol version this build cannot read.
    #[error("Unsupported protocol version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },
}
