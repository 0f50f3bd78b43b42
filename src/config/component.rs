// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::consts::{DEFAULT_ERROR_THRESHOLD, DEFAULT_POLL_INTERVAL_MS};
use crate::protocol::CompressionType;

/// Settings shared by every component, whatever its behaviour.
///
/// # Fields
/// * `error_threshold` - Override of the harness-wide health threshold
/// * `compression` - Compression applied to outgoing messages
/// * `poll_interval_ms` - Receive timeout between shutdown checks
/// * `extra` - Any other keys, kept for behaviours with dynamic settings
///
/// # Example
/// ```yaml
/// settings:
///   error_threshold: 3
///   compression: gzip
///   poll_interval_ms: 20
///   region: eu-west
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    pub error_threshold: Option<u32>,
    pub compression: CompressionType,
    pub poll_interval_ms: Option<u64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl ComponentConfig {
    pub fn error_threshold(&self) -> u32 {
        self.error_threshold.unwrap_or(DEFAULT_ERROR_THRESHOLD)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    pub fn with_error_threshold(mut self, threshold: u32) -> Self {
        self.error_threshold = Some(threshold);
        self
    }

    pub fn with_compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = Some(interval_ms);
        self
    }
}
