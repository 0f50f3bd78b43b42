// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for stream framework events.
//!
//! This module contains message types for logging events related to:
//! * Endpoint registration
//! * Backpressure timeouts and failed sends
//! * Frames that could not be decoded

use crate::observability::messages::StructuredLog;
use crate::streams::Direction;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Endpoint registered with the stream framework.
///
/// # Log Level
/// `debug!`
///
/// # Example
/// ```
/// use the_harness::observability::messages::stream::EndpointRegistered;
/// use the_harness::streams::Direction;
///
/// let msg = EndpointRegistered {
///     owner: "sink",
///     port: "input",
///     direction: Direction::Receive,
///     capacity: 100,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct EndpointRegistered<'a> {
    pub owner: &'a str,
    pub port: &'a str,
    pub direction: Direction,
    pub capacity: usize,
}

impl Display for EndpointRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered {} endpoint '{}.{}' with capacity {}",
            self.direction, self.owner, self.port, self.capacity
        )
    }
}

impl StructuredLog for EndpointRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            owner = self.owner,
            port = self.port,
            direction = %self.direction,
            capacity = self.capacity,
            "{}", self
        );
    }
}

/// Send gave up after the queue stayed full for the backpressure window.
///
/// # Log Level
/// `warn!` - Degraded behavior; the message was not enqueued and the caller
/// was told so
pub struct BackpressureTimeout<'a> {
    pub owner: &'a str,
    pub port: &'a str,
    pub timeout: Duration,
}

impl Display for BackpressureTimeout<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Endpoint '{}.{}' stayed full for {:?}; send rejected",
            self.owner, self.port, self.timeout
        )
    }
}

impl StructuredLog for BackpressureTimeout<'_> {
    fn log(&self) {
        tracing::warn!(
            owner = self.owner,
            port = self.port,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}

/// Send failed for a reason other than backpressure.
///
/// # Log Level
/// `warn!`
pub struct SendFailed<'a> {
    pub owner: &'a str,
    pub port: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for SendFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Send on endpoint '{}.{}' failed: {}",
            self.owner, self.port, self.error
        )
    }
}

impl StructuredLog for SendFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            owner = self.owner,
            port = self.port,
            error = %self.error,
            "{}", self
        );
    }
}

/// A dequeued frame could not be decoded and was discarded.
///
/// # Log Level
/// `error!` - Indicates a producer bug
pub struct FrameDecodeFailed<'a> {
    pub owner: &'a str,
    pub port: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for FrameDecodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discarding undecodable frame on '{}.{}': {}",
            self.owner, self.port, self.error
        )
    }
}

impl StructuredLog for FrameDecodeFailed<'_> {
    fn log(&self) {
        tracing::error!(
            owner = self.owner,
            port = self.port,
            error = %self.error,
            "{}", self
        );
    }
}
