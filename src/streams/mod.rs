// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded, named, directional message streams between components.
//!
//! A stream is a bounded `tokio::sync::mpsc` channel of encoded frames. Each
//! half is registered with the [`StreamFramework`] as an [`Endpoint`] owned by
//! one component. Producers feel backpressure when the queue is full: a send
//! waits up to the configured send timeout and then reports failure, it never
//! drops a message silently. Delivery on one endpoint is FIFO.

mod endpoint;
mod framework;

pub use endpoint::{Direction, Endpoint, EndpointId, EndpointMetricsSnapshot, RawStream};
pub use framework::StreamFramework;
