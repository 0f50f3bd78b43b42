// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for endpoint registration and stream I/O.
//!
//! Registration errors are surfaced to the caller. I/O errors stay inside the
//! stream framework: the public send/receive API reports them as `false` /
//! `None` and counts them in the endpoint metrics.

use std::time::Duration;
use thiserror::Error;

use crate::errors::ProtocolError;
use crate::streams::{Direction, EndpointId};

#[derive(Error, Debug)]
pub enum StreamError {
    /// The (owner, port, direction) triple already has an endpoint.
    #[error("Endpoint '{owner}.{port}' ({direction}) is already registered")]
    DuplicateEndpoint {
        owner: String,
        port: String,
        direction: Direction,
    },

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(EndpointId),

    /// Send attempted on a receive endpoint, or the reverse.
    #[error("Endpoint {id} is a {actual} endpoint")]
    WrongDirection { id: EndpointId, actual: Direction },

    #[error("Endpoint {0} is closed")]
    Closed(EndpointId),

    /// The queue stayed full for the whole backpressure window.
    #[error("Send on endpoint {id} timed out after {timeout:?}")]
    Timeout { id: EndpointId, timeout: Duration },

    #[error("Operation on endpoint {0} was cancelled")]
    Cancelled(EndpointId),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
