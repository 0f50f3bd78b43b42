// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::{InvalidStateTransition, StreamError};

/// Errors raised by component behaviour.
///
/// These never cross component boundaries: the lifecycle driver records them
/// against the component's status and keeps going until the health threshold
/// is exceeded.
#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Port '{0}' is not connected")]
    UnknownPort(String),

    #[error("Failed to send on port '{0}'")]
    SendFailed(String),

    /// The port's queue stayed full for the whole send timeout; retry later.
    #[error("Port '{0}' is full")]
    Backpressure(String),

    /// The upstream side of an input port is gone and its queue is drained.
    #[error("Input '{0}' is closed")]
    StreamClosed(String),

    /// A suspension point observed the shutdown signal.
    #[error("Cancelled by shutdown")]
    Cancelled,

    /// A payload could not be transformed by the component's operation.
    #[error("Cannot apply '{operation}' to payload {payload}")]
    Transform { operation: String, payload: String },

    #[error("Setup timed out after {0:?}")]
    SetupTimeout(std::time::Duration),

    #[error(transparent)]
    Lifecycle(#[from] InvalidStateTransition),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ComponentResult<T> = Result<T, ComponentError>;
