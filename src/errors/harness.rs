// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced while building or starting a harness.
//!
//! Everything here fails fast at wiring time, before any component task is
//! spawned.

use thiserror::Error;

use crate::errors::{ConfigError, InvalidStateTransition, StreamError};
use crate::streams::Direction;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Component '{0}' is already registered")]
    DuplicateComponent(String),

    #[error("Component '{0}' is not registered")]
    UnknownComponent(String),

    /// The port already has an endpoint; the existing wiring is untouched.
    #[error("Port '{component}.{port}' ({direction}) is already connected")]
    PortAlreadyConnected {
        component: String,
        port: String,
        direction: Direction,
    },

    #[error("Port '{component}.{port}' is an {actual} port, expected {expected}")]
    PortDirectionMismatch {
        component: String,
        port: String,
        expected: Direction,
        actual: Direction,
    },

    /// A "component.port" address could not be parsed.
    #[error("Invalid port address '{0}' (expected 'component.port')")]
    InvalidPortAddress(String),

    /// Wiring or running attempted after `run()` has started.
    #[error("Harness has already been started")]
    AlreadyStarted,

    #[error(transparent)]
    InvalidStateTransition(#[from] InvalidStateTransition),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
