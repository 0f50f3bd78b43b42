// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod component;
mod config;
mod harness;
mod lifecycle;
mod protocol;
mod stream;

pub use component::{ComponentError, ComponentResult};
pub use config::{ConfigError, ValidationError};
pub use harness::HarnessError;
pub use lifecycle::InvalidStateTransition;
pub use protocol::ProtocolError;
pub use stream::StreamError;
