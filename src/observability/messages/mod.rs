// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_harness::observability::messages::harness::HarnessStarted;
//!
//! let msg = HarnessStarted {
//!     component_count: 3,
//!     connection_count: 2,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

pub mod component;
pub mod config;
pub mod harness;
pub mod stream;

use tracing::Span;

/// Emit a message as a structured `tracing` event.
pub trait StructuredLog: std::fmt::Display {
    /// Log the message at its documented level with structured fields.
    fn log(&self);
}

/// A message that marks the start of a unit of work and can open a span
/// covering it.
///
/// Async work is wrapped with [`tracing::Instrument::instrument`] rather than
/// an entered guard, which must not be held across an `.await`.
pub trait StructuredSpan: StructuredLog {
    /// Create a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
