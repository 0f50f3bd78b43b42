// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational log lines in the harness come from the
//! message types in [`messages`]. Each type implements `Display` for the human
//! readable line and [`messages::StructuredLog`] to emit a `tracing` event
//! carrying the same data as structured fields. Messages that start a unit of
//! work (harness run, component setup, process loop, cleanup) also implement
//! [`messages::StructuredSpan`] and open the span that work runs in.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::component` - component lifecycle, errors and health
//! * `messages::stream` - endpoint registration and stream I/O faults
//! * `messages::harness` - registration, wiring, run and shutdown
//! * `messages::config` - pipeline file loading and validation
//!
//! # Usage
//!
//! ```rust
//! use the_harness::observability::messages::component::ProcessFailed;
//! use the_harness::observability::messages::StructuredLog;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! ProcessFailed {
//!     component: "transformer",
//!     error: &error,
//! }
//! .log();
//! ```
//!
//! Subscriber installation happens in the binary; see [`init_tracing`].

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `log_level` when set. Calling this twice is harmless;
/// the second installation is ignored.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
