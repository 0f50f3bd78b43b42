// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! System execution harness: registry, wiring and the concurrent driver.

mod ports;
mod report;
mod system;

#[cfg(test)]
mod integration_tests;

pub use ports::{ComponentRef, Connection, PortRef};
pub use report::{HarnessReport, HarnessStatus};
pub use system::SystemExecutionHarness;
