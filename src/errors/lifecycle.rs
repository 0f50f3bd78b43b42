// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::lifecycle::ComponentState;

/// A lifecycle edge that is not in the allowed transition table.
///
/// The status that raised it is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid state transition: {from} -> {to}")]
pub struct InvalidStateTransition {
    pub from: ComponentState,
    pub to: ComponentState,
}
