// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Component lifecycle state machine.
//!
//! ```text
//! created  -> ready | stopping | error
//! ready    -> running | stopping | error
//! running  -> stopping | error
//! stopping -> stopped | error
//! stopped  -> (terminal)
//! error    -> (terminal)
//! ```

mod state;
mod status;

pub use state::ComponentState;
pub use status::{ComponentStatus, StateTransition};
