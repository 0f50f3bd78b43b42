// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod component;

pub use crate::component::{Broadcast, ComponentContext};
pub use component::{Component, ProcessOutcome};
