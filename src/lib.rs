// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod component;      // harness wrapper + context
pub mod components;     // built-in behaviours
pub mod config;         // pipeline files + builder
pub mod errors;         // error handling
pub mod harness;        // system execution harness
pub mod lifecycle;      // states + status tracking
pub mod observability;
pub mod protocol;       // message envelope + codec
pub mod streams;        // bounded streams + endpoints
pub mod traits;         // unified abstractions
