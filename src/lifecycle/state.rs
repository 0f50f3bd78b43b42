// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a harness component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    Created,
    Ready,
    Running,
    Stopping,
    Stopped,
    Error,
}

impl ComponentState {
    pub const ALL: [ComponentState; 6] = [
        ComponentState::Created,
        ComponentState::Ready,
        ComponentState::Running,
        ComponentState::Stopping,
        ComponentState::Stopped,
        ComponentState::Error,
    ];

    /// Check whether `self -> to` is an edge of the transition table.
    pub fn can_transition_to(self, to: ComponentState) -> bool {
        use ComponentState::*;
        matches!(
            (self, to),
            (Created, Ready)
                | (Created, Stopping)
                | (Created, Error)
                | (Ready, Running)
                | (Ready, Stopping)
                | (Ready, Error)
                | (Running, Stopping)
                | (Running, Error)
                | (Stopping, Stopped)
                | (Stopping, Error)
        )
    }

    /// No edge leaves a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, ComponentState::Stopped | ComponentState::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentState::Created => "created",
            ComponentState::Ready => "ready",
            ComponentState::Running => "running",
            ComponentState::Stopping => "stopping",
            ComponentState::Stopped => "stopped",
            ComponentState::Error => "error",
        }
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_non_stopped_state_can_fail() {
        for state in ComponentState::ALL {
            let expected = !state.is_terminal();
            assert_eq!(state.can_transition_to(ComponentState::Error), expected, "{}", state);
        }
    }

    #[test]
    fn test_terminal_states_have_no_outgoing_edges() {
        for from in [ComponentState::Stopped, ComponentState::Error] {
            for to in ComponentState::ALL {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_running_requires_ready() {
        for from in ComponentState::ALL {
            let allowed = from.can_transition_to(ComponentState::Running);
            assert_eq!(allowed, from == ComponentState::Ready, "{} -> running", from);
        }
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ComponentState::Stopping).unwrap();
        assert_eq!(json, "\"stopping\"");
        let back: ComponentState = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(back, ComponentState::Error);
    }
}
