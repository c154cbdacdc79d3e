//! Probe phase state machine.

use serde::{Deserialize, Serialize};

/// How the browser settled a transient resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadEvent {
    Loaded,
    Errored,
}

/// Lifecycle of one attached resource.
///
/// State transitions:
/// - Idle -> Attached -> Succeeded
/// - Idle -> Attached -> Failed   (the browser fired an error event)
///
/// The first terminal state sticks; later events are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProbePhase {
    #[default]
    Idle,
    Attached,
    Succeeded,
    Failed,
}

impl ProbePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProbePhase::Succeeded | ProbePhase::Failed)
    }

    pub fn attach(self) -> Self {
        match self {
            ProbePhase::Idle => ProbePhase::Attached,
            other => other,
        }
    }

    /// Apply a browser event. Only an attached resource can settle.
    pub fn settle(self, event: LoadEvent) -> Self {
        match (self, event) {
            (ProbePhase::Attached, LoadEvent::Loaded) => ProbePhase::Succeeded,
            (ProbePhase::Attached, LoadEvent::Errored) => ProbePhase::Failed,
            (other, _) => other,
        }
    }
}
