// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by trap operations.

use alloc::string::String;
use core::fmt;

/// Lifecycle state of a trap controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrapState {
    /// No trap is built.
    Unbuilt,
    /// Built, listeners wired.
    Active,
    /// Built, listeners unwired.
    Paused,
}

/// A lifecycle action that can be refused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// `PAUSE`.
    Pause,
    /// `RESUME`.
    Resume,
    /// `DEMOLISH`.
    Demolish,
}

/// An action attempted from a state that does not permit it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InvalidTransition {
    /// What was attempted.
    pub action: TransitionKind,
    /// The state the controller was in.
    pub state: TrapState,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.action {
            TransitionKind::Pause => "pause",
            TransitionKind::Resume => "resume",
            TransitionKind::Demolish => "demolish",
        };
        match self.state {
            TrapState::Unbuilt => write!(f, "cannot {verb} inexistent trap"),
            TrapState::Paused => f.write_str("trap is already paused"),
            TrapState::Active => f.write_str("trap is already active"),
        }
    }
}

/// Failure of a trap operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrapError {
    /// Every supplied root failed resolution or validation.
    #[error("none of the provided roots is a valid element")]
    NoValidRoot,
    /// The roots contain no tabbable element.
    #[error("there are no tabbable elements in the focus trap")]
    NoTabbableElements,
    /// The action is not permitted in the current state.
    #[error("{0}")]
    InvalidStateTransition(InvalidTransition),
}

impl From<InvalidTransition> for TrapError {
    fn from(t: InvalidTransition) -> Self {
        Self::InvalidStateTransition(t)
    }
}

/// An action name that is not `PAUSE`, `RESUME`, or `DEMOLISH`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown focus trap action `{0}`")]
pub struct ParseActionError(pub String);

/// What a listener does with an error it cannot return to its caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerErrors {
    /// Panic with the error message.
    Raise,
    /// Log the error at `error` level and carry on.
    Silent,
}

impl Default for ListenerErrors {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Raise
        } else {
            Self::Silent
        }
    }
}

impl ListenerErrors {
    /// Surface `err` raised while handling `event`.
    pub(crate) fn surface(self, event: &str, err: TrapError) {
        match self {
            Self::Raise => panic!("focus trap {event} listener failed: {err}"),
            Self::Silent => tracing::error!(event, error = %err, "focus trap listener failed"),
        }
    }
}
