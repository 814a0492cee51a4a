// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event propagation: listener registrations and capture → target → bubble walks.
//!
//! The tree does not own listener callbacks. It records *which* listeners are
//! registered (node, event type, phase) and builds propagation sequences; the
//! embedder walks a sequence with [`run`] and invokes its own callbacks for
//! entries where [`Document::has_event_listener`](crate::Document::has_event_listener)
//! reports a registration.
//!
//! ## Semantics
//!
//! - [`Document::propagation_path`](crate::Document::propagation_path) emits capture
//!   entries root → parent, one target entry, then bubble entries parent → root.
//! - [`Outcome::Stop`] aborts propagation immediately (no target/bubble if raised in capture).
//! - Higher‑level semantics such as "default prevented" live on the event payload
//!   passed to [`run`], not in [`Outcome`].
//!
//! ```
//! use understory_element_tree::events::{self, Outcome, Phase};
//! use understory_element_tree::{Document, ElementSpec};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let button = doc.insert(Some(body), ElementSpec::new("button"));
//!
//! let seq = doc.propagation_path(button);
//! let mut seen = Vec::new();
//! let stopped = events::run(&seq, &mut (), |d, _| {
//!     seen.push(d.phase);
//!     Outcome::Continue
//! });
//! assert!(stopped.is_none());
//! // document, body (capture) → button (target) → body, document (bubble)
//! assert_eq!(
//!     seen,
//!     vec![Phase::Capture, Phase::Capture, Phase::Target, Phase::Bubble, Phase::Bubble]
//! );
//! ```

use crate::types::NodeId;

/// Propagation phase of a dispatch entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Root → parent, before the target.
    Capture,
    /// The target itself.
    Target,
    /// Parent → root, after the target.
    Bubble,
}

/// Propagation control returned by a handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Keep going.
    Continue,
    /// Abort propagation immediately.
    Stop,
}

/// Event types the tree keeps listener registrations for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// `keydown`.
    KeyDown,
    /// `mousedown`.
    MouseDown,
    /// `touchstart`.
    TouchStart,
    /// `click`.
    Click,
}

/// A listener registration. Registering the same triple twice is a no-op.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Listener {
    /// Node the listener is attached to.
    pub node: NodeId,
    /// Event type it listens for.
    pub event: EventType,
    /// Whether it fires during the capture phase (otherwise target/bubble).
    pub capture: bool,
}

impl Listener {
    /// Whether this registration fires for `event` at `node` during `phase`.
    ///
    /// Capturing listeners fire in the capture and target phases; the others
    /// fire in the target and bubble phases.
    pub fn fires(&self, node: NodeId, event: EventType, phase: Phase) -> bool {
        self.node == node
            && self.event == event
            && match phase {
                Phase::Capture => self.capture,
                Phase::Target => true,
                Phase::Bubble => !self.capture,
            }
    }
}

/// One step of a propagation sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    /// Phase of this step.
    pub phase: Phase,
    /// Node visited by this step.
    pub node: NodeId,
}

impl Dispatch {
    /// A capture-phase step.
    pub fn capture(node: NodeId) -> Self {
        Self {
            phase: Phase::Capture,
            node,
        }
    }

    /// A target-phase step.
    pub fn target(node: NodeId) -> Self {
        Self {
            phase: Phase::Target,
            node,
        }
    }

    /// A bubble-phase step.
    pub fn bubble(node: NodeId) -> Self {
        Self {
            phase: Phase::Bubble,
            node,
        }
    }
}

/// Run a handler over a dispatch sequence and honor stop outcomes.
///
/// Returns `None` if the full sequence was visited, or the last visited entry
/// if a handler returned [`Outcome::Stop`].
pub fn run<'a, E>(
    seq: &'a [Dispatch],
    event: &mut E,
    mut handler: impl FnMut(&Dispatch, &mut E) -> Outcome,
) -> Option<&'a Dispatch> {
    for d in seq {
        match handler(d, event) {
            Outcome::Continue => {}
            Outcome::Stop => return Some(d),
        }
    }
    None
}
