// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events the trap listens to.
//!
//! Events are plain values owned by the host's dispatch. Handlers record their
//! decisions on the event ([`KeyEvent::prevent_default`],
//! [`PointerEvent::stop_propagation`], ...) and the host applies them after the
//! listener returns.

use alloc::string::String;

/// Listener registrations the trap asks the host for. All are document-level
/// and capturing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// `keydown`.
    KeyDown,
    /// `mousedown`.
    MouseDown,
    /// `touchstart`.
    TouchStart,
    /// `click`.
    Click,
}

impl ListenerKind {
    /// The pointer listeners wired while the lock is enabled.
    pub const POINTER: [Self; 3] = [Self::MouseDown, Self::TouchStart, Self::Click];
}

/// Legacy key code of the Escape key.
const ESCAPE_KEY_CODE: u32 = 27;
/// Legacy key code of the Tab key.
const TAB_KEY_CODE: u32 = 9;

/// A `keydown` event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent<E> {
    /// Key value (`"Tab"`, `"Escape"`, ...).
    pub key: String,
    /// Legacy key code, when the host provides one.
    pub key_code: Option<u32>,
    /// Whether Shift was held.
    pub shift: bool,
    /// The element the event was dispatched to (the focused element).
    pub target: E,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl<E> KeyEvent<E> {
    /// A key event for `key` dispatched to `target`.
    pub fn new(key: &str, target: E) -> Self {
        Self {
            key: key.into(),
            key_code: None,
            shift: false,
            target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Tab (or Shift+Tab when `shift` is set).
    pub fn tab(target: E, shift: bool) -> Self {
        Self {
            shift,
            key_code: Some(TAB_KEY_CODE),
            ..Self::new("Tab", target)
        }
    }

    /// Escape.
    pub fn escape(target: E) -> Self {
        Self {
            key_code: Some(ESCAPE_KEY_CODE),
            ..Self::new("Escape", target)
        }
    }

    /// Whether this is a Tab press, by key or legacy key code.
    pub fn is_tab(&self) -> bool {
        self.key == "Tab" || self.key_code == Some(TAB_KEY_CODE)
    }

    /// Whether this is an Escape press, by key (`Escape`, legacy `Esc`) or key code.
    pub fn is_escape(&self) -> bool {
        self.key == "Escape" || self.key == "Esc" || self.key_code == Some(ESCAPE_KEY_CODE)
    }

    /// Cancel the host's default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether [`KeyEvent::prevent_default`] was called.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop further propagation.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether [`KeyEvent::stop_propagation`] was called.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Kind of pointer interaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// `mousedown`.
    MouseDown,
    /// `touchstart`.
    TouchStart,
    /// `click`.
    Click,
}

impl From<PointerKind> for ListenerKind {
    fn from(kind: PointerKind) -> Self {
        match kind {
            PointerKind::MouseDown => Self::MouseDown,
            PointerKind::TouchStart => Self::TouchStart,
            PointerKind::Click => Self::Click,
        }
    }
}

/// A pointer event (`mousedown`, `touchstart`, or `click`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerEvent<E> {
    /// What kind of interaction this is.
    pub kind: PointerKind,
    /// The element under the pointer.
    pub target: E,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl<E> PointerEvent<E> {
    /// A pointer event of `kind` dispatched to `target`.
    pub fn new(kind: PointerKind, target: E) -> Self {
        Self {
            kind,
            target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Cancel the host's default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether [`PointerEvent::prevent_default`] was called.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop further propagation (and the remaining listeners on the current node).
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether [`PointerEvent::stop_propagation`] was called.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
