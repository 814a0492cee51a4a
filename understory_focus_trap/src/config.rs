// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trap configuration.
//!
//! ```
//! use understory_focus_trap::{Escape, InitialFocus, Lock, TrapConfig};
//!
//! let config: TrapConfig<u32> = TrapConfig::new(["dialog", "toast"])
//!     .initial_focus(InitialFocus::Element("confirm".into()))
//!     .lock(Lock::Disabled)
//!     .escape(Escape::custom(|ev| ev.prevent_default()));
//! assert_eq!(config.roots().len(), 2);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::event::{KeyEvent, PointerEvent};
use crate::roots::ElementRef;

/// Boxed pointer handler used by [`Lock::Custom`].
pub type PointerHandler<E> = Box<dyn FnMut(&mut PointerEvent<E>)>;
/// Boxed key handler used by [`Escape::Custom`].
pub type EscapeHandler<E> = Box<dyn FnMut(&mut KeyEvent<E>)>;

/// Where focus goes when the trap is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitialFocus<E> {
    /// The first tab stop: first positive-tier, else first zero-tier.
    First,
    /// Leave focus alone.
    None,
    /// This element, falling back to [`InitialFocus::First`] when it cannot
    /// be resolved or focused.
    Element(ElementRef<E>),
}

impl<E> Default for InitialFocus<E> {
    fn default() -> Self {
        Self::First
    }
}

/// Where focus goes when the trap is demolished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnFocus<E> {
    /// Whatever had focus just before the trap was built.
    Previous,
    /// Leave focus alone.
    None,
    /// This element.
    Element(ElementRef<E>),
}

impl<E> Default for ReturnFocus<E> {
    fn default() -> Self {
        Self::Previous
    }
}

/// Pointer interaction outside the roots.
pub enum Lock<E> {
    /// Block it: prevent default and stop propagation.
    Enabled,
    /// Let it through.
    Disabled,
    /// Hand every pointer event to this handler instead.
    Custom(PointerHandler<E>),
}

impl<E> Default for Lock<E> {
    fn default() -> Self {
        Self::Enabled
    }
}

impl<E> Lock<E> {
    /// Wrap a closure as [`Lock::Custom`].
    pub fn custom(f: impl FnMut(&mut PointerEvent<E>) + 'static) -> Self {
        Self::Custom(Box::new(f))
    }

    /// Whether pointer listeners are wired at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl<E> fmt::Debug for Lock<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => f.write_str("Enabled"),
            Self::Disabled => f.write_str("Disabled"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// What the Escape key does.
pub enum Escape<E> {
    /// Demolish the trap (pop it, for a stack).
    Demolish,
    /// Nothing.
    Disabled,
    /// Call this handler instead.
    Custom(EscapeHandler<E>),
}

impl<E> Default for Escape<E> {
    fn default() -> Self {
        Self::Demolish
    }
}

impl<E> Escape<E> {
    /// Wrap a closure as [`Escape::Custom`].
    pub fn custom(f: impl FnMut(&mut KeyEvent<E>) + 'static) -> Self {
        Self::Custom(Box::new(f))
    }
}

impl<E> fmt::Debug for Escape<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demolish => f.write_str("Demolish"),
            Self::Disabled => f.write_str("Disabled"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Everything needed to build a trap.
#[derive(Debug)]
pub struct TrapConfig<E> {
    pub(crate) roots: Vec<ElementRef<E>>,
    pub(crate) initial_focus: InitialFocus<E>,
    pub(crate) return_focus: ReturnFocus<E>,
    pub(crate) lock: Lock<E>,
    pub(crate) escape: Escape<E>,
}

impl<E> TrapConfig<E> {
    /// A configuration with the given roots and default options.
    pub fn new<R: Into<ElementRef<E>>>(roots: impl IntoIterator<Item = R>) -> Self {
        Self::from_refs(roots.into_iter().map(Into::into).collect())
    }

    /// A configuration whose roots are element handles.
    pub fn with_elements(roots: impl IntoIterator<Item = E>) -> Self {
        Self::from_refs(roots.into_iter().map(ElementRef::Element).collect())
    }

    fn from_refs(roots: Vec<ElementRef<E>>) -> Self {
        Self {
            roots,
            initial_focus: InitialFocus::default(),
            return_focus: ReturnFocus::default(),
            lock: Lock::default(),
            escape: Escape::default(),
        }
    }

    /// The root references, as supplied.
    pub fn roots(&self) -> &[ElementRef<E>] {
        &self.roots
    }

    /// Set the initial focus.
    #[must_use]
    pub fn initial_focus(mut self, initial_focus: InitialFocus<E>) -> Self {
        self.initial_focus = initial_focus;
        self
    }

    /// Set the return focus.
    #[must_use]
    pub fn return_focus(mut self, return_focus: ReturnFocus<E>) -> Self {
        self.return_focus = return_focus;
        self
    }

    /// Set the pointer lock.
    #[must_use]
    pub fn lock(mut self, lock: Lock<E>) -> Self {
        self.lock = lock;
        self
    }

    /// Set the Escape behavior.
    #[must_use]
    pub fn escape(mut self, escape: Escape<E>) -> Self {
        self.escape = escape;
        self
    }
}

impl<E> From<Vec<ElementRef<E>>> for TrapConfig<E> {
    fn from(roots: Vec<ElementRef<E>>) -> Self {
        Self::from_refs(roots)
    }
}
