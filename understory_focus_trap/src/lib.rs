// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_focus_trap --heading-base-level=0

//! Understory Focus Trap: keep keyboard focus inside a set of regions.
//!
//! A focus trap confines Tab and Shift+Tab navigation to one or more *root*
//! elements (a modal dialog, or a dialog plus a toast) while the tab order
//! inside those roots stays exactly what the host would do natively. The trap
//! only steps in at the edges: on the last stop of a root, on a focus that
//! wandered outside, or whenever positive `tabindex` values are involved.
//!
//! The crate is built from:
//! - a **host abstraction** ([`Host`]) over an element tree with focus,
//!   listener registrations, and mutation observation;
//! - a **focusability predicate** ([`tabbable`]) deciding which elements are
//!   tab stops and in which tier;
//! - a **destination resolver** ([`get_destination`]) mapping an origin and a
//!   direction to the next stop, or to [`Destination::NoOp`] when native
//!   navigation already does the right thing;
//! - a **controller** ([`FocusTrap`]) with an `Unbuilt → Active ⇄ Paused`
//!   lifecycle, and a [`TrapStack`] for nested traps;
//! - a **reactivity filter** ([`reactivity`]) that decides when tree mutations
//!   invalidate the cached tab-order boundaries.
//!
//! ## Tab order
//!
//! The sequence the trap enforces is every positive-tier stop across all roots,
//! sorted by `tabindex` then document position, followed by each root's
//! zero-tier stops in document order, roots in document order. Tab past the end
//! wraps to the start and Shift+Tab before the start wraps to the end.
//!
//! ## Example
//!
//! ```rust
//! # #[cfg(feature = "element_tree_adapter")]
//! # {
//! use understory_element_tree::{Document, ElementSpec};
//! use understory_focus_trap::adapters::element_tree::{press_escape, press_tab};
//! use understory_focus_trap::{FocusTrap, TrapConfig, TrapState};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let opener = doc.insert(Some(body), ElementSpec::new("button"));
//! let dialog = doc.insert(Some(body), ElementSpec::new("div").attr("id", "dialog"));
//! let name = doc.insert(Some(dialog), ElementSpec::new("input"));
//! let save = doc.insert(Some(dialog), ElementSpec::new("button").attr("tabindex", "1"));
//! doc.focus(opener);
//!
//! let mut trap = FocusTrap::new();
//! trap.build(&mut doc, TrapConfig::new(["dialog"])).unwrap();
//! // Positive tab indices come first.
//! assert_eq!(doc.active_element(), save);
//! assert_eq!(press_tab(&mut doc, &mut trap, false), name);
//! assert_eq!(press_tab(&mut doc, &mut trap, false), save);
//!
//! // Escape demolishes the trap and returns focus to the opener.
//! press_escape(&mut doc, &mut trap);
//! assert_eq!(trap.state(), TrapState::Unbuilt);
//! assert_eq!(doc.active_element(), opener);
//! # }
//! ```
//!
//! ## Errors
//!
//! Operations return [`TrapError`]. Failures raised inside listeners have no
//! caller to return to; [`ListenerErrors`] decides whether they panic or are
//! logged through `tracing`.
//!
//! ## Logging
//!
//! The crate emits `tracing` events: `warn` for dropped roots and unusable
//! focus targets, `debug` for lifecycle transitions, `trace` for resolved
//! destinations. Install a subscriber to see them.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//! - `element_tree_adapter` (default): enables the [`adapters::element_tree`] module,
//!   which implements [`Host`] for `understory_element_tree::Document`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod error;
mod event;
mod host;
mod order;
pub mod reactivity;
mod resolver;
mod roots;
mod stack;
pub mod tabbable;
mod trap;

#[cfg(feature = "element_tree_adapter")]
pub mod adapters;

pub use config::{
    Escape, EscapeHandler, InitialFocus, Lock, PointerHandler, ReturnFocus, TrapConfig,
};
pub use error::{
    InvalidTransition, ListenerErrors, ParseActionError, TrapError, TrapState, TransitionKind,
};
pub use event::{KeyEvent, ListenerKind, PointerEvent, PointerKind};
pub use host::{ComputedStyle, Display, Host, Mutation, OBSERVED_ATTRIBUTES, Visibility};
pub use order::{Boundaries, Span, TabOrder};
pub use resolver::{Destination, Direction, get_destination, resolve};
pub use roots::{ElementRef, OrderedRoots, normalise_roots};
pub use stack::TrapStack;
pub use tabbable::Tier;
pub use trap::{FocusTrap, TrapAction, TrapListener};
