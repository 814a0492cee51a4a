// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The trap controller and its lifecycle.
//!
//! ```text
//!            build                pause
//! Unbuilt ----------> Active <-----------> Paused
//!    ^                  |        resume      |
//!    +---- demolish ----+--------------------+
//! ```
//!
//! A controller owns no elements. It registers listener kinds and mutation
//! subscriptions with the [`Host`], and the host calls back through
//! [`TrapListener`] while those registrations exist.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use smallvec::SmallVec;

use crate::config::{Escape, InitialFocus, Lock, ReturnFocus, TrapConfig};
use crate::error::{
    InvalidTransition, ListenerErrors, ParseActionError, TrapError, TrapState, TransitionKind,
};
use crate::event::{KeyEvent, ListenerKind, PointerEvent};
use crate::host::Host;
use crate::order::{Boundaries, TabOrder};
use crate::reactivity::{any_qualifies, needs_recompute};
use crate::resolver::{Destination, Direction, get_destination};
use crate::roots::{ElementRef, OrderedRoots, normalise_roots, repair_roots};
use crate::tabbable::is_focusable;

/// One call of the single-entry API.
#[derive(Debug)]
pub enum TrapAction<E> {
    /// Build (or rebuild) with this configuration.
    Build(TrapConfig<E>),
    /// Pause an active trap.
    Pause,
    /// Resume a paused trap.
    Resume,
    /// Demolish a built trap.
    Demolish,
}

impl<E> FromStr for TrapAction<E> {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAUSE" => Ok(Self::Pause),
            "RESUME" => Ok(Self::Resume),
            "DEMOLISH" => Ok(Self::Demolish),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}

impl<E> From<TrapConfig<E>> for TrapAction<E> {
    fn from(config: TrapConfig<E>) -> Self {
        Self::Build(config)
    }
}

impl<E> From<Vec<ElementRef<E>>> for TrapAction<E> {
    fn from(roots: Vec<ElementRef<E>>) -> Self {
        Self::Build(roots.into())
    }
}

/// Callbacks a host invokes while a trap's registrations are live.
pub trait TrapListener<H: Host> {
    /// A `keydown` reached the document-level capturing listener.
    fn on_keydown(&mut self, host: &mut H, event: &mut KeyEvent<H::Element>);
    /// A `mousedown`, `touchstart`, or `click` reached the pointer listener.
    fn on_pointer(&mut self, host: &mut H, event: &mut PointerEvent<H::Element>);
    /// Mutations are pending on the trap's subscriptions.
    fn on_mutations(&mut self, host: &mut H);
}

struct Built<H: Host> {
    roots: Vec<ElementRef<H::Element>>,
    ordered: OrderedRoots<H::Element>,
    boundaries: Boundaries<H::Element>,
    initial_focus: InitialFocus<H::Element>,
    return_to: Option<H::Element>,
    lock: Lock<H::Element>,
    escape: Escape<H::Element>,
    paused: bool,
    subscriptions: SmallVec<[H::Subscription; 2]>,
}

impl<H: Host> Built<H> {
    fn wire(&mut self, host: &mut H) {
        host.add_event_listener(ListenerKind::KeyDown);
        if self.lock.is_enabled() {
            for kind in ListenerKind::POINTER {
                host.add_event_listener(kind);
            }
        }
        self.subscriptions = observe_roots(host, &self.ordered);
    }

    fn unwire(&mut self, host: &mut H) {
        host.remove_event_listener(ListenerKind::KeyDown);
        if self.lock.is_enabled() {
            for kind in ListenerKind::POINTER {
                host.remove_event_listener(kind);
            }
        }
        for sub in self.subscriptions.drain(..) {
            host.disconnect(sub);
        }
    }

    /// Re-derive the roots, silently dropping stale ones.
    fn repair(&mut self, host: &H) -> Result<(), TrapError> {
        self.ordered =
            repair_roots(host, &self.roots).map_err(|_| TrapError::NoTabbableElements)?;
        Ok(())
    }
}

/// A focus trap controller.
///
/// Each controller is independent; several may coexist on one host.
///
/// ```
/// # #[cfg(feature = "element_tree_adapter")]
/// # {
/// use understory_element_tree::{Document, ElementSpec};
/// use understory_focus_trap::{FocusTrap, TrapConfig, TrapError, TrapState};
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let dialog = doc.insert(Some(body), ElementSpec::new("div"));
/// let ok = doc.insert(Some(dialog), ElementSpec::new("button"));
///
/// let mut trap = FocusTrap::new();
/// trap.build(&mut doc, TrapConfig::with_elements([dialog])).unwrap();
/// assert_eq!(doc.active_element(), ok);
/// assert_eq!(trap.state(), TrapState::Active);
///
/// trap.demolish(&mut doc).unwrap();
/// assert!(matches!(trap.demolish(&mut doc), Err(TrapError::InvalidStateTransition(_))));
/// # }
/// ```
pub struct FocusTrap<H: Host> {
    built: Option<Built<H>>,
    listener_errors: ListenerErrors,
}

impl<H: Host> fmt::Debug for FocusTrap<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("FocusTrap");
        s.field("state", &self.state());
        if let Some(b) = &self.built {
            s.field("roots", &b.ordered.as_slice())
                .field("return_to", &b.return_to)
                .field("lock", &b.lock)
                .field("escape", &b.escape);
        }
        s.field("listener_errors", &self.listener_errors).finish()
    }
}

impl<H: Host> Default for FocusTrap<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> FocusTrap<H> {
    /// An unbuilt controller with the default [`ListenerErrors`] policy.
    pub fn new() -> Self {
        Self {
            built: None,
            listener_errors: ListenerErrors::default(),
        }
    }

    /// Set how listener failures are surfaced.
    #[must_use]
    pub fn with_listener_errors(mut self, listener_errors: ListenerErrors) -> Self {
        self.listener_errors = listener_errors;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrapState {
        match &self.built {
            None => TrapState::Unbuilt,
            Some(b) if b.paused => TrapState::Paused,
            Some(_) => TrapState::Active,
        }
    }

    /// Roots as of the last normalization, if built.
    pub fn roots(&self) -> Option<&OrderedRoots<H::Element>> {
        self.built.as_ref().map(|b| &b.ordered)
    }

    /// Cached tab-order boundaries, if built.
    pub fn boundaries(&self) -> Option<&Boundaries<H::Element>> {
        self.built.as_ref().map(|b| &b.boundaries)
    }

    /// Fresh tab-order snapshot of the trap's roots, if built.
    pub fn tab_order(&self, host: &H) -> Option<TabOrder<H::Element>> {
        let roots = repair_roots(host, &self.built.as_ref()?.roots).ok()?;
        Some(TabOrder::compute(host, &roots))
    }

    /// Build a trap, replacing any trap this controller already holds.
    ///
    /// A previous trap is unwired without returning focus. If no root survives
    /// normalization the controller is left unbuilt. When the roots hold no tab
    /// stop and initial focus is not [`InitialFocus::None`], the trap is still
    /// built and [`TrapError::NoTabbableElements`] is returned.
    pub fn build(
        &mut self,
        host: &mut H,
        config: TrapConfig<H::Element>,
    ) -> Result<(), TrapError> {
        let previously_focused = host.active_element();
        if let Some(mut old) = self.built.take() {
            if !old.paused {
                old.unwire(host);
            }
            tracing::debug!("focus trap replaced");
        }

        let TrapConfig {
            roots,
            initial_focus,
            return_focus,
            lock,
            escape,
        } = config;
        let ordered = normalise_roots(host, &roots)?;
        let return_to = match return_focus {
            ReturnFocus::Previous => previously_focused,
            ReturnFocus::None => None,
            ReturnFocus::Element(r) => {
                let resolved = r.resolve(host);
                if resolved.is_none() {
                    tracing::warn!(return_focus = ?r, "return focus target not found");
                }
                resolved
            }
        };
        let boundaries = Boundaries::compute(host, &ordered);
        let mut built = Built {
            roots,
            ordered,
            boundaries,
            initial_focus,
            return_to,
            lock,
            escape,
            paused: false,
            subscriptions: SmallVec::new(),
        };
        built.wire(host);
        tracing::debug!(roots = ?built.ordered.as_slice(), "focus trap built");

        let target = initial_target(host, &built.ordered, &built.initial_focus);
        self.built = Some(built);
        if let Some(el) = target? {
            host.focus(el);
        }
        Ok(())
    }

    /// Unwire listeners, keeping the configuration.
    pub fn pause(&mut self, host: &mut H) -> Result<(), TrapError> {
        let state = self.state();
        let Some(built) = self.built.as_mut().filter(|b| !b.paused) else {
            return Err(invalid(TransitionKind::Pause, state));
        };
        built.unwire(host);
        built.paused = true;
        tracing::debug!("focus trap paused");
        Ok(())
    }

    /// Re-wire a paused trap.
    pub fn resume(&mut self, host: &mut H) -> Result<(), TrapError> {
        let state = self.state();
        let Some(built) = self.built.as_mut().filter(|b| b.paused) else {
            return Err(invalid(TransitionKind::Resume, state));
        };
        // The tree may have changed while nothing was observing it.
        if built.repair(host).is_ok() {
            built.boundaries = Boundaries::compute(host, &built.ordered);
        }
        built.wire(host);
        built.paused = false;
        tracing::debug!("focus trap resumed");
        Ok(())
    }

    /// Unwire, return focus, and forget the configuration.
    pub fn demolish(&mut self, host: &mut H) -> Result<(), TrapError> {
        let Some(mut built) = self.built.take() else {
            return Err(invalid(TransitionKind::Demolish, TrapState::Unbuilt));
        };
        if !built.paused {
            built.unwire(host);
        }
        if let Some(el) = built.return_to.filter(|&el| is_focusable(host, el)) {
            host.focus(el);
        }
        tracing::debug!("focus trap demolished");
        Ok(())
    }

    /// Demolish on behalf of the Escape key. An already unbuilt trap is not an error here.
    fn escape_demolish(&mut self, host: &mut H) -> Result<(), TrapError> {
        match self.demolish(host) {
            Err(TrapError::InvalidStateTransition(_)) => Ok(()),
            other => other,
        }
    }

    /// Run one action.
    pub fn apply(
        &mut self,
        host: &mut H,
        action: TrapAction<H::Element>,
    ) -> Result<(), TrapError> {
        match action {
            TrapAction::Build(config) => self.build(host, config),
            TrapAction::Pause => self.pause(host),
            TrapAction::Resume => self.resume(host),
            TrapAction::Demolish => self.demolish(host),
        }
    }

    fn handle_tab(
        &mut self,
        host: &mut H,
        event: &mut KeyEvent<H::Element>,
    ) -> Result<(), TrapError> {
        let Some(built) = self.built.as_mut() else {
            return Ok(());
        };
        built.repair(host)?;
        let direction = Direction::from_shift(event.shift);
        let destination = get_destination(host, &built.ordered, event.target, direction)?;
        if let Destination::Element(el) = destination {
            event.prevent_default();
            host.focus(el);
        }
        Ok(())
    }

    fn handle_mutations(&mut self, host: &mut H) {
        let Some(built) = self.built.as_mut() else {
            return;
        };
        let mut records = Vec::new();
        for &sub in &built.subscriptions {
            records.extend(host.take_records(sub));
        }
        if built.paused || !any_qualifies(host, &records) {
            return;
        }
        let stale = needs_recompute(host, &built.ordered, &built.boundaries, &records);
        let previous = built.ordered.clone();
        if built.repair(host).is_err() {
            return;
        }
        let roots_changed = built.ordered != previous;
        if roots_changed {
            for sub in built.subscriptions.drain(..) {
                host.disconnect(sub);
            }
            built.subscriptions = observe_roots(host, &built.ordered);
        }
        if stale || roots_changed {
            tracing::debug!(mutations = records.len(), "recomputing focus trap boundaries");
            built.boundaries = Boundaries::compute(host, &built.ordered);
        }

        // Focus can be lost to a mutation that leaves every boundary in place.
        let focus_inside = host
            .active_element()
            .is_some_and(|el| built.ordered.contains(host, el));
        if focus_inside {
            return;
        }
        match initial_target(host, &built.ordered, &built.initial_focus) {
            Ok(Some(el)) => host.focus(el),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(error = %err, "focus left the trap and cannot be restored");
            }
        }
    }
}

fn observe_roots<H: Host>(
    host: &mut H,
    roots: &OrderedRoots<H::Element>,
) -> SmallVec<[H::Subscription; 2]> {
    roots.as_slice().iter().map(|&r| host.observe(r)).collect()
}

fn invalid(action: TransitionKind, state: TrapState) -> TrapError {
    InvalidTransition { action, state }.into()
}

/// Initial focus selection: the configured element when it is focusable,
/// otherwise the first tab stop. `Ok(None)` means leave focus alone.
fn initial_target<H: Host>(
    host: &H,
    roots: &OrderedRoots<H::Element>,
    initial: &InitialFocus<H::Element>,
) -> Result<Option<H::Element>, TrapError> {
    match initial {
        InitialFocus::None => return Ok(None),
        InitialFocus::Element(r) => match r.resolve(host) {
            Some(el) if is_focusable(host, el) => return Ok(Some(el)),
            _ => tracing::warn!(
                initial_focus = ?r,
                "initial focus target unusable, using first tab stop"
            ),
        },
        InitialFocus::First => {}
    }
    TabOrder::compute(host, roots)
        .first_tabbable()
        .map(Some)
        .ok_or(TrapError::NoTabbableElements)
}

impl<H: Host> TrapListener<H> for FocusTrap<H> {
    fn on_keydown(&mut self, host: &mut H, event: &mut KeyEvent<H::Element>) {
        if self.state() != TrapState::Active {
            return;
        }
        let result = if event.is_tab() {
            self.handle_tab(host, event)
        } else if event.is_escape() {
            if let Some(Built {
                escape: Escape::Custom(handler),
                ..
            }) = &mut self.built
            {
                handler(event);
                Ok(())
            } else if matches!(
                self.built,
                Some(Built {
                    escape: Escape::Demolish,
                    ..
                })
            ) {
                self.escape_demolish(host)
            } else {
                Ok(())
            }
        } else {
            Ok(())
        };
        if let Err(err) = result {
            self.listener_errors.surface("keydown", err);
        }
    }

    fn on_pointer(&mut self, host: &mut H, event: &mut PointerEvent<H::Element>) {
        let Some(built) = self.built.as_mut().filter(|b| !b.paused) else {
            return;
        };
        match &mut built.lock {
            Lock::Disabled => {}
            Lock::Custom(handler) => handler(event),
            Lock::Enabled => {
                let inside = repair_roots(&*host, &built.roots)
                    .is_ok_and(|roots| roots.contains(&*host, event.target));
                if !inside {
                    event.prevent_default();
                    event.stop_propagation();
                }
            }
        }
    }

    fn on_mutations(&mut self, host: &mut H) {
        self.handle_mutations(host);
    }
}
