// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element tree adapter: run focus traps against an [`understory_element_tree::Document`].
//!
//! [`Document`] implements [`Host`] here. The trap's listeners become
//! capturing registrations on the document node, and its subscriptions
//! become subtree observers with old-value capture.
//!
//! The document only records registrations; it never calls anyone. The
//! dispatch helpers in this module close that loop: they walk the event's
//! propagation path and invoke the [`TrapListener`] at each step where a
//! registration fires. The `press_*` helpers then perform the default action
//! a browser would, unless the listener cancelled it.
//!
//! ## Feature
//!
//! Enable with `element_tree_adapter` (on by default).
//!
//! ## Notes
//!
//! - Registrations are keyed by (document, event type, capture), so two
//!   independent traps wired at the same time share a registration and the
//!   first one to unwire removes it for both. Use a
//!   [`TrapStack`](crate::TrapStack) for nested traps; it keeps only one trap
//!   wired at a time.
//! - [`press_tab`] emulates native sequential navigation with wrap-around at
//!   the document edges.
//!
//! ## Example
//!
//! ```
//! use understory_element_tree::{Document, ElementSpec};
//! use understory_focus_trap::TrapConfig;
//! use understory_focus_trap::FocusTrap;
//! use understory_focus_trap::adapters::element_tree::press_tab;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let outside = doc.insert(Some(body), ElementSpec::new("button"));
//! let dialog = doc.insert(Some(body), ElementSpec::new("div"));
//! let first = doc.insert(Some(dialog), ElementSpec::new("button"));
//! let last = doc.insert(Some(dialog), ElementSpec::new("button"));
//!
//! let mut trap = FocusTrap::new();
//! trap.build(&mut doc, TrapConfig::with_elements([dialog])).unwrap();
//! assert_eq!(press_tab(&mut doc, &mut trap, false), last);
//! // Tab from the last stop wraps instead of reaching `outside`.
//! assert_eq!(press_tab(&mut doc, &mut trap, false), first);
//! # let _ = outside;
//! ```

use alloc::string::ToString;
use alloc::vec::Vec;
use core::cmp::Ordering;

use kurbo::Rect;
use understory_element_tree::events::{self, EventType, Outcome};
use understory_element_tree::mutation::{MutationRecord, ObserveFlags, ObserverId, ObserverOptions};
use understory_element_tree::{self as tree, Document, NodeId};

use crate::event::{KeyEvent, ListenerKind, PointerEvent, PointerKind};
use crate::host::{ComputedStyle, Display, Host, Mutation, OBSERVED_ATTRIBUTES, Visibility};
use crate::order::TabOrder;
use crate::resolver::Direction;
use crate::roots::{ElementRef, normalise_roots};
use crate::tabbable::is_focusable;
use crate::trap::TrapListener;

fn event_type(kind: ListenerKind) -> EventType {
    match kind {
        ListenerKind::KeyDown => EventType::KeyDown,
        ListenerKind::MouseDown => EventType::MouseDown,
        ListenerKind::TouchStart => EventType::TouchStart,
        ListenerKind::Click => EventType::Click,
    }
}

fn convert_style(style: tree::ComputedStyle) -> ComputedStyle {
    ComputedStyle {
        display: match style.display {
            tree::Display::Box => Display::Box,
            tree::Display::None => Display::None,
            tree::Display::Contents => Display::Contents,
        },
        visibility: match style.visibility {
            tree::Visibility::Visible => Visibility::Visible,
            tree::Visibility::Hidden => Visibility::Hidden,
            tree::Visibility::Collapse => Visibility::Collapse,
        },
    }
}

fn convert_record(record: MutationRecord) -> Mutation<NodeId> {
    match record {
        MutationRecord::ChildList { target, added, .. } => Mutation::ChildList { target, added },
        MutationRecord::Attribute {
            target,
            name,
            old_value,
        } => Mutation::Attribute {
            target,
            name,
            old_value,
        },
    }
}

impl Host for Document {
    type Element = NodeId;
    type Subscription = ObserverId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        Document::element_by_id(self, id).filter(|&el| Host::is_element(self, el))
    }

    fn is_element(&self, el: NodeId) -> bool {
        Document::is_element(self, el) && self.is_connected(el)
    }

    fn parent_element(&self, el: NodeId) -> Option<NodeId> {
        self.parent_of(el)
            .filter(|&p| Document::is_element(self, p))
    }

    fn first_element_child(&self, el: NodeId) -> Option<NodeId> {
        Document::first_element_child(self, el)
    }

    fn next_element_sibling(&self, el: NodeId) -> Option<NodeId> {
        Document::next_element_sibling(self, el)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        Document::contains(self, ancestor, node)
    }

    fn compare_document_position(&self, a: NodeId, b: NodeId) -> Ordering {
        Document::compare_document_position(self, a, b)
    }

    fn local_name(&self, el: NodeId) -> &str {
        Document::local_name(self, el).unwrap_or("")
    }

    fn attribute(&self, el: NodeId, name: &str) -> Option<&str> {
        Document::attribute(self, el, name)
    }

    fn tab_index(&self, el: NodeId) -> i32 {
        Document::tab_index(self, el)
    }

    fn computed_style(&self, el: NodeId) -> ComputedStyle {
        Document::computed_style(self, el)
            .map(convert_style)
            .unwrap_or_default()
    }

    fn client_rect(&self, el: NodeId) -> Option<Rect> {
        Document::client_rect(self, el)
    }

    fn active_element(&self) -> Option<NodeId> {
        Some(Document::active_element(self))
    }

    fn focus(&mut self, el: NodeId) {
        if !Document::focus(self, el) {
            tracing::trace!(element = ?el, "focus target is not connected");
        }
    }

    fn add_event_listener(&mut self, kind: ListenerKind) {
        let document = self.document();
        Document::add_event_listener(self, document, event_type(kind), true);
    }

    fn remove_event_listener(&mut self, kind: ListenerKind) {
        let document = self.document();
        Document::remove_event_listener(self, document, event_type(kind), true);
    }

    fn observe(&mut self, root: NodeId) -> ObserverId {
        let options = ObserverOptions {
            flags: ObserveFlags::CHILD_LIST
                | ObserveFlags::ATTRIBUTES
                | ObserveFlags::SUBTREE
                | ObserveFlags::ATTRIBUTE_OLD_VALUE,
            attribute_filter: OBSERVED_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        };
        Document::observe(self, root, options)
    }

    fn take_records(&mut self, subscription: ObserverId) -> Vec<Mutation<NodeId>> {
        Document::take_records(self, subscription)
            .into_iter()
            .map(convert_record)
            .collect()
    }

    fn disconnect(&mut self, subscription: ObserverId) {
        Document::disconnect(self, subscription);
    }
}

/// What happened while an event travelled through the document.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// A registration fired and the listener was invoked.
    pub delivered: bool,
    /// The listener cancelled the default action.
    pub default_prevented: bool,
    /// The listener stopped propagation.
    pub propagation_stopped: bool,
}

/// Walk `target`'s propagation path, calling `invoke` wherever a
/// registration for `event_type` fires. `invoke` returns whether to stop.
fn propagate<Ev>(
    doc: &mut Document,
    target: NodeId,
    event_type: EventType,
    event: &mut Ev,
    mut invoke: impl FnMut(&mut Document, &mut Ev) -> bool,
) -> bool {
    let path = doc.propagation_path(target);
    let mut delivered = false;
    events::run(&path, event, |step, ev| {
        if !doc.has_event_listener(step.node, event_type, step.phase) {
            return Outcome::Continue;
        }
        delivered = true;
        if invoke(doc, ev) {
            Outcome::Stop
        } else {
            Outcome::Continue
        }
    });
    delivered
}

/// Dispatch a `keydown` to `listener`.
pub fn dispatch_keydown<L: TrapListener<Document>>(
    doc: &mut Document,
    listener: &mut L,
    event: &mut KeyEvent<NodeId>,
) -> DispatchReport {
    let delivered = propagate(doc, event.target, EventType::KeyDown, event, |doc, ev| {
        listener.on_keydown(doc, ev);
        ev.propagation_stopped()
    });
    DispatchReport {
        delivered,
        default_prevented: event.default_prevented(),
        propagation_stopped: event.propagation_stopped(),
    }
}

/// Dispatch a pointer event to `listener`.
pub fn dispatch_pointer<L: TrapListener<Document>>(
    doc: &mut Document,
    listener: &mut L,
    event: &mut PointerEvent<NodeId>,
) -> DispatchReport {
    let event_type = event_type(event.kind.into());
    let delivered = propagate(doc, event.target, event_type, event, |doc, ev| {
        listener.on_pointer(doc, ev);
        ev.propagation_stopped()
    });
    DispatchReport {
        delivered,
        default_prevented: event.default_prevented(),
        propagation_stopped: event.propagation_stopped(),
    }
}

/// Deliver pending mutation records to `listener`.
///
/// The document queues records synchronously; call this after a batch of
/// edits, where a browser would run its observer callbacks.
pub fn flush_mutations<L: TrapListener<Document>>(doc: &mut Document, listener: &mut L) {
    listener.on_mutations(doc);
}

/// Press Tab (Shift+Tab when `shift` is set) on the focused element.
///
/// The `keydown` goes to `listener` first. Unless it cancels the default
/// action, focus then moves the way native sequential navigation would.
/// Returns the element focused afterwards.
pub fn press_tab<L: TrapListener<Document>>(
    doc: &mut Document,
    listener: &mut L,
    shift: bool,
) -> NodeId {
    let origin = doc.active_element();
    let mut event = KeyEvent::tab(origin, shift);
    let report = dispatch_keydown(doc, listener, &mut event);
    if !report.default_prevented
        && let Some(next) = native_destination(doc, origin, Direction::from_shift(shift))
    {
        doc.focus(next);
    }
    doc.active_element()
}

/// Press Escape on the focused element.
pub fn press_escape<L: TrapListener<Document>>(
    doc: &mut Document,
    listener: &mut L,
) -> DispatchReport {
    let mut event = KeyEvent::escape(doc.active_element());
    dispatch_keydown(doc, listener, &mut event)
}

/// Press a pointer on `target`: `mousedown`, then `click`.
///
/// An uncancelled `mousedown` on a focusable element focuses it. The report
/// is the `mousedown`'s; a cancelled `mousedown` suppresses the `click`.
pub fn press_pointer<L: TrapListener<Document>>(
    doc: &mut Document,
    listener: &mut L,
    target: NodeId,
) -> DispatchReport {
    let mut down = PointerEvent::new(PointerKind::MouseDown, target);
    let report = dispatch_pointer(doc, listener, &mut down);
    if report.default_prevented {
        return report;
    }
    if is_focusable(&*doc, target) {
        doc.focus(target);
    }
    let mut click = PointerEvent::new(PointerKind::Click, target);
    dispatch_pointer(doc, listener, &mut click);
    report
}

/// Where native sequential navigation goes from `origin`.
///
/// Tab stops of the whole body are visited in tab order and wrap at the ends.
/// An origin that is not itself a tab stop continues from its document
/// position in the zero tier.
pub fn native_destination(
    doc: &Document,
    origin: NodeId,
    direction: Direction,
) -> Option<NodeId> {
    let roots = normalise_roots(doc, &[ElementRef::Element(doc.body())]).ok()?;
    let order = TabOrder::compute(doc, &roots);
    let sequence = order.sequence();
    let n = sequence.len();
    if n == 0 {
        return None;
    }
    if let Some(i) = sequence.iter().position(|&el| el == origin) {
        return Some(match direction {
            Direction::Forward => sequence[(i + 1) % n],
            Direction::Backward => sequence[(i + n - 1) % n],
        });
    }
    let first = sequence[0];
    let last = sequence[n - 1];
    if origin == doc.body() || !Host::is_element(doc, origin) {
        return Some(match direction {
            Direction::Forward => first,
            Direction::Backward => last,
        });
    }
    let zeros = order.zeros(0);
    let next = match direction {
        Direction::Forward => zeros
            .iter()
            .copied()
            .find(|&z| doc.compare_document_position(origin, z) == Ordering::Less)
            .unwrap_or(first),
        Direction::Backward => zeros
            .iter()
            .rev()
            .copied()
            .find(|&z| doc.compare_document_position(z, origin) == Ordering::Less)
            .unwrap_or(last),
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Escape, InitialFocus, Lock, ReturnFocus, TrapConfig};
    use crate::error::{ListenerErrors, TrapError, TrapState};
    use crate::stack::TrapStack;
    use crate::trap::{FocusTrap, TrapAction};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;
    use understory_element_tree::ElementSpec;

    fn el(doc: &mut Document, parent: NodeId, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let spec = attrs
            .iter()
            .fold(ElementSpec::new(name), |spec, (k, v)| spec.attr(k, v));
        doc.insert(Some(parent), spec)
    }

    fn button(doc: &mut Document, parent: NodeId) -> NodeId {
        el(doc, parent, "button", &[])
    }

    fn stop(doc: &mut Document, parent: NodeId, tabindex: &str) -> NodeId {
        el(doc, parent, "div", &[("tabindex", tabindex)])
    }

    fn tab_cycle(
        doc: &mut Document,
        trap: &mut FocusTrap<Document>,
        shift: bool,
        n: usize,
    ) -> Vec<NodeId> {
        (0..n).map(|_| press_tab(doc, trap, shift)).collect()
    }

    #[test]
    fn host_view_of_the_document() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[("id", "root")]);
        let detached = doc.insert(None, ElementSpec::new("button"));

        assert_eq!(Host::element_by_id(&doc, "root"), Some(root));
        assert!(!Host::is_element(&doc, detached));
        assert_eq!(Host::parent_element(&doc, root), Some(body));
        assert_eq!(Host::parent_element(&doc, body), None);
        assert_eq!(Host::active_element(&doc), Some(body));

        doc.remove(root);
        assert_eq!(Host::local_name(&doc, root), "");
        assert_eq!(Host::computed_style(&doc, root), ComputedStyle::default());
    }

    #[test]
    fn subscriptions_report_only_observed_attributes() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        let inner = button(&mut doc, root);
        let sub = Host::observe(&mut doc, root);
        doc.set_attribute(inner, "aria-label", "x");
        doc.set_attribute(inner, "disabled", "");
        let added = button(&mut doc, root);
        assert_eq!(
            Host::take_records(&mut doc, sub),
            vec![
                Mutation::Attribute {
                    target: inner,
                    name: "disabled".into(),
                    old_value: None,
                },
                Mutation::ChildList {
                    target: root,
                    added: vec![added],
                },
            ]
        );
        Host::disconnect(&mut doc, sub);
        assert_eq!(doc.observer_count(), 0);
    }

    #[test]
    fn native_navigation_follows_tab_order_and_wraps() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = button(&mut doc, body);
        let plain = el(&mut doc, body, "div", &[]);
        let b = button(&mut doc, body);
        let p = stop(&mut doc, body, "1");

        assert_eq!(native_destination(&doc, body, Direction::Forward), Some(p));
        assert_eq!(native_destination(&doc, p, Direction::Forward), Some(a));
        assert_eq!(native_destination(&doc, b, Direction::Forward), Some(p));
        assert_eq!(native_destination(&doc, p, Direction::Backward), Some(b));
        assert_eq!(native_destination(&doc, plain, Direction::Forward), Some(b));
        assert_eq!(native_destination(&doc, plain, Direction::Backward), Some(a));

        let mut trap = FocusTrap::new();
        doc.focus(a);
        assert_eq!(press_tab(&mut doc, &mut trap, false), b);
    }

    #[test]
    fn tab_cycle_closes_inside_a_single_root() {
        let mut doc = Document::new();
        let body = doc.body();
        let before = button(&mut doc, body);
        let root = el(&mut doc, body, "div", &[]);
        let a = button(&mut doc, root);
        let b = stop(&mut doc, root, "2");
        let c = button(&mut doc, root);
        stop(&mut doc, root, "-1");
        let e = el(&mut doc, root, "input", &[("tabindex", "1")]);
        let after = button(&mut doc, body);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        assert_eq!(doc.active_element(), e);

        let expected = [e, b, a, c];
        for (start, &origin) in expected.iter().enumerate() {
            doc.focus(origin);
            let forward = tab_cycle(&mut doc, &mut trap, false, expected.len());
            let want: Vec<_> = (1..=expected.len())
                .map(|k| expected[(start + k) % expected.len()])
                .collect();
            assert_eq!(forward, want, "forward from stop {start}");

            let backward = tab_cycle(&mut doc, &mut trap, true, expected.len());
            let want: Vec<_> = (1..=expected.len())
                .map(|k| expected[(start + expected.len() - k) % expected.len()])
                .collect();
            assert_eq!(backward, want, "backward from stop {start}");
        }
        assert!(![before, after].contains(&doc.active_element()));
    }

    #[test]
    fn positive_tier_comes_first_then_zero_tier_in_document_order() {
        let mut doc = Document::new();
        let body = doc.body();
        button(&mut doc, body);
        let root = el(&mut doc, body, "div", &[]);
        stop(&mut doc, root, "-1");
        let zero_a = stop(&mut doc, root, "0");
        let two = stop(&mut doc, root, "2");
        let zero_b = stop(&mut doc, root, "0");
        let one = stop(&mut doc, root, "1");

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        assert_eq!(doc.active_element(), one);
        assert_eq!(
            tab_cycle(&mut doc, &mut trap, false, 4),
            vec![two, zero_a, zero_b, one]
        );
    }

    #[test]
    fn tab_wraps_across_roots_skipping_the_gap() {
        let mut doc = Document::new();
        let body = doc.body();
        let first_root = el(&mut doc, body, "div", &[("id", "first")]);
        let a = button(&mut doc, first_root);
        let b = button(&mut doc, first_root);
        let gap = button(&mut doc, body);
        let second_root = el(&mut doc, body, "div", &[("id", "second")]);
        let c = button(&mut doc, second_root);
        let d = button(&mut doc, second_root);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::new(["second", "first"])).unwrap();
        assert_eq!(
            trap.roots().unwrap().as_slice(),
            &[first_root, second_root]
        );

        doc.focus(b);
        assert_eq!(press_tab(&mut doc, &mut trap, false), c);
        doc.focus(d);
        assert_eq!(press_tab(&mut doc, &mut trap, false), a);
        assert_eq!(press_tab(&mut doc, &mut trap, true), d);

        // Focus that escaped to the gap re-enters the following root.
        doc.focus(gap);
        assert_eq!(press_tab(&mut doc, &mut trap, false), c);
        doc.focus(gap);
        assert_eq!(press_tab(&mut doc, &mut trap, true), b);
    }

    #[test]
    fn positive_tier_is_ordered_across_roots() {
        let mut doc = Document::new();
        let body = doc.body();
        let first_root = el(&mut doc, body, "div", &[]);
        let x = stop(&mut doc, first_root, "3");
        let zero = button(&mut doc, first_root);
        let second_root = el(&mut doc, body, "div", &[]);
        let y = stop(&mut doc, second_root, "1");

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([first_root, second_root])).unwrap();
        let order = trap.tab_order(&doc).unwrap();
        assert_eq!(order.positive(), &[(y, 1), (x, 3)]);
        assert_eq!(doc.active_element(), y);
        assert_eq!(tab_cycle(&mut doc, &mut trap, false, 3), vec![x, zero, y]);
    }

    #[test]
    fn build_without_tab_stops_fails_unless_focus_is_left_alone() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        stop(&mut doc, root, "-1");
        el(&mut doc, root, "button", &[("disabled", "")]);
        el(&mut doc, root, "button", &[("style", "visibility: hidden")]);

        let mut trap = FocusTrap::new();
        assert_eq!(
            trap.build(&mut doc, TrapConfig::with_elements([root])),
            Err(TrapError::NoTabbableElements)
        );
        assert_eq!(doc.active_element(), body);

        let config = TrapConfig::with_elements([root]).initial_focus(InitialFocus::None);
        assert_eq!(trap.build(&mut doc, config), Ok(()));
        assert_eq!(trap.state(), TrapState::Active);
    }

    #[test]
    fn build_rejects_unusable_roots() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = el(&mut doc, body, "div", &[]);
        let inner = el(&mut doc, outer, "div", &[]);
        button(&mut doc, inner);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([inner, outer])).unwrap();
        assert_eq!(trap.roots().unwrap().as_slice(), &[outer]);

        let mut other = FocusTrap::new();
        assert_eq!(
            other.build(&mut doc, TrapConfig::new(["missing"])),
            Err(TrapError::NoValidRoot)
        );
        assert_eq!(other.state(), TrapState::Unbuilt);
    }

    #[test]
    fn demolish_is_not_idempotent() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        button(&mut doc, root);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        assert_eq!(trap.demolish(&mut doc), Ok(()));
        let err = trap.demolish(&mut doc).unwrap_err();
        assert_eq!(err.to_string(), "cannot demolish inexistent trap");
        assert!(doc.listeners().is_empty());
        assert_eq!(doc.observer_count(), 0);
    }

    #[test]
    fn escape_demolishes_and_returns_focus() {
        let mut doc = Document::new();
        let body = doc.body();
        let opener = button(&mut doc, body);
        let root = el(&mut doc, body, "div", &[]);
        let inside = button(&mut doc, root);
        doc.focus(opener);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        assert_eq!(doc.active_element(), inside);
        let report = press_escape(&mut doc, &mut trap);
        assert!(report.delivered);
        assert_eq!(trap.state(), TrapState::Unbuilt);
        assert_eq!(doc.active_element(), opener);

        // No registration survives, so a second Escape reaches nothing.
        assert!(!press_escape(&mut doc, &mut trap).delivered);
    }

    #[test]
    fn escape_can_be_disabled_or_customised() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        let inside = button(&mut doc, root);

        let mut trap = FocusTrap::new();
        let config = TrapConfig::with_elements([root]).escape(Escape::Disabled);
        trap.build(&mut doc, config).unwrap();
        press_escape(&mut doc, &mut trap);
        assert_eq!(trap.state(), TrapState::Active);
        assert_eq!(doc.active_element(), inside);

        let presses = Rc::new(Cell::new(0));
        let seen = presses.clone();
        let config = TrapConfig::with_elements([root]).escape(Escape::custom(move |ev| {
            seen.set(seen.get() + 1);
            ev.prevent_default();
        }));
        trap.build(&mut doc, config).unwrap();
        assert!(press_escape(&mut doc, &mut trap).default_prevented);
        assert_eq!(presses.get(), 1);
        assert_eq!(trap.state(), TrapState::Active);
    }

    #[test]
    fn outside_pointer_is_blocked_while_locked() {
        let mut doc = Document::new();
        let body = doc.body();
        let outside = button(&mut doc, body);
        let root = el(&mut doc, body, "div", &[]);
        let first = button(&mut doc, root);
        let second = button(&mut doc, root);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        let report = press_pointer(&mut doc, &mut trap, outside);
        assert!(report.default_prevented);
        assert!(report.propagation_stopped);
        assert_eq!(doc.active_element(), first);

        let report = press_pointer(&mut doc, &mut trap, second);
        assert!(report.delivered);
        assert!(!report.default_prevented);
        assert_eq!(doc.active_element(), second);
    }

    #[test]
    fn outside_pointer_passes_when_unlocked() {
        let mut doc = Document::new();
        let body = doc.body();
        let outside = button(&mut doc, body);
        let root = el(&mut doc, body, "div", &[]);
        button(&mut doc, root);

        let mut trap = FocusTrap::new();
        let config = TrapConfig::with_elements([root]).lock(Lock::Disabled);
        trap.build(&mut doc, config).unwrap();
        assert_eq!(doc.listeners().len(), 1);
        let report = press_pointer(&mut doc, &mut trap, outside);
        assert_eq!(report, DispatchReport::default());
        assert_eq!(doc.active_element(), outside);

        let clicks = Rc::new(Cell::new(0));
        let seen = clicks.clone();
        let config = TrapConfig::with_elements([root]).lock(Lock::custom(move |_| {
            seen.set(seen.get() + 1);
        }));
        trap.build(&mut doc, config).unwrap();
        press_pointer(&mut doc, &mut trap, outside);
        assert_eq!(clicks.get(), 2, "mousedown and click both reach the handler");
    }

    #[test]
    fn paused_traps_let_focus_leave() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        let inside = button(&mut doc, root);
        let outside = button(&mut doc, body);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        trap.pause(&mut doc).unwrap();
        assert!(doc.listeners().is_empty());
        assert_eq!(doc.observer_count(), 0);
        assert_eq!(
            trap.pause(&mut doc).unwrap_err().to_string(),
            "trap is already paused"
        );
        assert_eq!(press_tab(&mut doc, &mut trap, false), outside);

        trap.resume(&mut doc).unwrap();
        assert_eq!(
            trap.resume(&mut doc).unwrap_err().to_string(),
            "trap is already active"
        );
        assert_eq!(doc.observer_count(), 1);
        assert_eq!(press_tab(&mut doc, &mut trap, false), inside);
    }

    #[test]
    fn actions_drive_the_same_lifecycle() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[("id", "dialog")]);
        button(&mut doc, root);

        let mut trap = FocusTrap::new();
        let action = TrapAction::from(vec![ElementRef::from("dialog")]);
        trap.apply(&mut doc, action).unwrap();
        trap.apply(&mut doc, "PAUSE".parse().unwrap()).unwrap();
        assert_eq!(trap.state(), TrapState::Paused);
        trap.apply(&mut doc, "RESUME".parse().unwrap()).unwrap();
        trap.apply(&mut doc, "DEMOLISH".parse().unwrap()).unwrap();
        assert_eq!(trap.state(), TrapState::Unbuilt);
        assert!("pause".parse::<TrapAction<NodeId>>().is_err());
    }

    #[test]
    fn initial_and_return_focus_targets() {
        let mut doc = Document::new();
        let body = doc.body();
        let home = el(&mut doc, body, "button", &[("id", "home")]);
        let root = el(&mut doc, body, "div", &[]);
        let first = button(&mut doc, root);
        let confirm = el(&mut doc, root, "button", &[("id", "confirm")]);
        el(&mut doc, root, "button", &[("id", "off"), ("disabled", "")]);

        let mut trap = FocusTrap::new();
        let config = TrapConfig::with_elements([root])
            .initial_focus(InitialFocus::Element("confirm".into()))
            .return_focus(ReturnFocus::Element("home".into()));
        trap.build(&mut doc, config).unwrap();
        assert_eq!(doc.active_element(), confirm);
        trap.demolish(&mut doc).unwrap();
        assert_eq!(doc.active_element(), home);

        let config = TrapConfig::with_elements([root])
            .initial_focus(InitialFocus::Element("off".into()))
            .return_focus(ReturnFocus::None);
        trap.build(&mut doc, config).unwrap();
        assert_eq!(doc.active_element(), first);
        trap.demolish(&mut doc).unwrap();
        assert_eq!(doc.active_element(), first);
    }

    #[test]
    fn rebuilding_replaces_the_previous_trap() {
        let mut doc = Document::new();
        let body = doc.body();
        let first_root = el(&mut doc, body, "div", &[]);
        button(&mut doc, first_root);
        let second_root = el(&mut doc, body, "div", &[]);
        let target = button(&mut doc, second_root);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([first_root])).unwrap();
        trap.build(&mut doc, TrapConfig::with_elements([second_root])).unwrap();
        assert_eq!(doc.active_element(), target);
        assert_eq!(doc.observer_count(), 1);
        assert_eq!(doc.listeners().len(), 4);
    }

    #[test]
    fn removed_focus_is_restored_after_mutations() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        let first = button(&mut doc, root);
        let doomed = button(&mut doc, root);
        let last = button(&mut doc, root);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        doc.focus(doomed);
        doc.remove(doomed);
        assert_eq!(doc.active_element(), body);
        flush_mutations(&mut doc, &mut trap);
        assert_eq!(doc.active_element(), first);

        doc.set_attribute(last, "disabled", "");
        flush_mutations(&mut doc, &mut trap);
        let span = trap.boundaries().unwrap().span(0).unwrap();
        assert_eq!((span.first, span.last), (first, first));
    }

    #[test]
    fn focus_removed_from_inside_the_span_is_restored() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        let first = button(&mut doc, root);
        let wrapper = el(&mut doc, root, "div", &[]);
        let doomed = button(&mut doc, wrapper);
        let last = button(&mut doc, root);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        doc.focus(doomed);
        doc.remove(doomed);
        flush_mutations(&mut doc, &mut trap);
        assert_eq!(doc.active_element(), first);
        let span = trap.boundaries().unwrap().span(0).unwrap();
        assert_eq!((span.first, span.last), (first, last));
    }

    #[test]
    fn positive_stop_inserted_inside_the_span_joins_the_order() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        let first = button(&mut doc, root);
        let wrapper = el(&mut doc, root, "div", &[]);
        let last = button(&mut doc, root);

        let mut trap = FocusTrap::new();
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        assert!(!trap.boundaries().unwrap().has_positive);

        let positive = stop(&mut doc, wrapper, "2");
        flush_mutations(&mut doc, &mut trap);
        assert!(trap.boundaries().unwrap().has_positive);
        doc.focus(last);
        assert_eq!(tab_cycle(&mut doc, &mut trap, false, 2), [positive, first]);
    }

    #[test]
    fn stale_roots_are_dropped_on_tab() {
        let mut doc = Document::new();
        let body = doc.body();
        let first_root = el(&mut doc, body, "div", &[]);
        let a = button(&mut doc, first_root);
        let second_root = el(&mut doc, body, "div", &[]);
        button(&mut doc, second_root);

        let mut trap = FocusTrap::new().with_listener_errors(ListenerErrors::Silent);
        trap.build(&mut doc, TrapConfig::with_elements([first_root, second_root])).unwrap();
        doc.remove(second_root);
        doc.focus(a);
        assert_eq!(press_tab(&mut doc, &mut trap, false), a);

        // With every root gone the failure is logged and the key passes through.
        doc.remove(first_root);
        assert_eq!(press_tab(&mut doc, &mut trap, false), body);
    }

    #[test]
    #[should_panic(expected = "there are no tabbable elements in the focus trap")]
    fn raised_listener_errors_panic() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        let only = button(&mut doc, root);

        let mut trap = FocusTrap::new().with_listener_errors(ListenerErrors::Raise);
        trap.build(&mut doc, TrapConfig::with_elements([root])).unwrap();
        doc.set_attribute(only, "disabled", "");
        press_tab(&mut doc, &mut trap, false);
    }

    #[test]
    fn stacked_traps_hand_focus_back_down() {
        let mut doc = Document::new();
        let body = doc.body();
        let opener = button(&mut doc, body);
        let outer = el(&mut doc, body, "div", &[]);
        let a1 = button(&mut doc, outer);
        let a2 = button(&mut doc, outer);
        let inner = el(&mut doc, body, "div", &[]);
        let b1 = button(&mut doc, inner);
        let b2 = button(&mut doc, inner);
        doc.focus(opener);

        let mut stack = TrapStack::new();
        stack.push(&mut doc, TrapConfig::with_elements([outer])).unwrap();
        doc.focus(a2);
        stack.push(&mut doc, TrapConfig::with_elements([inner])).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(doc.active_element(), b1);
        assert_eq!(doc.observer_count(), 1);

        doc.focus(b2);
        assert_eq!(press_tab(&mut doc, &mut stack, false), b1);

        press_escape(&mut doc, &mut stack);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.state(), TrapState::Active);
        assert_eq!(doc.active_element(), a2);
        assert_eq!(press_tab(&mut doc, &mut stack, false), a1);

        stack.pop(&mut doc).unwrap();
        assert_eq!(doc.active_element(), opener);
        assert!(stack.is_empty());
        assert!(stack.pop(&mut doc).is_err());
        assert!(doc.listeners().is_empty());
    }

    #[test]
    fn failed_push_restores_the_previous_top() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = el(&mut doc, body, "div", &[]);
        let inside = button(&mut doc, root);

        let mut stack = TrapStack::new();
        stack.apply(&mut doc, TrapAction::Build(TrapConfig::with_elements([root]))).unwrap();
        assert_eq!(
            stack.push(&mut doc, TrapConfig::new(["missing"])),
            Err(TrapError::NoValidRoot)
        );
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.state(), TrapState::Active);
        assert_eq!(press_tab(&mut doc, &mut stack, false), inside);
    }
}
