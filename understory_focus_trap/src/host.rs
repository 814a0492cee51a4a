// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host environment the trap runs against.
//!
//! A [`Host`] owns the live element tree, focus, listener registrations, and
//! mutation observation. The trap never owns elements; it holds
//! [`Host::Element`] handles and re-validates them through the host before
//! every use, because arbitrary code may move or remove elements between two
//! events.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use kurbo::Rect;

use crate::event::ListenerKind;

/// Computed `display`, reduced to what decides whether an element renders a box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Display {
    /// Generates a box.
    #[default]
    Box,
    /// `display: none`.
    None,
    /// `display: contents`.
    Contents,
}

/// Computed `visibility`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `visible`.
    #[default]
    Visible,
    /// `hidden`.
    Hidden,
    /// `collapse`.
    Collapse,
}

/// The computed style properties the focusability predicate reads.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComputedStyle {
    /// Computed `display`.
    pub display: Display,
    /// Computed `visibility`.
    pub visibility: Visibility,
}

/// A mutation delivered by the host's observer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation<E> {
    /// Children of `target` were added or removed.
    ChildList {
        /// Parent whose child list changed.
        target: E,
        /// Nodes inserted under `target`.
        added: Vec<E>,
    },
    /// An attribute of `target` changed.
    Attribute {
        /// Element whose attribute changed.
        target: E,
        /// Attribute name (lowercase).
        name: String,
        /// Previous value, if the attribute existed.
        old_value: Option<String>,
    },
}

impl<E: Copy> Mutation<E> {
    /// The node the mutation is about.
    pub fn target(&self) -> E {
        match self {
            Self::ChildList { target, .. } | Self::Attribute { target, .. } => *target,
        }
    }
}

/// Attributes whose changes can alter tabbability. Observers must capture old values.
pub const OBSERVED_ATTRIBUTES: [&str; 5] = ["disabled", "type", "open", "style", "tabindex"];

/// Environment surface consumed by the trap.
///
/// Element handles are small copyable values. Every method must tolerate stale
/// handles (removed elements) and answer as if the element were absent.
pub trait Host {
    /// Handle of an element in the host's tree.
    type Element: Copy + Eq + Debug;
    /// Handle of a mutation subscription.
    type Subscription: Copy + Eq + Debug;

    // --- query surface ---

    /// Resolve an identifier to a connected element.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    /// Whether the handle names a live element connected to the document.
    fn is_element(&self, el: Self::Element) -> bool;
    /// Parent element, if any.
    fn parent_element(&self, el: Self::Element) -> Option<Self::Element>;
    /// First child element, if any.
    fn first_element_child(&self, el: Self::Element) -> Option<Self::Element>;
    /// Next sibling element, if any.
    fn next_element_sibling(&self, el: Self::Element) -> Option<Self::Element>;
    /// Inclusive containment: `node` is `ancestor` or inside it.
    fn contains(&self, ancestor: Self::Element, node: Self::Element) -> bool;
    /// Document order; must be a total order consistent with the host's tab traversal.
    fn compare_document_position(&self, a: Self::Element, b: Self::Element) -> Ordering;
    /// Lowercase tag name; empty for stale handles.
    fn local_name(&self, el: Self::Element) -> &str;
    /// Raw attribute value.
    fn attribute(&self, el: Self::Element, name: &str) -> Option<&str>;
    /// The host's native tab-index property, quirks included.
    fn tab_index(&self, el: Self::Element) -> i32;
    /// Computed display and visibility.
    fn computed_style(&self, el: Self::Element) -> ComputedStyle;
    /// The element's layout box, `None` when it renders no box.
    fn client_rect(&self, el: Self::Element) -> Option<Rect>;

    // --- focus ---

    /// The currently focused element, if any.
    fn active_element(&self) -> Option<Self::Element>;
    /// Move focus to `el`.
    fn focus(&mut self, el: Self::Element);

    // --- listeners ---

    /// Register the trap's document-level capturing listener for `kind`.
    fn add_event_listener(&mut self, kind: ListenerKind);
    /// Remove the registration added by [`Host::add_event_listener`].
    fn remove_event_listener(&mut self, kind: ListenerKind);

    // --- mutation observation ---

    /// Observe child-list changes and changes to [`OBSERVED_ATTRIBUTES`] in the
    /// subtree of `root`, capturing old attribute values.
    fn observe(&mut self, root: Self::Element) -> Self::Subscription;
    /// Drain the mutations queued for a subscription.
    fn take_records(&mut self, subscription: Self::Subscription) -> Vec<Mutation<Self::Element>>;
    /// Stop a subscription.
    fn disconnect(&mut self, subscription: Self::Subscription);
}
