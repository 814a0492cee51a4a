// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focusability predicate and tab-order classification.
//!
//! An element is a tab stop when three things hold:
//! - it is a *candidate* by tag or attribute (see [`is_candidate`]);
//! - it passes the runtime checks of [`is_actually_focusable`];
//! - its [`consistent_tab_index`] is not negative.
//!
//! None of this is cached. Callers re-run it whenever the tree may have changed.

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::host::{Host, Visibility};

/// Tab-order class of an element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Negative tab index or not a tab stop at all. Never a destination.
    Untabbable,
    /// Tab index zero: ordered by document position.
    Zero,
    /// Positive tab index: ordered by value, then by document position.
    Positive(i32),
}

impl Tier {
    /// Tier of a (consistent) tab index.
    pub fn of(tab_index: i32) -> Self {
        match tab_index.cmp(&0) {
            Ordering::Less => Self::Untabbable,
            Ordering::Equal => Self::Zero,
            Ordering::Greater => Self::Positive(tab_index),
        }
    }
}

fn is_form_control(name: &str) -> bool {
    matches!(name, "input" | "select" | "textarea" | "button")
}

fn is_content_editable<H: Host>(host: &H, el: H::Element) -> bool {
    host.attribute(el, "contenteditable")
        .is_some_and(|v| !v.trim().eq_ignore_ascii_case("false"))
}

fn has_controls<H: Host>(host: &H, el: H::Element) -> bool {
    matches!(host.local_name(el), "audio" | "video") && host.attribute(el, "controls").is_some()
}

/// Parses a `tabindex` attribute; `None` when absent or not an integer.
fn tabindex_attribute<H: Host>(host: &H, el: H::Element) -> Option<i32> {
    host.attribute(el, "tabindex")?.trim().parse().ok()
}

/// First `<summary>` child of `details`.
fn first_summary<H: Host>(host: &H, details: H::Element) -> Option<H::Element> {
    let mut child = host.first_element_child(details);
    while let Some(c) = child {
        if host.local_name(c) == "summary" {
            return Some(c);
        }
        child = host.next_element_sibling(c);
    }
    None
}

/// Whether `el` is the first `<summary>` child of a `<details>`.
fn is_direct_summary<H: Host>(host: &H, el: H::Element) -> bool {
    host.local_name(el) == "summary"
        && host
            .parent_element(el)
            .filter(|&p| host.local_name(p) == "details")
            .and_then(|p| first_summary(host, p))
            == Some(el)
}

/// Whether `el` is eligible to be a tab stop by tag or attribute alone.
///
/// Matches form controls, `a[href]`, elements with a `tabindex` attribute,
/// `audio`/`video` with `controls`, editable content, `details`, and the first
/// `summary` of a `details`.
pub fn is_candidate<H: Host>(host: &H, el: H::Element) -> bool {
    let name = host.local_name(el);
    is_form_control(name)
        || (name == "a" && host.attribute(el, "href").is_some())
        || name == "details"
        || host.attribute(el, "tabindex").is_some()
        || has_controls(host, el)
        || is_content_editable(host, el)
        || is_direct_summary(host, el)
}

fn is_disabled<H: Host>(host: &H, el: H::Element) -> bool {
    is_form_control(host.local_name(el)) && host.attribute(el, "disabled").is_some()
}

fn is_disabled_fieldset<H: Host>(host: &H, el: H::Element) -> bool {
    host.local_name(el) == "fieldset" && host.attribute(el, "disabled").is_some()
}

/// A form control inside a disabled `<fieldset>` is disabled, unless it sits
/// inside that fieldset's first `<legend>` and the fieldset is not itself
/// inside another disabled fieldset.
fn is_disabled_from_fieldset<H: Host>(host: &H, el: H::Element) -> bool {
    if !is_form_control(host.local_name(el)) {
        return false;
    }
    let mut ancestor = host.parent_element(el);
    while let Some(a) = ancestor {
        if is_disabled_fieldset(host, a) {
            let mut child = host.first_element_child(a);
            while let Some(c) = child {
                if host.local_name(c) == "legend" {
                    let mut outer = host.parent_element(a);
                    while let Some(o) = outer {
                        if is_disabled_fieldset(host, o) {
                            return true;
                        }
                        outer = host.parent_element(o);
                    }
                    return !host.contains(c, el);
                }
                child = host.next_element_sibling(c);
            }
            return true;
        }
        ancestor = host.parent_element(a);
    }
    false
}

/// Whether `el` is inside a closed `<details>`. The first summary of a closed
/// details is checked from its details element, so it stays reachable unless
/// an outer details is closed too.
fn is_under_closed_details<H: Host>(host: &H, el: H::Element) -> bool {
    let start = if is_direct_summary(host, el) {
        host.parent_element(el)
    } else {
        Some(el)
    };
    let mut ancestor = start.and_then(|s| host.parent_element(s));
    while let Some(a) = ancestor {
        if host.local_name(a) == "details" && host.attribute(a, "open").is_none() {
            return true;
        }
        ancestor = host.parent_element(a);
    }
    false
}

fn is_hidden<H: Host>(host: &H, el: H::Element) -> bool {
    host.computed_style(el).visibility == Visibility::Hidden
        || is_under_closed_details(host, el)
        || host.client_rect(el).is_none()
}

fn is_radio<H: Host>(host: &H, el: H::Element) -> bool {
    host.local_name(el) == "input"
        && host
            .attribute(el, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
}

fn is_hidden_input<H: Host>(host: &H, el: H::Element) -> bool {
    host.local_name(el) == "input"
        && host
            .attribute(el, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
}

/// The checked radio of `el`'s group, searched within its form owner or, if
/// none, its topmost ancestor.
fn checked_radio_in_group<H: Host>(host: &H, el: H::Element, name: &str) -> Option<H::Element> {
    let mut scope = el;
    while let Some(p) = host.parent_element(scope) {
        scope = p;
        if host.local_name(p) == "form" {
            break;
        }
    }
    Descendants::new(host, scope).find(|&r| {
        is_radio(host, r)
            && host.attribute(r, "name") == Some(name)
            && host.attribute(r, "checked").is_some()
    })
}

/// An unchecked radio is skipped when another radio of the same named group is
/// checked. A radio without a name forms its own group.
fn is_non_tabbable_radio<H: Host>(host: &H, el: H::Element) -> bool {
    if !is_radio(host, el) {
        return false;
    }
    let Some(name) = host.attribute(el, "name").filter(|n| !n.is_empty()) else {
        return false;
    };
    checked_radio_in_group(host, el, name).is_some_and(|checked| checked != el)
}

/// A `<details>` whose summary takes focus instead of it.
fn is_details_with_summary<H: Host>(host: &H, el: H::Element) -> bool {
    host.local_name(el) == "details" && first_summary(host, el).is_some()
}

/// Runtime focusability checks for a candidate (see [`is_candidate`]).
///
/// Returns `false` when the element renders no box, is disabled (directly or
/// through a `<fieldset>`), is `visibility: hidden`, is `input[type=hidden]`,
/// is an unchecked radio of a group with a checked member, is a `<details>`
/// that delegates focus to its summary, or lives inside a closed `<details>`.
pub fn is_actually_focusable<H: Host>(host: &H, el: H::Element) -> bool {
    host.is_element(el)
        && !(is_disabled(host, el)
            || is_hidden_input(host, el)
            || is_non_tabbable_radio(host, el)
            || is_details_with_summary(host, el)
            || is_disabled_from_fieldset(host, el)
            || is_hidden(host, el))
}

/// Tab index with host quirks normalized.
///
/// `details`, `audio[controls]`, `video[controls]` and editable content report a
/// negative native tab index yet take part in the default order; without a
/// valid `tabindex` attribute they are reported as `0`.
pub fn consistent_tab_index<H: Host>(host: &H, el: H::Element) -> i32 {
    let native = host.tab_index(el);
    if native < 0
        && (host.local_name(el) == "details"
            || has_controls(host, el)
            || is_content_editable(host, el))
        && tabindex_attribute(host, el).is_none()
    {
        0
    } else {
        native
    }
}

/// Whether `el` can take focus at all, in any tier.
pub fn is_focusable<H: Host>(host: &H, el: H::Element) -> bool {
    host.is_element(el) && is_candidate(host, el) && is_actually_focusable(host, el)
}

/// Tier of `el`; [`Tier::Untabbable`] for anything that is not a tab stop.
pub fn tier<H: Host>(host: &H, el: H::Element) -> Tier {
    if is_focusable(host, el) {
        Tier::of(consistent_tab_index(host, el))
    } else {
        Tier::Untabbable
    }
}

/// Whether `el` is a tab stop.
pub fn is_tabbable<H: Host>(host: &H, el: H::Element) -> bool {
    tier(host, el) != Tier::Untabbable
}

/// Tab stops under `root` (inclusive), in document order, with their tier.
pub fn tabbables<H: Host>(host: &H, root: H::Element) -> Vec<(H::Element, Tier)> {
    Descendants::new(host, root)
        .filter_map(|el| match tier(host, el) {
            Tier::Untabbable => None,
            t => Some((el, t)),
        })
        .collect()
}

/// Pre-order walk over `root` and its element descendants.
#[derive(Debug)]
pub(crate) struct Descendants<'h, H: Host> {
    host: &'h H,
    root: H::Element,
    next: Option<H::Element>,
}

impl<'h, H: Host> Descendants<'h, H> {
    pub(crate) fn new(host: &'h H, root: H::Element) -> Self {
        let next = host.is_element(root).then_some(root);
        Self { host, root, next }
    }
}

impl<H: Host> Iterator for Descendants<'_, H> {
    type Item = H::Element;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let host = self.host;
        self.next = host.first_element_child(current).or_else(|| {
            let mut node = current;
            loop {
                if node == self.root {
                    return None;
                }
                if let Some(sibling) = host.next_element_sibling(node) {
                    return Some(sibling);
                }
                node = host.parent_element(node)?;
            }
        });
        Some(current)
    }
}
