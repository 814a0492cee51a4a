// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deciding whether a batch of mutations can change the trap's tab order.
//!
//! Recomputation itself is [`Boundaries::compute`]; this module only filters.

use core::cmp::Ordering;

use crate::host::{Host, Mutation, OBSERVED_ATTRIBUTES};
use crate::order::Boundaries;
use crate::roots::OrderedRoots;
use crate::tabbable::{Tier, tabbables};

/// The inline-style properties that decide whether an element renders or is hidden.
///
/// Reads declarations the same way as the element tree's `InlineStyle`; kept
/// separate so this crate depends on no host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleVisibility {
    /// `display: none`.
    pub display_none: bool,
    /// `display: contents`.
    pub display_contents: bool,
    /// `visibility: hidden`.
    pub visibility_hidden: bool,
}

impl StyleVisibility {
    /// Read the relevant declarations of a `style` attribute. Later
    /// declarations win; `!important` is ignored.
    pub fn parse(style: &str) -> Self {
        let mut out = Self::default();
        for declaration in style.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim();
            let value = value.trim().trim_end_matches("!important").trim();
            if property.eq_ignore_ascii_case("display") {
                out.display_none = value.eq_ignore_ascii_case("none");
                out.display_contents = value.eq_ignore_ascii_case("contents");
            } else if property.eq_ignore_ascii_case("visibility") {
                out.visibility_hidden = value.eq_ignore_ascii_case("hidden");
            }
        }
        out
    }
}

/// Whether a single mutation could change tabbability at all.
///
/// Child-list changes always qualify. Attribute changes qualify for the
/// observed attributes, except `style` changes that do not cross into or out
/// of `display: none`, `display: contents`, or `visibility: hidden`.
pub fn qualifies<H: Host>(host: &H, record: &Mutation<H::Element>) -> bool {
    match record {
        Mutation::ChildList { .. } => true,
        Mutation::Attribute {
            target,
            name,
            old_value,
        } => {
            if !OBSERVED_ATTRIBUTES.contains(&name.as_str()) {
                return false;
            }
            if name != "style" {
                return true;
            }
            let before = StyleVisibility::parse(old_value.as_deref().unwrap_or(""));
            let after = StyleVisibility::parse(host.attribute(*target, "style").unwrap_or(""));
            before != after
        }
    }
}

/// Whether the mutation left a positive-tier stop in the subtree it touched:
/// the inserted nodes of a child-list change, the target of an attribute change.
fn introduces_positive<H: Host>(host: &H, record: &Mutation<H::Element>) -> bool {
    let has_positive = |root| {
        tabbables(host, root)
            .iter()
            .any(|&(_, tier)| matches!(tier, Tier::Positive(_)))
    };
    match record {
        Mutation::ChildList { added, .. } => added.iter().any(|&node| has_positive(node)),
        Mutation::Attribute { target, .. } => has_positive(*target),
    }
}

/// Whether a qualifying mutation provably leaves every boundary in place.
///
/// Holds when no positive tier exists and the mutation does not create one,
/// the mutation is not a `tabindex` change, and its target sits strictly
/// between its root's first and last zero-tier stop without containing the
/// last one.
fn inside_known_span<H: Host>(
    host: &H,
    roots: &OrderedRoots<H::Element>,
    boundaries: &Boundaries<H::Element>,
    record: &Mutation<H::Element>,
) -> bool {
    if boundaries.has_positive {
        return false;
    }
    if matches!(record, Mutation::Attribute { name, .. } if name == "tabindex") {
        return false;
    }
    if introduces_positive(host, record) {
        return false;
    }
    let target = record.target();
    let Some(span) = roots
        .position_of(host, target)
        .and_then(|root| boundaries.span(root))
    else {
        return false;
    };
    host.is_element(span.first)
        && host.is_element(span.last)
        && host.compare_document_position(span.first, target) == Ordering::Less
        && host.compare_document_position(target, span.last) == Ordering::Less
        && !host.contains(target, span.last)
}

/// Whether any of `records` could change tabbability.
pub fn any_qualifies<H: Host>(host: &H, records: &[Mutation<H::Element>]) -> bool {
    records.iter().any(|r| qualifies(host, r))
}

/// Whether `records` require recomputing `boundaries`.
pub fn needs_recompute<H: Host>(
    host: &H,
    roots: &OrderedRoots<H::Element>,
    boundaries: &Boundaries<H::Element>,
    records: &[Mutation<H::Element>],
) -> bool {
    records
        .iter()
        .any(|r| qualifies(host, r) && !inside_known_span(host, roots, boundaries, r))
}

#[cfg(test)]
mod style_tests {
    use super::*;

    #[test]
    fn parses_the_visibility_relevant_declarations() {
        let s = StyleVisibility::parse("color: red; DISPLAY : None !important");
        assert!(s.display_none);
        assert!(!s.display_contents);
        let s = StyleVisibility::parse("display:none; display: contents; visibility: hidden");
        assert_eq!(
            s,
            StyleVisibility {
                display_none: false,
                display_contents: true,
                visibility_hidden: true,
            }
        );
        assert_eq!(StyleVisibility::parse(""), StyleVisibility::default());
    }
}
