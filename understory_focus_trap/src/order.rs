// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tab-order snapshots of a root forest.
//!
//! The trap's tab sequence over roots `R0..Rn` is the global positive tier
//! (ascending tab index, document order for ties) followed by the zero tier of
//! every root in root order, then it wraps:
//!
//! ```text
//! [positive tier] ++ zeros(R0) ++ zeros(R1) ++ ... ++ zeros(Rn) -> wrap
//! ```
//!
//! [`TabOrder`] materializes that sequence; [`Boundaries`] keeps only what is
//! needed to tell whether a mutation can move a root's first or last stop.

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::host::Host;
use crate::roots::OrderedRoots;
use crate::tabbable::{Tier, tabbables};

/// Pure snapshot of the tab stops reachable from a set of roots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabOrder<E> {
    zeros: Vec<Vec<E>>,
    positive: Vec<(E, i32)>,
}

impl<E: Copy + Eq> TabOrder<E> {
    /// Collect the tab stops of every root.
    pub fn compute<H: Host<Element = E>>(host: &H, roots: &OrderedRoots<E>) -> Self {
        let mut zeros = Vec::with_capacity(roots.len());
        let mut positive = Vec::new();
        for &root in roots.as_slice() {
            let mut zero = Vec::new();
            for (el, tier) in tabbables(host, root) {
                match tier {
                    Tier::Zero => zero.push(el),
                    Tier::Positive(t) => positive.push((el, t)),
                    Tier::Untabbable => {}
                }
            }
            zeros.push(zero);
        }
        // Roots are visited in document order, so a stable sort on the index
        // leaves ties in document order.
        positive.sort_by_key(|&(_, t)| t);
        Self { zeros, positive }
    }

    /// Zero-tier stops of the root at `root`, in document order.
    pub fn zeros(&self, root: usize) -> &[E] {
        self.zeros.get(root).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Positive-tier stops across all roots with their tab index, in tab order.
    pub fn positive(&self) -> &[(E, i32)] {
        &self.positive
    }

    /// Whether any root has a positive-tier stop.
    pub fn has_positive(&self) -> bool {
        !self.positive.is_empty()
    }

    /// Whether there are no stops at all.
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.zeros.iter().all(Vec::is_empty)
    }

    /// First zero-tier stop of the forest.
    pub fn first_zero(&self) -> Option<E> {
        self.zeros.iter().find_map(|z| z.first().copied())
    }

    /// Last zero-tier stop of the forest.
    pub fn last_zero(&self) -> Option<E> {
        self.zeros.iter().rev().find_map(|z| z.last().copied())
    }

    /// The stop a freshly built trap focuses: first positive, else first zero.
    pub fn first_tabbable(&self) -> Option<E> {
        self.positive.first().map(|&(e, _)| e).or_else(|| self.first_zero())
    }

    /// The whole tab sequence, in the order Tab visits it.
    pub fn sequence(&self) -> Vec<E> {
        self.positive
            .iter()
            .map(|&(e, _)| e)
            .chain(self.zeros.iter().flatten().copied())
            .collect()
    }

    /// Index `origin` has, or would have, in the positive tier.
    ///
    /// Returns `Ok(i)` when `origin` is listed at `i`, `Err(i)` for the slot it
    /// would be inserted at given tab index `tab_index`.
    pub(crate) fn positive_slot<H: Host<Element = E>>(
        &self,
        host: &H,
        origin: E,
        tab_index: i32,
    ) -> Result<usize, usize> {
        if let Some(i) = self.positive.iter().position(|&(e, _)| e == origin) {
            return Ok(i);
        }
        Err(self.positive.partition_point(|&(e, t)| {
            t < tab_index
                || (t == tab_index && host.compare_document_position(e, origin) == Ordering::Less)
        }))
    }
}

/// First and last zero-tier stop of one root.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Span<E> {
    /// First zero-tier stop.
    pub first: E,
    /// Last zero-tier stop (may equal `first`).
    pub last: E,
}

/// Cached per-root boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Boundaries<E> {
    /// One entry per root; `None` for roots without zero-tier stops.
    pub spans: Vec<Option<Span<E>>>,
    /// Whether any root has a positive-tier stop.
    pub has_positive: bool,
}

impl<E: Copy + Eq> Boundaries<E> {
    /// Boundaries of a snapshot.
    pub fn of(order: &TabOrder<E>) -> Self {
        let spans = order
            .zeros
            .iter()
            .map(|z| match (z.first(), z.last()) {
                (Some(&first), Some(&last)) => Some(Span { first, last }),
                _ => None,
            })
            .collect();
        Self {
            spans,
            has_positive: order.has_positive(),
        }
    }

    /// Recompute from the host.
    pub fn compute<H: Host<Element = E>>(host: &H, roots: &OrderedRoots<E>) -> Self {
        Self::of(&TabOrder::compute(host, roots))
    }

    /// Span of the root at `root`.
    pub fn span(&self, root: usize) -> Option<Span<E>> {
        self.spans.get(root).copied().flatten()
    }
}

#[cfg(all(test, feature = "element_tree_adapter"))]
mod tests {
    use super::*;
    use crate::roots::{ElementRef, normalise_roots};
    use alloc::vec;
    use understory_element_tree::{Document, ElementSpec, NodeId};

    fn stop(doc: &mut Document, parent: NodeId, tabindex: &str) -> NodeId {
        doc.insert(Some(parent), ElementSpec::new("div").attr("tabindex", tabindex))
    }

    #[test]
    fn positive_tier_is_global_and_zero_tier_per_root() {
        let mut doc = Document::new();
        let body = doc.body();
        let r1 = doc.insert(Some(body), ElementSpec::new("div"));
        let a = stop(&mut doc, r1, "0");
        let x = stop(&mut doc, r1, "3");
        let tie_first = stop(&mut doc, r1, "1");
        let r2 = doc.insert(Some(body), ElementSpec::new("div"));
        let y = stop(&mut doc, r2, "1");
        let b = stop(&mut doc, r2, "0");
        let _skipped = stop(&mut doc, r2, "-1");

        let roots = normalise_roots(&doc, &[ElementRef::Element(r2), ElementRef::Element(r1)])
            .unwrap();
        let order = TabOrder::compute(&doc, &roots);
        assert_eq!(order.zeros(0), &[a]);
        assert_eq!(order.zeros(1), &[b]);
        assert_eq!(order.positive(), &[(tie_first, 1), (y, 1), (x, 3)]);
        assert_eq!(order.sequence(), vec![tie_first, y, x, a, b]);
        assert_eq!(order.first_tabbable(), Some(tie_first));
        assert_eq!(order.last_zero(), Some(b));

        // An outside element with tab index 2 slots between `y` and `x`.
        let outside = stop(&mut doc, body, "2");
        assert_eq!(order.positive_slot(&doc, outside, 2), Err(2));
        assert_eq!(order.positive_slot(&doc, y, 1), Ok(1));
    }

    #[test]
    fn boundaries_track_first_and_last_zero() {
        let mut doc = Document::new();
        let body = doc.body();
        let r1 = doc.insert(Some(body), ElementSpec::new("div"));
        let a = stop(&mut doc, r1, "0");
        let b = stop(&mut doc, r1, "0");
        let c = stop(&mut doc, r1, "0");
        let r2 = doc.insert(Some(body), ElementSpec::new("div"));
        let _only_positive = stop(&mut doc, r2, "4");

        let roots =
            normalise_roots(&doc, &[ElementRef::Element(r1), ElementRef::Element(r2)]).unwrap();
        let boundaries = Boundaries::compute(&doc, &roots);
        assert_eq!(boundaries.span(0), Some(Span { first: a, last: c }));
        assert_eq!(boundaries.span(1), None);
        assert!(boundaries.has_positive);
        assert_ne!(boundaries.span(0).map(|s| s.first), Some(b));
    }
}
