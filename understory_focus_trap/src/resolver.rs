// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tab destination resolution over a forest of roots.
//!
//! Given ordered roots, an origin and a direction, [`get_destination`] returns
//! the element Tab should move to, or [`Destination::NoOp`] when the host's
//! native traversal already lands in the right place. The traversal order is
//! the one described in [`order`](crate::order).
//!
//! ## Origins
//!
//! - **Positive tier** (anywhere, inside a root or not): the neighbor in the
//!   global positive tier, wrapping into the zero tier at either end.
//! - **Zero tier inside a root**: native handling, unless the origin is the
//!   root's last (forward) or first (backward) zero-tier stop, in which case the
//!   search crosses into the adjacent root. Crossing past the last root
//!   forward, or before the first root backward, visits the positive tier once.
//! - **Anything else** (negative tab index, not a stop, or a zero-tier element
//!   outside every root): positioned by document order against the roots.
//!
//! Crossing is bounded: at most `2 × roots` positions are visited before
//! [`TrapError::NoTabbableElements`] is reported.

use core::cmp::Ordering;

use crate::error::TrapError;
use crate::host::Host;
use crate::order::TabOrder;
use crate::roots::OrderedRoots;
use crate::tabbable::{Tier, consistent_tab_index, tier};

/// Tab (`Forward`) or Shift+Tab (`Backward`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Tab.
    Forward,
    /// Shift+Tab.
    Backward,
}

impl Direction {
    /// Direction of a Tab press.
    pub fn from_shift(shift: bool) -> Self {
        if shift { Self::Backward } else { Self::Forward }
    }

    fn step(self) -> isize {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// Outcome of destination resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Destination<E> {
    /// Move focus here.
    Element(E),
    /// Leave the key press to the host.
    NoOp,
}

/// Resolve the destination of a Tab press on `origin`.
pub fn get_destination<H: Host>(
    host: &H,
    roots: &OrderedRoots<H::Element>,
    origin: H::Element,
    direction: Direction,
) -> Result<Destination<H::Element>, TrapError> {
    let order = TabOrder::compute(host, roots);
    let destination = resolve(host, roots, &order, origin, direction)?;
    tracing::trace!(?origin, ?direction, ?destination, "resolved tab destination");
    Ok(destination)
}

/// [`get_destination`] over a precomputed snapshot of `roots`.
pub fn resolve<H: Host>(
    host: &H,
    roots: &OrderedRoots<H::Element>,
    order: &TabOrder<H::Element>,
    origin: H::Element,
    direction: Direction,
) -> Result<Destination<H::Element>, TrapError> {
    let resolver = Resolver {
        host,
        roots,
        order,
        direction,
    };
    match (tier(host, origin), roots.position_of(host, origin)) {
        (Tier::Positive(_), _) => resolver.from_positive(origin),
        (Tier::Zero, Some(root)) => resolver.from_zero(origin, root),
        (_, Some(root)) => resolver.from_inside(origin, root),
        (_, None) => resolver.from_outside(origin),
    }
}

struct Resolver<'a, H: Host> {
    host: &'a H,
    roots: &'a OrderedRoots<H::Element>,
    order: &'a TabOrder<H::Element>,
    direction: Direction,
}

impl<H: Host> Resolver<'_, H> {
    fn forward(&self) -> bool {
        self.direction == Direction::Forward
    }

    fn before(&self, a: H::Element, b: H::Element) -> bool {
        self.host.compare_document_position(a, b) == Ordering::Less
    }

    /// Entry stop of a root in the current direction.
    fn entry_of(&self, root: usize) -> Option<H::Element> {
        let zeros = self.order.zeros(root);
        if self.forward() {
            zeros.first().copied()
        } else {
            zeros.last().copied()
        }
    }

    /// Exit stop of a root in the current direction.
    fn exit_of(&self, root: usize) -> Option<H::Element> {
        let zeros = self.order.zeros(root);
        if self.forward() {
            zeros.last().copied()
        } else {
            zeros.first().copied()
        }
    }

    fn from_positive(&self, origin: H::Element) -> Result<Destination<H::Element>, TrapError> {
        let positive = self.order.positive();
        let slot = self
            .order
            .positive_slot(self.host, origin, consistent_tab_index(self.host, origin));
        let neighbor = match (slot, self.direction) {
            (Ok(i), Direction::Forward) => Some(i + 1),
            (Err(i), Direction::Forward) => Some(i),
            (Ok(i) | Err(i), Direction::Backward) => i.checked_sub(1),
        };
        if let Some(&(el, _)) = neighbor.and_then(|i| positive.get(i)) {
            return Ok(Destination::Element(el));
        }
        // Past either end of the positive tier: wrap into the zero tier, or
        // around the positive tier itself when there is no zero tier.
        let wrapped = if self.forward() {
            self.order
                .first_zero()
                .or_else(|| positive.first().map(|&(e, _)| e))
        } else {
            self.order
                .last_zero()
                .or_else(|| positive.last().map(|&(e, _)| e))
        };
        wrapped
            .map(Destination::Element)
            .ok_or(TrapError::NoTabbableElements)
    }

    fn from_zero(
        &self,
        origin: H::Element,
        root: usize,
    ) -> Result<Destination<H::Element>, TrapError> {
        if self.exit_of(root) != Some(origin) {
            return Ok(Destination::NoOp);
        }
        self.cross(root as isize)
    }

    fn from_inside(
        &self,
        origin: H::Element,
        root: usize,
    ) -> Result<Destination<H::Element>, TrapError> {
        let zeros = self.order.zeros(root);
        let (Some(&first), Some(&last)) = (zeros.first(), zeros.last()) else {
            return self.cross(root as isize);
        };
        let after_first = self.before(first, origin);
        let before_last = self.before(origin, last);
        match (after_first, before_last) {
            (true, true) => Ok(Destination::NoOp),
            // Ahead of the span: its entry stop is next.
            (false, _) if self.forward() => Ok(Destination::Element(first)),
            (_, false) if !self.forward() => Ok(Destination::Element(last)),
            _ => self.cross(root as isize),
        }
    }

    fn from_outside(&self, origin: H::Element) -> Result<Destination<H::Element>, TrapError> {
        let roots = self.roots.as_slice();
        let n = roots.len() as isize;
        let from = if self.forward() {
            roots
                .iter()
                .position(|&r| self.before(origin, r))
                .map_or(n - 1, |f| f as isize - 1)
        } else {
            roots
                .iter()
                .rposition(|&r| self.before(r, origin))
                .map_or(0, |p| p as isize + 1)
        };
        self.cross(from)
    }

    /// Walk roots from `from` in the current direction and return the first
    /// entry stop found. The positive tier sits between the last root and the
    /// first one.
    fn cross(&self, from: isize) -> Result<Destination<H::Element>, TrapError> {
        let n = self.roots.len() as isize;
        let positive = self.order.positive();
        for step in 1..=2 * n {
            let raw = from + step * self.direction.step();
            let positive_stop = match self.direction {
                Direction::Forward if raw == n => positive.first(),
                Direction::Backward if raw == -1 => positive.last(),
                _ => None,
            };
            if let Some(&(el, _)) = positive_stop {
                return Ok(Destination::Element(el));
            }
            if let Some(el) = self.entry_of(raw.rem_euclid(n) as usize) {
                return Ok(Destination::Element(el));
            }
        }
        Err(TrapError::NoTabbableElements)
    }
}
