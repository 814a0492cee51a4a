// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root references and their normalization into an ordered forest.

use alloc::string::String;

use smallvec::SmallVec;

use crate::error::TrapError;
use crate::host::Host;

/// A reference to an element, either by identifier or by handle.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementRef<E> {
    /// Resolved through [`Host::element_by_id`] each time it is needed.
    Id(String),
    /// A direct handle.
    Element(E),
}

impl<E: Copy> ElementRef<E> {
    /// Resolve to a live element, if any.
    pub fn resolve<H: Host<Element = E>>(&self, host: &H) -> Option<E> {
        match self {
            Self::Id(id) => host.element_by_id(id),
            Self::Element(el) => Some(*el),
        }
        .filter(|&el| host.is_element(el))
    }
}

impl<E> From<&str> for ElementRef<E> {
    fn from(id: &str) -> Self {
        Self::Id(id.into())
    }
}

impl<E> From<String> for ElementRef<E> {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

/// Surviving roots, sorted by document order, none nested in another.
///
/// Most traps have one or two roots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedRoots<E>(SmallVec<[E; 2]>);

impl<E: Copy> OrderedRoots<E> {
    /// The roots, in document order.
    pub fn as_slice(&self) -> &[E] {
        &self.0
    }

    /// Number of roots. Never zero.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no roots. Never `true` for a normalised set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Root at `index`.
    pub fn get(&self, index: usize) -> Option<E> {
        self.0.get(index).copied()
    }

    /// Index of the root containing `el` (inclusive), if any.
    pub fn position_of<H: Host<Element = E>>(&self, host: &H, el: E) -> Option<usize> {
        self.0.iter().position(|&r| host.contains(r, el))
    }

    /// Whether any root contains `el`.
    pub fn contains<H: Host<Element = E>>(&self, host: &H, el: E) -> bool {
        self.position_of(host, el).is_some()
    }
}

/// Resolve, deduplicate, de-nest, and sort roots.
///
/// Unresolvable references and nested roots are dropped with a warning. Fails
/// with [`TrapError::NoValidRoot`] only when nothing survives.
pub fn normalise_roots<H: Host>(
    host: &H,
    roots: &[ElementRef<H::Element>],
) -> Result<OrderedRoots<H::Element>, TrapError> {
    normalise(host, roots, true)
}

/// [`normalise_roots`] for the stale-root repair pass run on every Tab press.
/// Drops are silent there.
pub(crate) fn repair_roots<H: Host>(
    host: &H,
    roots: &[ElementRef<H::Element>],
) -> Result<OrderedRoots<H::Element>, TrapError> {
    normalise(host, roots, false)
}

fn normalise<H: Host>(
    host: &H,
    roots: &[ElementRef<H::Element>],
    report: bool,
) -> Result<OrderedRoots<H::Element>, TrapError> {
    let mut resolved: SmallVec<[H::Element; 2]> = SmallVec::new();
    for r in roots {
        match r.resolve(host) {
            Some(el) if !resolved.contains(&el) => resolved.push(el),
            Some(_) => {}
            None if report => {
                tracing::warn!(root = ?r, "focus trap root is not a live element, dropped");
            }
            None => {}
        }
    }

    let mut survivors: SmallVec<[H::Element; 2]> = SmallVec::new();
    for &candidate in &resolved {
        match resolved
            .iter()
            .find(|&&other| other != candidate && host.contains(other, candidate))
        {
            Some(outer) if report => tracing::warn!(
                root = ?candidate,
                ancestor = ?outer,
                "focus trap root is nested in another root, dropped"
            ),
            Some(_) => {}
            None => survivors.push(candidate),
        }
    }

    if survivors.is_empty() {
        return Err(TrapError::NoValidRoot);
    }
    survivors.sort_by(|&a, &b| host.compare_document_position(a, b));
    Ok(OrderedRoots(survivors))
}
