// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the element tree: node identifiers, element descriptions, and styles.

use alloc::string::{String, ToString};
use kurbo::Rect;
use smallvec::SmallVec;

/// Identifier for a node in the tree (generational).
///
/// An identifier goes stale once its node is removed; every accessor on
/// [`Document`](crate::Document) treats stale identifiers as absent.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A single `name="value"` pair on an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercase attribute name.
    pub name: String,
    /// Raw attribute value.
    pub value: String,
}

/// Attribute storage; most elements carry only a handful of attributes.
pub type Attributes = SmallVec<[Attribute; 4]>;

/// Description of an element to insert into a [`Document`](crate::Document).
///
/// ```rust
/// use understory_element_tree::{Document, ElementSpec};
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let button = doc.insert(
///     Some(body),
///     ElementSpec::new("button").attr("id", "ok").attr("tabindex", "2"),
/// );
/// assert_eq!(doc.attribute(button, "tabindex"), Some("2"));
/// assert_eq!(doc.element_by_id("ok"), Some(button));
/// ```
#[derive(Clone, Debug)]
pub struct ElementSpec {
    /// Tag name; stored lowercase.
    pub local_name: String,
    /// Initial attributes.
    pub attributes: Attributes,
    /// Layout box reported while the element is rendered.
    pub bounds: Rect,
}

impl ElementSpec {
    /// Describe an element with the given tag name and no attributes.
    pub fn new(local_name: &str) -> Self {
        Self {
            local_name: local_name.to_ascii_lowercase(),
            attributes: Attributes::new(),
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
        }
    }

    /// Add (or replace) an attribute.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value.to_string();
        } else {
            self.attributes.push(Attribute {
                name,
                value: value.to_string(),
            });
        }
        self
    }

    /// Set the layout box reported by [`Document::client_rect`](crate::Document::client_rect).
    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }
}

/// Computed `display` value, reduced to the distinctions that affect rendering boxes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Display {
    /// Any value that generates a box (`block`, `inline`, `flex`, ...).
    #[default]
    Box,
    /// `display: none`; the element and its subtree generate no boxes.
    None,
    /// `display: contents`; the element generates no box, its children do.
    Contents,
}

/// Computed `visibility` value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `visibility: visible`.
    #[default]
    Visible,
    /// `visibility: hidden`.
    Hidden,
    /// `visibility: collapse`.
    Collapse,
}

/// The two style properties the tree computes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComputedStyle {
    /// Computed `display`.
    pub display: Display,
    /// Computed (inherited) `visibility`.
    pub visibility: Visibility,
}

/// Declarations read from an inline `style` attribute.
///
/// Only `display` and `visibility` are interpreted; everything else is ignored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InlineStyle {
    /// Declared `display`, if any.
    pub display: Option<Display>,
    /// Declared `visibility`, if any.
    pub visibility: Option<Visibility>,
}

impl InlineStyle {
    /// Parse the text of a `style` attribute. Later declarations win.
    ///
    /// ```rust
    /// use understory_element_tree::{Display, InlineStyle, Visibility};
    ///
    /// let style = InlineStyle::parse("color: red; DISPLAY: none ;visibility:hidden");
    /// assert_eq!(style.display, Some(Display::None));
    /// assert_eq!(style.visibility, Some(Visibility::Hidden));
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut style = Self::default();
        for declaration in text.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim();
            let value = value.trim().trim_end_matches("!important").trim();
            if property.eq_ignore_ascii_case("display") {
                style.display = Some(if value.eq_ignore_ascii_case("none") {
                    Display::None
                } else if value.eq_ignore_ascii_case("contents") {
                    Display::Contents
                } else {
                    Display::Box
                });
            } else if property.eq_ignore_ascii_case("visibility") {
                style.visibility = if value.eq_ignore_ascii_case("hidden") {
                    Some(Visibility::Hidden)
                } else if value.eq_ignore_ascii_case("collapse") {
                    Some(Visibility::Collapse)
                } else if value.eq_ignore_ascii_case("visible") {
                    Some(Visibility::Visible)
                } else {
                    // `inherit` and friends fall back to the inherited value.
                    None
                };
            }
        }
        style
    }
}
