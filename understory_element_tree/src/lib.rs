// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_element_tree --heading-base-level=0

//! Understory Element Tree: an arena-backed element tree with document semantics.
//!
//! Understory Element Tree is a small, self-contained stand-in for the part of a
//! document object model that focus management needs: structure, attributes,
//! a couple of computed styles, focus, listener registrations, and mutation
//! observers. It backs headless tests and demos of focus policies, and can serve
//! as the widget-side mirror of a real document in embedders that do not run a
//! browser.
//!
//! ## Not a layout engine
//!
//! This crate does not perform layout. Each element carries a layout box supplied by
//! the caller; the tree only decides whether that box exists (connected, not under
//! `display: none`, not `display: contents`).
//!
//! ## API overview
//!
//! - [`Document`]: container managing nodes, focus, listeners, and observers.
//! - [`ElementSpec`]: description of an element to insert (tag, attributes, bounds).
//! - [`NodeId`]: generational handle of a node.
//! - [`ComputedStyle`], [`Display`], [`Visibility`], [`InlineStyle`]: the style
//!   subset the tree computes.
//! - [`events`]: listener registrations and capture → target → bubble sequences.
//! - [`mutation`]: mutation records and observer options.
//!
//! Key operations:
//! - [`Document::insert`] / [`Document::remove`] / [`Document::reparent`]
//! - [`Document::set_attribute`] / [`Document::remove_attribute`]
//! - [`Document::contains`] and [`Document::compare_document_position`]
//! - [`Document::next_depth_first`] and [`Document::prev_depth_first`]
//! - [`Document::tab_index`], [`Document::computed_style`], [`Document::client_rect`]
//! - [`Document::focus`] / [`Document::active_element`]
//! - [`Document::observe`] / [`Document::take_records`] / [`Document::disconnect`]
//!
//! ## Example
//!
//! ```rust
//! use understory_element_tree::mutation::{ObserveFlags, ObserverOptions};
//! use understory_element_tree::{Document, ElementSpec};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let form = doc.insert(Some(body), ElementSpec::new("form"));
//! let observer = doc.observe(
//!     form,
//!     ObserverOptions {
//!         flags: ObserveFlags::CHILD_LIST | ObserveFlags::SUBTREE,
//!         attribute_filter: Vec::new(),
//!     },
//! );
//!
//! let input = doc.insert(Some(form), ElementSpec::new("input"));
//! assert!(doc.focus(input));
//! assert_eq!(doc.active_element(), input);
//! assert_eq!(doc.take_records(observer).len(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod document;
pub mod events;
pub mod mutation;
mod types;

pub use document::Document;
pub use types::{
    Attribute, Attributes, ComputedStyle, Display, ElementSpec, InlineStyle, NodeId, Visibility,
};
