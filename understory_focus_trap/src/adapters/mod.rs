// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapters to run the trap against other Understory crates.
//!
//! Each adapter is gated behind a feature flag so the core stays host-agnostic.
//!
//! ## Available Adapters
//!
//! - [`element_tree`] (`element_tree_adapter` feature): implements [`Host`](crate::Host)
//!   for [`understory_element_tree::Document`] and dispatches document events
//!   to a [`TrapListener`](crate::TrapListener) through the tree's
//!   capture → target → bubble propagation.

#[cfg(feature = "element_tree_adapter")]
pub mod element_tree;
