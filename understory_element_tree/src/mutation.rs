// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutation records and observer registrations.
//!
//! Observers are registered with [`Document::observe`](crate::Document::observe).
//! Every structural or attribute change made through the [`Document`](crate::Document)
//! API is queued on each matching observer and handed out in batches by
//! [`Document::take_records`](crate::Document::take_records).

use alloc::string::String;
use alloc::vec::Vec;

use crate::types::NodeId;

bitflags::bitflags! {
    /// What an observer wants to hear about.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ObserveFlags: u8 {
        /// Children added to or removed from the target.
        const CHILD_LIST = 0b0000_0001;
        /// Attribute changes on the target.
        const ATTRIBUTES = 0b0000_0010;
        /// Extend observation to every descendant of the target.
        const SUBTREE = 0b0000_0100;
        /// Capture the previous value of changed attributes.
        const ATTRIBUTE_OLD_VALUE = 0b0000_1000;
    }
}

/// Options for [`Document::observe`](crate::Document::observe).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObserverOptions {
    /// Which mutation kinds to record.
    pub flags: ObserveFlags,
    /// When non-empty, only these attribute names are recorded.
    pub attribute_filter: Vec<String>,
}

impl ObserverOptions {
    /// Whether an attribute change to `name` should be recorded.
    pub fn wants_attribute(&self, name: &str) -> bool {
        self.flags.contains(ObserveFlags::ATTRIBUTES)
            && (self.attribute_filter.is_empty()
                || self.attribute_filter.iter().any(|f| f == name))
    }
}

/// Handle of a registered observer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u32);

/// A single recorded change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    /// Children were added to or removed from `target`.
    ChildList {
        /// The parent whose child list changed.
        target: NodeId,
        /// Nodes inserted.
        added: Vec<NodeId>,
        /// Nodes removed. Removed nodes are stale by the time the record is read.
        removed: Vec<NodeId>,
    },
    /// An attribute of `target` was set or removed.
    Attribute {
        /// The element whose attribute changed.
        target: NodeId,
        /// Attribute name.
        name: String,
        /// Previous value, when the observer asked for it and the attribute existed.
        old_value: Option<String>,
    },
}

impl MutationRecord {
    /// The node the record is about.
    pub fn target(&self) -> NodeId {
        match self {
            Self::ChildList { target, .. } | Self::Attribute { target, .. } => *target,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Observer {
    pub(crate) target: NodeId,
    pub(crate) options: ObserverOptions,
    pub(crate) records: Vec<MutationRecord>,
}
