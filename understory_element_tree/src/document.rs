// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core document implementation: structure, attributes, queries, focus, events, observers.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashMap;
use kurbo::Rect;
use smallvec::SmallVec;

use crate::events::{Dispatch, EventType, Listener, Phase};
use crate::mutation::{MutationRecord, ObserveFlags, Observer, ObserverId, ObserverOptions};
use crate::types::{
    Attribute, Attributes, ComputedStyle, Display, ElementSpec, InlineStyle, NodeId, Visibility,
};

/// An in-memory document: a tree of elements rooted at a document node.
///
/// Nodes live in a generational arena. Removing a node frees its whole
/// subtree and turns every identifier inside it stale; stale identifiers are
/// treated as absent by all accessors, so callers holding on to old handles
/// never observe reused slots.
///
/// Nodes inserted with no parent form detached subtrees. They are live but
/// not connected: they have no rendering box, cannot be focused, and are not
/// found by [`Document::element_by_id`].
///
/// ## Example
///
/// ```rust
/// use core::cmp::Ordering;
/// use understory_element_tree::{Document, ElementSpec};
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let dialog = doc.insert(Some(body), ElementSpec::new("div").attr("id", "dialog"));
/// let ok = doc.insert(Some(dialog), ElementSpec::new("button"));
/// let after = doc.insert(Some(body), ElementSpec::new("a").attr("href", "#"));
///
/// assert!(doc.contains(dialog, ok));
/// assert_eq!(doc.compare_document_position(ok, after), Ordering::Less);
/// assert_eq!(doc.tab_index(ok), 0);
/// ```
pub struct Document {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    document: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    listeners: SmallVec<[Listener; 4]>,
    observers: HashMap<ObserverId, Observer>,
    next_observer: u32,
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Document")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("focused", &self.focused)
            .field("listeners", &self.listeners.len())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Clone, Debug)]
struct ElementData {
    local_name: String,
    attributes: Attributes,
    bounds: Rect,
}

impl ElementData {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

impl Node {
    fn element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl Document {
    /// Create a document containing a single empty `<body>`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            document: NodeId::new(0, 1),
            body: NodeId::new(0, 1),
            focused: None,
            listeners: SmallVec::new(),
            observers: HashMap::new(),
            next_observer: 0,
        };
        doc.document = doc.alloc(NodeData::Document);
        let body = doc.alloc(NodeData::Element(ElementData {
            local_name: "body".to_string(),
            attributes: Attributes::new(),
            bounds: Rect::ZERO,
        }));
        doc.link_parent(body, doc.document);
        doc.body = body;
        doc
    }

    /// The document node (the root of the connected tree).
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node {
                generation,
                parent: None,
                children: Vec::new(),
                data,
            });
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node {
                generation,
                parent: None,
                children: Vec::new(),
                data,
            }));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId stores 32-bit indices."
        )]
        NodeId::new(idx as u32, generation)
    }

    /// Insert a new element as the last child of `parent` (or detached if `None`).
    ///
    /// Inserting under a stale parent yields a detached element.
    pub fn insert(&mut self, parent: Option<NodeId>, spec: ElementSpec) -> NodeId {
        let id = self.alloc(NodeData::Element(ElementData {
            local_name: spec.local_name,
            attributes: spec.attributes,
            bounds: spec.bounds,
        }));
        if let Some(p) = parent.filter(|p| self.is_alive(*p)) {
            self.link_parent(id, p);
            self.queue_child_list(p, Some(id), None);
        }
        id
    }

    /// Insert a text node as the last child of `parent`.
    pub fn insert_text(&mut self, parent: NodeId, text: &str) -> Option<NodeId> {
        if !self.is_alive(parent) {
            return None;
        }
        let id = self.alloc(NodeData::Text(text.to_string()));
        self.link_parent(id, parent);
        self.queue_child_list(parent, Some(id), None);
        Some(id)
    }

    /// Remove a node (and its subtree) from the document.
    ///
    /// All identifiers in the subtree become stale. Removing the document node is ignored.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) || id == self.document {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.queue_child_list(parent, None, Some(id));
            self.unlink_parent(id, parent);
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = self.node(id).children.clone();
        for child in children {
            self.free_subtree(child);
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
        if id == self.body {
            // Keep `body()` pointing at a live node.
            self.body = self.document;
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Move `id` to become the last child of `new_parent` (or detach it if `None`).
    ///
    /// Moves that would create a cycle are ignored.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if !self.is_alive(id) || id == self.document {
            return;
        }
        if let Some(p) = new_parent
            && (!self.is_alive(p) || self.contains(id, p))
        {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.queue_child_list(parent, None, Some(id));
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
            self.queue_child_list(p, Some(id), None);
        }
    }

    /// Set (or replace) an attribute on a live element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let old_value = match element.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(core::mem::replace(&mut existing.value, value.to_string())),
            None => {
                element.attributes.push(Attribute {
                    name: name.clone(),
                    value: value.to_string(),
                });
                None
            }
        };
        self.queue_attribute(id, name, old_value);
    }

    /// Remove an attribute from a live element. Missing attributes are ignored.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let name = name.to_ascii_lowercase();
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let Some(pos) = element.attributes.iter().position(|a| a.name == name) else {
            return;
        };
        let old = element.attributes.remove(pos);
        self.queue_attribute(id, name, Some(old.value));
    }

    /// Update the layout box of an element.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(element) = self.element_mut(id) {
            element.bounds = bounds;
        }
    }

    // --- queries ---

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns true if `id` is live and its ancestor chain reaches the document node.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if !self.is_alive(n) {
                return false;
            }
            if n == self.document {
                return true;
            }
            cur = self.node(n).parent;
        }
        false
    }

    /// Returns true if `id` is a live element (not the document or a text node).
    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        self.node(id).parent
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node(id).children
    }

    /// First child that is an element.
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children_of(id)
            .iter()
            .copied()
            .find(|c| self.is_element(*c))
    }

    /// Next sibling that is an element.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|s| self.is_element(*s))
    }

    /// Get the next node in depth-first traversal order.
    ///
    /// Returns `None` if no next node exists or if the current node is stale.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(&first_child) = self.node(current).children.first() {
            return Some(first_child);
        }
        let mut node = current;
        while let Some(parent) = self.parent_of(node) {
            if let Some(next_sibling) = self.sibling(node, 1) {
                return Some(next_sibling);
            }
            node = parent;
        }
        None
    }

    /// Get the previous node in reverse depth-first traversal order.
    ///
    /// Returns `None` if no previous node exists or if the current node is stale.
    pub fn prev_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(mut node) = self.sibling(current, -1) {
            while let Some(&last_child) = self.node(node).children.last() {
                node = last_child;
            }
            return Some(node);
        }
        self.parent_of(current)
    }

    fn sibling(&self, node: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        pos.checked_add_signed(offset)
            .and_then(|p| siblings.get(p))
            .copied()
    }

    /// Inclusive containment: `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent_of(n);
        }
        false
    }

    /// Total order of nodes in the document (pre-order, depth-first).
    ///
    /// Ancestors precede their descendants. Nodes in different detached
    /// subtrees are ordered by the slot of their subtree root; stale nodes
    /// order after every live node. The order is transitive in all cases.
    pub fn compare_document_position(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let pa = self.ancestry(a);
        let pb = self.ancestry(b);
        let key = |path: &[NodeId], id: NodeId| match path.first() {
            Some(root) => (0_u8, root.0, root.1),
            None => (1_u8, id.0, id.1),
        };
        let (ka, kb) = (key(&pa, a), key(&pb, b));
        if ka != kb {
            return ka.cmp(&kb);
        }
        let common = pa.iter().zip(pb.iter()).take_while(|(x, y)| x == y).count();
        if common == pa.len() {
            return Ordering::Less;
        }
        if common == pb.len() {
            return Ordering::Greater;
        }
        let siblings = &self.node(pa[common - 1]).children;
        let ia = siblings.iter().position(|&s| s == pa[common]);
        let ib = siblings.iter().position(|&s| s == pb[common]);
        ia.cmp(&ib)
    }

    /// Root → node path of a live node; empty for stale ids.
    fn ancestry(&self, id: NodeId) -> SmallVec<[NodeId; 16]> {
        let mut out = SmallVec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            if !self.is_alive(n) {
                return SmallVec::new();
            }
            out.push(n);
            cur = self.node(n).parent;
        }
        out.reverse();
        out
    }

    /// Lowercase tag name of a live element.
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.local_name.as_str())
    }

    /// Attribute value of a live element.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    /// Whether a live element carries the attribute.
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        if !self.is_alive(id) {
            return None;
        }
        match &self.node(id).data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// The first connected element, in document order, whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut cur = Some(self.document);
        while let Some(n) = cur {
            if self.attribute(n, "id") == Some(id) {
                return Some(n);
            }
            cur = self.next_depth_first(n);
        }
        None
    }

    /// The element's native `tabIndex`.
    ///
    /// A valid integer `tabindex` attribute wins. Otherwise links with `href`,
    /// form controls, iframes, and the first `<summary>` of a `<details>` default
    /// to `0`; every other element, including `<details>`, media elements with
    /// controls, and editable content, reports `-1`.
    pub fn tab_index(&self, id: NodeId) -> i32 {
        let Some(element) = self.element(id) else {
            return -1;
        };
        if let Some(value) = element
            .attribute("tabindex")
            .and_then(|v| v.trim().parse::<i32>().ok())
        {
            return value;
        }
        match element.local_name.as_str() {
            "a" | "area" if element.attribute("href").is_some() => 0,
            "button" | "input" | "select" | "textarea" | "iframe" => 0,
            "summary" if self.is_first_summary(id) => 0,
            _ => -1,
        }
    }

    fn is_first_summary(&self, id: NodeId) -> bool {
        let Some(parent) = self.parent_of(id) else {
            return false;
        };
        self.local_name(parent) == Some("details")
            && self
                .children_of(parent)
                .iter()
                .copied()
                .find(|c| self.local_name(*c) == Some("summary"))
                == Some(id)
    }

    /// Computed `display` and `visibility` of a live element.
    ///
    /// `display` comes from the inline style, then from the `hidden` attribute.
    /// `visibility` inherits from the nearest element that declares it.
    pub fn computed_style(&self, id: NodeId) -> Option<ComputedStyle> {
        let element = self.element(id)?;
        let own = element.attribute("style").map(InlineStyle::parse).unwrap_or_default();
        let display = own.display.unwrap_or(if element.attribute("hidden").is_some() {
            Display::None
        } else {
            Display::Box
        });
        let mut visibility = own.visibility;
        let mut cur = self.parent_of(id);
        while visibility.is_none() {
            let Some(n) = cur else {
                break;
            };
            visibility = self
                .attribute(n, "style")
                .and_then(|s| InlineStyle::parse(s).visibility);
            cur = self.parent_of(n);
        }
        Some(ComputedStyle {
            display,
            visibility: visibility.unwrap_or(Visibility::Visible),
        })
    }

    /// The element's layout box, or `None` when it generates no box.
    ///
    /// Detached elements, elements with `display: none` on themselves or an
    /// ancestor, and `display: contents` elements have no box.
    pub fn client_rect(&self, id: NodeId) -> Option<Rect> {
        let element = self.element(id)?;
        if !self.is_connected(id) {
            return None;
        }
        if self.computed_style(id)?.display != Display::Box {
            return None;
        }
        let mut cur = self.parent_of(id);
        while let Some(n) = cur {
            if self
                .computed_style(n)
                .is_some_and(|s| s.display == Display::None)
            {
                return None;
            }
            cur = self.parent_of(n);
        }
        Some(element.bounds)
    }

    // --- focus ---

    /// Move focus to a connected element. Returns whether focus moved.
    ///
    /// The document does not judge focusability; callers decide what may be focused.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if self.is_element(id) && self.is_connected(id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    /// Clear focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// The focused element, or `<body>` when nothing (live) is focused.
    pub fn active_element(&self) -> NodeId {
        self.focused
            .filter(|f| self.is_connected(*f))
            .unwrap_or(self.body)
    }

    // --- events ---

    /// Register a listener. Duplicate registrations are ignored.
    pub fn add_event_listener(&mut self, node: NodeId, event: EventType, capture: bool) {
        let listener = Listener {
            node,
            event,
            capture,
        };
        if !self.listeners.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    /// Remove a listener registration. Unknown registrations are ignored.
    pub fn remove_event_listener(&mut self, node: NodeId, event: EventType, capture: bool) {
        self.listeners.retain(|l| {
            !(l.node == node && l.event == event && l.capture == capture)
        });
    }

    /// Whether some registered listener fires for `event` at `node` during `phase`.
    pub fn has_event_listener(&self, node: NodeId, event: EventType, phase: Phase) -> bool {
        self.listeners.iter().any(|l| l.fires(node, event, phase))
    }

    /// All current listener registrations.
    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Capture → target → bubble sequence for an event targeted at `target`.
    ///
    /// Stale targets produce an empty sequence.
    pub fn propagation_path(&self, target: NodeId) -> Vec<Dispatch> {
        let path = self.ancestry(target);
        let mut out = Vec::new();
        let Some((target, ancestors)) = path.split_last() else {
            return out;
        };
        for &n in ancestors {
            out.push(Dispatch::capture(n));
        }
        out.push(Dispatch::target(*target));
        for &n in ancestors.iter().rev() {
            out.push(Dispatch::bubble(n));
        }
        out
    }

    // --- mutation observers ---

    /// Start recording mutations at `target` according to `options`.
    pub fn observe(&mut self, target: NodeId, options: ObserverOptions) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer = self.next_observer.wrapping_add(1);
        self.observers.insert(
            id,
            Observer {
                target,
                options,
                records: Vec::new(),
            },
        );
        id
    }

    /// Drain the records queued for an observer.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(&observer)
            .map(|o| core::mem::take(&mut o.records))
            .unwrap_or_default()
    }

    /// Stop an observer and drop its pending records.
    pub fn disconnect(&mut self, observer: ObserverId) {
        self.observers.remove(&observer);
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn observes(&self, observer: &Observer, target: NodeId) -> bool {
        observer.target == target
            || (observer.options.flags.contains(ObserveFlags::SUBTREE)
                && self.contains(observer.target, target))
    }

    fn queue_child_list(&mut self, target: NodeId, added: Option<NodeId>, removed: Option<NodeId>) {
        if self.observers.is_empty() {
            return;
        }
        let matching: SmallVec<[ObserverId; 4]> = self
            .observers
            .iter()
            .filter(|(_, o)| {
                o.options.flags.contains(ObserveFlags::CHILD_LIST) && self.observes(o, target)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in matching {
            if let Some(o) = self.observers.get_mut(&id) {
                o.records.push(MutationRecord::ChildList {
                    target,
                    added: added.into_iter().collect(),
                    removed: removed.into_iter().collect(),
                });
            }
        }
    }

    fn queue_attribute(&mut self, target: NodeId, name: String, old_value: Option<String>) {
        if self.observers.is_empty() {
            return;
        }
        let matching: SmallVec<[ObserverId; 4]> = self
            .observers
            .iter()
            .filter(|(_, o)| o.options.wants_attribute(&name) && self.observes(o, target))
            .map(|(id, _)| *id)
            .collect();
        for id in matching {
            if let Some(o) = self.observers.get_mut(&id) {
                let old_value = if o.options.flags.contains(ObserveFlags::ATTRIBUTE_OLD_VALUE) {
                    old_value.clone()
                } else {
                    None
                };
                o.records.push(MutationRecord::Attribute {
                    target,
                    name: name.clone(),
                    old_value,
                });
            }
        }
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        if !self.is_alive(id) {
            return None;
        }
        self.node(id).element()
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        match &mut n.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventType;
    use alloc::vec;

    /// body -> [a -> [c, d], b]
    fn fixture() -> (Document, [NodeId; 4]) {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.insert(Some(body), ElementSpec::new("div"));
        let b = doc.insert(Some(body), ElementSpec::new("div"));
        let c = doc.insert(Some(a), ElementSpec::new("span"));
        let d = doc.insert(Some(a), ElementSpec::new("span"));
        (doc, [a, b, c, d])
    }

    #[test]
    fn depth_first_traversal() {
        let (doc, [a, b, c, d]) = fixture();
        assert_eq!(doc.next_depth_first(doc.body()), Some(a));
        assert_eq!(doc.next_depth_first(a), Some(c));
        assert_eq!(doc.next_depth_first(c), Some(d));
        assert_eq!(doc.next_depth_first(d), Some(b));
        assert!(doc.next_depth_first(b).is_none());
    }

    #[test]
    fn reverse_depth_first_traversal() {
        let (doc, [a, b, c, d]) = fixture();
        assert_eq!(doc.prev_depth_first(b), Some(d));
        assert_eq!(doc.prev_depth_first(d), Some(c));
        assert_eq!(doc.prev_depth_first(c), Some(a));
        assert_eq!(doc.prev_depth_first(a), Some(doc.body()));
        assert_eq!(doc.prev_depth_first(doc.body()), Some(doc.document()));
        assert!(doc.prev_depth_first(doc.document()).is_none());
    }

    #[test]
    fn document_order_is_preorder() {
        let (doc, [a, b, c, d]) = fixture();
        assert_eq!(doc.compare_document_position(a, c), Ordering::Less);
        assert_eq!(doc.compare_document_position(c, a), Ordering::Greater);
        assert_eq!(doc.compare_document_position(d, b), Ordering::Less);
        assert_eq!(doc.compare_document_position(c, d), Ordering::Less);
        assert_eq!(doc.compare_document_position(b, b), Ordering::Equal);
    }

    #[test]
    fn detached_and_stale_nodes_order_after_connected_ones() {
        let (mut doc, [a, _, c, _]) = fixture();
        let loose = doc.insert(None, ElementSpec::new("div"));
        assert_eq!(doc.compare_document_position(a, loose), Ordering::Less);
        assert_eq!(doc.compare_document_position(loose, a), Ordering::Greater);
        doc.remove(c);
        assert_eq!(doc.compare_document_position(a, c), Ordering::Less);
        assert_eq!(doc.compare_document_position(c, a), Ordering::Greater);
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let (mut doc, [a, _, c, d]) = fixture();
        doc.remove(a);
        assert!(!doc.is_alive(a));
        assert!(!doc.is_alive(c));
        assert!(!doc.is_alive(d));
        let reused = doc.insert(Some(doc.body()), ElementSpec::new("p"));
        assert_ne!(reused, a);
        assert!(doc.local_name(a).is_none());
        assert!(!doc.contains(a, reused));
    }

    #[test]
    fn reparent_moves_and_rejects_cycles() {
        let (mut doc, [a, b, c, _]) = fixture();
        doc.reparent(c, Some(b));
        assert_eq!(doc.parent_of(c), Some(b));
        assert_eq!(doc.children_of(a).len(), 1);
        doc.reparent(b, Some(c));
        assert_eq!(doc.parent_of(b), Some(doc.body()));
    }

    #[test]
    fn native_tab_index_defaults() {
        let mut doc = Document::new();
        let body = doc.body();
        let link = doc.insert(Some(body), ElementSpec::new("a").attr("href", "#"));
        let anchor = doc.insert(Some(body), ElementSpec::new("a"));
        let input = doc.insert(Some(body), ElementSpec::new("input"));
        let details = doc.insert(Some(body), ElementSpec::new("details"));
        let summary = doc.insert(Some(details), ElementSpec::new("summary"));
        let second = doc.insert(Some(details), ElementSpec::new("summary"));
        let video = doc.insert(Some(body), ElementSpec::new("video").attr("controls", ""));
        let div = doc.insert(Some(body), ElementSpec::new("div").attr("tabindex", " 3 "));
        let junk = doc.insert(Some(body), ElementSpec::new("div").attr("tabindex", "x"));
        assert_eq!(doc.tab_index(link), 0);
        assert_eq!(doc.tab_index(anchor), -1);
        assert_eq!(doc.tab_index(input), 0);
        assert_eq!(doc.tab_index(details), -1);
        assert_eq!(doc.tab_index(summary), 0);
        assert_eq!(doc.tab_index(second), -1);
        assert_eq!(doc.tab_index(video), -1);
        assert_eq!(doc.tab_index(div), 3);
        assert_eq!(doc.tab_index(junk), -1);
    }

    #[test]
    fn styles_and_layout_boxes() {
        let mut doc = Document::new();
        let body = doc.body();
        let hidden = doc.insert(Some(body), ElementSpec::new("div").attr("hidden", ""));
        let inside = doc.insert(Some(hidden), ElementSpec::new("button"));
        let contents = doc.insert(
            Some(body),
            ElementSpec::new("div").attr("style", "display: contents; visibility: hidden"),
        );
        let child = doc.insert(Some(contents), ElementSpec::new("button"));
        let shown = doc.insert(
            Some(contents),
            ElementSpec::new("button").attr("style", "visibility: visible"),
        );
        assert!(doc.client_rect(hidden).is_none());
        assert!(doc.client_rect(inside).is_none());
        assert!(doc.client_rect(contents).is_none());
        assert!(doc.client_rect(child).is_some());
        assert_eq!(
            doc.computed_style(child).map(|s| s.visibility),
            Some(Visibility::Hidden)
        );
        assert_eq!(
            doc.computed_style(shown).map(|s| s.visibility),
            Some(Visibility::Visible)
        );
        let loose = doc.insert(None, ElementSpec::new("button"));
        assert!(doc.client_rect(loose).is_none());
    }

    #[test]
    fn focus_falls_back_to_body() {
        let (mut doc, [a, _, c, _]) = fixture();
        assert_eq!(doc.active_element(), doc.body());
        assert!(doc.focus(c));
        assert_eq!(doc.active_element(), c);
        doc.remove(a);
        assert_eq!(doc.active_element(), doc.body());
        let loose = doc.insert(None, ElementSpec::new("button"));
        assert!(!doc.focus(loose));
    }

    #[test]
    fn element_by_id_ignores_detached_elements() {
        let mut doc = Document::new();
        let body = doc.body();
        let _loose = doc.insert(None, ElementSpec::new("div").attr("id", "x"));
        assert!(doc.element_by_id("x").is_none());
        let first = doc.insert(Some(body), ElementSpec::new("div").attr("id", "x"));
        let _second = doc.insert(Some(body), ElementSpec::new("div").attr("id", "x"));
        assert_eq!(doc.element_by_id("x"), Some(first));
    }

    #[test]
    fn propagation_path_and_listener_registry() {
        let (mut doc, [a, _, c, _]) = fixture();
        let root = doc.document();
        let seq = doc.propagation_path(c);
        assert_eq!(seq.len(), 7);
        assert_eq!(seq[0], Dispatch::capture(root));
        assert_eq!(seq[3], Dispatch::target(c));
        assert_eq!(seq[6], Dispatch::bubble(root));
        assert_eq!(seq[4], Dispatch::bubble(a));

        doc.add_event_listener(root, EventType::KeyDown, true);
        doc.add_event_listener(root, EventType::KeyDown, true);
        assert_eq!(doc.listeners().len(), 1);
        assert!(doc.has_event_listener(root, EventType::KeyDown, Phase::Capture));
        assert!(!doc.has_event_listener(root, EventType::KeyDown, Phase::Bubble));
        doc.remove_event_listener(root, EventType::KeyDown, true);
        assert!(doc.listeners().is_empty());
    }

    #[test]
    fn observers_record_subtree_mutations() {
        let (mut doc, [a, b, c, _]) = fixture();
        let obs = doc.observe(
            a,
            ObserverOptions {
                flags: ObserveFlags::CHILD_LIST
                    | ObserveFlags::ATTRIBUTES
                    | ObserveFlags::SUBTREE
                    | ObserveFlags::ATTRIBUTE_OLD_VALUE,
                attribute_filter: vec!["style".to_string(), "disabled".to_string()],
            },
        );
        doc.set_attribute(c, "style", "display: none");
        doc.set_attribute(c, "style", "display: block");
        doc.set_attribute(c, "class", "ignored");
        doc.set_attribute(b, "disabled", "");
        doc.remove(c);

        let records = doc.take_records(obs);
        assert_eq!(
            records,
            vec![
                MutationRecord::Attribute {
                    target: c,
                    name: "style".to_string(),
                    old_value: None,
                },
                MutationRecord::Attribute {
                    target: c,
                    name: "style".to_string(),
                    old_value: Some("display: none".to_string()),
                },
                MutationRecord::ChildList {
                    target: a,
                    added: vec![],
                    removed: vec![c],
                },
            ]
        );
        assert!(doc.take_records(obs).is_empty());

        doc.disconnect(obs);
        doc.insert(Some(a), ElementSpec::new("p"));
        assert!(doc.take_records(obs).is_empty());
        assert_eq!(doc.observer_count(), 0);
    }
}
