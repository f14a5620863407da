//! In-memory element tree for testing without a UI.
//!
//! [`MockTree`] implements [`MatcherEngine`] over a tree of [`MockNode`]s.
//! Changes can be scheduled to land after a number of queries, so a test
//! can say "the spinner disappears on the fifth poll" and get the same
//! result on every run.
//!
//! ```rust,ignore
//! let tree = MockTree::new();
//! let button = tree.add(tree.root(), MockNode::new("Button").with_id("pay").hidden());
//! tree.schedule_after_queries(9, button, MockChange::Hidden(false));
//! ```
//!
//! Engine order is depth-first pre-order in insertion order. The synthetic
//! root window is never returned by [`MatcherEngine::locate_all`].

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

use crate::action::{Action, ContentEdge};
use crate::engine::{ElementView, MatcherEngine};
use crate::predicate::Predicate;
use crate::result::{MatchError, MatchResult};

/// Handle to a node in a [`MockTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in insertion order
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Description of a mock element
#[derive(Debug, Clone, PartialEq)]
pub struct MockNode {
    kind: String,
    accessibility_id: Option<String>,
    accessibility_label: Option<String>,
    text: Option<String>,
    enabled: bool,
    selected: bool,
    hidden: bool,
    visibility: f64,
    progress: Option<f64>,
    edges: HashSet<ContentEdge>,
    scroll_extent: Option<usize>,
}

impl MockNode {
    /// Create an enabled, fully visible node of the given kind
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            accessibility_id: None,
            accessibility_label: None,
            text: None,
            enabled: true,
            selected: false,
            hidden: false,
            visibility: 1.0,
            progress: None,
            edges: HashSet::new(),
            scroll_extent: None,
        }
    }

    /// Set accessibility identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.accessibility_id = Some(id.into());
        self
    }

    /// Set accessibility label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.accessibility_label = Some(label.into());
        self
    }

    /// Give the node a text accessor with the given content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Mark disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Mark selected
    #[must_use]
    pub const fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Mark hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Set the visible fraction
    #[must_use]
    pub const fn with_visibility(mut self, fraction: f64) -> Self {
        self.visibility = fraction;
        self
    }

    /// Set progress value
    #[must_use]
    pub const fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Report the given content edge as reached
    #[must_use]
    pub fn scrolled_to(mut self, edge: ContentEdge) -> Self {
        self.edges.insert(edge);
        self
    }

    /// Make the node a scroll container whose far edge is reached after
    /// `steps` scrolls
    #[must_use]
    pub const fn with_scroll_extent(mut self, steps: usize) -> Self {
        self.scroll_extent = Some(steps);
        self
    }
}

/// A change applied to a node
#[derive(Debug, Clone, PartialEq)]
pub enum MockChange {
    /// Set the visible fraction
    Visibility(f64),
    /// Set the hidden flag
    Hidden(bool),
    /// Set the enabled flag
    Enabled(bool),
    /// Set the selected flag
    Selected(bool),
    /// Replace the text accessor
    Text(Option<String>),
    /// Set progress value
    Progress(f64),
    /// Remove the node and its subtree from the tree
    Detach,
}

/// When a scheduled change lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Once this many `locate_all` calls have completed
    Queries(usize),
    /// Once `container` has been scrolled this many times
    Scrolls { container: NodeId, count: usize },
}

#[derive(Debug, Clone)]
struct Scheduled {
    trigger: Trigger,
    node: NodeId,
    change: MockChange,
}

/// An action recorded by [`MockTree::perform`](MatcherEngine::perform)
#[derive(Debug, Clone, PartialEq)]
pub struct PerformedAction {
    /// Target node
    pub node: NodeId,
    /// Action performed
    pub action: Action,
}

#[derive(Debug)]
struct Slot {
    node: MockNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
    scrolls: usize,
}

#[derive(Debug)]
struct TreeState {
    slots: Vec<Slot>,
    queries: usize,
    scheduled: Vec<Scheduled>,
    performed: Vec<PerformedAction>,
}

impl TreeState {
    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    fn apply_due(&mut self) {
        let pending = std::mem::take(&mut self.scheduled);
        let (due, waiting): (Vec<_>, Vec<_>) =
            pending.into_iter().partition(|s| self.is_due(s.trigger));
        self.scheduled = waiting;
        for scheduled in due {
            trace!(node = scheduled.node.0, change = ?scheduled.change, "applying scheduled change");
            self.apply(scheduled.node, scheduled.change);
        }
    }

    fn is_due(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Queries(count) => self.queries >= count,
            Trigger::Scrolls { container, count } => {
                self.slot(container).is_some_and(|s| s.scrolls >= count)
            }
        }
    }

    fn apply(&mut self, id: NodeId, change: MockChange) {
        if change == MockChange::Detach {
            self.detach(id);
            return;
        }
        let Some(slot) = self.slots.get_mut(id.0) else {
            return;
        };
        let node = &mut slot.node;
        match change {
            MockChange::Visibility(fraction) => node.visibility = fraction,
            MockChange::Hidden(hidden) => node.hidden = hidden,
            MockChange::Enabled(enabled) => node.enabled = enabled,
            MockChange::Selected(selected) => node.selected = selected,
            MockChange::Text(text) => node.text = text,
            MockChange::Progress(progress) => node.progress = Some(progress),
            MockChange::Detach => {}
        }
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.slot(id).and_then(|s| s.parent);
        if let Some(parent) = parent.and_then(|p| self.slots.get_mut(p.0)) {
            parent.children.retain(|c| *c != id);
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.slots.get_mut(current.0) {
                slot.attached = false;
                stack.extend(slot.children.iter().copied());
            }
        }
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.parent = None;
        }
    }

    /// Attached nodes below the root in depth-first pre-order
    fn candidates(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self
            .slot(NodeId(0))
            .map(|root| root.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(slot) = self.slot(id) {
                stack.extend(slot.children.iter().rev().copied());
            }
        }
        order
    }

    fn is_interactable(&self, id: NodeId) -> bool {
        self.slot(id).is_some_and(|s| {
            s.attached && s.node.enabled && !s.node.hidden && s.node.visibility > 0.0
        })
    }

    fn scroll(&mut self, id: NodeId, edge: Option<ContentEdge>, to_edge: Option<ContentEdge>) {
        let Some(slot) = self.slots.get_mut(id.0) else {
            return;
        };
        slot.scrolls += 1;
        if let Some(edge) = to_edge {
            slot.node.edges.insert(edge);
            if let Some(extent) = slot.node.scroll_extent {
                slot.scrolls = slot.scrolls.max(extent);
            }
        } else if let (Some(edge), Some(extent)) = (edge, slot.node.scroll_extent) {
            if slot.scrolls >= extent {
                slot.node.edges.insert(edge);
            }
        }
        self.apply_due();
    }
}

/// Shared in-memory element tree.
///
/// Clones share the same tree.
#[derive(Clone)]
pub struct MockTree {
    state: Arc<RwLock<TreeState>>,
}

impl Default for MockTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("MockTree")
            .field("nodes", &state.slots.len())
            .field("queries", &state.queries)
            .field("scheduled", &state.scheduled.len())
            .field("performed", &state.performed.len())
            .finish()
    }
}

impl MockTree {
    /// Create a tree holding only the root window
    #[must_use]
    pub fn new() -> Self {
        let root = Slot {
            node: MockNode::new("Window"),
            parent: None,
            children: Vec::new(),
            attached: true,
            scrolls: 0,
        };
        Self {
            state: Arc::new(RwLock::new(TreeState {
                slots: vec![root],
                queries: 0,
                scheduled: Vec::new(),
                performed: Vec::new(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TreeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TreeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The root window
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `node` as the last child of `parent`
    pub fn add(&self, parent: NodeId, node: MockNode) -> NodeId {
        let mut state = self.write();
        let id = NodeId(state.slots.len());
        let attached = state.slot(parent).is_some_and(|p| p.attached);
        state.slots.push(Slot {
            node,
            parent: Some(parent),
            children: Vec::new(),
            attached,
            scrolls: 0,
        });
        if let Some(slot) = state.slots.get_mut(parent.0) {
            slot.children.push(id);
        }
        id
    }

    /// Element handle for a node
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<MockElement> {
        (id.0 < self.read().slots.len()).then(|| MockElement {
            state: Arc::clone(&self.state),
            id,
        })
    }

    /// First attached element with the given accessibility identifier
    #[must_use]
    pub fn element_by_id(&self, accessibility_id: &str) -> Option<MockElement> {
        self.find(|node| node.accessibility_id.as_deref() == Some(accessibility_id))
    }

    /// First attached element of the given kind
    #[must_use]
    pub fn find_kind(&self, kind: &str) -> Option<MockElement> {
        self.find(|node| node.kind == kind)
    }

    fn find(&self, test: impl Fn(&MockNode) -> bool) -> Option<MockElement> {
        let id = {
            let state = self.read();
            state
                .candidates()
                .into_iter()
                .find(|id| state.slot(*id).is_some_and(|s| test(&s.node)))
        };
        id.and_then(|id| self.element(id))
    }

    /// Apply `change` immediately
    pub fn update(&self, node: NodeId, change: MockChange) {
        self.write().apply(node, change);
    }

    /// Apply `change` once `queries` calls to `locate_all` have completed.
    ///
    /// `schedule_after_queries(k - 1, ..)` makes the change visible to the
    /// `k`-th query.
    pub fn schedule_after_queries(&self, queries: usize, node: NodeId, change: MockChange) {
        self.write().scheduled.push(Scheduled {
            trigger: Trigger::Queries(queries),
            node,
            change,
        });
    }

    /// Apply `change` once `container` has been scrolled `scrolls` times
    pub fn schedule_after_scrolls(
        &self,
        container: NodeId,
        scrolls: usize,
        node: NodeId,
        change: MockChange,
    ) {
        self.write().scheduled.push(Scheduled {
            trigger: Trigger::Scrolls {
                container,
                count: scrolls,
            },
            node,
            change,
        });
    }

    /// Number of completed `locate_all` calls
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.read().queries
    }

    /// Actions performed so far, in order
    #[must_use]
    pub fn performed_actions(&self) -> Vec<PerformedAction> {
        self.read().performed.clone()
    }

    /// Number of scrolls performed on `container`
    #[must_use]
    pub fn scroll_count(&self, container: NodeId) -> usize {
        self.read().slot(container).map_or(0, |s| s.scrolls)
    }
}

impl MatcherEngine for MockTree {
    type Element = MockElement;

    fn locate_all(&self, predicate: &Predicate<MockElement>) -> Vec<MockElement> {
        let candidates = {
            let mut state = self.write();
            state.apply_due();
            state.queries += 1;
            state.candidates()
        };
        let matches: Vec<MockElement> = candidates
            .into_iter()
            .map(|id| MockElement {
                state: Arc::clone(&self.state),
                id,
            })
            .filter(|element| predicate.matches(element))
            .collect();
        trace!(predicate = %predicate, count = matches.len(), "mock query");
        matches
    }

    fn perform(&self, action: &Action, element: &MockElement) -> MatchResult<()> {
        let mut state = self.write();
        let id = element.id;
        if !state.slot(id).is_some_and(|s| s.attached) {
            return Err(MatchError::action_failed(
                action.to_string(),
                "element is no longer in the hierarchy",
            ));
        }
        if !state.is_interactable(id) {
            return Err(MatchError::action_failed(
                action.to_string(),
                "element is not interactable",
            ));
        }

        match action {
            Action::TypeText(text) => {
                if let Some(slot) = state.slots.get_mut(id.0) {
                    slot.node.text.get_or_insert_with(String::new).push_str(text);
                }
            }
            Action::ReplaceText(text) => state.apply(id, MockChange::Text(Some(text.clone()))),
            Action::ClearText => state.apply(id, MockChange::Text(Some(String::new()))),
            Action::Scroll { direction, .. } => state.scroll(id, Some(direction.edge()), None),
            Action::ScrollToContentEdge(edge) => state.scroll(id, None, Some(*edge)),
            Action::Tap | Action::Swipe { .. } | Action::Custom(_) => {}
        }

        trace!(node = id.0, %action, "mock action");
        state.performed.push(PerformedAction {
            node: id,
            action: action.clone(),
        });
        Ok(())
    }
}

/// Handle to a node of a [`MockTree`].
///
/// Attribute reads see the tree's current state.
#[derive(Clone)]
pub struct MockElement {
    state: Arc<RwLock<TreeState>>,
    id: NodeId,
}

impl MockElement {
    /// Node this handle refers to
    #[must_use]
    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    fn with_node<T>(&self, read: impl FnOnce(&MockNode) -> T) -> Option<T> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.slot(self.id).map(|s| read(&s.node))
    }

    fn related(&self, id: NodeId) -> Self {
        Self {
            state: Arc::clone(&self.state),
            id,
        }
    }
}

impl PartialEq for MockElement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockElement")
            .field("id", &self.id.0)
            .field("kind", &self.with_node(|n| n.kind.clone()))
            .field("accessibility_id", &self.accessibility_id())
            .finish()
    }
}

impl ElementView for MockElement {
    fn parent(&self) -> Option<Self> {
        let parent = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state.slot(self.id).and_then(|s| s.parent)
        };
        parent.map(|id| self.related(id))
    }

    fn children(&self) -> Vec<Self> {
        let children = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state
                .slot(self.id)
                .map(|s| s.children.clone())
                .unwrap_or_default()
        };
        children.into_iter().map(|id| self.related(id)).collect()
    }

    fn is_hidden(&self) -> bool {
        self.with_node(|n| n.hidden).unwrap_or(true)
    }

    fn text(&self) -> Option<String> {
        self.with_node(|n| n.text.clone()).flatten()
    }

    fn accessibility_id(&self) -> Option<String> {
        self.with_node(|n| n.accessibility_id.clone()).flatten()
    }

    fn accessibility_label(&self) -> Option<String> {
        self.with_node(|n| n.accessibility_label.clone()).flatten()
    }

    fn is_kind_of(&self, kind: &str) -> bool {
        self.with_node(|n| n.kind == kind).unwrap_or(false)
    }

    fn is_enabled(&self) -> bool {
        self.with_node(|n| n.enabled).unwrap_or(false)
    }

    fn is_selected(&self) -> bool {
        self.with_node(|n| n.selected).unwrap_or(false)
    }

    fn is_interactable(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.is_interactable(self.id)
    }

    fn visible_fraction(&self) -> f64 {
        self.with_node(|n| if n.hidden { 0.0 } else { n.visibility })
            .unwrap_or(0.0)
    }

    fn progress(&self) -> Option<f64> {
        self.with_node(|n| n.progress).flatten()
    }

    fn is_scrolled_to_edge(&self, edge: ContentEdge) -> bool {
        self.with_node(|n| n.edges.contains(&edge)).unwrap_or(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::action::Direction;
    use crate::predicates::{accessibility_id, kind_of, minimum_visible};

    mod structure {
        use super::*;

        #[test]
        fn test_preorder_excludes_root() {
            let tree = MockTree::new();
            let a = tree.add(tree.root(), MockNode::new("View").with_id("a"));
            tree.add(a, MockNode::new("View").with_id("a.1"));
            tree.add(tree.root(), MockNode::new("View").with_id("b"));
            let ids: Vec<_> = tree
                .locate_all(&kind_of("View"))
                .iter()
                .map(|e| e.accessibility_id().unwrap())
                .collect();
            assert_eq!(ids, vec!["a", "a.1", "b"]);
            assert!(tree.locate_all(&kind_of("Window")).is_empty());
        }

        #[test]
        fn test_parent_and_children() {
            let tree = MockTree::new();
            let a = tree.add(tree.root(), MockNode::new("View").with_id("a"));
            let child = tree.add(a, MockNode::new("Label"));
            let element = tree.element(child).unwrap();
            assert_eq!(element.parent().unwrap().accessibility_id().as_deref(), Some("a"));
            assert_eq!(tree.element(a).unwrap().children(), vec![element]);
            assert!(tree.element(tree.root()).unwrap().parent().is_none());
        }

        #[test]
        fn test_hidden_zeroes_own_visibility() {
            let tree = MockTree::new();
            let id = tree.add(tree.root(), MockNode::new("View").hidden());
            assert_eq!(tree.element(id).unwrap().visible_fraction(), 0.0);
        }
    }

    mod scheduling {
        use super::*;

        #[test]
        fn test_change_lands_on_kth_query() {
            let tree = MockTree::new();
            let id = tree.add(tree.root(), MockNode::new("Spinner").with_visibility(0.0));
            tree.schedule_after_queries(2, id, MockChange::Visibility(1.0));
            let visible = minimum_visible(0.5);
            assert!(tree.locate_all(&visible).is_empty());
            assert!(tree.locate_all(&visible).is_empty());
            assert_eq!(tree.locate_all(&visible).len(), 1);
            assert_eq!(tree.query_count(), 3);
        }

        #[test]
        fn test_detach_removes_subtree() {
            let tree = MockTree::new();
            let list = tree.add(tree.root(), MockNode::new("List").with_id("list"));
            tree.add(list, MockNode::new("Cell").with_id("cell"));
            tree.update(list, MockChange::Detach);
            assert!(tree.locate_all(&accessibility_id("cell")).is_empty());
            assert!(tree.element_by_id("list").is_none());
        }
    }

    mod actions {
        use super::*;

        #[test]
        fn test_text_actions() {
            let tree = MockTree::new();
            let field = tree.add(tree.root(), MockNode::new("TextField").with_text("ab"));
            let element = tree.element(field).unwrap();
            tree.perform(&Action::type_text("c"), &element).unwrap();
            assert_eq!(element.text().as_deref(), Some("abc"));
            tree.perform(&Action::replace_text("xyz"), &element).unwrap();
            assert_eq!(element.text().as_deref(), Some("xyz"));
            tree.perform(&Action::ClearText, &element).unwrap();
            assert_eq!(element.text().as_deref(), Some(""));
            assert_eq!(tree.performed_actions().len(), 3);
        }

        #[test]
        fn test_disabled_rejects_action() {
            let tree = MockTree::new();
            let id = tree.add(tree.root(), MockNode::new("Button").disabled());
            let err = tree
                .perform(&Action::Tap, &tree.element(id).unwrap())
                .unwrap_err();
            assert!(matches!(err, MatchError::ActionFailed { .. }));
            assert!(tree.performed_actions().is_empty());
        }

        #[test]
        fn test_scroll_reaches_edge() {
            let tree = MockTree::new();
            let id = tree.add(tree.root(), MockNode::new("Scroll").with_scroll_extent(2));
            let element = tree.element(id).unwrap();
            let step = Action::Scroll {
                direction: Direction::Down,
                offset: 400.0,
            };
            tree.perform(&step, &element).unwrap();
            assert!(!element.is_scrolled_to_edge(ContentEdge::Bottom));
            tree.perform(&step, &element).unwrap();
            assert!(element.is_scrolled_to_edge(ContentEdge::Bottom));
            assert_eq!(tree.scroll_count(id), 2);
        }

        #[test]
        fn test_scroll_triggers_change() {
            let tree = MockTree::new();
            let scroll = tree.add(tree.root(), MockNode::new("Scroll"));
            let row = tree.add(scroll, MockNode::new("Cell").with_visibility(0.0));
            tree.schedule_after_scrolls(scroll, 1, row, MockChange::Visibility(1.0));
            let element = tree.element(scroll).unwrap();
            tree.perform(&Action::ScrollToContentEdge(ContentEdge::Bottom), &element)
                .unwrap();
            assert_eq!(tree.element(row).unwrap().visible_fraction(), 1.0);
            assert!(element.is_scrolled_to_edge(ContentEdge::Bottom));
        }
    }
}
