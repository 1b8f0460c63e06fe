//! Presentation seam: the element tree that focus, scrolling, live regions and
//! key listeners are applied to.

use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Landmark,
    Section,
    Heading,
    Text,
    Link,
    Button,
    Select,
    TextInput,
    TextArea,
    Dialog,
    LiveRegion,
}

impl ElementKind {
    /// Controls that swallow printable keys; shortcuts stay quiet while they have focus.
    pub fn is_text_entry(self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea)
    }

    fn natively_focusable(self) -> bool {
        matches!(
            self,
            Self::Link | Self::Button | Self::Select | Self::TextInput | Self::TextArea
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Politeness {
    Polite,
    Assertive,
}

impl Politeness {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }

    pub fn region_id(self) -> ElementId {
        ElementId::new(format!("live-region-{}", self.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollEvent {
    ToTop(ScrollBehavior),
    IntoView(ElementId, ScrollBehavior),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub trait Surface: Send + Sync {
    fn contains(&self, id: &ElementId) -> bool;
    fn kind_of(&self, id: &ElementId) -> Option<ElementKind>;
    /// Moves focus; false when the element is missing or cannot take focus.
    fn focus(&self, id: &ElementId) -> bool;
    fn active_element(&self) -> Option<ElementId>;
    /// Tab-reachable descendants of `container` in document order.
    fn focusable_descendants(&self, container: &ElementId) -> Vec<ElementId>;
    fn scroll_to_top(&self, behavior: ScrollBehavior);
    fn scroll_into_view(&self, id: &ElementId, behavior: ScrollBehavior);
    /// Returns the hidden live region for `politeness`, creating it on first use.
    fn ensure_live_region(&self, politeness: Politeness) -> ElementId;
    fn set_text(&self, id: &ElementId, text: &str);
    fn text(&self, id: &ElementId) -> Option<String>;
    fn remove(&self, id: &ElementId);
    fn add_key_listener(&self) -> ListenerId;
    fn remove_key_listener(&self, listener: ListenerId) -> bool;
}

#[derive(Debug)]
struct Node {
    kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    text: String,
    tab_index: Option<i32>,
}

#[derive(Debug, Default)]
struct Document {
    nodes: HashMap<ElementId, Node>,
    roots: Vec<ElementId>,
    active: Option<ElementId>,
    scroll_top: u32,
    scroll_log: Vec<ScrollEvent>,
    text_log: Vec<(ElementId, String)>,
    listeners: HashSet<ListenerId>,
    next_listener: u64,
}

impl Document {
    fn can_focus(&self, id: &ElementId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|node| node.tab_index.is_some() || node.kind.natively_focusable())
    }

    fn in_tab_order(node: &Node) -> bool {
        match node.tab_index {
            Some(index) => index >= 0,
            None => node.kind.natively_focusable(),
        }
    }

    fn collect_tab_order(&self, id: &ElementId, out: &mut Vec<ElementId>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        for child in &node.children {
            if let Some(child_node) = self.nodes.get(child) {
                if Self::in_tab_order(child_node) {
                    out.push(child.clone());
                }
            }
            self.collect_tab_order(child, out);
        }
    }

    fn detach(&mut self, id: &ElementId) {
        let parent = self.nodes.get(id).and_then(|node| node.parent.clone());
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.retain(|child| child != id),
            None => self.roots.retain(|root| root != id),
        }
        self.remove_subtree(id);
    }

    fn remove_subtree(&mut self, id: &ElementId) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        for child in node.children {
            self.remove_subtree(&child);
        }
    }
}

/// In-memory element tree with a single focus pointer.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    doc: Mutex<Document>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page skeleton used by the terminal front-end: navigation, the main
    /// landmark with the blog filters/results/article heading, and the
    /// shortcuts help dialog.
    pub fn app_layout() -> Self {
        let surface = Self::new();
        surface.insert(None, "app", ElementKind::Landmark);
        surface.insert(Some("app"), "skip-link", ElementKind::Link);
        surface.insert(Some("app"), "site-nav", ElementKind::Landmark);
        surface.insert(Some("site-nav"), "nav-home", ElementKind::Link);
        surface.insert(Some("site-nav"), "nav-blog", ElementKind::Link);
        surface.insert(Some("site-nav"), "nav-about", ElementKind::Link);
        surface.insert(Some("site-nav"), "nav-search", ElementKind::TextInput);
        surface.insert_with_tab_index(
            Some("app"),
            crate::MAIN_CONTENT_ID,
            ElementKind::Landmark,
            -1,
        );
        surface.insert(Some(crate::MAIN_CONTENT_ID), "category-filter", ElementKind::Select);
        surface.insert(Some(crate::MAIN_CONTENT_ID), "tag-filter", ElementKind::Select);
        surface.insert_with_tab_index(
            Some(crate::MAIN_CONTENT_ID),
            crate::BLOG_RESULTS_ID,
            ElementKind::Section,
            -1,
        );
        surface.insert_with_tab_index(
            Some(crate::MAIN_CONTENT_ID),
            crate::ARTICLE_HEADING_ID,
            ElementKind::Heading,
            -1,
        );
        surface.insert_with_tab_index(
            Some("app"),
            crate::SHORTCUTS_GUIDE_ID,
            ElementKind::Dialog,
            -1,
        );
        surface.insert(Some(crate::SHORTCUTS_GUIDE_ID), "shortcuts-close", ElementKind::Button);
        surface.insert(Some(crate::SHORTCUTS_GUIDE_ID), "shortcuts-table", ElementKind::Text);
        surface.insert(Some(crate::SHORTCUTS_GUIDE_ID), "shortcuts-done", ElementKind::Button);
        surface
    }

    fn doc(&self) -> MutexGuard<'_, Document> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, parent: Option<&str>, id: &str, kind: ElementKind) -> ElementId {
        self.insert_node(parent, id, kind, None)
    }

    pub fn insert_with_tab_index(
        &self,
        parent: Option<&str>,
        id: &str,
        kind: ElementKind,
        tab_index: i32,
    ) -> ElementId {
        self.insert_node(parent, id, kind, Some(tab_index))
    }

    fn insert_node(
        &self,
        parent: Option<&str>,
        id: &str,
        kind: ElementKind,
        tab_index: Option<i32>,
    ) -> ElementId {
        let id = ElementId::new(id);
        let parent = parent.map(ElementId::new);
        let mut guard = self.doc();
        let doc = &mut *guard;
        doc.detach(&id);
        let parent = parent.filter(|p| doc.nodes.contains_key(p));
        match parent.as_ref().and_then(|p| doc.nodes.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(id.clone()),
            None => doc.roots.push(id.clone()),
        }
        doc.nodes.insert(
            id.clone(),
            Node {
                kind,
                parent,
                children: Vec::new(),
                text: String::new(),
                tab_index,
            },
        );
        id
    }

    pub fn parent_of(&self, id: &ElementId) -> Option<ElementId> {
        self.doc().nodes.get(id).and_then(|node| node.parent.clone())
    }

    pub fn scroll_top(&self) -> u32 {
        self.doc().scroll_top
    }

    pub fn set_scroll_top(&self, offset: u32) {
        self.doc().scroll_top = offset;
    }

    pub fn scroll_log(&self) -> Vec<ScrollEvent> {
        self.doc().scroll_log.clone()
    }

    /// Every text mutation applied to `id`, oldest first.
    pub fn text_history(&self, id: &ElementId) -> Vec<String> {
        self.doc()
            .text_log
            .iter()
            .filter(|(target, _)| target == id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn key_listener_count(&self) -> usize {
        self.doc().listeners.len()
    }

    pub fn blur(&self) {
        self.doc().active = None;
    }
}

impl Surface for HeadlessSurface {
    fn contains(&self, id: &ElementId) -> bool {
        self.doc().nodes.contains_key(id)
    }

    fn kind_of(&self, id: &ElementId) -> Option<ElementKind> {
        self.doc().nodes.get(id).map(|node| node.kind)
    }

    fn focus(&self, id: &ElementId) -> bool {
        let mut doc = self.doc();
        if !doc.can_focus(id) {
            return false;
        }
        doc.active = Some(id.clone());
        true
    }

    fn active_element(&self) -> Option<ElementId> {
        self.doc().active.clone()
    }

    fn focusable_descendants(&self, container: &ElementId) -> Vec<ElementId> {
        let doc = self.doc();
        let mut out = Vec::new();
        doc.collect_tab_order(container, &mut out);
        out
    }

    fn scroll_to_top(&self, behavior: ScrollBehavior) {
        let mut doc = self.doc();
        doc.scroll_top = 0;
        doc.scroll_log.push(ScrollEvent::ToTop(behavior));
    }

    fn scroll_into_view(&self, id: &ElementId, behavior: ScrollBehavior) {
        let mut doc = self.doc();
        if doc.nodes.contains_key(id) {
            doc.scroll_log.push(ScrollEvent::IntoView(id.clone(), behavior));
        }
    }

    fn ensure_live_region(&self, politeness: Politeness) -> ElementId {
        let id = politeness.region_id();
        if !self.contains(&id) {
            self.insert(None, id.as_str(), ElementKind::LiveRegion);
        }
        id
    }

    fn set_text(&self, id: &ElementId, text: &str) {
        let mut guard = self.doc();
        let doc = &mut *guard;
        let Some(node) = doc.nodes.get_mut(id) else {
            return;
        };
        node.text = text.to_string();
        doc.text_log.push((id.clone(), text.to_string()));
    }

    fn text(&self, id: &ElementId) -> Option<String> {
        self.doc().nodes.get(id).map(|node| node.text.clone())
    }

    fn remove(&self, id: &ElementId) {
        self.doc().detach(id);
    }

    fn add_key_listener(&self) -> ListenerId {
        let mut doc = self.doc();
        doc.next_listener += 1;
        let listener = ListenerId(doc.next_listener);
        doc.listeners.insert(listener);
        listener
    }

    fn remove_key_listener(&self, listener: ListenerId) -> bool {
        self.doc().listeners.remove(&listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_order_skips_programmatic_only_targets() {
        let surface = HeadlessSurface::app_layout();
        let order = surface.focusable_descendants(&ElementId::from(crate::MAIN_CONTENT_ID));
        assert_eq!(
            order,
            vec![ElementId::from("category-filter"), ElementId::from("tag-filter")]
        );
        assert!(surface.focus(&ElementId::from(crate::BLOG_RESULTS_ID)));
    }

    #[test]
    fn plain_text_cannot_take_focus() {
        let surface = HeadlessSurface::app_layout();
        assert!(!surface.focus(&ElementId::from("shortcuts-table")));
        assert!(!surface.focus(&ElementId::from("missing")));
        assert_eq!(surface.active_element(), None);
    }

    #[test]
    fn removing_a_subtree_drops_focus_inside_it() {
        let surface = HeadlessSurface::app_layout();
        assert!(surface.focus(&ElementId::from("shortcuts-done")));
        surface.remove(&ElementId::from(crate::SHORTCUTS_GUIDE_ID));
        assert_eq!(surface.active_element(), None);
        assert!(!surface.contains(&ElementId::from("shortcuts-close")));
    }

    #[test]
    fn live_regions_are_created_once() {
        let surface = HeadlessSurface::new();
        let first = surface.ensure_live_region(Politeness::Assertive);
        surface.set_text(&first, "hello");
        let second = surface.ensure_live_region(Politeness::Assertive);
        assert_eq!(first, second);
        assert_eq!(surface.text(&second).as_deref(), Some("hello"));
    }

    #[test]
    fn key_listeners_are_tracked_individually() {
        let surface = HeadlessSurface::new();
        let a = surface.add_key_listener();
        let b = surface.add_key_listener();
        assert_ne!(a, b);
        assert!(surface.remove_key_listener(a));
        assert!(!surface.remove_key_listener(a));
        assert_eq!(surface.key_listener_count(), 1);
    }
}
