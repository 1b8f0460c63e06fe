//! Keyboard focus across route changes and modal overlays.

use tracing::debug;

use crate::surface::{ElementId, ScrollBehavior, Surface};

/// Element that held focus at capture time. Restoring consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusMemento {
    element: Option<ElementId>,
}

impl FocusMemento {
    pub fn capture(surface: &dyn Surface) -> Self {
        Self {
            element: surface.active_element(),
        }
    }

    pub fn element(&self) -> Option<&ElementId> {
        self.element.as_ref()
    }

    pub fn restore(self, surface: &dyn Surface) -> bool {
        match self.element {
            Some(element) => surface.focus(&element),
            None => false,
        }
    }
}

#[derive(Debug)]
pub struct FocusManager {
    main_content: ElementId,
    previous_path: String,
    memento: Option<FocusMemento>,
}

impl FocusManager {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self::with_main_content(initial_path, ElementId::from(crate::MAIN_CONTENT_ID))
    }

    pub fn with_main_content(initial_path: impl Into<String>, main_content: ElementId) -> Self {
        Self {
            main_content,
            previous_path: initial_path.into(),
            memento: None,
        }
    }

    pub fn current_path(&self) -> &str {
        &self.previous_path
    }

    /// Moves focus to the main landmark and scrolls to the top when `path`
    /// differs from the last seen path. Returns whether focus moved.
    pub fn on_route_change(&mut self, surface: &dyn Surface, path: &str) -> bool {
        if path == self.previous_path {
            return false;
        }
        self.previous_path = path.to_string();

        if !surface.focus(&self.main_content) {
            debug!(path, landmark = %self.main_content, "focus: main landmark missing");
            return false;
        }
        surface.scroll_to_top(ScrollBehavior::Smooth);
        true
    }

    pub fn store_focus(&mut self, surface: &dyn Surface) {
        self.memento = Some(FocusMemento::capture(surface));
    }

    /// Refocuses the stored element. A stored memento is used at most once.
    pub fn restore_focus(&mut self, surface: &dyn Surface) -> bool {
        self.memento
            .take()
            .is_some_and(|memento| memento.restore(surface))
    }

    pub fn clear_stored_focus(&mut self) {
        self.memento = None;
    }

    pub fn focus_on_element(&self, surface: &dyn Surface, id: &ElementId) -> bool {
        surface.focus(id)
    }

    pub fn skip_to_content(&self, surface: &dyn Surface) -> bool {
        if !surface.focus(&self.main_content) {
            return false;
        }
        surface.scroll_into_view(&self.main_content, ScrollBehavior::Smooth);
        true
    }
}

/// Confines Tab/Shift+Tab cycling to an overlay while it is open.
#[derive(Debug)]
pub struct FocusTrap {
    container: ElementId,
    order: Vec<ElementId>,
    trigger: FocusMemento,
}

impl FocusTrap {
    /// Records the trigger, computes the overlay's tab order and focuses its
    /// first entry. Returns `None` when the overlay is not on the surface or
    /// nothing inside it, the container included, can take focus.
    pub fn activate(surface: &dyn Surface, container: ElementId) -> Option<Self> {
        if !surface.contains(&container) {
            return None;
        }
        let trigger = FocusMemento::capture(surface);
        let order = surface.focusable_descendants(&container);
        let trap = Self {
            container,
            order,
            trigger,
        };
        trap.focus_first(surface)?;
        Some(trap)
    }

    pub fn container(&self) -> &ElementId {
        &self.container
    }

    pub fn trigger(&self) -> Option<&ElementId> {
        self.trigger.element()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        id == &self.container || self.order.contains(id)
    }

    /// Recomputes the tab order, e.g. after the overlay content changed.
    pub fn refresh(&mut self, surface: &dyn Surface) {
        self.order = surface.focusable_descendants(&self.container);
    }

    fn focus_first(&self, surface: &dyn Surface) -> Option<ElementId> {
        let target = self.order.first().unwrap_or(&self.container);
        surface.focus(target).then(|| target.clone())
    }

    /// Advances focus inside the overlay with wrap-around.
    pub fn cycle(&self, surface: &dyn Surface, backwards: bool) -> Option<ElementId> {
        if self.order.is_empty() {
            return self.focus_first(surface);
        }
        let len = self.order.len();
        let position = surface
            .active_element()
            .and_then(|active| self.order.iter().position(|id| *id == active));
        let next = match (position, backwards) {
            (Some(index), false) => (index + 1) % len,
            (Some(index), true) => (index + len - 1) % len,
            (None, false) => 0,
            (None, true) => len - 1,
        };
        let target = &self.order[next];
        surface.focus(target).then(|| target.clone())
    }

    /// Pulls focus back inside when it escaped the overlay.
    pub fn contain(&self, surface: &dyn Surface) -> bool {
        match surface.active_element() {
            Some(active) if self.contains(&active) => false,
            _ => self.focus_first(surface).is_some(),
        }
    }

    /// Closes the trap and returns focus to the element that opened it.
    pub fn release(self, surface: &dyn Surface) -> bool {
        self.trigger.restore(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ElementKind, HeadlessSurface, ScrollEvent};

    fn id(value: &str) -> ElementId {
        ElementId::from(value)
    }

    #[test]
    fn route_change_focuses_main_and_scrolls_to_top() {
        let surface = HeadlessSurface::app_layout();
        surface.set_scroll_top(840);
        let mut focus = FocusManager::new("/");

        assert!(focus.on_route_change(&surface, "/blog"));
        assert_eq!(surface.active_element(), Some(id(crate::MAIN_CONTENT_ID)));
        assert_eq!(surface.scroll_top(), 0);
        assert_eq!(
            surface.scroll_log(),
            vec![ScrollEvent::ToTop(ScrollBehavior::Smooth)]
        );
    }

    #[test]
    fn same_path_does_not_steal_focus() {
        let surface = HeadlessSurface::app_layout();
        let mut focus = FocusManager::new("/blog");
        assert!(surface.focus(&id("category-filter")));
        surface.set_scroll_top(300);

        assert!(!focus.on_route_change(&surface, "/blog"));
        assert_eq!(surface.active_element(), Some(id("category-filter")));
        assert_eq!(surface.scroll_top(), 300);
        assert!(surface.scroll_log().is_empty());
    }

    #[test]
    fn missing_landmark_still_records_path() {
        let surface = HeadlessSurface::new();
        let mut focus = FocusManager::new("/");

        assert!(!focus.on_route_change(&surface, "/about"));
        assert_eq!(focus.current_path(), "/about");
        assert!(surface.scroll_log().is_empty());
    }

    #[test]
    fn stored_focus_is_restored_exactly_once() {
        let surface = HeadlessSurface::app_layout();
        let mut focus = FocusManager::new("/");
        assert!(surface.focus(&id("nav-blog")));
        focus.store_focus(&surface);
        assert!(surface.focus(&id("shortcuts-close")));

        assert!(focus.restore_focus(&surface));
        assert_eq!(surface.active_element(), Some(id("nav-blog")));

        assert!(surface.focus(&id("nav-home")));
        assert!(!focus.restore_focus(&surface));
        assert_eq!(surface.active_element(), Some(id("nav-home")));
    }

    #[test]
    fn focus_on_element_reports_missing_targets() {
        let surface = HeadlessSurface::app_layout();
        let focus = FocusManager::new("/");
        assert!(focus.focus_on_element(&surface, &id(crate::BLOG_RESULTS_ID)));
        assert!(!focus.focus_on_element(&surface, &id("nope")));
        assert_eq!(surface.active_element(), Some(id(crate::BLOG_RESULTS_ID)));
    }

    #[test]
    fn trap_cycles_with_wrap_around() {
        let surface = HeadlessSurface::app_layout();
        assert!(surface.focus(&id("nav-about")));
        let trap = FocusTrap::activate(&surface, id(crate::SHORTCUTS_GUIDE_ID)).expect("trap");
        assert_eq!(surface.active_element(), Some(id("shortcuts-close")));

        assert_eq!(trap.cycle(&surface, false), Some(id("shortcuts-done")));
        assert_eq!(trap.cycle(&surface, false), Some(id("shortcuts-close")));
        assert_eq!(trap.cycle(&surface, true), Some(id("shortcuts-done")));
    }

    #[test]
    fn trap_pulls_escaped_focus_back_inside() {
        let surface = HeadlessSurface::app_layout();
        let trap = FocusTrap::activate(&surface, id(crate::SHORTCUTS_GUIDE_ID)).expect("trap");
        assert!(surface.focus(&id("nav-home")));

        assert!(trap.contain(&surface));
        assert_eq!(surface.active_element(), Some(id("shortcuts-close")));
        assert!(!trap.contain(&surface));
    }

    #[test]
    fn releasing_trap_restores_trigger() {
        let surface = HeadlessSurface::app_layout();
        assert!(surface.focus(&id("nav-search")));
        let trap = FocusTrap::activate(&surface, id(crate::SHORTCUTS_GUIDE_ID)).expect("trap");
        trap.cycle(&surface, false);

        assert!(trap.release(&surface));
        assert_eq!(surface.active_element(), Some(id("nav-search")));
    }

    #[test]
    fn trap_requires_overlay_on_surface() {
        let surface = HeadlessSurface::new();
        assert!(FocusTrap::activate(&surface, id("dialog")).is_none());
    }

    #[test]
    fn trap_refuses_overlay_that_cannot_hold_focus() {
        let surface = HeadlessSurface::app_layout();
        surface.insert(Some("app"), "empty-dialog", ElementKind::Dialog);
        surface.insert(Some("empty-dialog"), "notice", ElementKind::Text);
        assert!(surface.focus(&id("nav-home")));

        assert!(FocusTrap::activate(&surface, id("empty-dialog")).is_none());
        assert_eq!(surface.active_element(), Some(id("nav-home")));
    }

    #[test]
    fn trap_holds_focus_on_container_without_controls() {
        let surface = HeadlessSurface::app_layout();
        surface.insert_with_tab_index(Some("app"), "notice-dialog", ElementKind::Dialog, -1);
        surface.insert(Some("notice-dialog"), "notice", ElementKind::Text);

        let trap = FocusTrap::activate(&surface, id("notice-dialog")).expect("trap");
        assert_eq!(surface.active_element(), Some(id("notice-dialog")));
        assert!(surface.focus(&id("nav-home")));
        assert!(trap.contain(&surface));
        assert_eq!(surface.active_element(), Some(id("notice-dialog")));
    }
}
