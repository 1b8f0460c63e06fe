//! Top-level shell: current route, theme, the shortcuts help overlay and the
//! global key listener.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    focus::FocusTrap,
    router::Route,
    services::UiServices,
    shortcuts::{KeyEvent, KeyboardShortcuts, ShortcutAction},
    surface::ElementId,
    theme::Theme,
    SHORTCUTS_GUIDE_ID,
};

pub struct AppShell {
    services: Arc<UiServices>,
    shortcuts: KeyboardShortcuts,
    route: Route,
    theme: Theme,
    help: Option<FocusTrap>,
}

impl AppShell {
    pub fn new(services: Arc<UiServices>, initial_path: &str) -> Self {
        let shortcuts = KeyboardShortcuts::new(services.surface().clone());
        Self {
            services,
            shortcuts,
            route: Route::parse(initial_path),
            theme: Theme::default(),
            help: None,
        }
    }

    pub fn mount(&mut self) {
        self.shortcuts.attach();
    }

    /// Detaches the key listener, closes the overlay and drops live regions.
    pub async fn teardown(&mut self) {
        self.shortcuts.detach();
        self.close_help();
        self.services.reset().await;
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn services(&self) -> &Arc<UiServices> {
        &self.services
    }

    pub fn is_help_open(&self) -> bool {
        self.help.is_some()
    }

    /// Switches to `path` and moves focus to the main landmark when the path changed.
    pub async fn navigate(&mut self, path: &str) -> &Route {
        self.route = Route::parse(path);
        if self.services.route_changed(path).await {
            debug!(path, "app: focus moved to main content");
        }
        &self.route
    }

    /// Key press on whatever currently has focus.
    pub async fn key_down(&mut self, key: &str, shift: bool) -> Option<ShortcutAction> {
        let surface = self.services.surface();
        let target = surface
            .active_element()
            .and_then(|active| surface.kind_of(&active));
        let mut event = KeyEvent::new(key);
        event.shift = shift;
        event.target = target;
        self.handle_key(&event).await
    }

    /// Tab stays inside the help overlay while it is open; every other key
    /// goes through the shortcut dispatcher. Navigating closes the overlay
    /// first so focus never lands outside an open trap.
    pub async fn handle_key(&mut self, event: &KeyEvent) -> Option<ShortcutAction> {
        if let Some(trap) = &self.help {
            if event.is_key("tab") {
                trap.cycle(self.services.surface().as_ref(), event.shift);
                return None;
            }
        }

        let action = self.shortcuts.handle(event)?;
        match &action {
            ShortcutAction::Navigate(route) => {
                self.close_help();
                let path = route.path();
                self.navigate(&path).await;
            }
            ShortcutAction::ToggleTheme => {
                self.toggle_theme();
            }
            ShortcutAction::ToggleHelp => self.toggle_help(),
            ShortcutAction::CloseHelp => {
                self.close_help();
            }
        }
        if let Some(trap) = &self.help {
            trap.contain(self.services.surface().as_ref());
        }
        Some(action)
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        info!(theme = self.theme.as_str(), "app: theme toggled");
        self.theme
    }

    pub fn open_help(&mut self) -> bool {
        if self.help.is_some() {
            return true;
        }
        self.help = FocusTrap::activate(
            self.services.surface().as_ref(),
            ElementId::from(SHORTCUTS_GUIDE_ID),
        );
        self.help.is_some()
    }

    /// Closes the overlay and returns focus to the element that opened it.
    pub fn close_help(&mut self) -> bool {
        match self.help.take() {
            Some(trap) => trap.release(self.services.surface().as_ref()),
            None => false,
        }
    }

    pub fn toggle_help(&mut self) {
        if self.help.is_some() {
            self.close_help();
        } else {
            self.open_help();
        }
    }

    pub async fn skip_to_content(&self) -> bool {
        self.services.skip_to_content().await
    }
}
