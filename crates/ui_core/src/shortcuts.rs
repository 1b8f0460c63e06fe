//! Global single-key shortcuts.
//!
//! Every key event is gated on its own: events aimed at a text input or
//! textarea are ignored, everything else is matched on the lowercased key.

use std::sync::Arc;

use tracing::debug;

use crate::{
    router::Route,
    surface::{ElementKind, ListenerId, Surface},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub shift: bool,
    /// Kind of element the event was dispatched to, if any.
    pub target: Option<ElementKind>,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shift: false,
            target: None,
        }
    }

    pub fn on(mut self, target: ElementKind) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn is_key(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchGate {
    Armed,
    Suppressed,
}

pub fn gate(event: &KeyEvent) -> DispatchGate {
    match event.target {
        Some(kind) if kind.is_text_entry() => DispatchGate::Suppressed,
        _ => DispatchGate::Armed,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutAction {
    Navigate(Route),
    ToggleTheme,
    ToggleHelp,
    CloseHelp,
}

pub fn action_for(event: &KeyEvent) -> Option<ShortcutAction> {
    if gate(event) == DispatchGate::Suppressed {
        return None;
    }
    match event.key.to_lowercase().as_str() {
        "h" => Some(ShortcutAction::Navigate(Route::Home)),
        "b" => Some(ShortcutAction::Navigate(Route::Blog)),
        "a" => Some(ShortcutAction::Navigate(Route::About)),
        "t" => Some(ShortcutAction::ToggleTheme),
        "?" => Some(ShortcutAction::ToggleHelp),
        "escape" => Some(ShortcutAction::CloseHelp),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub key: &'static str,
    pub description: &'static str,
}

/// Rows of the help overlay.
pub const SHORTCUTS: [Shortcut; 6] = [
    Shortcut {
        key: "h",
        description: "Go to Home page",
    },
    Shortcut {
        key: "b",
        description: "Go to Blog page",
    },
    Shortcut {
        key: "a",
        description: "Go to About page",
    },
    Shortcut {
        key: "t",
        description: "Toggle theme",
    },
    Shortcut {
        key: "?",
        description: "Show/hide keyboard shortcuts",
    },
    Shortcut {
        key: "Esc",
        description: "Close modals or menus",
    },
];

/// Key listener registered on the surface for as long as it is attached.
pub struct KeyboardShortcuts {
    surface: Arc<dyn Surface>,
    listener: Option<ListenerId>,
}

impl KeyboardShortcuts {
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            listener: None,
        }
    }

    /// Registers the listener; false when it is already registered.
    pub fn attach(&mut self) -> bool {
        if self.listener.is_some() {
            return false;
        }
        self.listener = Some(self.surface.add_key_listener());
        debug!("shortcuts: key listener attached");
        true
    }

    pub fn detach(&mut self) -> bool {
        let Some(listener) = self.listener.take() else {
            return false;
        };
        debug!("shortcuts: key listener detached");
        self.surface.remove_key_listener(listener)
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    pub fn handle(&self, event: &KeyEvent) -> Option<ShortcutAction> {
        if !self.is_attached() {
            return None;
        }
        action_for(event)
    }
}

impl Drop for KeyboardShortcuts {
    fn drop(&mut self) {
        self.detach();
    }
}
