//! Accessible UI coordination for the blog client: live-region announcements,
//! focus management, keyboard shortcuts, and the per-page fetch lifecycle.
//!
//! Presentation is reached only through [`surface::Surface`]; the in-memory
//! [`surface::HeadlessSurface`] backs tests and the terminal front-end.

pub mod announcer;
pub mod app;
pub mod clock;
pub mod controller;
pub mod focus;
pub mod lifecycle;
pub mod meta;
pub mod router;
pub mod services;
pub mod shortcuts;
pub mod surface;
pub mod theme;

pub use announcer::{AnnounceOptions, AnnouncementPhase, Announcer};
pub use app::AppShell;
pub use clock::{Clock, ManualClock, SystemClock};
pub use focus::{FocusManager, FocusMemento, FocusTrap};
pub use lifecycle::{CycleOutcome, Lifecycle, RequestTicket, Settle, ViewState};
pub use router::Route;
pub use services::UiServices;
pub use shortcuts::{KeyEvent, KeyboardShortcuts, ShortcutAction};
pub use surface::{ElementId, ElementKind, HeadlessSurface, Politeness, Surface};
pub use theme::Theme;

/// Landmark that receives focus after every route change.
pub const MAIN_CONTENT_ID: &str = "main-content";
/// Post grid on the blog index; focused after a filter change.
pub const BLOG_RESULTS_ID: &str = "blog-results";
/// Title of the article on the detail page.
pub const ARTICLE_HEADING_ID: &str = "article-heading";
/// Container of the keyboard shortcuts help overlay.
pub const SHORTCUTS_GUIDE_ID: &str = "keyboard-shortcuts-guide";
