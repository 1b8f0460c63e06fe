use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    announcer::{AnnounceOptions, AnnouncementPhase, Announcer},
    clock::Clock,
    focus::FocusManager,
    surface::{ElementId, Politeness, Surface},
};

/// Shared accessibility services handed to every controller: the surface,
/// the clock, the announcer and the focus manager.
pub struct UiServices {
    surface: Arc<dyn Surface>,
    clock: Arc<dyn Clock>,
    announcer: Mutex<Announcer>,
    focus: Mutex<FocusManager>,
}

impl UiServices {
    pub fn new(
        surface: Arc<dyn Surface>,
        clock: Arc<dyn Clock>,
        initial_path: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            surface,
            clock,
            announcer: Mutex::new(Announcer::new()),
            focus: Mutex::new(FocusManager::new(initial_path)),
        })
    }

    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub async fn announce(&self, message: impl Into<String>, options: AnnounceOptions) {
        let now = self.clock.now();
        self.announcer
            .lock()
            .await
            .announce(self.surface.as_ref(), now, message, options);
    }

    /// Advances announcement timers to the current clock reading.
    pub async fn tick(&self) {
        let now = self.clock.now();
        self.announcer.lock().await.poll(self.surface.as_ref(), now);
    }

    pub async fn next_announcement_deadline(&self) -> Option<Duration> {
        self.announcer.lock().await.next_deadline()
    }

    /// True while either region still holds a message waiting for its show deadline.
    pub async fn has_pending_announcement(&self) -> bool {
        let announcer = self.announcer.lock().await;
        [Politeness::Polite, Politeness::Assertive]
            .into_iter()
            .any(|p| matches!(announcer.phase(p), AnnouncementPhase::Pending { .. }))
    }

    pub async fn route_changed(&self, path: &str) -> bool {
        self.focus
            .lock()
            .await
            .on_route_change(self.surface.as_ref(), path)
    }

    pub async fn focus_on_element(&self, id: &str) -> bool {
        self.focus
            .lock()
            .await
            .focus_on_element(self.surface.as_ref(), &ElementId::from(id))
    }

    pub async fn store_focus(&self) {
        self.focus.lock().await.store_focus(self.surface.as_ref());
    }

    pub async fn restore_focus(&self) -> bool {
        self.focus.lock().await.restore_focus(self.surface.as_ref())
    }

    pub async fn skip_to_content(&self) -> bool {
        self.focus.lock().await.skip_to_content(self.surface.as_ref())
    }

    /// Teardown hook: removes live regions and forgets any stored focus.
    pub async fn reset(&self) {
        self.announcer.lock().await.reset(self.surface.as_ref());
        self.focus.lock().await.clear_stored_focus();
    }
}
