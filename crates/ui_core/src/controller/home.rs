use std::sync::Arc;

use client_core::{BlogApi, HomeImage, ImageResolver};
use shared::{domain::Post, protocol::PostFilter};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::{
    lifecycle::{run_fetch_cycle, CycleMessages, CycleOutcome, Lifecycle, ViewState},
    meta::PageMeta,
    services::UiServices,
};

pub const FEATURED_LIMIT: u32 = 3;

const MESSAGES: CycleMessages = CycleMessages {
    subject: "home",
    loading: "Loading featured content",
    failure_banner: "Failed to load featured content. Please try again later.",
    failure_announcement: "Error loading featured content",
};

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct HomeView {
    pub featured: ViewState<Vec<Post>>,
    /// Empty until the image pass finishes; failed ids carry the placeholder URL.
    pub images: Vec<(HomeImage, String)>,
}

pub struct HomeController {
    api: Arc<dyn BlogApi>,
    images: Arc<ImageResolver>,
    services: Arc<UiServices>,
    featured: Mutex<Lifecycle<Vec<Post>>>,
    resolved_images: RwLock<Vec<(HomeImage, String)>>,
}

impl HomeController {
    pub fn new(
        api: Arc<dyn BlogApi>,
        images: Arc<ImageResolver>,
        services: Arc<UiServices>,
    ) -> Self {
        Self {
            api,
            images,
            services,
            featured: Mutex::new(Lifecycle::new()),
            resolved_images: RwLock::new(Vec::new()),
        }
    }

    /// Loads featured posts and the hero images side by side.
    pub async fn mount(&self) -> CycleOutcome {
        let (outcome, ()) = futures::join!(self.load_featured(), self.load_images());
        outcome
    }

    pub async fn load_featured(&self) -> CycleOutcome {
        let filter = PostFilter::featured(FEATURED_LIMIT);
        let fetch = async {
            self.api
                .list_posts(&filter)
                .await
                .map(|page| page.results)
        };
        run_fetch_cycle(&self.featured, &self.services, &MESSAGES, fetch, |posts| {
            format!("Loaded {} featured articles", posts.len())
        })
        .await
    }

    /// Image failures never fail the page; they are logged by the resolver
    /// and replaced with the placeholder. Results arriving after unmount are
    /// dropped.
    pub async fn load_images(&self) {
        let resolved = self.images.resolve_home_images().await;
        if !self.featured.lock().await.is_mounted() {
            debug!(count = resolved.len(), "home: discarded hero images after unmount");
            return;
        }
        debug!(count = resolved.len(), "home: hero images resolved");
        *self.resolved_images.write().await = resolved;
    }

    pub async fn view(&self) -> HomeView {
        HomeView {
            featured: self.featured.lock().await.state().clone(),
            images: self.resolved_images.read().await.clone(),
        }
    }

    pub async fn image_url(&self, key: &str) -> Option<String> {
        self.resolved_images
            .read()
            .await
            .iter()
            .find(|(image, _)| image.key == key)
            .map(|(_, url)| url.clone())
    }

    pub async fn unmount(&self) {
        self.featured.lock().await.unmount();
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta::new("Sustainable Living - Home").with_description(
            "Explore sustainable living practices and eco-friendly lifestyle tips for a better tomorrow.",
        )
    }
}
