use std::{sync::Arc, time::Duration};

use client_core::BlogApi;
use shared::domain::Post;
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::{
    announcer::AnnounceOptions,
    lifecycle::{run_fetch_cycle, CycleMessages, CycleOutcome, Lifecycle, ViewState},
    meta::PageMeta,
    router::Route,
    services::UiServices,
    ARTICLE_HEADING_ID,
};

const MESSAGES: CycleMessages = CycleMessages {
    subject: "blog_post",
    loading: "Loading article",
    failure_banner: "Failed to load the post. It may have been removed or is unavailable.",
    failure_announcement: "Error loading article",
};

/// How long a share confirmation or error stays visible.
pub const SHARE_STATUS_TTL: Duration = Duration::from_millis(3000);
const DEFAULT_SHARE_TEXT: &str = "Sustainable Living Blog Post";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePlatform {
    Facebook,
    Twitter,
    LinkedIn,
}

impl SharePlatform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::LinkedIn => "linkedin",
        }
    }

    /// Share intent for `page_url`; query values are percent-encoded.
    pub fn share_url(self, page_url: &str, text: &str) -> Result<Url, url::ParseError> {
        Url::parse(page_url)?;
        match self {
            Self::Facebook => Url::parse_with_params(
                "https://www.facebook.com/sharer/sharer.php",
                &[("u", page_url)],
            ),
            Self::Twitter => Url::parse_with_params(
                "https://twitter.com/intent/tweet",
                &[("url", page_url), ("text", text)],
            ),
            Self::LinkedIn => Url::parse_with_params(
                "https://www.linkedin.com/sharing/share-offsite/",
                &[("url", page_url)],
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareStatus {
    pub message: String,
    pub is_error: bool,
    expires_at: Duration,
}

pub struct BlogPostController {
    api: Arc<dyn BlogApi>,
    services: Arc<UiServices>,
    post: Mutex<Lifecycle<Post>>,
    heading_focus_pending: Mutex<bool>,
    share_status: Mutex<Option<ShareStatus>>,
}

impl BlogPostController {
    pub fn new(api: Arc<dyn BlogApi>, services: Arc<UiServices>) -> Self {
        Self {
            api,
            services,
            post: Mutex::new(Lifecycle::new()),
            heading_focus_pending: Mutex::new(false),
            share_status: Mutex::new(None),
        }
    }

    pub async fn load(&self, slug: &str) -> CycleOutcome {
        *self.heading_focus_pending.lock().await = false;
        let outcome = run_fetch_cycle(
            &self.post,
            &self.services,
            &MESSAGES,
            self.api.get_post(slug),
            |_| "Article loaded successfully".to_string(),
        )
        .await;
        if outcome.is_loaded() {
            *self.heading_focus_pending.lock().await = true;
        }
        outcome
    }

    /// Called by the presentation once the loaded article is on screen.
    /// Moves focus to the heading the first time after each successful load.
    pub async fn after_paint(&self) -> bool {
        let pending = std::mem::take(&mut *self.heading_focus_pending.lock().await);
        if !pending || !self.post.lock().await.is_mounted() {
            return false;
        }
        self.services.focus_on_element(ARTICLE_HEADING_ID).await
    }

    /// Builds the share intent for the loaded article and reports the result
    /// through the status line and the announcer.
    pub async fn share(&self, platform: SharePlatform, page_url: &str) -> Option<Url> {
        let text = self
            .post
            .lock()
            .await
            .state()
            .loaded()
            .map(|post| post.title.clone())
            .unwrap_or_else(|| DEFAULT_SHARE_TEXT.to_string());

        let (url, message, options) = match platform.share_url(page_url, &text) {
            Ok(url) => {
                info!(platform = platform.as_str(), "post: share intent built");
                let message = format!("Article shared on {}", platform.as_str());
                (Some(url), message, AnnounceOptions::polite())
            }
            Err(err) => {
                warn!(platform = platform.as_str(), page_url, error = %err, "post: share failed");
                let message = format!(
                    "Failed to share on {}. Please try again.",
                    platform.as_str()
                );
                (None, message, AnnounceOptions::assertive())
            }
        };

        *self.share_status.lock().await = Some(ShareStatus {
            message: message.clone(),
            is_error: url.is_none(),
            expires_at: self.services.now() + SHARE_STATUS_TTL,
        });
        self.services.announce(message, options).await;
        url
    }

    /// Current share status; expired entries are dropped on read.
    pub async fn share_status(&self) -> Option<ShareStatus> {
        let mut status = self.share_status.lock().await;
        if status
            .as_ref()
            .is_some_and(|s| s.expires_at <= self.services.now())
        {
            *status = None;
        }
        status.clone()
    }

    pub async fn back_to_list(&self) -> Route {
        self.services
            .announce("Navigating back to blog listing", AnnounceOptions::polite())
            .await;
        Route::Blog
    }

    pub async fn state(&self) -> ViewState<Post> {
        self.post.lock().await.state().clone()
    }

    pub async fn unmount(&self) {
        self.post.lock().await.unmount();
    }

    pub async fn meta(&self) -> PageMeta {
        match self.post.lock().await.state() {
            ViewState::Loading => PageMeta::new("Loading Article..."),
            ViewState::Failed(_) => PageMeta::new("Article Not Found")
                .with_description("The requested blog post could not be found."),
            ViewState::Loaded(post) => PageMeta::new(post.title.clone())
                .with_description(post.excerpt.clone())
                .with_image(post.featured_image.clone())
                .as_article(),
        }
    }
}
