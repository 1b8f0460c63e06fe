use std::{collections::HashMap, sync::Arc};

use client_core::{BlogApi, ImageResolver};
use tracing::debug;
use ui_core::{
    controller::{BlogController, BlogFilters, BlogPostController, HomeController, SharePlatform},
    meta::PageMeta,
    AppShell, HeadlessSurface, Politeness, Route, Surface, UiServices,
};

use crate::render;

/// Controller of the page currently on screen.
pub enum Page {
    Home(HomeController),
    Blog(BlogController),
    Post(BlogPostController),
    Static(Route),
}

impl Page {
    async fn unmount(&self) {
        match self {
            Self::Home(home) => home.unmount().await,
            Self::Blog(blog) => blog.unmount().await,
            Self::Post(article) => article.unmount().await,
            Self::Static(_) => {}
        }
    }
}

/// One terminal session: shared services, the app shell, the current page
/// and the live-region output printed so far.
pub struct Session {
    api: Arc<dyn BlogApi>,
    images: Arc<ImageResolver>,
    surface: Arc<HeadlessSurface>,
    app: AppShell,
    page: Option<Page>,
    echoed: HashMap<Politeness, usize>,
}

impl Session {
    pub fn new(
        api: Arc<dyn BlogApi>,
        images: Arc<ImageResolver>,
        surface: Arc<HeadlessSurface>,
        services: Arc<UiServices>,
        initial_path: &str,
    ) -> Self {
        let mut app = AppShell::new(services, initial_path);
        app.mount();
        Self {
            api,
            images,
            surface,
            app,
            page: None,
            echoed: HashMap::new(),
        }
    }

    pub fn app(&self) -> &AppShell {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut AppShell {
        &mut self.app
    }

    fn services(&self) -> Arc<UiServices> {
        self.app.services().clone()
    }

    /// Navigates and mounts the page for the new route.
    pub async fn open(&mut self, path: &str) -> String {
        self.app.navigate(path).await;
        self.show_current(BlogFilters::default()).await
    }

    pub async fn open_blog(&mut self, filters: BlogFilters) -> String {
        self.app.navigate(&Route::Blog.path()).await;
        self.show_current(filters).await
    }

    /// Mounts a controller for the shell's current route and renders it.
    pub async fn show_current(&mut self, filters: BlogFilters) -> String {
        if let Some(previous) = self.page.take() {
            previous.unmount().await;
        }
        let services = self.services();
        let route = self.app.route().clone();
        debug!(path = %route.path(), "cli: mounting page");

        let page = match &route {
            Route::Home => {
                let home = HomeController::new(self.api.clone(), self.images.clone(), services);
                home.mount().await;
                Page::Home(home)
            }
            Route::Blog => {
                let blog = BlogController::with_filters(self.api.clone(), services, filters);
                blog.load().await;
                Page::Blog(blog)
            }
            Route::BlogPost { slug } => {
                let article = BlogPostController::new(self.api.clone(), services);
                article.load(slug).await;
                Page::Post(article)
            }
            other => Page::Static(other.clone()),
        };
        self.page = Some(page);
        self.render().await
    }

    pub async fn render(&self) -> String {
        let Some(page) = &self.page else {
            return String::new();
        };
        match page {
            Page::Home(home) => {
                format!("{}\n{}", render::header(&home.meta()), render::home(&home.view().await))
            }
            Page::Blog(blog) => format!(
                "{}\n{}",
                render::header(&blog.meta()),
                render::blog(&blog.state().await, &blog.filter_description().await)
            ),
            Page::Post(article) => {
                let text = format!(
                    "{}\n{}",
                    render::header(&article.meta().await),
                    render::post(&article.state().await)
                );
                // The article is on screen now; let the heading take focus.
                article.after_paint().await;
                text
            }
            Page::Static(route) => render::header(&static_meta(route)),
        }
    }

    pub async fn select_category(&mut self, slug: &str) -> Option<String> {
        let Some(Page::Blog(blog)) = &self.page else {
            return None;
        };
        blog.select_category(slug).await;
        Some(self.render().await)
    }

    pub async fn select_tag(&mut self, slug: &str) -> Option<String> {
        let Some(Page::Blog(blog)) = &self.page else {
            return None;
        };
        blog.select_tag(slug).await;
        Some(self.render().await)
    }

    pub async fn share(&self, platform: SharePlatform, page_url: &str) -> Option<String> {
        let Some(Page::Post(article)) = &self.page else {
            return None;
        };
        let intent = article.share(platform, page_url).await;
        let status = article
            .share_status()
            .await
            .map(|s| s.message)
            .unwrap_or_default();
        Some(match intent {
            Some(url) => format!("{status}\n{url}"),
            None => status,
        })
    }

    pub async fn back_to_list(&mut self) -> Option<String> {
        let route = match &self.page {
            Some(Page::Post(article)) => article.back_to_list().await,
            _ => return None,
        };
        Some(self.open(&route.path()).await)
    }

    /// Waits for every scheduled announcement to reach its live region and
    /// returns the messages that appeared since the previous call.
    pub async fn drain_announcements(&mut self) -> Vec<String> {
        let services = self.services();
        while services.has_pending_announcement().await {
            if let Some(deadline) = services.next_announcement_deadline().await {
                let now = services.now();
                if deadline > now {
                    tokio::time::sleep(deadline - now).await;
                }
            }
            services.tick().await;
        }

        let mut lines = Vec::new();
        for politeness in [Politeness::Polite, Politeness::Assertive] {
            let history = self.surface.text_history(&politeness.region_id());
            let seen = self.echoed.entry(politeness).or_insert(0);
            lines.extend(
                history
                    .iter()
                    .skip(*seen)
                    .filter(|text| !text.is_empty())
                    .map(|text| format!("[{}] {text}", politeness.as_str())),
            );
            *seen = history.len();
        }
        lines
    }

    pub fn focused(&self) -> String {
        self.surface
            .active_element()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(none)".to_string())
    }

    pub async fn close(mut self) {
        if let Some(page) = self.page.take() {
            page.unmount().await;
        }
        self.app.teardown().await;
    }
}

fn static_meta(route: &Route) -> PageMeta {
    match route {
        Route::About => PageMeta::new("About"),
        Route::Privacy => PageMeta::new("Privacy Policy"),
        Route::NotFound { path } => {
            PageMeta::new("Page Not Found").with_description(format!("Nothing lives at {path}"))
        }
        _ => PageMeta::new("Sustainable Living"),
    }
}
