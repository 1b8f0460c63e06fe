use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex as StdMutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use client_core::{BlogApi, ClientError, ImageResolver, ImageSource, PLACEHOLDER_IMAGE_URL};
use shared::{
    domain::{Author, AuthorId, Category, CategoryId, ImageId, Post, PostId, PostStatus, Tag, TagId},
    error::ErrorKind,
    protocol::{Page, PostFilter},
};
use tokio::sync::oneshot;

use super::*;
use crate::{
    clock::ManualClock,
    lifecycle::{CycleOutcome, Settle, ViewState},
    router::Route,
    services::UiServices,
    surface::{ElementId, HeadlessSurface, Politeness, Surface},
    ARTICLE_HEADING_ID, BLOG_RESULTS_ID,
};

fn category(id: i64, slug: &str, name: &str) -> Category {
    Category {
        id: CategoryId(id),
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        created_at: None,
    }
}

fn tag(id: i64, slug: &str, name: &str) -> Tag {
    Tag {
        id: TagId(id),
        name: name.to_string(),
        slug: slug.to_string(),
        created_at: None,
    }
}

fn post(id: i64, slug: &str, category: &Category, tags: &[Tag], featured: bool) -> Post {
    Post {
        id: PostId(id),
        title: format!("Post {slug}"),
        slug: slug.to_string(),
        content: format!("<p>Body of {slug}</p>"),
        excerpt: format!("About {slug}"),
        featured_image: Some(format!("https://cdn.test/{slug}.jpg")),
        author: Author {
            id: AuthorId(1),
            username: "gardener".to_string(),
            first_name: "Ada".to_string(),
            last_name: String::new(),
        },
        category: category.clone(),
        tags: tags.to_vec(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        updated_at: None,
        published_at: None,
        is_featured: featured,
        status: PostStatus::Published,
    }
}

struct FakeBlogApi {
    posts: Vec<Post>,
    categories: StdMutex<Vec<Category>>,
    tags: Vec<Tag>,
    fail_lists: bool,
    post_calls: StdMutex<Vec<PostFilter>>,
    gates: StdMutex<VecDeque<oneshot::Receiver<()>>>,
}

impl FakeBlogApi {
    fn new() -> Self {
        let energy = category(1, "energy", "Renewable Energy");
        let food = category(2, "food", "Food");
        let solar = tag(1, "solar", "Solar");
        Self {
            posts: vec![
                post(1, "solar-roofs", &energy, &[solar.clone()], true),
                post(2, "wind-farms", &energy, &[], true),
                post(3, "compost-basics", &food, &[], true),
                post(4, "seasonal-eating", &food, &[], true),
                post(5, "heat-pumps", &energy, &[], false),
            ],
            categories: StdMutex::new(vec![energy, food]),
            tags: vec![solar],
            fail_lists: false,
            post_calls: StdMutex::new(Vec::new()),
            gates: StdMutex::new(VecDeque::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail_lists: true,
            ..Self::new()
        }
    }

    /// Holds the next `list_posts` call until the returned sender fires.
    fn gate_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    fn add_category(&self, category: Category) {
        self.categories.lock().unwrap().push(category);
    }

    fn list_calls(&self) -> Vec<PostFilter> {
        self.post_calls.lock().unwrap().clone()
    }

    fn unavailable() -> ClientError {
        ClientError::Status {
            status: 503,
            url: "http://blog.test/api/posts/".to_string(),
        }
    }
}

#[async_trait]
impl BlogApi for FakeBlogApi {
    async fn list_posts(&self, filter: &PostFilter) -> client_core::Result<Page<Post>> {
        self.post_calls.lock().unwrap().push(filter.clone());
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail_lists {
            return Err(Self::unavailable());
        }
        let mut results: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| filter.category.as_deref().map_or(true, |c| p.category.slug == c))
            .filter(|p| filter.tag.as_deref().map_or(true, |t| p.has_tag(t)))
            .filter(|p| filter.featured.map_or(true, |f| p.is_featured == f))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            results.truncate(limit as usize);
        }
        Ok(Page::single(results))
    }

    async fn get_post(&self, slug: &str) -> client_core::Result<Post> {
        self.posts
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("post {slug}"),
            })
    }

    async fn list_categories(&self) -> client_core::Result<Page<Category>> {
        Ok(Page::single(self.categories.lock().unwrap().clone()))
    }

    async fn list_tags(&self) -> client_core::Result<Page<Tag>> {
        Ok(Page::single(self.tags.clone()))
    }
}

#[derive(Default)]
struct FakeImages {
    calls: AtomicUsize,
    missing: Vec<&'static str>,
}

#[async_trait]
impl ImageSource for FakeImages {
    async fn fetch_image_url(&self, id: &ImageId) -> client_core::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing.contains(&id.as_str()) {
            return Err(ClientError::ImageNotFound { id: id.clone() });
        }
        Ok(format!("https://img.test/{id}.jpg"))
    }
}

struct Harness {
    surface: Arc<HeadlessSurface>,
    clock: Arc<ManualClock>,
    services: Arc<UiServices>,
}

impl Harness {
    fn new(path: &str) -> Self {
        let surface = Arc::new(HeadlessSurface::app_layout());
        let clock = Arc::new(ManualClock::new());
        let services = UiServices::new(surface.clone(), clock.clone(), path);
        Self {
            surface,
            clock,
            services,
        }
    }

    /// Lets every pending announcement reach its live region.
    async fn settle_announcements(&self) {
        self.clock.advance(Duration::from_millis(100));
        self.services.tick().await;
    }

    fn region_text(&self, politeness: Politeness) -> String {
        self.surface
            .text(&politeness.region_id())
            .unwrap_or_default()
    }

    fn active(&self) -> Option<ElementId> {
        self.surface.active_element()
    }
}

#[test]
fn enter_or_space_opens_the_card() {
    assert_eq!(card_activation("Enter", "compost"), Some(Route::post("compost")));
    assert_eq!(card_activation(" ", "compost"), Some(Route::post("compost")));
    assert_eq!(card_activation("a", "compost"), None);
}

#[tokio::test]
async fn home_mount_loads_featured_posts_and_images() {
    let h = Harness::new("/");
    let api = Arc::new(FakeBlogApi::new());
    let source = Arc::new(FakeImages {
        missing: vec!["1869902"],
        ..FakeImages::default()
    });
    let images = Arc::new(ImageResolver::new(source.clone()));
    let home = HomeController::new(api.clone(), images.clone(), h.services.clone());

    assert!(home.mount().await.is_loaded());

    let calls = api.list_calls();
    assert_eq!(calls, vec![PostFilter::featured(3)]);
    let view = home.view().await;
    assert_eq!(view.featured.loaded().map(Vec::len), Some(3));
    assert_eq!(view.images.len(), 4);
    assert_eq!(
        home.image_url("renewable").await.as_deref(),
        Some(PLACEHOLDER_IMAGE_URL)
    );
    assert_eq!(
        home.image_url("hero").await.as_deref(),
        Some("https://img.test/4324711.jpg")
    );

    h.settle_announcements().await;
    assert_eq!(h.region_text(Politeness::Polite), "Loaded 3 featured articles");
}

#[tokio::test]
async fn remounting_home_hits_the_image_cache() {
    let h = Harness::new("/");
    let api = Arc::new(FakeBlogApi::new());
    let source = Arc::new(FakeImages::default());
    let images = Arc::new(ImageResolver::new(source.clone()));

    let first = HomeController::new(api.clone(), images.clone(), h.services.clone());
    first.mount().await;
    first.unmount().await;
    let second = HomeController::new(api, images.clone(), h.services.clone());
    second.mount().await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    assert_eq!(images.cache_len().await, 4);
    assert_eq!(
        second.image_url("eco_living").await.as_deref(),
        Some("https://img.test/931706.jpg")
    );
}

#[tokio::test]
async fn home_failure_shows_banner_and_announces_assertively() {
    let h = Harness::new("/");
    let images = Arc::new(ImageResolver::new(Arc::new(FakeImages::default())));
    let home = HomeController::new(Arc::new(FakeBlogApi::failing()), images, h.services.clone());

    assert!(matches!(home.load_featured().await, CycleOutcome::Failed(_)));
    let view = home.view().await;
    let err = view.featured.error().expect("failed state");
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(
        err.message,
        "Failed to load featured content. Please try again later."
    );

    h.settle_announcements().await;
    assert_eq!(
        h.region_text(Politeness::Assertive),
        "Error loading featured content"
    );
}

#[tokio::test]
async fn unmounted_home_ignores_late_completion() {
    let h = Harness::new("/");
    let api = Arc::new(FakeBlogApi::new());
    let release = api.gate_next_list();
    let images = Arc::new(ImageResolver::new(Arc::new(FakeImages::default())));
    let home = HomeController::new(api, images, h.services.clone());

    let (outcome, ()) = tokio::join!(home.load_featured(), async {
        tokio::task::yield_now().await;
        home.unmount().await;
        let _ = release.send(());
    });

    assert_eq!(outcome, CycleOutcome::Discarded(Settle::Unmounted));
    assert!(home.view().await.featured.is_loading());
    h.settle_announcements().await;
    assert_eq!(h.region_text(Politeness::Polite), "Loading featured content");
}

#[tokio::test]
async fn unmounted_home_drops_late_image_results() {
    let h = Harness::new("/");
    let source = Arc::new(FakeImages::default());
    let images = Arc::new(ImageResolver::new(source.clone()));
    let home = HomeController::new(
        Arc::new(FakeBlogApi::new()),
        images.clone(),
        h.services.clone(),
    );

    home.unmount().await;
    home.load_images().await;

    assert!(home.view().await.images.is_empty());
    assert_eq!(home.image_url("hero").await, None);
    assert_eq!(images.cache_len().await, 4);
}

#[tokio::test]
async fn blog_filter_change_runs_one_cycle_with_summary() {
    let h = Harness::new("/blog");
    let api = Arc::new(FakeBlogApi::new());
    let blog = BlogController::new(api.clone(), h.services.clone());

    assert!(blog.load().await.is_loaded());
    h.settle_announcements().await;
    assert_eq!(
        h.region_text(Politeness::Polite),
        "Loaded 5 posts for all categories and all tags"
    );

    assert!(blog.select_category("energy").await.is_loaded());

    let calls = api.list_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].category.as_deref(), Some("energy"));
    assert_eq!(calls[1].tag, None);
    assert_eq!(blog.filter_description().await, "Showing posts from Renewable Energy");
    assert_eq!(h.active(), Some(ElementId::from(BLOG_RESULTS_ID)));

    let state = blog.state().await;
    let listing = state.loaded().expect("listing");
    assert_eq!(listing.posts.len(), 3);
    assert_eq!(listing.filters.category.as_deref(), Some("energy"));

    h.settle_announcements().await;
    assert_eq!(
        h.region_text(Politeness::Polite),
        "Loaded 3 posts for Renewable Energy and all tags"
    );
}

#[tokio::test]
async fn blog_tag_filter_and_reset_to_all() {
    let h = Harness::new("/blog");
    let api = Arc::new(FakeBlogApi::new());
    let blog = BlogController::new(api.clone(), h.services.clone());
    blog.load().await;

    blog.select_tag("solar").await;
    assert_eq!(blog.filter_description().await, "Showing posts tagged with Solar");
    h.settle_announcements().await;
    assert_eq!(
        h.region_text(Politeness::Polite),
        "Loaded 1 posts for all categories and Solar"
    );

    blog.select_tag("").await;
    assert_eq!(blog.filters().await, BlogFilters::default());
    assert_eq!(blog.filter_description().await, "Showing posts tagged with all tags");
    assert_eq!(api.list_calls().last(), Some(&PostFilter::default()));
}

#[tokio::test]
async fn stale_filter_result_is_discarded() {
    let h = Harness::new("/blog");
    let api = Arc::new(FakeBlogApi::new());
    let blog = BlogController::new(api.clone(), h.services.clone());
    blog.load().await;

    let release_energy = api.gate_next_list();
    let release_food = api.gate_next_list();

    let (energy, food, ()) = tokio::join!(
        blog.select_category("energy"),
        blog.select_category("food"),
        async {
            tokio::task::yield_now().await;
            let _ = release_food.send(());
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
            let _ = release_energy.send(());
        }
    );

    assert_eq!(energy, CycleOutcome::Discarded(Settle::Stale));
    assert!(food.is_loaded());

    let state = blog.state().await;
    let listing = state.loaded().expect("listing");
    assert!(listing.posts.iter().all(|p| p.category.slug == "food"));
    assert_eq!(listing.filters.category.as_deref(), Some("food"));

    h.settle_announcements().await;
    assert_eq!(
        h.region_text(Politeness::Polite),
        "Loaded 2 posts for Food and all tags"
    );
}

#[tokio::test]
async fn taxonomy_comes_from_the_applied_cycle() {
    let h = Harness::new("/blog");
    let api = Arc::new(FakeBlogApi::new());
    let blog = BlogController::new(api.clone(), h.services.clone());
    blog.load().await;
    assert_eq!(blog.categories().await.len(), 2);

    let release_energy = api.gate_next_list();
    let release_food = api.gate_next_list();

    let (energy, food, ()) = tokio::join!(
        blog.select_category("energy"),
        async {
            api.add_category(category(3, "water", "Water"));
            blog.select_category("food").await
        },
        async {
            tokio::task::yield_now().await;
            let _ = release_food.send(());
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
            let _ = release_energy.send(());
        }
    );

    assert_eq!(energy, CycleOutcome::Discarded(Settle::Stale));
    assert!(food.is_loaded());
    let slugs: Vec<String> = blog.categories().await.into_iter().map(|c| c.slug).collect();
    assert_eq!(slugs, vec!["energy", "food", "water"]);

    blog.select_category("water").await;
    assert_eq!(blog.filter_description().await, "Showing posts from Water");
}

#[tokio::test]
async fn blog_failure_fails_the_whole_cycle() {
    let h = Harness::new("/blog");
    let blog = BlogController::new(Arc::new(FakeBlogApi::failing()), h.services.clone());

    assert!(matches!(blog.load().await, CycleOutcome::Failed(_)));
    match blog.state().await {
        ViewState::Failed(err) => {
            assert_eq!(err.message, "Failed to load blog content. Please try again later.")
        }
        other => panic!("unexpected state {other:?}"),
    }
    assert!(blog.categories().await.is_empty());

    h.settle_announcements().await;
    assert_eq!(h.region_text(Politeness::Assertive), "Error loading blog content");
}

#[tokio::test]
async fn article_loads_and_focuses_heading_once() {
    let h = Harness::new("/blog/solar-roofs");
    let article = BlogPostController::new(Arc::new(FakeBlogApi::new()), h.services.clone());

    assert!(article.load("solar-roofs").await.is_loaded());
    let state = article.state().await;
    let loaded = state.loaded().expect("post");
    assert_eq!(loaded.title, "Post solar-roofs");
    assert_eq!(loaded.content, "<p>Body of solar-roofs</p>");

    assert!(article.after_paint().await);
    assert_eq!(h.active(), Some(ElementId::from(ARTICLE_HEADING_ID)));
    assert!(h.surface.focus(&ElementId::from("nav-home")));
    assert!(!article.after_paint().await);
    assert_eq!(h.active(), Some(ElementId::from("nav-home")));

    h.settle_announcements().await;
    assert_eq!(h.region_text(Politeness::Polite), "Article loaded successfully");

    let meta = article.meta().await;
    assert_eq!(meta.full_title(), "Post solar-roofs | Sustainable Living");
    assert_eq!(meta.description, "About solar-roofs");
    assert_eq!(meta.image, "https://cdn.test/solar-roofs.jpg");
    assert!(meta.article);
}

#[tokio::test]
async fn missing_article_shows_not_found_with_return_action() {
    let h = Harness::new("/blog/gone");
    let article = BlogPostController::new(Arc::new(FakeBlogApi::new()), h.services.clone());

    assert!(matches!(article.load("gone").await, CycleOutcome::Failed(_)));
    let state = article.state().await;
    let err = state.error().expect("failed state");
    assert!(err.is_not_found());
    assert_eq!(
        err.message,
        "Failed to load the post. It may have been removed or is unavailable."
    );
    assert!(!article.after_paint().await);
    assert_eq!(article.meta().await.title, "Article Not Found");

    h.settle_announcements().await;
    assert_eq!(h.region_text(Politeness::Assertive), "Error loading article");

    assert_eq!(article.back_to_list().await, Route::Blog);
    h.settle_announcements().await;
    assert_eq!(
        h.region_text(Politeness::Polite),
        "Navigating back to blog listing"
    );
}

#[tokio::test]
async fn share_builds_encoded_intent_and_status_expires() {
    let h = Harness::new("/blog/solar-roofs");
    let article = BlogPostController::new(Arc::new(FakeBlogApi::new()), h.services.clone());
    article.load("solar-roofs").await;

    let page = "https://blog.test/blog/solar-roofs?ref=a&b=c";
    let url = article
        .share(SharePlatform::Facebook, page)
        .await
        .expect("share url");
    assert_eq!(url.host_str(), Some("www.facebook.com"));
    assert_eq!(
        url.query_pairs().find(|(k, _)| k == "u").map(|(_, v)| v.into_owned()),
        Some(page.to_string())
    );
    assert!(url.as_str().contains("u=https%3A%2F%2Fblog.test"));

    let tweet = article
        .share(SharePlatform::Twitter, page)
        .await
        .expect("share url");
    assert!(tweet
        .query_pairs()
        .any(|(k, v)| k == "text" && v == "Post solar-roofs"));

    let status = article.share_status().await.expect("status");
    assert_eq!(status.message, "Article shared on twitter");
    assert!(!status.is_error);

    h.settle_announcements().await;
    assert_eq!(h.region_text(Politeness::Polite), "Article shared on twitter");

    h.clock.advance(Duration::from_millis(2900));
    assert_eq!(article.share_status().await, None);
}

#[tokio::test]
async fn share_failure_is_announced_assertively() {
    let h = Harness::new("/blog/solar-roofs");
    let article = BlogPostController::new(Arc::new(FakeBlogApi::new()), h.services.clone());

    assert!(article
        .share(SharePlatform::LinkedIn, "not a url")
        .await
        .is_none());
    let status = article.share_status().await.expect("status");
    assert!(status.is_error);
    assert_eq!(status.message, "Failed to share on linkedin. Please try again.");

    h.settle_announcements().await;
    assert_eq!(
        h.region_text(Politeness::Assertive),
        "Failed to share on linkedin. Please try again."
    );
}
