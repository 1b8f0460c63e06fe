use std::sync::Arc;

use client_core::{BlogApi, ClientError};
use shared::{
    domain::{Category, Post, Tag},
    protocol::PostFilter,
};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::{
    announcer::AnnounceOptions,
    lifecycle::{run_fetch_cycle, CycleMessages, CycleOutcome, Lifecycle, ViewState},
    meta::PageMeta,
    services::UiServices,
    BLOG_RESULTS_ID,
};

const MESSAGES: CycleMessages = CycleMessages {
    subject: "blog",
    loading: "Loading blog content",
    failure_banner: "Failed to load blog content. Please try again later.",
    failure_announcement: "Error loading blog content",
};

const ALL_CATEGORIES: &str = "all categories";
const ALL_TAGS: &str = "all tags";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilters {
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl BlogFilters {
    pub fn new(category: Option<String>, tag: Option<String>) -> Self {
        Self {
            category: category.filter(|value| !value.is_empty()),
            tag: tag.filter(|value| !value.is_empty()),
        }
    }
}

/// Everything one successful cycle of the blog index fetched.
#[derive(Debug, Clone)]
pub struct BlogListing {
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub filters: BlogFilters,
}

impl BlogListing {
    pub fn category_name(&self) -> String {
        taxonomy_name(
            self.filters.category.as_deref(),
            &self.categories,
            |c| (&c.slug, &c.name),
            ALL_CATEGORIES,
        )
    }

    pub fn tag_name(&self) -> String {
        taxonomy_name(
            self.filters.tag.as_deref(),
            &self.tags,
            |t| (&t.slug, &t.name),
            ALL_TAGS,
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "Loaded {} posts for {} and {}",
            self.posts.len(),
            self.category_name(),
            self.tag_name()
        )
    }
}

/// Display name of the selected slug; unknown slugs are shown as-is.
fn taxonomy_name<T>(
    selected: Option<&str>,
    items: &[T],
    fields: impl Fn(&T) -> (&String, &String),
    all: &str,
) -> String {
    let Some(slug) = selected else {
        return all.to_string();
    };
    items
        .iter()
        .map(&fields)
        .find(|(candidate, _)| candidate.as_str() == slug)
        .map(|(_, name)| name.clone())
        .unwrap_or_else(|| slug.to_string())
}

#[derive(Debug, Default)]
struct Taxonomy {
    categories: Vec<Category>,
    tags: Vec<Tag>,
}

pub struct BlogController {
    api: Arc<dyn BlogApi>,
    services: Arc<UiServices>,
    listing: Mutex<Lifecycle<BlogListing>>,
    filters: Mutex<BlogFilters>,
    // Last successfully loaded categories/tags, used to name a selection
    // before the next cycle finishes.
    taxonomy: RwLock<Taxonomy>,
    filter_description: Mutex<String>,
}

impl BlogController {
    pub fn new(api: Arc<dyn BlogApi>, services: Arc<UiServices>) -> Self {
        Self::with_filters(api, services, BlogFilters::default())
    }

    pub fn with_filters(
        api: Arc<dyn BlogApi>,
        services: Arc<UiServices>,
        filters: BlogFilters,
    ) -> Self {
        Self {
            api,
            services,
            listing: Mutex::new(Lifecycle::new()),
            filters: Mutex::new(filters),
            taxonomy: RwLock::new(Taxonomy::default()),
            filter_description: Mutex::new(String::new()),
        }
    }

    /// Runs one cycle for the current filters: posts, categories and tags are
    /// fetched concurrently and any failure fails the whole cycle.
    pub async fn load(&self) -> CycleOutcome {
        let filters = self.filters.lock().await.clone();
        let query = PostFilter::by_taxonomy(filters.category.clone(), filters.tag.clone());
        let fetch = async {
            let (posts, categories, tags) = futures::try_join!(
                self.api.list_posts(&query),
                self.api.list_categories(),
                self.api.list_tags(),
            )?;
            Ok::<_, ClientError>(BlogListing {
                posts: posts.results,
                categories: categories.results,
                tags: tags.results,
                filters,
            })
        };

        let mut fetched = None;
        let summarize = |listing: &BlogListing| {
            fetched = Some(Taxonomy {
                categories: listing.categories.clone(),
                tags: listing.tags.clone(),
            });
            listing.summary()
        };
        let outcome =
            run_fetch_cycle(&self.listing, &self.services, &MESSAGES, fetch, summarize).await;

        if let (true, Some(fetched)) = (outcome.is_loaded(), fetched) {
            *self.taxonomy.write().await = fetched;
        }
        outcome
    }

    /// Applies a category selection (empty means all) and reloads.
    pub async fn select_category(&self, slug: &str) -> CycleOutcome {
        let selected = Some(slug).filter(|value| !value.is_empty());
        let name = {
            let taxonomy = self.taxonomy.read().await;
            taxonomy_name(selected, &taxonomy.categories, |c| (&c.slug, &c.name), ALL_CATEGORIES)
        };
        self.filters.lock().await.category = selected.map(str::to_string);
        self.apply_filter_change(
            format!("Showing posts from {name}"),
            format!("Filtering by category: {name}"),
        )
        .await
    }

    /// Applies a tag selection (empty means all) and reloads.
    pub async fn select_tag(&self, slug: &str) -> CycleOutcome {
        let selected = Some(slug).filter(|value| !value.is_empty());
        let name = {
            let taxonomy = self.taxonomy.read().await;
            taxonomy_name(selected, &taxonomy.tags, |t| (&t.slug, &t.name), ALL_TAGS)
        };
        self.filters.lock().await.tag = selected.map(str::to_string);
        self.apply_filter_change(
            format!("Showing posts tagged with {name}"),
            format!("Filtering by tag: {name}"),
        )
        .await
    }

    async fn apply_filter_change(&self, description: String, announcement: String) -> CycleOutcome {
        info!(filter = %description, "blog: filter changed");
        *self.filter_description.lock().await = description;
        self.services
            .announce(announcement, AnnounceOptions::polite())
            .await;
        self.services.focus_on_element(BLOG_RESULTS_ID).await;
        self.load().await
    }

    pub async fn state(&self) -> ViewState<BlogListing> {
        self.listing.lock().await.state().clone()
    }

    pub async fn filters(&self) -> BlogFilters {
        self.filters.lock().await.clone()
    }

    pub async fn filter_description(&self) -> String {
        self.filter_description.lock().await.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.taxonomy.read().await.categories.clone()
    }

    pub async fn tags(&self) -> Vec<Tag> {
        self.taxonomy.read().await.tags.clone()
    }

    pub async fn unmount(&self) {
        self.listing.lock().await.unmount();
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta::new("Blog - Sustainable Living").with_description(
            "Read our latest articles about sustainable living and environmental consciousness",
        )
    }
}
