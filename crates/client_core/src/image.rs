//! Resolution of external image ids to displayable URLs.
//!
//! Successful lookups are memoized for the lifetime of the resolver. There is
//! no expiry and no bound on the number of entries, and concurrent lookups of
//! the same uncached id each reach the image service (last writer wins).

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::ImageId, protocol::ImageSearchResponse};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

pub const DEFAULT_IMAGE_API_URL: &str = "https://pixabay.com/api/";
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://via.placeholder.com/800x400?text=Image+Unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeImage {
    pub key: &'static str,
    pub id: &'static str,
    pub alt: &'static str,
}

impl HomeImage {
    pub fn image_id(&self) -> ImageId {
        ImageId::new(self.id)
    }
}

/// Images shown on the landing page, in display order.
pub const HOME_IMAGES: [HomeImage; 4] = [
    HomeImage {
        key: "hero",
        id: "4324711",
        alt: "",
    },
    HomeImage {
        key: "eco_living",
        id: "931706",
        alt: "Lush green forest at sunrise",
    },
    HomeImage {
        key: "renewable",
        id: "1869902",
        alt: "Wind turbines against blue sky",
    },
    HomeImage {
        key: "sustainable",
        id: "1850181",
        alt: "Person planting a tree",
    },
];

/// One outbound lookup against an image-metadata service.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image_url(&self, id: &ImageId) -> Result<String>;
}

pub struct PixabayImageSource {
    http: Client,
    api_url: String,
    api_key: Option<String>,
}

impl PixabayImageSource {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_api_url(Client::new(), DEFAULT_IMAGE_API_URL, api_key)
    }

    pub fn with_api_url(http: Client, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

#[async_trait]
impl ImageSource for PixabayImageSource {
    async fn fetch_image_url(&self, id: &ImageId) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ClientError::MissingApiKey);
        };

        let response = self
            .http
            .get(&self.api_url)
            .query(&[("key", api_key), ("id", id.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: self.api_url.clone(),
            });
        }
        let body = response.bytes().await?;
        let search: ImageSearchResponse =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                url: self.api_url.clone(),
                source,
            })?;

        search
            .hits
            .into_iter()
            .next()
            .map(|hit| hit.large_image_url)
            .ok_or_else(|| ClientError::ImageNotFound { id: id.clone() })
    }
}

pub struct ImageResolver {
    source: Arc<dyn ImageSource>,
    cache: RwLock<HashMap<ImageId, String>>,
}

impl ImageResolver {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached URL or performs one lookup. Failures are not cached.
    pub async fn resolve(&self, id: &ImageId) -> Result<String> {
        if let Some(url) = self.cache.read().await.get(id) {
            debug!(image_id = %id, "image: cache hit");
            return Ok(url.clone());
        }

        let url = self.source.fetch_image_url(id).await?;
        self.cache.write().await.insert(id.clone(), url.clone());
        debug!(image_id = %id, "image: resolved and cached");
        Ok(url)
    }

    /// Like [`resolve`](Self::resolve) but substitutes the placeholder and logs the failure.
    pub async fn resolve_or_placeholder(&self, id: &ImageId) -> String {
        match self.resolve(id).await {
            Ok(url) => url,
            Err(err) => {
                warn!(image_id = %id, error = %err, "image: resolution failed; using placeholder");
                PLACEHOLDER_IMAGE_URL.to_string()
            }
        }
    }

    /// Resolves every landing-page image, substituting placeholders for failures.
    pub async fn resolve_home_images(&self) -> Vec<(HomeImage, String)> {
        let mut resolved = Vec::with_capacity(HOME_IMAGES.len());
        for image in HOME_IMAGES {
            let url = self.resolve_or_placeholder(&image.image_id()).await;
            resolved.push((image, url));
        }
        resolved
    }

    pub async fn cached(&self, id: &ImageId) -> Option<String> {
        self.cache.read().await.get(id).cloned()
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }
}

#[cfg(test)]
#[path = "tests/image_tests.rs"]
mod tests;
