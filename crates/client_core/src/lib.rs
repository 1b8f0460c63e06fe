use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Category, Post, Tag},
    protocol::{Page, PostFilter},
};
use tracing::{debug, warn};
use url::Url;

pub mod error;
pub mod image;

pub use error::{ClientError, Result};
pub use image::{
    HomeImage, ImageResolver, ImageSource, PixabayImageSource, HOME_IMAGES, PLACEHOLDER_IMAGE_URL,
};

/// Read-only view of the content API.
///
/// Every call is a single attempt: transport failures and non-2xx responses
/// surface immediately as [`ClientError`].
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Page<Post>>;
    async fn get_post(&self, slug: &str) -> Result<Post>;
    async fn list_categories(&self) -> Result<Page<Category>>;
    async fn list_tags(&self) -> Result<Page<Tag>>;
}

pub struct HttpBlogClient {
    http: Client,
    base_url: Url,
}

impl HttpBlogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_http(Client::new(), base_url)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_http(http, base_url)
    }

    pub fn with_http(http: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            });
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Joins path segments onto the base url, keeping the API's trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidBaseUrl {
                    url: self.base_url.to_string(),
                    reason: "url cannot carry a path".to_string(),
                })?;
            path.pop_if_empty();
            path.extend(segments);
            path.push("");
        }
        Ok(url)
    }

    async fn get_json<T, Q>(&self, url: Url, query: Option<&Q>, resource: &str) -> Result<T>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let mut request = self.http.get(url.clone());
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%url, resource, "api: resource not found");
            return Err(ClientError::NotFound {
                resource: resource.to_string(),
            });
        }
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "api: unexpected response status");
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl BlogApi for HttpBlogClient {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Page<Post>> {
        let url = self.endpoint(&["posts"])?;
        let page: Page<Post> = self.get_json(url, Some(filter), "posts").await?;
        debug!(count = page.count, returned = page.len(), "api: posts listed");
        Ok(page)
    }

    async fn get_post(&self, slug: &str) -> Result<Post> {
        let url = self.endpoint(&["posts", slug])?;
        self.get_json::<_, ()>(url, None, &format!("post '{slug}'"))
            .await
    }

    async fn list_categories(&self) -> Result<Page<Category>> {
        let url = self.endpoint(&["categories"])?;
        self.get_json::<_, ()>(url, None, "categories").await
    }

    async fn list_tags(&self) -> Result<Page<Tag>> {
        let url = self.endpoint(&["tags"])?;
        self.get_json::<_, ()>(url, None, "tags").await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
