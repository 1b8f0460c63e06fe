use serde::{Deserialize, Serialize};

/// Paginated list envelope returned by every collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn single(results: Vec<T>) -> Self {
        Self {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Query parameters for `GET /posts/`. Unset fields are left off the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "is_featured", skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<i64>,
}

impl PostFilter {
    pub fn featured(limit: u32) -> Self {
        Self {
            featured: Some(true),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn by_taxonomy(category: Option<String>, tag: Option<String>) -> Self {
        Self {
            category: category.filter(|slug| !slug.is_empty()),
            tag: tag.filter(|slug| !slug.is_empty()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSearchResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default, rename = "totalHits")]
    pub total_hits: u64,
    #[serde(default)]
    pub hits: Vec<ImageHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageHit {
    pub id: i64,
    #[serde(rename = "largeImageURL")]
    pub large_image_url: String,
    #[serde(default, rename = "webformatURL")]
    pub webformat_url: Option<String>,
    #[serde(default, rename = "previewURL")]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub tags: String,
}
