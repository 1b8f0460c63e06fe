use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use client_core::image::DEFAULT_IMAGE_API_URL;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "blog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: Option<String>,
    pub image_api_key: Option<String>,
    pub image_api_url: String,
    pub request_timeout_secs: u64,
    pub site_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            image_api_key: None,
            image_api_url: DEFAULT_IMAGE_API_URL.into(),
            request_timeout_secs: 10,
            site_url: "http://localhost:3000".into(),
        }
    }
}

impl Settings {
    pub fn api_base_url(&self) -> anyhow::Result<&str> {
        self.api_base_url.as_deref().ok_or_else(|| {
            anyhow!(
                "content API base URL is not configured; pass --api-url, set BLOG_API_URL, \
                 or add api_base_url to {DEFAULT_CONFIG_FILE}"
            )
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Public URL of `path` on the site, as shared on social platforms.
    pub fn page_url(&self, path: &str) -> String {
        format!("{}{path}", self.site_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    image_api_key: Option<String>,
    image_api_url: Option<String>,
    request_timeout_secs: Option<u64>,
    site_url: Option<String>,
}

/// Defaults, then the config file (when present), then the process environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
    };
    settings_from(raw.as_deref(), |key| std::env::var(key).ok())
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

fn settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg: FileConfig = toml::from_str(raw)?;
        if let Some(v) = file_cfg.api_base_url {
            settings.api_base_url = Some(v);
        }
        if let Some(v) = file_cfg.image_api_key {
            settings.image_api_key = Some(v);
        }
        if let Some(v) = file_cfg.image_api_url {
            settings.image_api_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            settings.request_timeout_secs = v;
        }
        if let Some(v) = file_cfg.site_url {
            settings.site_url = v;
        }
    }

    if let Some(v) = env("BLOG_API_URL") {
        settings.api_base_url = Some(v);
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = Some(v);
    }

    if let Some(v) = env("PIXABAY_API_KEY") {
        settings.image_api_key = Some(v);
    }
    if let Some(v) = env("APP__IMAGE_API_KEY") {
        settings.image_api_key = Some(v);
    }

    if let Some(v) = env("APP__IMAGE_API_URL") {
        settings.image_api_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__SITE_URL") {
        settings.site_url = v;
    }

    settings.api_base_url = settings.api_base_url.filter(|v| !v.trim().is_empty());
    settings.image_api_key = settings.image_api_key.filter(|v| !v.trim().is_empty());
    Ok(settings)
}
