//! Document metadata each page hands to the presentation layer.

pub const SITE_TITLE: &str = "Sustainable Living";
pub const DEFAULT_DESCRIPTION: &str = "Sustainable living tips and environmental awareness blog";
pub const DEFAULT_IMAGE: &str = "/logo512.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub image: String,
    pub article: bool,
}

impl PageMeta {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: DEFAULT_DESCRIPTION.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            article: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: Option<impl Into<String>>) -> Self {
        if let Some(image) = image {
            self.image = image.into();
        }
        self
    }

    pub fn as_article(mut self) -> Self {
        self.article = true;
        self
    }

    pub fn full_title(&self) -> String {
        format!("{} | {SITE_TITLE}", self.title)
    }

    /// Open Graph / Twitter tags as `(attribute, content)` pairs.
    pub fn tags(&self) -> Vec<(&'static str, String)> {
        let full_title = self.full_title();
        let mut tags = vec![
            ("description", self.description.clone()),
            ("og:title", full_title.clone()),
            ("og:description", self.description.clone()),
            ("og:image", self.image.clone()),
        ];
        if self.article {
            tags.push(("og:type", "article".to_string()));
        }
        tags.extend([
            ("twitter:card", "summary_large_image".to_string()),
            ("twitter:title", full_title),
            ("twitter:description", self.description.clone()),
            ("twitter:image", self.image.clone()),
        ]);
        tags
    }
}
