//! Client-side routes of the blog.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Blog,
    BlogPost { slug: String },
    Privacy,
    NotFound { path: String },
}

impl Route {
    /// Maps a location path to a route. Query strings, fragments and a
    /// trailing slash are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["about"] => Self::About,
            ["blog"] => Self::Blog,
            ["blog", slug] => Self::BlogPost {
                slug: (*slug).to_string(),
            },
            ["privacy"] => Self::Privacy,
            _ => Self::NotFound {
                path: path.to_string(),
            },
        }
    }

    pub fn post(slug: impl Into<String>) -> Self {
        Self::BlogPost { slug: slug.into() }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::About => "/about".to_string(),
            Self::Blog => "/blog".to_string(),
            Self::BlogPost { slug } => format!("/blog/{slug}"),
            Self::Privacy => "/privacy".to_string(),
            Self::NotFound { path } => path.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/about/"), Route::About);
        assert_eq!(Route::parse("/blog?category=energy"), Route::Blog);
        assert_eq!(Route::parse("/blog/solar-roofs"), Route::post("solar-roofs"));
        assert_eq!(Route::parse("/privacy#cookies"), Route::Privacy);
    }

    #[test]
    fn unknown_paths_fall_through_to_not_found() {
        let route = Route::parse("/blog/a/b");
        assert!(route.is_not_found());
        assert_eq!(route.path(), "/blog/a/b");
        assert!(Route::parse("/shop").is_not_found());
    }

    #[test]
    fn path_round_trips_for_post_routes() {
        assert_eq!(Route::post("compost").path(), "/blog/compost");
        assert_eq!(Route::parse(&Route::Blog.path()), Route::Blog);
    }
}
