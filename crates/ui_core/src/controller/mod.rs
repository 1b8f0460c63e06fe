//! Page controllers. Each one owns a [`Lifecycle`](crate::lifecycle::Lifecycle)
//! and drives it through [`run_fetch_cycle`](crate::lifecycle::run_fetch_cycle).

pub mod blog;
pub mod blog_post;
pub mod home;

pub use blog::{BlogController, BlogFilters, BlogListing};
pub use blog_post::{BlogPostController, SharePlatform, ShareStatus};
pub use home::{HomeController, HomeView};

use crate::router::Route;

/// Enter or Space on a focused post card opens the article.
pub fn card_activation(key: &str, slug: &str) -> Option<Route> {
    match key {
        "Enter" | " " => Some(Route::post(slug)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
