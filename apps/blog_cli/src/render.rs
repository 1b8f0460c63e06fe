//! Plain-text rendering of page snapshots.

use std::fmt::Write as _;

use shared::domain::Post;
use ui_core::{
    controller::{BlogListing, HomeView},
    meta::PageMeta,
    shortcuts::SHORTCUTS,
    ViewState,
};

pub fn header(meta: &PageMeta) -> String {
    let title = meta.full_title();
    format!("{title}\n{}\n{}\n", "=".repeat(title.chars().count()), meta.description)
}

pub fn home(view: &HomeView) -> String {
    let mut out = String::new();
    for (image, url) in &view.images {
        let _ = writeln!(out, "[image {}] {url}", image.key);
    }
    out.push('\n');
    out.push_str("Featured articles\n");
    out.push_str(&view_state(&view.featured, |posts| post_list(posts)));
    out
}

pub fn blog(state: &ViewState<BlogListing>, filter_description: &str) -> String {
    let mut out = String::new();
    if !filter_description.is_empty() {
        let _ = writeln!(out, "({filter_description})");
    }
    out.push_str(&view_state(state, |listing| {
        let mut body = String::new();
        let _ = writeln!(
            body,
            "Category: {} | Tag: {}",
            listing.category_name(),
            listing.tag_name()
        );
        if listing.posts.is_empty() {
            body.push_str("No posts found. Try adjusting your filters.\n");
        } else {
            body.push_str(&post_list(&listing.posts));
        }
        let _ = writeln!(
            body,
            "\nCategories: {}",
            join_slugs(listing.categories.iter().map(|c| c.slug.as_str()))
        );
        let _ = writeln!(
            body,
            "Tags: {}",
            join_slugs(listing.tags.iter().map(|t| t.slug.as_str()))
        );
        body
    }));
    out
}

pub fn post(state: &ViewState<Post>) -> String {
    match state {
        ViewState::Failed(err) => format!("{}\n\n[Return to Blog]\n", err.message),
        _ => view_state(state, |post| {
            let mut out = String::new();
            let _ = writeln!(out, "# {}", post.title);
            let _ = writeln!(
                out,
                "By {} | {} | {}",
                post.author.display_name(),
                post.byline_date(),
                post.category.name
            );
            if !post.tags.is_empty() {
                let tags: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
                let _ = writeln!(out, "Tags: {}", tags.join(", "));
            }
            out.push('\n');
            out.push_str(&strip_tags(&post.content));
            out.push_str("\n\n[Share on Facebook] [Share on Twitter] [Share on LinkedIn]\n");
            out
        }),
    }
}

pub fn shortcuts_help() -> String {
    let mut out = String::from("Keyboard shortcuts\n");
    for shortcut in SHORTCUTS {
        let _ = writeln!(out, "  {:<4} {}", shortcut.key, shortcut.description);
    }
    out
}

fn view_state<T>(state: &ViewState<T>, loaded: impl FnOnce(&T) -> String) -> String {
    match state {
        ViewState::Loading => "Loading...\n".to_string(),
        ViewState::Failed(err) => format!("{}\n", err.message),
        ViewState::Loaded(data) => loaded(data),
    }
}

fn post_list(posts: &[Post]) -> String {
    let mut out = String::new();
    for post in posts {
        let _ = writeln!(out, "- {} (/blog/{})", post.title, post.slug);
        if !post.excerpt.is_empty() {
            let _ = writeln!(out, "    {}", post.excerpt);
        }
    }
    out
}

fn join_slugs<'a>(slugs: impl Iterator<Item = &'a str>) -> String {
    let slugs: Vec<&str> = slugs.collect();
    if slugs.is_empty() {
        "-".to_string()
    } else {
        slugs.join(", ")
    }
}

/// Drops markup from article HTML, keeping paragraph breaks.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match (in_tag, ch) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (true, '>') => {
                in_tag = false;
                let name = tag.trim_start_matches('/').to_ascii_lowercase();
                if matches!(name.split_whitespace().next(), Some("p" | "br" | "br/" | "li")) {
                    out.push('\n');
                }
            }
            (true, c) => tag.push(c),
            (false, c) => out.push(c),
        }
    }
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
