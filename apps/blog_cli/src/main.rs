mod config;
mod render;
mod session;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{BlogApi, HttpBlogClient, ImageResolver, PixabayImageSource};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ui_core::{
    controller::{BlogFilters, SharePlatform},
    HeadlessSurface, SystemClock, UiServices,
};

use crate::{config::Settings, session::Session};

#[derive(Parser, Debug)]
#[command(name = "blog_cli", about = "Read the Sustainable Living blog from a terminal")]
struct Cli {
    /// Configuration file; missing files are ignored.
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Content API base URL, e.g. http://localhost:8000/api
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    image_api_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Featured articles and hero images.
    Home,
    /// Post listing, optionally filtered.
    Blog {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// A single article.
    Post {
        slug: String,
        #[arg(long, value_enum)]
        share: Option<ShareTarget>,
    },
    /// Interactive session driven by shortcut keys and commands on stdin.
    Browse,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ShareTarget {
    Facebook,
    Twitter,
    Linkedin,
}

impl From<ShareTarget> for SharePlatform {
    fn from(value: ShareTarget) -> Self {
        match value {
            ShareTarget::Facebook => SharePlatform::Facebook,
            ShareTarget::Twitter => SharePlatform::Twitter,
            ShareTarget::Linkedin => SharePlatform::LinkedIn,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = config::load_settings(&cli.config)?;
    if let Some(url) = cli.api_url {
        settings.api_base_url = Some(url);
    }
    if let Some(key) = cli.image_api_key {
        settings.image_api_key = Some(key);
    }

    let initial_path = match &cli.command {
        Command::Home | Command::Browse => "/".to_string(),
        Command::Blog { .. } => "/blog".to_string(),
        Command::Post { slug, .. } => format!("/blog/{slug}"),
    };
    let mut session = build_session(&settings, &initial_path)?;

    match cli.command {
        Command::Home => {
            let text = session.show_current(BlogFilters::default()).await;
            print_page(&mut session, text).await;
        }
        Command::Blog { category, tag } => {
            let text = session.open_blog(BlogFilters::new(category, tag)).await;
            print_page(&mut session, text).await;
        }
        Command::Post { slug, share } => {
            let text = session.open(&format!("/blog/{slug}")).await;
            print_page(&mut session, text).await;
            if let Some(target) = share {
                let page_url = settings.page_url(&format!("/blog/{slug}"));
                if let Some(text) = session.share(target.into(), &page_url).await {
                    print_page(&mut session, text).await;
                }
            }
        }
        Command::Browse => browse(&mut session, &settings).await?,
    }

    session.close().await;
    Ok(())
}

fn build_session(settings: &Settings, initial_path: &str) -> Result<Session> {
    let api_url = settings.api_base_url()?;
    let api = HttpBlogClient::with_timeout(api_url, settings.request_timeout())
        .with_context(|| format!("cannot use {api_url} as the content API"))?;
    info!(api = api.base_url(), "cli: content API configured");

    if settings.image_api_key.is_none() {
        warn!("cli: no image API key configured; images will use the placeholder");
    }
    let http = reqwest::Client::builder()
        .timeout(settings.request_timeout())
        .build()
        .context("failed to build HTTP client for the image API")?;
    let images = PixabayImageSource::with_api_url(
        http,
        settings.image_api_url.clone(),
        settings.image_api_key.clone(),
    );

    let surface = Arc::new(HeadlessSurface::app_layout());
    let services = UiServices::new(surface.clone(), Arc::new(SystemClock::new()), initial_path);
    let api: Arc<dyn BlogApi> = Arc::new(api);
    Ok(Session::new(
        api,
        Arc::new(ImageResolver::new(Arc::new(images))),
        surface,
        services,
        initial_path,
    ))
}

async fn print_page(session: &mut Session, text: String) {
    println!("{text}");
    for line in session.drain_announcements().await {
        println!("{line}");
    }
}

const BROWSE_HELP: &str = "\
commands: h | b | a | t | ? | esc | tab | shift+tab  (shortcut keys)
          open <slug> | cat <slug> | tag <slug> | back | share <platform>
          skip | focus | quit";

async fn browse(session: &mut Session, settings: &Settings) -> Result<()> {
    let text = session.show_current(BlogFilters::default()).await;
    print_page(session, text).await;
    println!("{BROWSE_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let argument = words.next().unwrap_or_default();

        let output = match command {
            "quit" | "exit" => break,
            "open" => Some(session.open(&format!("/blog/{argument}")).await),
            "cat" => session.select_category(argument).await,
            "tag" => session.select_tag(argument).await,
            "back" => session.back_to_list().await,
            "share" => match parse_platform(argument) {
                Some(platform) => {
                    let page_url = settings.page_url(&session.app().route().path());
                    session.share(platform, &page_url).await
                }
                None => Some(format!("unknown platform '{argument}'")),
            },
            "skip" => {
                session.app().skip_to_content().await;
                Some(format!("focus: {}", session.focused()))
            }
            "focus" => Some(format!("focus: {}", session.focused())),
            key => dispatch_key(session, key).await,
        };

        if let Some(text) = output {
            print_page(session, text).await;
        } else {
            println!("(no action; {BROWSE_HELP})");
        }
    }
    Ok(())
}

async fn dispatch_key(session: &mut Session, input: &str) -> Option<String> {
    let (key, shift) = match input.to_ascii_lowercase().as_str() {
        "esc" => ("Escape".to_string(), false),
        "tab" => ("Tab".to_string(), false),
        "shift+tab" => ("Tab".to_string(), true),
        _ if input.chars().count() == 1 => (input.to_string(), false),
        _ => return None,
    };

    let before = session.app().route().clone();
    let action = session.app_mut().key_down(&key, shift).await;
    if session.app().route() != &before {
        return Some(session.show_current(BlogFilters::default()).await);
    }
    if key == "Tab" {
        return Some(format!("focus: {}", session.focused()));
    }
    let action = action?;
    let app = session.app();
    Some(if app.is_help_open() {
        render::shortcuts_help()
    } else {
        format!(
            "{action:?} (theme: {}, focus: {})",
            app.theme().as_str(),
            session.focused()
        )
    })
}

fn parse_platform(name: &str) -> Option<SharePlatform> {
    match name.to_ascii_lowercase().as_str() {
        "facebook" => Some(SharePlatform::Facebook),
        "twitter" => Some(SharePlatform::Twitter),
        "linkedin" => Some(SharePlatform::LinkedIn),
        _ => None,
    }
}
