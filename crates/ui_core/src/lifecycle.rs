//! Per-page fetch lifecycle: `Loading -> Loaded | Failed`, announced.
//!
//! Every cycle is tagged with a [`RequestTicket`]. Only the most recently
//! issued ticket of a mounted view may settle its state; completions carrying
//! an older ticket, or arriving after unmount, are dropped without touching
//! the view or the announcer.

use std::future::Future;

use client_core::ClientError;
use shared::error::ViewError;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::{
    announcer::{AnnounceOptions, SUMMARY_ANNOUNCE_TIMEOUT},
    services::UiServices,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Loaded(T),
    Failed(ViewError),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ViewError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Applied,
    Stale,
    Unmounted,
}

#[derive(Debug)]
pub struct Lifecycle<T> {
    state: ViewState<T>,
    latest: u64,
    mounted: bool,
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Lifecycle<T> {
    /// A freshly mounted view renders as loading until its first cycle settles.
    pub fn new() -> Self {
        Self {
            state: ViewState::Loading,
            latest: 0,
            mounted: true,
        }
    }

    pub fn begin(&mut self) -> RequestTicket {
        self.latest += 1;
        self.state = ViewState::Loading;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.mounted && ticket.0 == self.latest
    }

    pub fn settle(&mut self, ticket: RequestTicket, outcome: Result<T, ViewError>) -> Settle {
        if !self.mounted {
            return Settle::Unmounted;
        }
        if ticket.0 != self.latest {
            return Settle::Stale;
        }
        self.state = match outcome {
            Ok(data) => ViewState::Loaded(data),
            Err(err) => ViewState::Failed(err),
        };
        Settle::Applied
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn latest_ticket(&self) -> Option<RequestTicket> {
        (self.latest > 0).then_some(RequestTicket(self.latest))
    }
}

/// Announcement and banner texts for one kind of page load.
#[derive(Debug, Clone, Copy)]
pub struct CycleMessages {
    /// Short name used in logs.
    pub subject: &'static str,
    pub loading: &'static str,
    pub failure_banner: &'static str,
    pub failure_announcement: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Loaded(RequestTicket),
    Failed(RequestTicket),
    Discarded(Settle),
}

impl CycleOutcome {
    pub fn is_loaded(self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Runs one fetch cycle against `lifecycle`.
///
/// `fetch` is only polled after the Loading state and the loading
/// announcement are in place. On success `summarize` derives the polite
/// summary announcement; on failure the cause is logged and the banner text
/// from `messages` is stored and announced assertively.
pub async fn run_fetch_cycle<T, Fut, S>(
    lifecycle: &Mutex<Lifecycle<T>>,
    services: &UiServices,
    messages: &CycleMessages,
    fetch: Fut,
    summarize: S,
) -> CycleOutcome
where
    Fut: Future<Output = Result<T, ClientError>>,
    S: FnOnce(&T) -> String,
{
    let ticket = lifecycle.lock().await.begin();
    services
        .announce(messages.loading, AnnounceOptions::polite())
        .await;
    debug!(view = messages.subject, ticket = ticket.seq(), "view: fetch cycle started");

    match fetch.await {
        Ok(data) => {
            let summary = summarize(&data);
            let settle = lifecycle.lock().await.settle(ticket, Ok(data));
            if settle != Settle::Applied {
                debug!(
                    view = messages.subject,
                    ticket = ticket.seq(),
                    ?settle,
                    "view: discarded completed fetch"
                );
                return CycleOutcome::Discarded(settle);
            }
            services
                .announce(
                    summary,
                    AnnounceOptions::polite().with_timeout(SUMMARY_ANNOUNCE_TIMEOUT),
                )
                .await;
            CycleOutcome::Loaded(ticket)
        }
        Err(err) => {
            error!(
                view = messages.subject,
                ticket = ticket.seq(),
                error = %err,
                "view: fetch cycle failed"
            );
            let failure = ViewError::new(err.kind(), messages.failure_banner);
            let settle = lifecycle.lock().await.settle(ticket, Err(failure));
            if settle != Settle::Applied {
                debug!(
                    view = messages.subject,
                    ticket = ticket.seq(),
                    ?settle,
                    "view: discarded failed fetch"
                );
                return CycleOutcome::Discarded(settle);
            }
            services
                .announce(messages.failure_announcement, AnnounceOptions::assertive())
                .await;
            CycleOutcome::Failed(ticket)
        }
    }
}
