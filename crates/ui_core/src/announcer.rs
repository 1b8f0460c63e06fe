//! Status messages for assistive technology, delivered through hidden live
//! regions without moving visual focus.
//!
//! Each politeness level owns one region, created lazily on first use. A
//! region moves through `Idle -> Pending -> Announced -> Cleared`:
//!
//! - `announce` empties the region immediately and schedules the message for
//!   `ANNOUNCE_DELAY` later, so screen readers observe a fresh mutation;
//! - `poll` writes the message once the show deadline passes and empties the
//!   region again once the clear deadline (call time + timeout) passes.
//!
//! A newer call on the same region replaces whatever was scheduled there;
//! messages are not queued.

use std::{collections::HashMap, time::Duration};

use tracing::debug;

use crate::surface::{ElementId, Politeness, Surface};

pub const ANNOUNCE_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_ANNOUNCE_TIMEOUT: Duration = Duration::from_millis(1000);
/// Timeout used for result summaries, which tend to be longer sentences.
pub const SUMMARY_ANNOUNCE_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnounceOptions {
    pub politeness: Politeness,
    /// `None` keeps the message in the region until the next announcement.
    pub timeout: Option<Duration>,
}

impl Default for AnnounceOptions {
    fn default() -> Self {
        Self {
            politeness: Politeness::Polite,
            timeout: Some(DEFAULT_ANNOUNCE_TIMEOUT),
        }
    }
}

impl AnnounceOptions {
    pub fn polite() -> Self {
        Self::default()
    }

    pub fn assertive() -> Self {
        Self {
            politeness: Politeness::Assertive,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.timeout = None;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnnouncementPhase {
    #[default]
    Idle,
    Pending {
        message: String,
        show_at: Duration,
        clear_at: Option<Duration>,
    },
    Announced {
        message: String,
        clear_at: Option<Duration>,
    },
    Cleared,
}

impl AnnouncementPhase {
    fn next_deadline(&self) -> Option<Duration> {
        match self {
            Self::Pending { show_at, .. } => Some(*show_at),
            Self::Announced { clear_at, .. } => *clear_at,
            Self::Idle | Self::Cleared => None,
        }
    }
}

#[derive(Debug)]
struct LiveRegion {
    element: ElementId,
    phase: AnnouncementPhase,
}

#[derive(Debug, Default)]
pub struct Announcer {
    regions: HashMap<Politeness, LiveRegion>,
}

impl Announcer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn announce(
        &mut self,
        surface: &dyn Surface,
        now: Duration,
        message: impl Into<String>,
        options: AnnounceOptions,
    ) {
        let message = message.into();
        let region = self
            .regions
            .entry(options.politeness)
            .or_insert_with(|| LiveRegion {
                element: surface.ensure_live_region(options.politeness),
                phase: AnnouncementPhase::Idle,
            });

        if let AnnouncementPhase::Pending {
            message: dropped, ..
        } = &region.phase
        {
            debug!(
                politeness = options.politeness.as_str(),
                dropped = %dropped,
                replacement = %message,
                "announce: pending message replaced before it was read"
            );
        }

        surface.set_text(&region.element, "");
        region.phase = AnnouncementPhase::Pending {
            show_at: now + ANNOUNCE_DELAY,
            clear_at: options
                .timeout
                .filter(|timeout| !timeout.is_zero())
                .map(|timeout| now + timeout),
            message,
        };
    }

    /// Applies every transition whose deadline is at or before `now`.
    pub fn poll(&mut self, surface: &dyn Surface, now: Duration) {
        for region in self.regions.values_mut() {
            if let AnnouncementPhase::Pending {
                message,
                show_at,
                clear_at,
            } = &region.phase
            {
                if *show_at <= now {
                    surface.set_text(&region.element, message);
                    region.phase = AnnouncementPhase::Announced {
                        message: message.clone(),
                        clear_at: *clear_at,
                    };
                }
            }

            if let AnnouncementPhase::Announced {
                clear_at: Some(clear_at),
                ..
            } = &region.phase
            {
                if *clear_at <= now {
                    surface.set_text(&region.element, "");
                    region.phase = AnnouncementPhase::Cleared;
                }
            }
        }
    }

    pub fn phase(&self, politeness: Politeness) -> AnnouncementPhase {
        self.regions
            .get(&politeness)
            .map(|region| region.phase.clone())
            .unwrap_or_default()
    }

    /// Earliest pending deadline across both regions, for drivers that sleep between polls.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.regions
            .values()
            .filter_map(|region| region.phase.next_deadline())
            .min()
    }

    /// Drops both live regions from the surface; the next announcement recreates them.
    pub fn reset(&mut self, surface: &dyn Surface) {
        for (_, region) in self.regions.drain() {
            surface.remove(&region.element);
        }
    }
}
