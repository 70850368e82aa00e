//! Parsed feeds held together with the arena their text lives in.

use std::path::Path;

use crate::arena::{Arena, ArenaStr};
use crate::error::TodayResult;
use crate::event::{Calendar, Event};
use crate::ics::{ParseError, parse_calendar};
use crate::schedule;
use crate::store::{FeedStore, read_file};
use crate::timestamp::{Clock, DayWindow};

const UNTITLED: &str = "(No title)";

#[derive(Debug)]
struct Feed {
    /// Shown when the calendar has no name of its own.
    label: String,
    calendar: Calendar,
}

/// Every calendar loaded for one run.
///
/// All text is copied into a single arena that is released with the agenda.
#[derive(Debug, Default)]
pub struct Agenda {
    arena: Arena,
    feeds: Vec<Feed>,
}

/// An event with its text resolved.
#[derive(Debug, Clone, Copy)]
pub struct EventView<'a> {
    pub event: &'a Event,
    pub summary: &'a str,
    pub calendar: &'a str,
    pub location: Option<&'a str>,
    pub category: Option<&'a str>,
    pub uid: Option<&'a str>,
    pub geo: Option<&'a str>,
}

impl AsRef<Event> for EventView<'_> {
    fn as_ref(&self) -> &Event {
        self.event
    }
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one feed and keep it. `label` names the feed in errors and
    /// stands in for a missing calendar name.
    pub fn add_feed(&mut self, label: &str, input: &[u8]) -> Result<usize, ParseError> {
        let calendar = parse_calendar(&mut self.arena, label, input)?;
        let count = calendar.events.len();

        tracing::debug!("{}: {} events", label, count);
        self.feeds.push(Feed {
            label: label.to_string(),
            calendar,
        });
        Ok(count)
    }

    /// A single feed already in memory.
    pub fn from_bytes(label: &str, input: &[u8]) -> Result<Self, ParseError> {
        let mut agenda = Agenda::new();
        agenda.add_feed(label, input)?;
        Ok(agenda)
    }

    /// Load a single local file. A parse error is returned to the caller.
    pub fn from_file(path: &Path) -> TodayResult<Self> {
        let input = read_file(path)?;
        Ok(Self::from_bytes(&path.display().to_string(), &input)?)
    }

    /// Load every cached feed.
    ///
    /// A feed that fails to parse is logged and skipped so the others still
    /// show.
    pub fn from_cache(store: &FeedStore) -> TodayResult<Self> {
        let mut agenda = Agenda::new();

        for feed in store.cached_feeds()? {
            let input = read_file(&feed.path)?;
            match agenda.add_feed(&feed.url, &input) {
                Ok(_) => {}
                Err(e) if e.is_empty_feed() => {
                    tracing::warn!("Skipping {}: cached copy is empty", feed.url);
                }
                Err(e) => tracing::warn!("Skipping {}: {}", feed.url, e),
            }
        }

        Ok(agenda)
    }

    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }

    fn resolve(&self, s: Option<ArenaStr>) -> Option<&str> {
        s.and_then(|s| self.arena.resolve(s))
    }

    /// All events in feed order.
    pub fn events(&self) -> Vec<EventView<'_>> {
        self.feeds
            .iter()
            .flat_map(|feed| {
                feed.calendar.events.iter().map(move |event| EventView {
                    event,
                    summary: self.resolve(event.summary).unwrap_or(UNTITLED),
                    calendar: self.resolve(event.calendar).unwrap_or(&feed.label),
                    location: self.resolve(event.location),
                    category: self.resolve(event.category),
                    uid: self.resolve(event.uid),
                    geo: self.resolve(event.geo),
                })
            })
            .collect()
    }

    /// Events touching `window`, earliest first.
    pub fn day(&self, window: &DayWindow) -> Vec<EventView<'_>> {
        schedule::select_day(self.events(), window)
    }

    /// Events touching the clock's current day, earliest first.
    pub fn today(&self, clock: &dyn Clock) -> Vec<EventView<'_>> {
        self.day(&DayWindow::today(clock))
    }
}
