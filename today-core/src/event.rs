//! Parsed calendar types.
//!
//! Text fields are handles into the [`Arena`](crate::arena::Arena) the feed
//! was parsed with; resolve them through that arena.

use crate::arena::ArenaStr;
use crate::timestamp::Timestamp;

/// A VEVENT block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub dtstart: Timestamp,
    pub dtend: Timestamp,
    pub summary: Option<ArenaStr>,
    /// Name of the owning calendar, stamped when the event is committed.
    pub calendar: Option<ArenaStr>,

    pub uid: Option<ArenaStr>,
    pub category: Option<ArenaStr>,
    pub location: Option<ArenaStr>,
    /// GEO as `lat, lon`.
    pub geo: Option<ArenaStr>,
}

/// A VCALENDAR: its display name and events in feed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calendar {
    pub name: Option<ArenaStr>,
    pub events: Vec<Event>,
}

impl Calendar {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
