//! Core of the `today` calendar tool.
//!
//! This crate holds the ingestion pipeline used by the `today` CLI:
//! - `http`: a minimal HTTP/1.1 client (plain or TLS) that fetches a feed
//! - `ics`: a line-oriented state machine turning ICS text into a `Calendar`
//! - `schedule`: day-window selection and ordering of events
//! - `store`: the URL list and the on-disk cache of fetched feeds
//! - `refresh`: fetch, validate and cache every configured feed
//! - `agenda`: cached or local feeds loaded for display

pub mod agenda;
pub mod arena;
pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod ics;
pub mod refresh;
pub mod schedule;
pub mod slice;
pub mod store;
pub mod timestamp;

pub use agenda::{Agenda, EventView};
pub use error::{TodayError, TodayResult};
pub use event::{Calendar, Event};
pub use timestamp::{Clock, DayWindow, FixedClock, SystemClock, Timestamp};
