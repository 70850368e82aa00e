//! ICS (iCalendar) parsing.

mod error;
mod parse;
mod record;

pub use error::{ParseError, ParseErrorKind};
pub use parse::parse_calendar;
pub use record::{Block, Record};
