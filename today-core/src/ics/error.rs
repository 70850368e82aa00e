use thiserror::Error;

use crate::arena::ArenaError;

/// A fatal parse condition, located by file name and 1-based line number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{file}:{line}: {kind}")]
pub struct ParseError {
    pub file: String,
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// The input never opened a calendar (typically an empty file).
    pub fn is_empty_feed(&self) -> bool {
        self.kind == ParseErrorKind::MissingCalendar
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected start of calendar")]
    UnexpectedCalendarStart,

    #[error("closing calendar before its start")]
    CalendarEndBeforeStart,

    #[error("unclosed event")]
    UnclosedEvent,

    #[error("event outside of calendar")]
    EventOutsideCalendar,

    #[error("closing event before its start")]
    EventEndBeforeStart,

    #[error("unclosed {0} block")]
    UnclosedBlock(String),

    #[error("summary outside of event")]
    SummaryOutsideEvent,

    #[error("time outside of event")]
    TimeOutsideEvent,

    #[error("no calendar found")]
    MissingCalendar,

    #[error("calendar is not terminated by END:VCALENDAR")]
    UnterminatedCalendar,

    #[error(transparent)]
    Arena(#[from] ArenaError),
}
