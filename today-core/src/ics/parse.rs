//! Line-oriented state machine turning ICS text into a [`Calendar`].

use crate::arena::{Arena, ArenaStr};
use crate::event::{Calendar, Event};
use crate::ics::error::{ParseError, ParseErrorKind};
use crate::ics::record::{Block, Record};
use crate::slice::Slice;
use crate::timestamp::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Undefined,
    Calendar,
    Event,
    /// Inside a block we don't interpret.
    Other,
}

struct Parser<'a> {
    arena: &'a mut Arena,
    state: State,
    /// State to return to once the outermost ignored block closes.
    resume: State,
    other_depth: usize,
    other_name: String,
    calendar: Calendar,
    pending: Event,
}

enum Step {
    Continue,
    Done,
}

/// Parse `input` into a calendar, copying text fields into `arena`.
///
/// `file` is only used to locate errors. Parsing stops at `END:VCALENDAR`;
/// anything after it is not read. Events are only added once their
/// `END:VEVENT` is seen, so an error never leaves a half-built event behind.
pub fn parse_calendar(
    arena: &mut Arena,
    file: &str,
    input: &[u8],
) -> Result<Calendar, ParseError> {
    let mut parser = Parser {
        arena,
        state: State::Undefined,
        resume: State::Undefined,
        other_depth: 0,
        other_name: String::new(),
        calendar: Calendar::default(),
        pending: Event::default(),
    };

    let lines = Slice::new(input).split("\n", 0);
    for (i, line) in lines.iter().enumerate() {
        let located = |kind| ParseError {
            file: file.to_string(),
            line: i + 1,
            kind,
        };

        match parser.step(Record::classify(*line)).map_err(located)? {
            Step::Continue => {}
            Step::Done => return Ok(parser.calendar),
        }
    }

    let kind = if parser.state == State::Undefined && parser.resume == State::Undefined {
        ParseErrorKind::MissingCalendar
    } else {
        ParseErrorKind::UnterminatedCalendar
    };
    Err(ParseError {
        file: file.to_string(),
        line: lines.len(),
        kind,
    })
}

impl Parser<'_> {
    fn step(&mut self, record: Record<'_>) -> Result<Step, ParseErrorKind> {
        match record {
            Record::Begin(Block::Calendar) => {
                if self.state != State::Undefined {
                    return Err(ParseErrorKind::UnexpectedCalendarStart);
                }
                self.state = State::Calendar;
            }
            Record::Begin(Block::Event) => match self.state {
                State::Calendar => {
                    self.pending = Event::default();
                    self.state = State::Event;
                }
                State::Event => return Err(ParseErrorKind::UnclosedEvent),
                State::Undefined | State::Other => {
                    return Err(ParseErrorKind::EventOutsideCalendar);
                }
            },
            Record::Begin(Block::Other(name)) => {
                if self.state != State::Other {
                    self.resume = self.state;
                    self.other_name = name.to_string();
                }
                self.other_depth += 1;
                self.state = State::Other;
            }

            Record::End(Block::Event) => {
                if self.state != State::Event {
                    return Err(ParseErrorKind::EventEndBeforeStart);
                }
                let mut event = std::mem::take(&mut self.pending);
                event.calendar = self.calendar.name;
                self.calendar.events.push(event);
                self.state = State::Calendar;
            }
            Record::End(Block::Calendar) => match self.state {
                State::Calendar => return Ok(Step::Done),
                State::Event => return Err(ParseErrorKind::UnclosedEvent),
                State::Other => {
                    return Err(ParseErrorKind::UnclosedBlock(self.other_name.clone()));
                }
                State::Undefined => return Err(ParseErrorKind::CalendarEndBeforeStart),
            },
            Record::End(Block::Other(_)) => {
                if self.state == State::Other {
                    self.other_depth -= 1;
                    if self.other_depth == 0 {
                        self.state = self.resume;
                    }
                }
            }

            Record::CalendarName(value) => {
                self.calendar.name = Some(self.copy(value)?);
            }
            Record::Summary(value) => {
                if self.state != State::Event {
                    return Err(ParseErrorKind::SummaryOutsideEvent);
                }
                self.pending.summary = Some(self.copy(value)?);
            }
            Record::DtStart(value) | Record::DtEnd(value) => match self.state {
                State::Other => {}
                State::Event => {
                    let ts = Timestamp::parse(value);
                    if matches!(record, Record::DtStart(_)) {
                        self.pending.dtstart = ts;
                    } else {
                        self.pending.dtend = ts;
                    }
                }
                State::Undefined | State::Calendar => {
                    return Err(ParseErrorKind::TimeOutsideEvent);
                }
            },

            Record::Uid(value) if self.state == State::Event => {
                self.pending.uid = Some(self.copy(value)?);
            }
            Record::Categories(value) if self.state == State::Event => {
                self.pending.category = Some(self.copy(value)?);
            }
            Record::Location(value) if self.state == State::Event => {
                self.pending.location = Some(self.copy(value)?);
            }
            Record::Geo(value) if self.state == State::Event => {
                self.pending.geo = Some(self.copy_geo(value)?);
            }

            Record::Uid(_)
            | Record::Categories(_)
            | Record::Location(_)
            | Record::Geo(_)
            | Record::Unknown => {}
        }

        Ok(Step::Continue)
    }

    fn copy(&mut self, value: Slice<'_>) -> Result<ArenaStr, ParseErrorKind> {
        Ok(self.arena.copy_str(&value.to_str_lossy())?)
    }

    /// GEO is `lat;lon`; stored as `lat, lon`.
    fn copy_geo(&mut self, value: Slice<'_>) -> Result<ArenaStr, ParseErrorKind> {
        match value.split(";", 1).as_slice() {
            [lat, lon] => Ok(self
                .arena
                .copy_fmt(format_args!("{}, {}", lat.trimmed(), lon.trimmed()))?),
            _ => self.copy(value),
        }
    }
}
