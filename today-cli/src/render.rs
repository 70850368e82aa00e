//! Terminal rendering for today's events.
//!
//! Plain-text builders do the layout; the `Render` impls add colour on top
//! using owo_colors.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use owo_colors::OwoColorize;
use today_core::EventView;
use today_core::refresh::{FeedOutcome, FeedReport};

pub const NO_EVENTS: &str = "No events today";

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventView<'_> {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            time_range(self).dimmed(),
            format!("({})", self.calendar).cyan(),
            self.summary.bold()
        )
    }
}

impl Render for FeedReport {
    fn render(&self) -> String {
        match &self.outcome {
            FeedOutcome::Updated { events, .. } => format!(
                "{} {} {}",
                "✓".green(),
                self.url,
                format!("({} {})", events, pluralize("event", *events)).dimmed()
            ),
            FeedOutcome::FetchFailed(e) => {
                format!("{} {}\n   {}", "✗".red(), self.url, e.to_string().red())
            }
            FeedOutcome::ParseFailed(e) => {
                format!("{} {}\n   {}", "✗".red(), self.url, e.to_string().red())
            }
        }
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// `[HH:MM - HH:MM]`
pub fn time_range(view: &EventView<'_>) -> String {
    format!(
        "[{} - {}]",
        view.event.dtstart.to_local().format("%H:%M"),
        view.event.dtend.to_local().format("%H:%M")
    )
}

/// `[HH:MM - HH:MM] (calendar) summary`
pub fn list_line(view: &EventView<'_>) -> String {
    format!("{} ({}) {}", time_range(view), view.calendar, view.summary)
}

/// `Monday - 19/10/2026`
pub fn day_header(date: NaiveDate) -> String {
    date.format("%A - %d/%m/%Y").to_string()
}

pub fn render_list(events: &[EventView<'_>]) -> String {
    if events.is_empty() {
        return NO_EVENTS.dimmed().to_string();
    }

    events
        .iter()
        .map(|view| view.render())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_agenda(date: NaiveDate, events: &[EventView<'_>]) -> String {
    format!("{}\n\n{}", day_header(date).bold(), render_list(events))
}

const MINUTES_PER_DAY: i64 = 24 * 60;
const TIMELINE_WIDTH: usize = 100;

/// Proportional ASCII timeline of one day.
///
/// Covers whole hours from the earliest to the latest event endpoint (rounded
/// up), at least one hour. Every hour gets `100 / hours` columns; times
/// outside the day are clamped to its edges, so an event running over from
/// yesterday pulls the start back to midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    day: NaiveDate,
    start_hour: usize,
    end_hour: usize,
    /// Columns per hour.
    space: usize,
}

impl Timeline {
    /// `None` when there is nothing to draw.
    pub fn new(day: NaiveDate, events: &[EventView<'_>]) -> Option<Timeline> {
        let minutes: Vec<i64> = events
            .iter()
            .flat_map(|view| {
                [
                    minute_of_day(day, view.event.dtstart.to_local()),
                    minute_of_day(day, view.event.dtend.to_local()),
                ]
            })
            .collect();
        let first = *minutes.iter().min()?;
        let last = *minutes.iter().max()?;

        // The last hour that can start a timeline is 23.
        let start_hour = ((first / 60) as usize).min(23);
        let end_hour = (((last + 59) / 60) as usize).clamp(start_hour + 1, 24);
        let space = TIMELINE_WIDTH / (end_hour - start_hour);

        Some(Timeline {
            day,
            start_hour,
            end_hour,
            space,
        })
    }

    fn width(&self) -> usize {
        (self.end_hour - self.start_hour) * self.space
    }

    fn column(&self, t: NaiveDateTime) -> usize {
        let offset = minute_of_day(self.day, t) - (self.start_hour as i64) * 60;
        let col = offset.max(0) as usize * self.space / 60;
        col.min(self.width())
    }

    fn visible(&self, t: NaiveDateTime) -> bool {
        let minute = minute_of_day(self.day, t);
        t.date() == self.day
            && minute >= (self.start_hour as i64) * 60
            && minute <= (self.end_hour as i64) * 60
    }

    fn now_column(&self, now: NaiveDateTime) -> Option<usize> {
        self.visible(now).then(|| self.column(now))
    }

    /// Hour labels, each at the column where its hour begins.
    pub fn ruler(&self) -> String {
        let mut ruler: String = (self.start_hour..self.end_hour)
            .map(|hour| format!("{:<width$}", format!("{:02}", hour), width = self.space))
            .collect();
        ruler.push_str(&format!("{:02}", self.end_hour));
        ruler
    }

    /// One event: `[xxxx]` over a `.` background with `|` on hour lines,
    /// and `|` at the current time when it is on screen.
    pub fn row(&self, view: &EventView<'_>, now: NaiveDateTime) -> String {
        let mut cells: Vec<char> = (0..=self.width())
            .map(|col| if col % self.space == 0 { '|' } else { '.' })
            .collect();

        // An end before the start still draws between the two.
        let start = self.column(view.event.dtstart.to_local());
        let end = self.column(view.event.dtend.to_local());
        let (from, to) = (start.min(end), start.max(end));
        for cell in &mut cells[from..=to] {
            *cell = 'x';
        }
        cells[from] = '[';
        if to > from {
            cells[to] = ']';
        }

        let bar: String = cells.into_iter().collect();
        format!(
            "{} {}",
            mark_now(&bar, self.now_column(now), str::to_string),
            view.summary
        )
    }

    /// Ruler, one row per event, ruler again. The now marker runs through
    /// every line.
    pub fn render(&self, events: &[EventView<'_>], now: NaiveDateTime) -> String {
        let ruler = mark_now(&self.ruler(), self.now_column(now), |s| {
            s.dimmed().to_string()
        });

        let mut lines = vec![ruler.clone()];
        lines.extend(events.iter().map(|view| self.row(view, now)));
        lines.push(ruler);
        lines.join("\n")
    }
}

/// Paint `line` with `paint`, except the character at `now_col`, which
/// becomes a red `|`.
fn mark_now(line: &str, now_col: Option<usize>, paint: impl Fn(&str) -> String) -> String {
    let Some((at, c)) = now_col.and_then(|col| line.char_indices().nth(col)) else {
        return paint(line);
    };

    format!(
        "{}{}{}",
        paint(&line[..at]),
        "|".red().bold(),
        paint(&line[at + c.len_utf8()..])
    )
}

/// Minutes since the start of `day`, clamped to that day.
fn minute_of_day(day: NaiveDate, t: NaiveDateTime) -> i64 {
    if t.date() < day {
        0
    } else if t.date() > day {
        MINUTES_PER_DAY
    } else {
        i64::from(t.hour() * 60 + t.minute())
    }
}

pub fn render_table(day: NaiveDate, events: &[EventView<'_>], now: NaiveDateTime) -> String {
    match Timeline::new(day, events) {
        Some(timeline) => timeline.render(events, now),
        None => NO_EVENTS.dimmed().to_string(),
    }
}
