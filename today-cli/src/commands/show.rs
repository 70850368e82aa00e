use std::path::Path;

use anyhow::Result;
use today_core::{Agenda, Clock};

use super::require_feeds;
use crate::render::{render_agenda, render_list, render_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Day header followed by the list.
    Agenda,
    List,
    Table,
}

/// Print today's events from `file`, or from every cached feed.
pub fn run(view: View, file: Option<&Path>, clock: &dyn Clock) -> Result<()> {
    let agenda = match file {
        Some(path) => Agenda::from_file(path)?,
        None => Agenda::from_cache(&require_feeds()?)?,
    };

    let events = agenda.today(clock);
    let today = clock.today();

    let output = match view {
        View::Agenda => render_agenda(today, &events),
        View::List => render_list(&events),
        View::Table => render_table(today, &events, clock.now()),
    };
    println!("{}", output);

    Ok(())
}
