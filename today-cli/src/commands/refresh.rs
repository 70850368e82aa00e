use anyhow::Result;
use owo_colors::OwoColorize;
use today_core::refresh::{FeedReport, Refresher};

use super::{create_spinner, require_feeds};
use crate::render::Render;

pub async fn run() -> Result<()> {
    let store = require_feeds()?;
    let urls = store.urls()?;

    let mut refresher = Refresher::new(&store);
    let mut updated = 0;

    for url in &urls {
        let spinner = create_spinner(url.clone());
        let result = refresher.refresh_feed(url).await;
        spinner.finish_and_clear();

        let report = FeedReport {
            url: url.clone(),
            outcome: result?,
        };
        if report.outcome.is_updated() {
            updated += 1;
        }
        println!("{}", report.render());
    }

    let summary = format!("\nRefreshed {} of {} feeds", updated, urls.len());
    if updated == urls.len() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }

    Ok(())
}
