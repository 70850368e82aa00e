pub mod add;
pub mod refresh;
pub mod remove;
pub mod show;
pub mod urls;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use today_core::config::TodayConfig;
use today_core::store::FeedStore;

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner().tick_strings(&["-", "\\", "|", "/"]);
    spinner.set_style(style.clone().template("{msg} {spinner}").unwrap_or(style));
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// The feed store under the configured data directory.
pub fn open_store() -> Result<FeedStore> {
    let config = TodayConfig::load()?;
    Ok(FeedStore::from_config(&config))
}

/// Like `open_store`, but fails with a hint when no feed has been added.
pub fn require_feeds() -> Result<FeedStore> {
    let store = open_store()?;

    if store.urls()?.is_empty() {
        anyhow::bail!(
            "No feeds configured.\n\n\
            Add your first calendar feed with:\n  \
            today add <url>"
        );
    }

    Ok(store)
}
