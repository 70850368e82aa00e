use anyhow::Result;
use owo_colors::OwoColorize;

use super::open_store;

pub fn run(url: &str) -> Result<()> {
    let store = open_store()?;

    if !store.remove_url(url.trim())? {
        anyhow::bail!("{} is not configured. See `today urls`.", url);
    }

    println!("{} {}", "Removed".red(), url.trim());
    Ok(())
}
