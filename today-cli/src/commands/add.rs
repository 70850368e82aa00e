use anyhow::Result;
use owo_colors::OwoColorize;
use url::Url;

use super::open_store;

pub fn run(url: &str) -> Result<()> {
    let url = validate(url)?;
    let store = open_store()?;

    if store.add_url(&url)? {
        println!("{} {}", "Added".green(), url);
        println!("{}", "Run `today refresh` to fetch it.".dimmed());
    } else {
        println!("{} is already configured", url);
    }

    Ok(())
}

/// Only absolute http(s) URLs with a host can be fetched.
fn validate(input: &str) -> Result<String> {
    let input = input.trim();
    let parsed = Url::parse(input).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", input, e))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!(
            "Unsupported scheme '{}' in {}: only http and https feeds can be fetched",
            parsed.scheme(),
            input
        );
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        anyhow::bail!("URL '{}' has no host", input);
    }

    Ok(input.to_string())
}
