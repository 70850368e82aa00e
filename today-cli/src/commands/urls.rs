use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use super::open_store;

pub fn run() -> Result<()> {
    let store = open_store()?;
    let urls = store.urls()?;

    if urls.is_empty() {
        println!("{}", "No feeds configured".dimmed());
        return Ok(());
    }

    let now = Utc::now();
    for url in urls {
        let status = match store.entry(&url)? {
            Some(entry) => format!("fetched {}", age(now, entry.fetched_at)),
            None => "never fetched".to_string(),
        };
        println!("{} {}", url, format!("({})", status).dimmed());
    }

    Ok(())
}

/// "3h 12m ago", to the minute.
fn age(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0) as u64;
    let minutes = secs - secs % 60;

    if minutes == 0 {
        "just now".to_string()
    } else {
        format!("{} ago", humantime::format_duration(Duration::from_secs(minutes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_age() {
        let now = Utc::now();
        assert_eq!(age(now, now - TimeDelta::seconds(20)), "just now");
        assert_eq!(age(now, now - TimeDelta::minutes(192) - TimeDelta::seconds(5)), "3h 12m ago");
        assert_eq!(age(now, now + TimeDelta::minutes(5)), "just now");
    }
}
