//! Fetching every configured feed into the cache.

use chrono::Utc;

use crate::arena::Arena;
use crate::error::{TodayError, TodayResult};
use crate::http::{self, FetchError, ResponseBuffer};
use crate::ics::{ParseError, parse_calendar};
use crate::store::FeedStore;

#[derive(Debug)]
pub enum FeedOutcome {
    /// The body parsed and replaced the cached copy.
    Updated { events: usize, bytes: usize },
    /// Nothing usable came back; the previous cache is kept.
    FetchFailed(FetchError),
    /// The body was not a calendar; the previous cache is kept.
    ParseFailed(ParseError),
}

impl FeedOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, FeedOutcome::Updated { .. })
    }
}

#[derive(Debug)]
pub struct FeedReport {
    pub url: String,
    pub outcome: FeedOutcome,
}

/// Refreshes feeds one after another, reusing one response buffer and one
/// arena for the whole pass.
pub struct Refresher<'s> {
    store: &'s FeedStore,
    arena: Arena,
    buffer: ResponseBuffer,
}

impl<'s> Refresher<'s> {
    pub fn new(store: &'s FeedStore) -> Self {
        Refresher {
            store,
            arena: Arena::new(),
            buffer: ResponseBuffer::new(),
        }
    }

    /// Fetch `url`, check that it parses, and cache it.
    ///
    /// Fetch and parse failures are reported in the outcome; only a failure
    /// to write the cache is an error.
    pub async fn refresh_feed(&mut self, url: &str) -> TodayResult<FeedOutcome> {
        if let Err(e) = http::fetch(url, &mut self.buffer).await {
            tracing::warn!("Could not fetch {}: {}", url, e);
            return Ok(FeedOutcome::FetchFailed(e));
        }

        let parsed = parse_calendar(&mut self.arena, url, self.buffer.as_bytes());
        self.arena.free_all();

        let calendar = match parsed {
            Ok(calendar) => calendar,
            Err(e) => {
                tracing::warn!("Not caching {}: {}", url, e);
                return Ok(FeedOutcome::ParseFailed(e));
            }
        };

        self.store
            .store_feed(url, self.buffer.as_bytes(), Utc::now())?;

        Ok(FeedOutcome::Updated {
            events: calendar.events.len(),
            bytes: self.buffer.len(),
        })
    }
}

/// Refresh every configured feed, in list order.
pub async fn refresh_all(store: &FeedStore) -> TodayResult<Vec<FeedReport>> {
    let urls = store.urls()?;
    if urls.is_empty() {
        return Err(TodayError::NoFeeds);
    }

    let mut refresher = Refresher::new(store);
    let mut reports = Vec::with_capacity(urls.len());
    for url in urls {
        let outcome = refresher.refresh_feed(&url).await?;
        reports.push(FeedReport { url, outcome });
    }

    let updated = reports.iter().filter(|r| r.outcome.is_updated()).count();
    tracing::info!("Refreshed {} of {} feeds", updated, reports.len());

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `responses` to successive connections on a local port.
    async fn serve(responses: Vec<Vec<u8>>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut req = vec![0u8; 1024];
                let _ = socket.read(&mut req).await.unwrap();
                socket.write_all(&response).await.unwrap();
            }
        });

        format!("http://{}", addr)
    }

    fn ok(body: &str) -> Vec<u8> {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        )
        .into_bytes()
    }

    const CALENDAR: &str = "BEGIN:VCALENDAR\r\n\
        BEGIN:VEVENT\r\n\
        SUMMARY:Review\r\n\
        DTSTART:20240101T100000\r\n\
        DTEND:20240101T110000\r\n\
        END:VEVENT\r\n\
        END:VCALENDAR\r\n";

    #[tokio::test]
    async fn test_refresh_all_without_feeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::open(dir.path());

        assert!(matches!(
            refresh_all(&store).await,
            Err(TodayError::NoFeeds)
        ));
    }

    #[tokio::test]
    async fn test_refresh_caches_valid_feeds_only() {
        let base = serve(vec![ok(CALENDAR), ok("this is not a calendar")]).await;
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::open(dir.path());

        let good = format!("{}/good.ics", base);
        let bad = format!("{}/bad.ics", base);
        store.add_url(&good).unwrap();
        store.add_url(&bad).unwrap();

        let reports = refresh_all(&store).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert!(matches!(
            reports[0].outcome,
            FeedOutcome::Updated { events: 1, .. }
        ));
        assert!(matches!(reports[1].outcome, FeedOutcome::ParseFailed(_)));

        let cached = store.cached_feeds().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].url, good);
        assert_eq!(
            std::fs::read(&cached[0].path).unwrap(),
            CALENDAR.as_bytes().to_vec()
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_cache() {
        let base = serve(vec![b"HTTP/1.1 500 Internal Server Error\r\n\r\n".to_vec()]).await;
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::open(dir.path());

        let url = format!("{}/cal.ics", base);
        store.add_url(&url).unwrap();
        store.store_feed(&url, CALENDAR.as_bytes(), Utc::now()).unwrap();

        let mut refresher = Refresher::new(&store);
        let outcome = refresher.refresh_feed(&url).await.unwrap();
        assert!(matches!(
            outcome,
            FeedOutcome::FetchFailed(FetchError::Status { code: 500, .. })
        ));

        let cached = store.cached_feeds().unwrap();
        assert_eq!(
            std::fs::read(&cached[0].path).unwrap(),
            CALENDAR.as_bytes().to_vec()
        );
    }
}
