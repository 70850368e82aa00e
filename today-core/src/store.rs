//! On-disk feed list and feed cache.
//!
//! ```text
//! <data_dir>/
//!   urls              one feed URL per line
//!   cache/
//!     index.toml      URL -> cache file + fetch time
//!     <slug>-<hash>.ics  last successfully fetched body
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::TodayConfig;
use crate::error::{TodayError, TodayResult};
use crate::http::FeedUrl;

const URLS_FILE: &str = "urls";
const CACHE_DIR: &str = "cache";
const INDEX_FILE: &str = "index.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// File name inside the cache directory.
    pub file: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheIndex {
    #[serde(default)]
    feeds: BTreeMap<String, CacheEntry>,
}

/// A feed with a body on disk.
#[derive(Debug, Clone)]
pub struct CachedFeed {
    pub url: String,
    pub path: PathBuf,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FeedStore {
    root: PathBuf,
}

impl FeedStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        FeedStore { root: root.into() }
    }

    pub fn from_config(config: &TodayConfig) -> Self {
        Self::open(config.data_path())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn urls_path(&self) -> PathBuf {
        self.root.join(URLS_FILE)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }

    fn index_path(&self) -> PathBuf {
        self.cache_dir().join(INDEX_FILE)
    }

    /// Configured feed URLs, in the order they were added.
    ///
    /// A missing list is an empty list. Blank lines and `#` comments are
    /// skipped.
    pub fn urls(&self) -> TodayResult<Vec<String>> {
        let path = self.urls_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| TodayError::io(&path, e))?;

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect())
    }

    /// Append `url` to the list. Returns false if it was already there.
    pub fn add_url(&self, url: &str) -> TodayResult<bool> {
        let mut urls = self.urls()?;
        if urls.iter().any(|u| u == url) {
            return Ok(false);
        }

        urls.push(url.to_string());
        self.write_urls(&urls)?;
        Ok(true)
    }

    /// Drop `url` from the list along with its cached body.
    /// Returns false if it was not configured.
    pub fn remove_url(&self, url: &str) -> TodayResult<bool> {
        let mut urls = self.urls()?;
        let before = urls.len();
        urls.retain(|u| u != url);
        if urls.len() == before {
            return Ok(false);
        }
        self.write_urls(&urls)?;

        let mut index = self.load_index()?;
        if let Some(entry) = index.feeds.remove(url) {
            let path = self.cache_dir().join(&entry.file);
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| TodayError::io(&path, e))?;
            }
            self.save_index(&index)?;
        }

        Ok(true)
    }

    fn write_urls(&self, urls: &[String]) -> TodayResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| TodayError::io(&self.root, e))?;

        let mut contents = urls.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }

        let path = self.urls_path();
        std::fs::write(&path, contents).map_err(|e| TodayError::io(&path, e))
    }

    /// Cache file name for a feed: its host, port and path slugified, then
    /// the first 8 hex digits of the URL's SHA-256.
    ///
    /// Slugs alone collide (`/a-b` and `/a/b` both become `a-b`), the hash
    /// keeps distinct URLs apart.
    pub fn cache_file_name(url: &str) -> String {
        let stem = match FeedUrl::parse(url) {
            Ok(parsed) => slug::slugify(format!("{} {}", parsed.host_header(), parsed.path)),
            Err(_) => slug::slugify(url),
        };
        let hash = format!("{:x}", Sha256::digest(url.as_bytes()));
        let hash = &hash[..8];

        if stem.is_empty() {
            format!("feed-{}.ics", hash)
        } else {
            format!("{}-{}.ics", stem, hash)
        }
    }

    pub fn cache_path_for(&self, url: &str) -> PathBuf {
        self.cache_dir().join(Self::cache_file_name(url))
    }

    /// Write a freshly fetched body to the cache and record it in the index.
    pub fn store_feed(
        &self,
        url: &str,
        body: &[u8],
        fetched_at: DateTime<Utc>,
    ) -> TodayResult<PathBuf> {
        let dir = self.cache_dir();
        std::fs::create_dir_all(&dir).map_err(|e| TodayError::io(&dir, e))?;

        let file = Self::cache_file_name(url);
        let path = dir.join(&file);
        std::fs::write(&path, body).map_err(|e| TodayError::io(&path, e))?;

        let mut index = self.load_index()?;
        index
            .feeds
            .insert(url.to_string(), CacheEntry { file, fetched_at });
        self.save_index(&index)?;

        tracing::debug!("Cached {} bytes for {} at {}", body.len(), url, path.display());
        Ok(path)
    }

    pub fn entry(&self, url: &str) -> TodayResult<Option<CacheEntry>> {
        Ok(self.load_index()?.feeds.remove(url))
    }

    /// Cached bodies for the configured URLs, in list order.
    ///
    /// URLs that were never fetched, or whose file has gone missing, are
    /// left out.
    pub fn cached_feeds(&self) -> TodayResult<Vec<CachedFeed>> {
        let index = self.load_index()?;
        let dir = self.cache_dir();

        let feeds = self
            .urls()?
            .into_iter()
            .filter_map(|url| {
                let entry = index.feeds.get(&url)?;
                let path = dir.join(&entry.file);
                if !path.exists() {
                    tracing::warn!("Cache file for {} is missing: {}", url, path.display());
                    return None;
                }
                Some(CachedFeed {
                    fetched_at: entry.fetched_at,
                    url,
                    path,
                })
            })
            .collect();

        Ok(feeds)
    }

    fn load_index(&self) -> TodayResult<CacheIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(CacheIndex::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| TodayError::io(&path, e))?;
        toml::from_str(&contents)
            .map_err(|e| TodayError::CacheIndex(format!("{}: {}", path.display(), e)))
    }

    fn save_index(&self, index: &CacheIndex) -> TodayResult<()> {
        let contents =
            toml::to_string(index).map_err(|e| TodayError::CacheIndex(e.to_string()))?;

        let path = self.index_path();
        std::fs::write(&path, contents).map_err(|e| TodayError::io(&path, e))
    }
}

/// Read a whole file into memory.
pub fn read_file(path: &Path) -> TodayResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| TodayError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn store() -> (tempfile::TempDir, FeedStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::open(dir.path().join("data"));
        (dir, store)
    }

    #[test]
    fn test_missing_list_is_empty() {
        let (_dir, store) = store();
        assert!(store.urls().unwrap().is_empty());
        assert!(store.cached_feeds().unwrap().is_empty());
    }

    #[test]
    fn test_add_and_remove_urls() {
        let (_dir, store) = store();

        assert!(store.add_url("https://a.example.com/a.ics").unwrap());
        assert!(store.add_url("https://b.example.com/b.ics").unwrap());
        assert!(!store.add_url("https://a.example.com/a.ics").unwrap());

        assert_eq!(
            store.urls().unwrap(),
            vec!["https://a.example.com/a.ics", "https://b.example.com/b.ics"]
        );

        assert!(store.remove_url("https://a.example.com/a.ics").unwrap());
        assert!(!store.remove_url("https://a.example.com/a.ics").unwrap());
        assert_eq!(store.urls().unwrap(), vec!["https://b.example.com/b.ics"]);
    }

    #[test]
    fn test_urls_skip_comments_and_blanks() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.root()).unwrap();
        std::fs::write(
            store.urls_path(),
            "# work\nhttps://a.example.com/a.ics\n\n  https://b.example.com/b.ics  \n",
        )
        .unwrap();

        assert_eq!(
            store.urls().unwrap(),
            vec!["https://a.example.com/a.ics", "https://b.example.com/b.ics"]
        );
    }

    fn assert_cache_name(url: &str, stem: &str) {
        let name = FeedStore::cache_file_name(url);
        let hash = name
            .strip_prefix(stem)
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|rest| rest.strip_suffix(".ics"))
            .unwrap_or_else(|| panic!("unexpected cache name {name}"));

        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_cache_file_name() {
        assert_cache_name(
            "https://calendar.example.com/ical/basic.ics",
            "calendar-example-com-ical-basic-ics",
        );
        assert_cache_name("http://127.0.0.1:8080/feed", "127-0-0-1-8080-feed");
        assert_cache_name("not a url", "not-a-url");
        assert_cache_name("", "feed");

        // Stable across calls.
        assert_eq!(
            FeedStore::cache_file_name("https://example.com/cal.ics"),
            FeedStore::cache_file_name("https://example.com/cal.ics")
        );
    }

    #[test]
    fn test_similar_urls_get_separate_cache_files() {
        let (_dir, store) = store();
        let now = Utc::now();
        let pairs = [
            ("http://127.0.0.1:8080/feed", "http://127.0.0.1:9090/feed"),
            ("https://example.com/a-b", "https://example.com/a/b"),
        ];

        for (a, b) in pairs {
            assert_ne!(FeedStore::cache_file_name(a), FeedStore::cache_file_name(b));

            store.add_url(a).unwrap();
            store.add_url(b).unwrap();
            store.store_feed(a, a.as_bytes(), now).unwrap();
            store.store_feed(b, b.as_bytes(), now).unwrap();
        }

        let cached = store.cached_feeds().unwrap();
        assert_eq!(cached.len(), 4);
        for feed in cached {
            assert_eq!(read_file(&feed.path).unwrap(), feed.url.as_bytes().to_vec());
        }
    }

    #[test]
    fn test_store_feed_updates_index() {
        let (_dir, store) = store();
        let url = "https://example.com/cal.ics";
        let fetched_at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();

        store.add_url(url).unwrap();
        let path = store.store_feed(url, b"BEGIN:VCALENDAR", fetched_at).unwrap();

        assert_eq!(path, store.cache_path_for(url));
        assert_eq!(read_file(&path).unwrap(), b"BEGIN:VCALENDAR".to_vec());

        let entry = store.entry(url).unwrap().unwrap();
        assert_eq!(entry.fetched_at, fetched_at);
        assert_eq!(entry.file, FeedStore::cache_file_name(url));
        assert!(entry.file.starts_with("example-com-cal-ics-"));

        let cached = store.cached_feeds().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].url, url);
        assert_eq!(cached[0].path, path);
    }

    #[test]
    fn test_cached_feeds_follow_url_order() {
        let (_dir, store) = store();
        let now = Utc::now();

        store.add_url("https://b.example.com/b.ics").unwrap();
        store.add_url("https://a.example.com/a.ics").unwrap();
        store.add_url("https://never.example.com/x.ics").unwrap();
        store.store_feed("https://a.example.com/a.ics", b"a", now).unwrap();
        store.store_feed("https://b.example.com/b.ics", b"b", now).unwrap();

        let urls: Vec<_> = store
            .cached_feeds()
            .unwrap()
            .into_iter()
            .map(|feed| feed.url)
            .collect();
        assert_eq!(
            urls,
            vec!["https://b.example.com/b.ics", "https://a.example.com/a.ics"]
        );
    }

    #[test]
    fn test_remove_url_drops_cache() {
        let (_dir, store) = store();
        let url = "https://example.com/cal.ics";

        store.add_url(url).unwrap();
        let path = store.store_feed(url, b"body", Utc::now()).unwrap();
        assert!(path.exists());

        store.remove_url(url).unwrap();
        assert!(!path.exists());
        assert!(store.entry(url).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_index() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.cache_dir()).unwrap();
        std::fs::write(store.cache_dir().join(INDEX_FILE), "not = [valid").unwrap();

        assert!(matches!(
            store.entry("https://example.com/"),
            Err(TodayError::CacheIndex(_))
        ));
    }
}
