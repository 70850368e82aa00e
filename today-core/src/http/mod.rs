//! Minimal HTTP/1.1 client for fetching calendar feeds.
//!
//! One request per call: no redirects, no chunked transfer encoding, no
//! connection reuse, no retries. The body is read up to `Content-Length`.

mod client;
mod error;
mod response;
mod url;

pub use client::{USER_AGENT, fetch};
pub use error::FetchError;
pub use response::{ResponseBuffer, ResponseHead, StatusLine, find_header_end};
pub use url::{FeedUrl, Scheme};
