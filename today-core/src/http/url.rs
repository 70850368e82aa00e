use std::fmt;

use crate::http::FetchError;
use crate::slice::Slice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// `scheme://host[:port]/path`, split the way the client needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUrl {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path without its leading `/`, query included.
    pub path: String,
}

impl FeedUrl {
    /// Split a feed URL.
    ///
    /// Anything other than `http:`/`https:` before the `//` (or no scheme at
    /// all) falls back to plain http with a warning.
    pub fn parse(url: &str) -> Result<FeedUrl, FetchError> {
        let invalid = || FetchError::InvalidUrl(url.to_string());

        let parts = Slice::from(url.trim()).split("//", 1);
        let (scheme_part, rest) = match parts.as_slice() {
            [scheme, rest] => (Some(*scheme), *rest),
            [rest] => (None, *rest),
            _ => return Err(invalid()),
        };

        let scheme = match scheme_part {
            Some(s) if s.equals("https:") => Scheme::Https,
            Some(s) if s.equals("http:") => Scheme::Http,
            other => {
                tracing::warn!(
                    "Unrecognised scheme '{}' in {}, defaulting to http",
                    other.map(|s| s.to_string()).unwrap_or_default(),
                    url
                );
                Scheme::Http
            }
        };

        let parts = rest.split("/", 1);
        let authority = parts.first().copied().unwrap_or_default();
        let path = parts.get(1).copied().unwrap_or_default();

        let parts = authority.split(":", 1);
        let host = parts.first().copied().unwrap_or_default();
        let port = match parts.get(1) {
            Some(port) => port.to_str_lossy().parse().map_err(|_| invalid())?,
            None => scheme.default_port(),
        };

        if host.is_empty() {
            return Err(invalid());
        }

        Ok(FeedUrl {
            scheme,
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// Value for the `Host` header; the port is only spelled out when it is
    /// not the scheme's default.
    pub fn host_header(&self) -> String {
        if self.port == self.scheme.default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for FeedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self.scheme {
            Scheme::Http => "http",
            Scheme::Https => "https",
        };
        write!(f, "{}://{}/{}", scheme, self.host_header(), self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https() {
        let url = FeedUrl::parse("https://calendar.example.com/ical/basic.ics").unwrap();
        assert_eq!(url.scheme, Scheme::Https);
        assert_eq!(url.host, "calendar.example.com");
        assert_eq!(url.port, 443);
        assert_eq!(url.path, "ical/basic.ics");
    }

    #[test]
    fn test_parse_explicit_port_and_query() {
        let url = FeedUrl::parse("http://127.0.0.1:8080/feed?token=abc/def").unwrap();
        assert_eq!(url.scheme, Scheme::Http);
        assert_eq!(url.host, "127.0.0.1");
        assert_eq!(url.port, 8080);
        assert_eq!(url.path, "feed?token=abc/def");
        assert_eq!(url.host_header(), "127.0.0.1:8080");
    }

    #[test]
    fn test_unknown_scheme_defaults_to_http() {
        let url = FeedUrl::parse("webcal://example.com/cal.ics").unwrap();
        assert_eq!(url.scheme, Scheme::Http);
        assert_eq!(url.port, 80);

        let url = FeedUrl::parse("example.com/cal.ics").unwrap();
        assert_eq!(url.scheme, Scheme::Http);
        assert_eq!(url.host, "example.com");
    }

    #[test]
    fn test_host_only() {
        let url = FeedUrl::parse("https://example.com").unwrap();
        assert_eq!(url.path, "");
        assert_eq!(url.to_string(), "https://example.com/");
    }

    #[test]
    fn test_invalid_urls() {
        assert!(matches!(FeedUrl::parse(""), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(
            FeedUrl::parse("https:///path"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            FeedUrl::parse("http://host:notaport/"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
