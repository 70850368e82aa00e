use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Why a single fetch failed. The caller skips the feed and carries on.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("Could not resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("Could not connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("TLS setup failed: {0}")]
    TlsConfig(String),

    #[error("'{0}' is not a valid TLS server name")]
    InvalidServerName(String),

    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("Connection closed before the response headers ended")]
    ClosedBeforeHeaders,

    #[error("Response headers exceed {0} bytes")]
    HeadersTooLarge(usize),

    #[error("Malformed status line '{0}'")]
    MalformedStatusLine(String),

    #[error("Server answered {code} {reason}")]
    Status { code: u16, reason: String },

    #[error("Response has no Content-Length (chunked transfer encoding is not supported)")]
    MissingContentLength,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
