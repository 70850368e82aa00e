use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, OnceLock};

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, lookup_host};
use tokio_rustls::TlsConnector;

use crate::http::response::{ResponseBuffer, ResponseHead, find_header_end};
use crate::http::url::{FeedUrl, Scheme};
use crate::http::FetchError;

pub const USER_AGENT: &str = concat!("today/", env!("CARGO_PKG_VERSION"));

const CHUNK_SIZE: usize = 4096;
const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Fetch `url` into `out`.
///
/// `out` is reset first and only receives bytes once the response has been
/// accepted (status 200 with a non-zero `Content-Length`). Reading stops at
/// `Content-Length` bytes or when the peer closes, whichever comes first; a
/// short body is returned as is.
pub async fn fetch(url: &str, out: &mut ResponseBuffer) -> Result<(), FetchError> {
    out.reset();

    let target = FeedUrl::parse(url)?;
    let addrs = resolve(&target).await?;
    let tcp = connect(&target.host, &addrs).await?;

    match target.scheme {
        Scheme::Http => exchange(tcp, &target, out).await,
        Scheme::Https => {
            let tls = handshake(tcp, &target.host).await?;
            exchange(tls, &target, out).await
        }
    }
}

/// Every address for the host, in resolver order. Never empty.
async fn resolve(url: &FeedUrl) -> Result<Vec<SocketAddr>, FetchError> {
    if let Ok(ip) = url.host.parse::<Ipv4Addr>() {
        return Ok(vec![SocketAddr::from((ip, url.port))]);
    }

    let addrs: Vec<SocketAddr> = lookup_host((url.host.as_str(), url.port))
        .await
        .map_err(|source| FetchError::Resolve {
            host: url.host.clone(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(no_addresses(&url.host));
    }
    Ok(addrs)
}

fn no_addresses(host: &str) -> FetchError {
    FetchError::Resolve {
        host: host.to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "no addresses"),
    }
}

/// Try each address in turn; the error is the last address's.
async fn connect(host: &str, addrs: &[SocketAddr]) -> Result<TcpStream, FetchError> {
    let mut last_error = None;

    for &addr in addrs {
        tracing::debug!("Connecting to {} ({})", host, addr);
        match TcpStream::connect(addr).await {
            Ok(tcp) => return Ok(tcp),
            Err(source) => {
                tracing::debug!("Connect to {} failed: {}", addr, source);
                last_error = Some(FetchError::Connect { addr, source });
            }
        }
    }

    Err(last_error.unwrap_or_else(|| no_addresses(host)))
}

static TLS_CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();

/// Client config shared by every handshake in the process. Trust roots are
/// loaded on first use.
fn tls_config() -> Result<Arc<ClientConfig>, FetchError> {
    if let Some(config) = TLS_CONFIG.get() {
        return Ok(config.clone());
    }

    let native = rustls_native_certs::load_native_certs();
    for err in &native.errors {
        tracing::debug!("Skipping platform certificate: {}", err);
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    tracing::debug!(added, ignored, "Loaded platform trust roots");

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| FetchError::TlsConfig(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(TLS_CONFIG.get_or_init(|| Arc::new(config)).clone())
}

async fn handshake(
    tcp: TcpStream,
    host: &str,
) -> Result<tokio_rustls::client::TlsStream<TcpStream>, FetchError> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| FetchError::InvalidServerName(host.to_string()))?;

    let connector = TlsConnector::from(tls_config()?);
    let tls = connector
        .connect(server_name, tcp)
        .await
        .map_err(|source| FetchError::Handshake {
            host: host.to_string(),
            source,
        })?;

    tracing::debug!("TLS session established with {}", host);
    Ok(tls)
}

fn request(url: &FeedUrl) -> String {
    format!(
        "GET /{path} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: {USER_AGENT}\r\n\
         Accept: text/calendar\r\n\
         Cache-Control: no-cache\r\n\
         Pragma: no-cache\r\n\
         Connection: close\r\n\
         \r\n",
        path = url.path,
        host = url.host_header(),
    )
}

/// A read that treats a TLS peer closing without `close_notify` as EOF.
async fn read_some<S>(stream: &mut S, chunk: &mut [u8]) -> Result<usize, FetchError>
where
    S: AsyncRead + Unpin,
{
    match stream.read(chunk).await {
        Ok(n) => Ok(n),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
        Err(e) => Err(e.into()),
    }
}

async fn exchange<S>(mut stream: S, url: &FeedUrl, out: &mut ResponseBuffer) -> Result<(), FetchError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(request(url).as_bytes()).await?;
    stream.flush().await?;

    let mut chunk = [0u8; CHUNK_SIZE];
    let mut head = Vec::new();
    let header_end = loop {
        let n = read_some(&mut stream, &mut chunk).await?;
        if n == 0 {
            return Err(FetchError::ClosedBeforeHeaders);
        }
        head.extend_from_slice(&chunk[..n]);

        if let Some(end) = find_header_end(&head) {
            break end;
        }
        if head.len() > MAX_HEADER_BYTES {
            return Err(FetchError::HeadersTooLarge(MAX_HEADER_BYTES));
        }
    };

    // Whatever arrived past the blank line is the start of the body.
    let early_body = head.split_off(header_end + 4);
    let response = ResponseHead::parse(&head)?;

    if response.status.code != 200 {
        tracing::error!(
            code = response.status.code,
            "{} answered {} {}",
            url,
            response.status.code,
            response.status.reason
        );
        return Err(FetchError::Status {
            code: response.status.code,
            reason: response.status.reason.to_string(),
        });
    }

    let Some(content_length) = response.content_length else {
        tracing::error!("{} sent no Content-Length", url);
        return Err(FetchError::MissingContentLength);
    };

    out.extend(&early_body[..early_body.len().min(content_length)]);
    while out.len() < content_length {
        let n = read_some(&mut stream, &mut chunk).await?;
        if n == 0 {
            tracing::debug!(
                "{} closed after {} of {} body bytes",
                url,
                out.len(),
                content_length
            );
            break;
        }
        let wanted = (content_length - out.len()).min(n);
        out.extend(&chunk[..wanted]);
    }

    // The body is complete; a failed close changes nothing for the caller.
    let _ = stream.shutdown().await;

    Ok(())
}
