use crate::http::FetchError;
use crate::slice::Slice;

/// Append-only buffer receiving a response body.
#[derive(Debug, Default, Clone)]
pub struct ResponseBuffer {
    bytes: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the buffer, keeping its capacity.
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Offset of the `\r\n\r\n` that ends the response head.
pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    Slice::new(buf).find(b"\r\n\r\n")
}

/// `HTTP/<version> <code> <reason>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine<'a> {
    pub version: Slice<'a>,
    pub code: u16,
    pub reason: Slice<'a>,
}

impl<'a> StatusLine<'a> {
    pub fn parse(line: Slice<'a>) -> Result<StatusLine<'a>, FetchError> {
        let malformed = || FetchError::MalformedStatusLine(line.to_string());

        let parts = line.trimmed().split(" ", 2);
        let (version, code, reason) = match parts.as_slice() {
            [version, code, reason] => (*version, *code, reason.trimmed()),
            [version, code] => (*version, *code, Slice::default()),
            _ => return Err(malformed()),
        };

        if !version.starts_with("HTTP/") || code.len() != 3 {
            return Err(malformed());
        }
        let code = u16::try_from(code.parse_int()).map_err(|_| malformed())?;
        if code < 100 {
            return Err(malformed());
        }

        Ok(StatusLine {
            version,
            code,
            reason,
        })
    }
}

/// Status line plus the one header the client cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHead<'a> {
    pub status: StatusLine<'a>,
    /// `Content-Length`, if present and non-zero.
    pub content_length: Option<usize>,
}

impl<'a> ResponseHead<'a> {
    /// Parse everything before the blank line.
    ///
    /// The `Content-Length` key is matched exactly (after trimming) and its
    /// value read with the lenient integer parser, so junk reads as absent.
    pub fn parse(head: &'a [u8]) -> Result<ResponseHead<'a>, FetchError> {
        let lines = Slice::new(head).split("\r\n", 0);
        let (status_line, headers) = lines
            .split_first()
            .ok_or_else(|| FetchError::MalformedStatusLine(String::new()))?;
        let status = StatusLine::parse(*status_line)?;

        let content_length = headers
            .iter()
            .filter_map(|line| match line.split(":", 1).as_slice() {
                [key, value] if key.trimmed().equals("Content-Length") => {
                    Some(value.trimmed().parse_int())
                }
                _ => None,
            })
            .next()
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| n > 0);

        Ok(ResponseHead {
            status,
            content_length,
        })
    }
}
