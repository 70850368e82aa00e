//! Zero-copy views over feed and response bytes.

use std::fmt;

/// A borrowed view into a byte buffer. Trimming narrows the view in place.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Slice<'a> {
    bytes: &'a [u8],
}

impl<'a> Slice<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Slice { bytes }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lossy text form, for logging and for copying into owned storage.
    pub fn to_str_lossy(&self) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }

    /// Sub-view of `len` bytes at `start`; empty when out of range.
    pub fn sub(&self, start: usize, len: usize) -> Slice<'a> {
        let bytes = self.bytes.get(start..start + len).unwrap_or_default();
        Slice { bytes }
    }

    /// Split on non-overlapping occurrences of `sep`.
    ///
    /// With `limit > 0`, scanning stops after `limit` segments and the rest of
    /// the input is appended whole, so `split(":", 1)` on `KEY:A:B` yields
    /// `KEY` and `A:B`. An empty view yields nothing.
    pub fn split(&self, sep: &str, limit: usize) -> Vec<Slice<'a>> {
        let mut out = Vec::new();
        if self.bytes.is_empty() {
            return out;
        }

        let sep = sep.as_bytes();
        let mut start = 0;
        let mut i = 0;
        while !sep.is_empty() && i < self.bytes.len() && (limit == 0 || out.len() < limit) {
            if self.bytes[i..].starts_with(sep) {
                out.push(Slice::new(&self.bytes[start..i]));
                i += sep.len();
                start = i;
            } else {
                i += 1;
            }
        }
        out.push(Slice::new(&self.bytes[start..]));
        out
    }

    /// Position of the first occurrence of `needle`.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        self.bytes.windows(needle.len()).position(|w| w == needle)
    }

    pub fn trim_start(&mut self) {
        while let [first, rest @ ..] = self.bytes {
            if !first.is_ascii_whitespace() {
                break;
            }
            self.bytes = rest;
        }
    }

    pub fn trim_end(&mut self) {
        while let [rest @ .., last] = self.bytes {
            if !last.is_ascii_whitespace() {
                break;
            }
            self.bytes = rest;
        }
    }

    pub fn trim(&mut self) {
        self.trim_start();
        self.trim_end();
    }

    /// Trimmed copy of the view.
    pub fn trimmed(mut self) -> Slice<'a> {
        self.trim();
        self
    }

    /// Exact byte comparison. An empty view only equals an empty literal.
    pub fn equals(&self, literal: &str) -> bool {
        self.bytes.len() == literal.len() && self.bytes == literal.as_bytes()
    }

    pub fn starts_with(&self, literal: &str) -> bool {
        literal.len() <= self.bytes.len() && self.bytes.starts_with(literal.as_bytes())
    }

    /// Parse an optional leading `-` followed by ASCII digits.
    ///
    /// Any other byte makes the whole value 0, as does an empty view or a
    /// value that does not fit in an `i64`. Callers rely on this to read
    /// fixed-width date fields without a separate validation step.
    pub fn parse_int(&self) -> i64 {
        let (sign, digits) = match self.bytes {
            [b'-', rest @ ..] => (-1, rest),
            _ => (1, self.bytes),
        };

        let mut n: i64 = 0;
        for &b in digits {
            if !b.is_ascii_digit() {
                return 0;
            }
            n = match n.checked_mul(10).and_then(|n| n.checked_add(i64::from(b - b'0'))) {
                Some(n) => n,
                None => return 0,
            };
        }
        n * sign
    }
}

impl<'a> From<&'a str> for Slice<'a> {
    fn from(s: &'a str) -> Self {
        Slice::new(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Slice<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Slice::new(bytes)
    }
}

impl fmt::Debug for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str_lossy())
    }
}

impl fmt::Display for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}
