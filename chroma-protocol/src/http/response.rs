//! Response building and encoding

use core::fmt::{self, Write};

use heapless::{String, Vec};

use super::HttpError;

/// Maximum response body size
pub const MAX_BODY_SIZE: usize = 1024;

/// Maximum extra headers per response
pub const MAX_EXTRA_HEADERS: usize = 4;

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

/// A complete response with a fixed-capacity body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub content_type: &'static str,
    headers: Vec<(&'static str, &'static str), MAX_EXTRA_HEADERS>,
    body: String<MAX_BODY_SIZE>,
    /// Encode headers only, as the answer to a HEAD request
    head_only: bool,
}

/// Longest prefix of `text` no longer than `max` bytes, ending on a
/// character boundary
pub fn clip(text: &str, max: usize) -> &str {
    let mut end = text.len().min(max);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

impl Response {
    /// Create an empty response
    pub fn new(status: Status, content_type: &'static str) -> Self {
        Self {
            status,
            content_type,
            headers: Vec::new(),
            body: String::new(),
            head_only: false,
        }
    }

    /// Create a plain-text response with the given body
    ///
    /// Text past `MAX_BODY_SIZE` is cut at a character boundary.
    pub fn text(status: Status, text: &str) -> Self {
        let mut response = Self::new(status, "text/plain");
        let _ = response.body.push_str(clip(text, MAX_BODY_SIZE));
        response
    }

    /// Keep the headers but leave the body off the wire
    ///
    /// `Content-Length` still reports the body that a GET would carry.
    pub fn without_body(mut self) -> Self {
        self.head_only = true;
        self
    }

    pub fn is_head_only(&self) -> bool {
        self.head_only
    }

    /// Append to the body
    pub fn push_body(&mut self, text: &str) -> Result<(), HttpError> {
        self.body.push_str(text).map_err(|_| HttpError::BodyTooLarge)
    }

    /// Add an extra header
    pub fn add_header(&mut self, name: &'static str, value: &'static str) -> Result<(), HttpError> {
        self.headers
            .push((name, value))
            .map_err(|_| HttpError::TooManyHeaders)
    }

    /// Look up an extra header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&'static str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    /// Mutable access to the body, for `write!`
    pub fn body_mut(&mut self) -> &mut String<MAX_BODY_SIZE> {
        &mut self.body
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Encode status line, headers and body into `buffer`
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, HttpError> {
        let mut out = SliceWriter { buffer, pos: 0 };
        self.write_to(&mut out).map_err(|_| HttpError::BufferTooSmall)?;
        Ok(out.pos)
    }

    fn write_to(&self, out: &mut SliceWriter<'_>) -> fmt::Result {
        write!(
            out,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type,
            self.body.len()
        )?;
        for (name, value) in &self.headers {
            write!(out, "{}: {}\r\n", name, value)?;
        }
        out.write_str("Connection: close\r\n\r\n")?;
        if self.head_only {
            return Ok(());
        }
        out.write_str(&self.body)
    }
}

/// `fmt::Write` over a byte slice
struct SliceWriter<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos + s.len();
        if end > self.buffer.len() {
            return Err(fmt::Error);
        }
        self.buffer[self.pos..end].copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}
