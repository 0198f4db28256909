//! Minimal HTTP/1.1 server codec
//!
//! Requests are parsed in place from the receive buffer; only the request
//! line is interpreted. Responses are built into fixed-capacity buffers
//! and always close the connection.

pub mod request;
pub mod response;

pub use request::{head_complete, parse_request, Method, Request, MAX_ARGS};
pub use response::{clip, Response, Status, MAX_BODY_SIZE, MAX_EXTRA_HEADERS};

/// Errors that can occur during HTTP parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Request line not terminated yet
    Incomplete,
    /// Request line is not valid HTTP
    Malformed,
    /// Too many extra headers on a response
    TooManyHeaders,
    /// Response body exceeds `MAX_BODY_SIZE`
    BodyTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}
