//! HTTP endpoint trait

use chroma_protocol::{HttpError, Response};

/// Errors that can occur while serving a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServeError {
    /// Client went away or the socket failed
    Io,
    /// Client did not send a full request head in time
    Timeout,
    /// Response could not be encoded
    Http(HttpError),
}

impl From<HttpError> for ServeError {
    fn from(e: HttpError) -> Self {
        ServeError::Http(e)
    }
}

/// A listening socket that answers one request at a time
#[allow(async_fn_in_trait)]
pub trait HttpEndpoint {
    /// Answer at most one pending request
    ///
    /// Hands the raw request head to `respond` and sends back whatever it
    /// returns. Returns `Ok(false)` when no client was waiting.
    async fn serve<F>(&mut self, respond: F) -> Result<bool, ServeError>
    where
        F: FnOnce(&[u8]) -> Response;
}
