//! Status HTTP server

use chroma_protocol::{parse_request, Method, Response};

use crate::state::StatusSnapshot;
use crate::traits::HttpEndpoint;

use super::page::{bad_request, not_found, status_page};

/// Route a raw request head to its response
///
/// `/` serves the status page for any method; every other path gets the
/// 404 diagnostic. HEAD requests get the same headers without a body.
pub fn respond(raw: &[u8], snapshot: &StatusSnapshot) -> Response {
    let request = match parse_request(raw) {
        Ok(request) => request,
        Err(e) => return bad_request(e),
    };

    let response = if request.path == "/" {
        status_page(snapshot)
    } else {
        not_found(&request)
    };

    if request.method == Method::Head {
        response.without_body()
    } else {
        response
    }
}

/// Answers status requests from the snapshot
pub struct StatusHttpServer<E> {
    endpoint: E,
    served: u32,
}

impl<E: HttpEndpoint> StatusHttpServer<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            served: 0,
        }
    }

    /// Requests answered since boot
    pub fn served(&self) -> u32 {
        self.served
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Answer at most one pending request
    ///
    /// Returns whether a request was answered. Endpoint errors are logged
    /// and dropped; the client simply sees a closed connection.
    pub async fn poll(&mut self, snapshot: &StatusSnapshot) -> bool {
        match self.endpoint.serve(|raw| respond(raw, snapshot)).await {
            Ok(true) => {
                self.served = self.served.wrapping_add(1);

                #[cfg(feature = "defmt")]
                defmt::debug!("Served HTTP request #{}", self.served);

                true
            }
            Ok(false) => false,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("HTTP serve failed: {}", _e);

                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{ColorTopic, ColorUpdate};
    use crate::traits::ServeError;
    use chroma_protocol::Status;
    use embassy_futures::block_on;

    fn purple() -> StatusSnapshot {
        let mut snapshot = StatusSnapshot::new();
        snapshot.update_color(ColorUpdate {
            topic: ColorTopic::Name,
            value: b"purple",
        });
        snapshot.update_color(ColorUpdate {
            topic: ColorTopic::Code,
            value: b"#800080",
        });
        snapshot
    }

    #[test]
    fn test_root_serves_status_page() {
        let response = respond(b"GET / HTTP/1.1\r\nHost: thot0x9\r\n\r\n", &purple());

        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.content_type, "text/html");
        assert_eq!(
            response.header("Cache-Control"),
            Some("no-cache, no-store, must-revalidate")
        );
        assert_eq!(response.header("Pragma"), Some("no-cache"));
        assert_eq!(response.header("Expires"), Some("-1"));
        assert!(response.body().contains("<font color=\"#800080\">purple</font>"));
    }

    #[test]
    fn test_root_before_first_message() {
        let response = respond(b"GET / HTTP/1.1\r\n\r\n", &StatusSnapshot::new());
        assert_eq!(response.status, Status::Ok);
        assert!(response.body().contains("<font color=\"\"></font>"));
    }

    #[test]
    fn test_root_escapes_feed_content() {
        let mut snapshot = StatusSnapshot::new();
        snapshot.update_color(ColorUpdate {
            topic: ColorTopic::Name,
            value: b"<script>",
        });
        let response = respond(b"GET / HTTP/1.1\r\n\r\n", &snapshot);
        assert!(response.body().contains("&lt;script&gt;"));
        assert!(!response.body().contains("<script>"));
    }

    #[test]
    fn test_unknown_path_diagnostic() {
        let response = respond(b"GET /foo?a=1 HTTP/1.1\r\n\r\n", &purple());

        assert_eq!(response.status, Status::NotFound);
        assert_eq!(response.content_type, "text/plain");
        assert_eq!(
            response.body(),
            "File Not Found\n\nURI: /foo\nMethod: GET\nArguments: 1\n a: 1\n"
        );
    }

    #[test]
    fn test_root_ignores_extra_arguments() {
        let response = respond(
            b"GET /?a=1&b=2&c=3&d=4&e=5&f=6&g=7&h=8&i=9 HTTP/1.1\r\n\r\n",
            &purple(),
        );
        assert_eq!(response.status, Status::Ok);
        assert!(response.body().contains("purple"));
    }

    #[test]
    fn test_unknown_path_counts_every_argument() {
        let response = respond(
            b"GET /foo?a=1&b=2&c=3&d=4&e=5&f=6&g=7&h=8&i=9 HTTP/1.1\r\n\r\n",
            &purple(),
        );
        assert_eq!(response.status, Status::NotFound);
        assert!(response.body().contains("URI: /foo\n"));
        assert!(response.body().contains("Arguments: 9\n a: 1\n"));
        assert!(response.body().contains(" h: 8\n"));
        assert!(!response.body().contains(" i: 9"));
    }

    #[test]
    fn test_head_omits_body() {
        let response = respond(b"HEAD / HTTP/1.1\r\n\r\n", &purple());
        assert_eq!(response.status, Status::Ok);
        assert!(response.is_head_only());
        assert_eq!(response.header("Pragma"), Some("no-cache"));

        let mut buffer = [0u8; 2048];
        let len = response.encode(&mut buffer).unwrap();
        let text = core::str::from_utf8(&buffer[..len]).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
        assert!(!text.contains("<html>"));
    }

    #[test]
    fn test_head_to_unknown_path() {
        let response = respond(b"HEAD /foo HTTP/1.1\r\n\r\n", &purple());
        assert_eq!(response.status, Status::NotFound);
        assert!(response.is_head_only());
    }

    #[test]
    fn test_get_keeps_body() {
        let response = respond(b"GET / HTTP/1.1\r\n\r\n", &purple());
        assert!(!response.is_head_only());
    }

    #[test]
    fn test_post_to_unknown_path() {
        let response = respond(b"POST /update HTTP/1.1\r\n\r\n", &purple());
        assert_eq!(response.status, Status::NotFound);
        assert!(response.body().contains("Method: POST"));
        assert!(response.body().contains("Arguments: 0"));
    }

    #[test]
    fn test_malformed_request() {
        let response = respond(b"garbage\r\n\r\n", &purple());
        assert_eq!(response.status, Status::BadRequest);
    }

    /// Endpoint with a single queued request
    struct OneShot {
        request: Option<&'static [u8]>,
        last: Option<Response>,
    }

    impl HttpEndpoint for OneShot {
        async fn serve<F>(&mut self, respond: F) -> Result<bool, ServeError>
        where
            F: FnOnce(&[u8]) -> Response,
        {
            match self.request.take() {
                Some(raw) => {
                    self.last = Some(respond(raw));
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[test]
    fn test_poll_serves_once() {
        let mut server = StatusHttpServer::new(OneShot {
            request: Some(&b"GET / HTTP/1.1\r\n\r\n"[..]),
            last: None,
        });
        let snapshot = purple();

        assert!(block_on(server.poll(&snapshot)));
        assert!(!block_on(server.poll(&snapshot)));
        assert_eq!(server.served(), 1);

        let last = server.endpoint().last.as_ref().unwrap();
        assert_eq!(last.status, Status::Ok);
    }
}
