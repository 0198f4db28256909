//! Request-line parsing

use heapless::Vec;

use super::HttpError;

/// Maximum query arguments kept per request
pub const MAX_ARGS: usize = 8;

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Other,
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Other => "OTHER",
        }
    }
}

/// A parsed request line, borrowing from the receive buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    /// Path without the query string
    pub path: &'a str,
    /// Raw query string, if any
    pub query: Option<&'a str>,
    /// First `MAX_ARGS` query arguments in order of appearance
    pub args: Vec<(&'a str, &'a str), MAX_ARGS>,
    /// Arguments present in the query, including any past `MAX_ARGS`
    pub arg_count: usize,
}

impl<'a> Request<'a> {
    /// Look up a query argument by name
    pub fn arg(&self, name: &str) -> Option<&'a str> {
        self.args
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

/// Check whether `bytes` holds a complete request head
pub fn head_complete(bytes: &[u8]) -> bool {
    bytes.windows(4).any(|w| w == b"\r\n\r\n")
}

/// Parse the request line at the start of `bytes`
///
/// Headers are not interpreted. Query arguments are split on `&` and `=`
/// without percent-decoding; arguments past `MAX_ARGS` are counted but not
/// kept.
pub fn parse_request(bytes: &[u8]) -> Result<Request<'_>, HttpError> {
    let line_end = bytes
        .windows(2)
        .position(|w| w == b"\r\n")
        .ok_or(HttpError::Incomplete)?;
    let line = core::str::from_utf8(&bytes[..line_end]).map_err(|_| HttpError::Malformed)?;

    let mut parts = line.split(' ');
    let method = parts.next().filter(|m| !m.is_empty()).ok_or(HttpError::Malformed)?;
    let target = parts.next().ok_or(HttpError::Malformed)?;
    let version = parts.next().ok_or(HttpError::Malformed)?;
    if parts.next().is_some() || !version.starts_with("HTTP/1.") || !target.starts_with('/') {
        return Err(HttpError::Malformed);
    }

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let mut args = Vec::new();
    let mut arg_count = 0;
    if let Some(query) = query {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let _ = args.push(pair.split_once('=').unwrap_or((pair, "")));
            arg_count += 1;
        }
    }

    Ok(Request {
        method: Method::parse(method),
        path,
        query,
        args,
        arg_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root() {
        let req = parse_request(b"GET / HTTP/1.1\r\nHost: thot0x9\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/");
        assert_eq!(req.query, None);
        assert!(req.args.is_empty());
        assert_eq!(req.arg_count, 0);
    }

    #[test]
    fn test_parse_query_args() {
        let req = parse_request(b"POST /foo?a=1&flag&b=two HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/foo");
        assert_eq!(req.query, Some("a=1&flag&b=two"));
        assert_eq!(&req.args[..], &[("a", "1"), ("flag", ""), ("b", "two")]);
        assert_eq!(req.arg_count, 3);
        assert_eq!(req.arg("b"), Some("two"));
        assert_eq!(req.arg("c"), None);
    }

    #[test]
    fn test_unknown_method() {
        let req = parse_request(b"PATCH /x HTTP/1.1\r\n").unwrap();
        assert_eq!(req.method, Method::Other);
        assert_eq!(req.method.as_str(), "OTHER");
    }

    #[test]
    fn test_incomplete() {
        assert_eq!(parse_request(b"GET / HTTP/1.1"), Err(HttpError::Incomplete));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(parse_request(b"GET\r\n"), Err(HttpError::Malformed));
        assert_eq!(parse_request(b"GET / FTP/1.0\r\n"), Err(HttpError::Malformed));
        assert_eq!(parse_request(b"GET foo HTTP/1.1\r\n"), Err(HttpError::Malformed));
        assert_eq!(parse_request(b" / HTTP/1.1\r\n"), Err(HttpError::Malformed));
        assert_eq!(parse_request(b"GET /\xFF HTTP/1.1\r\n"), Err(HttpError::Malformed));
    }

    #[test]
    fn test_extra_args_are_counted_not_kept() {
        let req = parse_request(b"GET /foo?a&b&c&d&e&f&g&h&i=9 HTTP/1.1\r\n").unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/foo");
        assert_eq!(req.args.len(), MAX_ARGS);
        assert_eq!(req.arg_count, 9);
        assert_eq!(req.args[0], ("a", ""));
        assert_eq!(req.arg("i"), None);
    }

    #[test]
    fn test_head_complete() {
        assert!(!head_complete(b"GET / HTTP/1.1\r\nHost: x\r\n"));
        assert!(head_complete(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"));
    }
}
