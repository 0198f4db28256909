//! Response bodies

use core::fmt::{self, Write};

use chroma_protocol::http::{clip, MAX_BODY_SIZE};
use chroma_protocol::{HttpError, Request, Response, Status};

use crate::state::StatusSnapshot;

/// Longest URI echoed on the 404 page, leaving room for the remaining lines
const MAX_URI_ECHO: usize = MAX_BODY_SIZE - 128;

/// Escape HTML metacharacters while writing `text`
fn write_escaped<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' => out.write_str("&quot;")?,
            '\'' => out.write_str("&#39;")?,
            _ => out.write_char(ch)?,
        }
    }
    Ok(())
}

fn write_page<W: Write>(out: &mut W, snapshot: &StatusSnapshot) -> fmt::Result {
    out.write_str(
        "<html>\n<head>\n\
         <style>body{background-color: black; color: #ccc; font-family: Tahoma; font-size: 24px;}</style>\n\
         </head>\n<body>\nCheerlights Color: <font color=\"",
    )?;
    write_escaped(out, snapshot.color_code())?;
    out.write_str("\">")?;
    write_escaped(out, snapshot.color_name())?;
    out.write_str("</font>\n</body>\n</html>\n")
}

/// 200 page showing the current color, never cached
pub fn status_page(snapshot: &StatusSnapshot) -> Response {
    let mut response = Response::new(Status::Ok, "text/html");
    if write_page(response.body_mut(), snapshot).is_err() {
        #[cfg(feature = "defmt")]
        defmt::error!("Status page exceeds body capacity");

        return Response::text(Status::InternalServerError, "Internal Server Error\n");
    }

    let headers = [
        ("Cache-Control", "no-cache, no-store, must-revalidate"),
        ("Pragma", "no-cache"),
        ("Expires", "-1"),
    ];
    for (name, value) in headers {
        // Three headers always fit
        let _ = response.add_header(name, value);
    }
    response
}

/// 404 diagnostic echoing the request back
///
/// Long URIs are cut short; argument lines that no longer fit are left off.
pub fn not_found(request: &Request<'_>) -> Response {
    let mut response = Response::new(Status::NotFound, "text/plain");
    let body = response.body_mut();
    let _ = write!(
        body,
        "File Not Found\n\nURI: {}\nMethod: {}\nArguments: {}\n",
        clip(request.path, MAX_URI_ECHO),
        request.method.as_str(),
        request.arg_count
    );
    for (name, value) in request.args.iter() {
        // " name: value\n"
        let line = name.len() + value.len() + 4;
        if body.len() + line > body.capacity() {
            break;
        }
        let _ = write!(body, " {}: {}\n", name, value);
    }
    response
}

/// 400 for requests that could not be parsed
pub fn bad_request(_error: HttpError) -> Response {
    #[cfg(feature = "defmt")]
    defmt::warn!("Bad HTTP request: {}", _error);

    Response::text(Status::BadRequest, "Bad Request\n")
}
