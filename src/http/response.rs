//! Response assembly.
//!
//! # Responsibilities
//! - Serialize status line, headers and body as HTTP/1.0 bytes
//! - Provide the canned HTML pages for 403, 404 and 429
//!
//! # Design Decisions
//! - Content-Length is always written; the connection closes after the body
//! - Header names are emitted in canonical capitalization

use ::http::header::{HeaderName, CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE};
use ::http::StatusCode;

use crate::security::ClientIdentity;

/// An HTTP/1.0 response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(HeaderName, String)>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Small HTML page naming the status, e.g. `404 Not Found`.
    pub fn error_page(status: StatusCode) -> Self {
        let title = format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );
        Self::new(status)
            .header(CONTENT_TYPE, "text/html")
            .body(format!("<html><body><h1>{title}</h1></body></html>"))
    }

    pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach `Set-Cookie` when the identity was minted for this connection.
    pub fn with_session(self, identity: &ClientIdentity) -> Self {
        match identity.set_cookie() {
            Some(cookie) => self.header(SET_COOKIE, cookie),
            None => self,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header_value(&self, name: &HeaderName) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Serialize to wire format.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.0 {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Unknown")
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", canonical_name(name), value));
        }
        head.push_str(&format!(
            "{}: {}\r\n\r\n",
            canonical_name(&CONTENT_LENGTH),
            self.body.len()
        ));

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// `content-type` → `Content-Type`.
fn canonical_name(name: &HeaderName) -> String {
    name.as_str()
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
