//! Request parsing.
//!
//! # Responsibilities
//! - Split the request line into method and path
//! - Extract the User-Agent header
//! - Extract the `session_id` value from Cookie headers
//!
//! # Design Decisions
//! - Works on the bytes of one read; no incremental parsing
//! - Header names are matched case-insensitively
//! - Invalid UTF-8 is replaced rather than rejected

use crate::security::SESSION_COOKIE;

/// The parts of an HTTP/1.0 request the server acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
}

impl Request {
    /// Parse raw request bytes. Returns `None` when the request line lacks a
    /// method or path.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(raw);
        let mut lines = text.lines();

        let mut request_line = lines.next()?.split_whitespace();
        let method = request_line.next()?.to_string();
        let path = request_line.next()?.to_string();

        let mut user_agent = None;
        let mut session_id = None;

        for line in lines.take_while(|line| !line.is_empty()) {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();

            if user_agent.is_none() && name.eq_ignore_ascii_case("user-agent") {
                user_agent = Some(value.to_string());
            } else if session_id.is_none() && name.eq_ignore_ascii_case("cookie") {
                session_id = cookie_value(value, SESSION_COOKIE).map(str::to_string);
            }
        }

        Some(Self {
            method,
            path,
            user_agent,
            session_id,
        })
    }
}

/// Find `name` in a `Cookie` header value (`a=1; b=2`).
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}
