//! Client identity from the `session_id` cookie.
//!
//! Tokens presented by the peer are trusted as-is: no validation, expiry
//! or signing. New tokens are random v4 UUIDs.

use uuid::Uuid;

use crate::admission::ClientKey;

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// The client a connection is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub key: ClientKey,
    /// True when the key was minted for this connection and must be sent
    /// back in a `Set-Cookie` header.
    pub issued: bool,
}

impl ClientIdentity {
    /// Resolve the identity from an optional session token.
    pub fn resolve(session_token: Option<&str>) -> Self {
        match session_token.map(str::trim).filter(|token| !token.is_empty()) {
            Some(token) => Self {
                key: ClientKey::new(token),
                issued: false,
            },
            None => Self::issue(),
        }
    }

    /// Mint a fresh identity.
    pub fn issue() -> Self {
        Self {
            key: ClientKey::new(Uuid::new_v4().simple().to_string()),
            issued: true,
        }
    }

    /// `Set-Cookie` value for a newly issued identity, `None` otherwise.
    pub fn set_cookie(&self) -> Option<String> {
        self.issued
            .then(|| format!("{SESSION_COOKIE}={}; HttpOnly", self.key))
    }
}
