//! HTTP/1.0 layer.
//!
//! # Data Flow
//! ```text
//! server.rs (accept loop, one task per connection)
//!     → handler.rs (read → parse → identify → admit → serve → release)
//!         → request.rs (request line, User-Agent, session cookie)
//!         → files.rs + content_type.rs (document root lookup)
//!         → response.rs (status line, headers, body)
//! ```
//!
//! # Design Decisions
//! - One request per connection; the connection closes after the response
//! - Malformed requests are dropped without a response

pub mod content_type;
pub mod files;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{handle_connection, ConnectionOutcome, HandlerContext, HandlerError};
pub use request::Request;
pub use response::Response;
pub use server::HttpServer;
