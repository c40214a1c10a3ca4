//! HTTP/1.0 static file server with connection admission control.

pub mod admission;
pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use admission::{AdmissionController, AdmissionDecision, ClientKey};
pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
