//! Per-connection request handling.
//!
//! # State Machine
//! ```text
//! Receiving ──(empty read)──────────────────────────────▶ Cleanup
//!     │
//!     ▼
//! Parsed ──(no method/path, oversized)──────────────────▶ Cleanup
//!     │
//!     ▼
//! Identity-Resolved
//!     │
//!     ▼
//! Admission-Checked ──(client at limit: 429)────────────▶ Cleanup
//!     │
//!     ▼
//! Serving ──(403 | 404 | 200)───────────────────────────▶ Cleanup
//! ```
//!
//! Cleanup drops the client permit (if admitted), closes the stream and
//! then returns the global slot. It runs on every path, including I/O
//! errors, because both resources are guards owned by this function.

use ::http::header::CONTENT_TYPE;
use ::http::StatusCode;
use std::io;
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::admission::{AdmissionController, AdmissionDecision, GlobalSlot};
use crate::config::ServerConfig;
use crate::http::files::{DocumentRoot, FileLookup};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::observability::metrics;
use crate::security::{ClientIdentity, UserAgentFilter};

/// Internal faults while handling a connection.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),

    #[error("failed to read file: {0}")]
    File(#[source] io::Error),
}

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Peer closed before sending anything.
    PeerClosed,
    /// Request line unusable or request too large; no response sent.
    Malformed,
    /// 429, client over its connection limit.
    RateLimited,
    /// 403, blocked User-Agent.
    Forbidden,
    /// 404.
    NotFound,
    /// 200 with file contents.
    Served,
    /// Internal error; response may be missing or partial.
    Failed,
}

impl ConnectionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionOutcome::PeerClosed => "peer_closed",
            ConnectionOutcome::Malformed => "malformed",
            ConnectionOutcome::RateLimited => "rate_limited",
            ConnectionOutcome::Forbidden => "forbidden",
            ConnectionOutcome::NotFound => "not_found",
            ConnectionOutcome::Served => "served",
            ConnectionOutcome::Failed => "failed",
        }
    }
}

/// Shared, read-only state for connection tasks.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub admission: AdmissionController,
    pub files: DocumentRoot,
    pub user_agents: UserAgentFilter,
    pub read_buffer_bytes: usize,
}

impl HandlerContext {
    pub fn from_config(config: &ServerConfig, admission: AdmissionController) -> Self {
        Self {
            admission,
            files: DocumentRoot::from_config(&config.files),
            user_agents: UserAgentFilter::new(&config.security.blocked_user_agents),
            read_buffer_bytes: config.connection.read_buffer_bytes,
        }
    }
}

/// Handle one connection from first read to close.
///
/// Consumes the global slot and always releases it before returning.
pub async fn handle_connection<S>(mut stream: S, ctx: &HandlerContext, slot: GlobalSlot) -> ConnectionOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start = Instant::now();

    let outcome = match serve(&mut stream, ctx).await {
        Ok(outcome) => {
            tracing::debug!(outcome = outcome.as_str(), "Connection finished");
            outcome
        }
        Err(e) => {
            tracing::error!(error = %e, "Error handling connection");
            ConnectionOutcome::Failed
        }
    };

    if let Err(e) = stream.shutdown().await {
        tracing::trace!(error = %e, "Shutdown after response failed");
    }
    drop(stream);
    slot.release();

    metrics::record_connection(outcome.as_str(), start);
    outcome
}

async fn serve<S>(stream: &mut S, ctx: &HandlerContext) -> Result<ConnectionOutcome, HandlerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; ctx.read_buffer_bytes];
    let n = stream.read(&mut buf).await.map_err(HandlerError::Read)?;
    if n == 0 {
        return Ok(ConnectionOutcome::PeerClosed);
    }
    if n == buf.len() {
        tracing::debug!(limit = buf.len(), "Request fills read buffer, dropping");
        return Ok(ConnectionOutcome::Malformed);
    }

    let raw = &buf[..n];
    tracing::debug!(request = %String::from_utf8_lossy(raw), "Incoming request");

    let Some(request) = Request::parse(raw) else {
        return Ok(ConnectionOutcome::Malformed);
    };

    let identity = ClientIdentity::resolve(request.session_id.as_deref());

    // Held until serve() returns, on success and on error alike.
    let _permit = match ctx.admission.try_admit_client(&identity.key) {
        AdmissionDecision::Admitted(permit) => permit,
        AdmissionDecision::Rejected { active } => {
            tracing::warn!(
                client = %identity.key,
                active,
                limit = ctx.admission.max_per_client(),
                "Per-client connection limit reached"
            );
            metrics::record_rejection("per_client_limit");
            let response = Response::error_page(StatusCode::TOO_MANY_REQUESTS).with_session(&identity);
            send(stream, response).await?;
            return Ok(ConnectionOutcome::RateLimited);
        }
    };

    let (response, outcome) = respond(&request, ctx).await?;
    send(stream, response.with_session(&identity)).await?;
    Ok(outcome)
}

async fn respond(request: &Request, ctx: &HandlerContext) -> Result<(Response, ConnectionOutcome), HandlerError> {
    if let Some(pattern) = ctx.user_agents.blocked_by(request.user_agent.as_deref()) {
        tracing::info!(
            user_agent = request.user_agent.as_deref().unwrap_or_default(),
            pattern,
            "Blocked user agent"
        );
        metrics::record_rejection("user_agent");
        return Ok((Response::error_page(StatusCode::FORBIDDEN), ConnectionOutcome::Forbidden));
    }

    match ctx.files.load(&request.path).await.map_err(HandlerError::File)? {
        FileLookup::Found {
            contents,
            content_type,
        } => {
            tracing::debug!(method = %request.method, path = %request.path, bytes = contents.len(), "Serving file");
            let response = Response::new(StatusCode::OK)
                .header(CONTENT_TYPE, content_type)
                .body(contents);
            Ok((response, ConnectionOutcome::Served))
        }
        FileLookup::NotFound => {
            tracing::debug!(method = %request.method, path = %request.path, "File not found");
            Ok((Response::error_page(StatusCode::NOT_FOUND), ConnectionOutcome::NotFound))
        }
    }
}

async fn send<S>(stream: &mut S, response: Response) -> Result<(), HandlerError>
where
    S: AsyncWrite + Unpin,
{
    stream
        .write_all(&response.into_bytes())
        .await
        .map_err(HandlerError::Write)?;
    stream.flush().await.map_err(HandlerError::Write)
}
