//! HTTP/1.0 static file server with connection admission control.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────────┐
//!                 │                    admission-httpd                        │
//!                 │                                                          │
//!   TCP accept    │  ┌──────────┐   ┌──────────────┐   ┌──────────────────┐  │
//!   ──────────────┼─▶│   net    │──▶│  admission   │──▶│ spawn connection │  │
//!                 │  │ listener │   │ global slot  │   │      task        │  │
//!                 │  └──────────┘   │ (waits)      │   └────────┬─────────┘  │
//!                 │                 └──────────────┘            │            │
//!                 │                                             ▼            │
//!                 │  ┌──────────┐   ┌──────────────┐   ┌──────────────────┐  │
//!                 │  │ session  │◀──│ http request │◀──│   read request   │  │
//!                 │  │ identity │   │    parser    │   └──────────────────┘  │
//!                 │  └────┬─────┘   └──────────────┘                         │
//!                 │       ▼                                                  │
//!                 │  ┌──────────────┐   ┌──────────┐   ┌──────────────────┐  │
//!   HTTP/1.0      │  │  admission   │──▶│ UA block │──▶│  document root   │  │
//!   ◀─────────────┼──│ per-client   │   │   list   │   │  200 / 404       │  │
//!   response      │  │ (429)        │   │ (403)    │   └──────────────────┘  │
//!                 │  └──────────────┘   └──────────┘                         │
//!                 └──────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use admission_httpd::cli::Cli;
use admission_httpd::lifecycle::startup;
use admission_httpd::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);

    tracing::info!("admission-httpd v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.listener.port,
        max_per_client = config.limits.max_per_client,
        max_total = config.limits.max_total,
        document_root = %config.files.document_root.display(),
        "Configuration loaded"
    );

    match startup::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
