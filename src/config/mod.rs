//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional config file (loader.rs, TOML)
//!     → CLI overrides (cli.rs)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared by the listener and every connection task
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{read_config, ConfigError};
pub use schema::{
    ConnectionConfig, FilesConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    SecurityConfig, ServerConfig,
};
pub use validation::{validate_config, ValidationError};
