//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed request:
//!     → session.rs (cookie token → ClientKey, mint a new one if absent)
//!     → admission (per-client limit)
//!     → user_agent.rs (block-list check, 403 on match)
//!     → file service
//! ```
//!
//! # Design Decisions
//! - Session tokens are coordination keys, not credentials
//! - Block-list matching is case-insensitive substring matching

pub mod session;
pub mod user_agent;

pub use session::{ClientIdentity, SESSION_COOKIE};
pub use user_agent::UserAgentFilter;
