//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (tracking, deadlines, HTTP/1.1 serving)
//!     → Hand off to the axum router
//! ```
//!
//! # Design Decisions
//! - Bounded accept prevents resource exhaustion
//! - Each connection tracked for graceful shutdown
//! - Header-read and lifetime deadlines stop slow clients holding slots

pub mod connection;
pub mod listener;

pub use connection::{serve_connection, ConnectionSettings, ConnectionTracker};
pub use listener::{Listener, ListenerError};
