//! Process lifecycle: resolving config at startup, reacting to signals, and
//! coordinating the stop.
//!
//! ```text
//! startup.rs:   CLI flags + optional TOML file → validated MediatorConfig
//! signals.rs:   SIGINT / SIGTERM → shutdown_signal() resolves
//! shutdown.rs:  Shutdown::trigger() → server stops accepting, drains, returns
//! ```
//!
//! A bad config or a failed bind ends the process with a non-zero status.
//! Connections still open when the grace period ends are dropped.

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
