//! Ad mediation endpoint library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod mediation;
pub mod net;
pub mod observability;

pub use config::MediatorConfig;
pub use http::MediatorServer;
pub use lifecycle::Shutdown;
