//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! net::connection (HTTP/1.1 on an accepted stream)
//!     → server.rs (router + middleware stack)
//!     → request.rs (request ID assigned and echoed)
//!     → handlers.rs (POST /mediate, GET /health)
//!     → error.rs (failures mapped to status + body)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use error::MediationError;
pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, MediatorServer, ServerError};
