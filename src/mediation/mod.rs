//! Mediation domain.
//!
//! # Data Flow
//! ```text
//! POST /mediate body
//!     → AdRequest (decoded, `url` validated)
//!     → MediationResponse (canned, built once from config)
//! ```
//!
//! No ad network is contacted. The response does not depend on the request
//! content, only on whether the request is valid.

pub mod types;

pub use types::{AdRequest, MediationRequest, MediationResponse};
