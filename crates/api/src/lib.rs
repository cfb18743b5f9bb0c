//! HTTP API layer for votings-rs.
//!
//! - **Endpoints**: votings, complaints, profiles and account routes
//! - **Extractors**: authenticated principal
//! - **Middleware**: bearer token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
