//! Core business logic for votings-rs.
//!
//! Every service takes the acting user's ID explicitly; authorization rules
//! (authorship, staff role) are enforced here rather than in the HTTP layer.

pub mod services;

pub use services::*;
