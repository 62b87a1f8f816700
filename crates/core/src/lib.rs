//! Pure domain logic for the Sharayeh backend.
//!
//! Nothing in this crate performs I/O. The HTTP server, database layer and
//! Agentic Kernel client all build on these types.

pub mod artifacts;
pub mod error;
pub mod locale;
pub mod mirror_status;
pub mod roles;
pub mod types;
pub mod validation;
