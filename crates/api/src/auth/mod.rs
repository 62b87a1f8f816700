//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token validation. Tokens are issued by the
//!   external identity provider; this service only verifies them.

pub mod jwt;
