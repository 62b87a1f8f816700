//! Request middleware and authentication extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`locale::redirect_to_locale`] -- Locale prefix redirects for page routes.

pub mod auth;
pub mod locale;
pub mod rbac;
