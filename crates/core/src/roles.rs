//! Role names carried in admin bearer tokens and `org_members.role`.

pub const ROLE_ADMIN: &str = "admin";
