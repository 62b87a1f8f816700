//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Mirror writes are upserts keyed
//! on the external identifier.

pub mod audit_repo;
pub mod dubbing_mirror_repo;
pub mod org_repo;
pub mod presentation_mirror_repo;
pub mod user_profile_repo;

pub use audit_repo::AuditLogRepo;
pub use dubbing_mirror_repo::DubbingMirrorRepo;
pub use org_repo::OrgRepo;
pub use presentation_mirror_repo::PresentationMirrorRepo;
pub use user_profile_repo::UserProfileRepo;

/// Filter and page for mirror listings.
#[derive(Debug, Clone, Default)]
pub struct MirrorListQuery {
    pub user_id: Option<sharayeh_core::types::DbId>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Default and maximum page sizes for mirror and audit listings.
pub const DEFAULT_LIST_LIMIT: i64 = 25;
pub const MAX_LIST_LIMIT: i64 = 200;
