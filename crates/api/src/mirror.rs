//! Mirror-table maintenance shared by handlers and background tasks.
//!
//! The kernel owns job state and the identity provider owns users; the rows
//! written here are local copies. Writes that only refresh a copy log and
//! carry on when the database is unavailable.

use sharayeh_core::artifacts::JobArtifacts;
use sharayeh_core::error::CoreError;
use sharayeh_core::mirror_status::MirrorStatus;
use sharayeh_core::types::DbId;
use sharayeh_db::models::audit::CreateAuditLog;
use sharayeh_db::models::dubbing::{DubbingMirror, UpsertDubbingMirror};
use sharayeh_db::models::identity::{UpsertOrg, UpsertUserProfile};
use sharayeh_db::models::presentation::{PresentationMirror, UpsertPresentationMirror};
use sharayeh_db::repositories::{
    AuditLogRepo, DubbingMirrorRepo, OrgRepo, PresentationMirrorRepo, UserProfileRepo,
};
use sharayeh_db::DbPool;
use sharayeh_kernel::api::{KernelApi, Presentation};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

/// Language recorded when the kernel omits one and no earlier copy exists.
const UNDETERMINED_LANGUAGE: &str = "und";

/// Local ids a mirrored job is filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Owner {
    pub user_id: Option<DbId>,
    pub org_id: Option<DbId>,
}

/// Resolve the caller's local profile and org, refreshing both copies and
/// the membership between them. Parts that cannot be resolved (no email on
/// first sight, no org claim, database unavailable) are `None`.
pub async fn resolve_owner(pool: &DbPool, user: &AuthUser) -> Owner {
    let user_id = resolve_profile_id(pool, user).await;
    let org_id = match &user.org_id {
        Some(external_id) => resolve_org_id(pool, external_id, user.org_slug.as_deref()).await,
        None => None,
    };

    if let (Some(org_id), Some(profile_id)) = (org_id, user_id) {
        if let Err(e) = OrgRepo::upsert_member(pool, org_id, profile_id, &user.role).await {
            tracing::warn!(
                user_id = %user.user_id,
                org_id,
                error = %e,
                "Org membership write failed"
            );
        }
    }

    Owner { user_id, org_id }
}

async fn resolve_profile_id(pool: &DbPool, user: &AuthUser) -> Option<DbId> {
    let result = match &user.email {
        Some(email) => UserProfileRepo::upsert(
            pool,
            &UpsertUserProfile {
                external_id: user.user_id.clone(),
                email: email.clone(),
                display_name: None,
                locale: None,
                is_admin: user.is_admin(),
            },
        )
        .await
        .map(|p| Some(p.id)),
        None => UserProfileRepo::find_by_external_id(pool, &user.user_id)
            .await
            .map(|p| p.map(|p| p.id)),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(user_id = %user.user_id, error = %e, "Profile mirror unavailable");
        None
    })
}

async fn resolve_org_id(pool: &DbPool, external_id: &str, slug: Option<&str>) -> Option<DbId> {
    let input = UpsertOrg {
        external_id: external_id.to_string(),
        name: slug.unwrap_or(external_id).to_string(),
        slug: slug.map(str::to_string),
    };
    match OrgRepo::upsert(pool, &input).await {
        Ok(org) => Some(org.id),
        Err(e) => {
            tracing::warn!(org = %external_id, error = %e, "Org mirror unavailable");
            None
        }
    }
}

/// Reject callers who do not own a mirrored row. Admins and unowned rows pass.
pub async fn ensure_owner(pool: &DbPool, user: &AuthUser, owner: Option<DbId>) -> AppResult<()> {
    let Some(owner) = owner else {
        return Ok(());
    };
    if user.is_admin() {
        return Ok(());
    }
    let caller = UserProfileRepo::find_by_external_id(pool, &user.user_id).await?;
    if caller.is_some_and(|p| p.id == owner) {
        Ok(())
    } else {
        Err(CoreError::Forbidden("This job belongs to another user".into()).into())
    }
}

/// Append an audit entry. Failures are logged and swallowed.
pub async fn audit(
    pool: &DbPool,
    actor_id: Option<&str>,
    action: &str,
    entity_type: &str,
    entity_id: &str,
    details: serde_json::Value,
) {
    let entry = CreateAuditLog {
        actor_id: actor_id.map(str::to_string),
        action: action.to_string(),
        entity_type: Some(entity_type.to_string()),
        entity_id: Some(entity_id.to_string()),
        details_json: details,
    };
    if let Err(e) = AuditLogRepo::insert(pool, &entry).await {
        tracing::warn!(action, entity_id, error = %e, "Audit write failed");
    }
}

/// Canonical status for an artifacts response.
///
/// An explicit kernel status wins; otherwise ready artifacts count as
/// completed and anything else as running.
pub fn artifacts_status(artifacts: &JobArtifacts) -> MirrorStatus {
    match artifacts.status.as_deref().map(MirrorStatus::normalize) {
        Some(status) if status != MirrorStatus::Unknown => status,
        _ if artifacts.is_ready() => MirrorStatus::Completed,
        _ => MirrorStatus::Running,
    }
}

fn presentation_status(presentation: &Presentation) -> MirrorStatus {
    let has_export = [&presentation.pptx_url, &presentation.pdf_url]
        .iter()
        .any(|u| u.as_deref().is_some_and(|u| !u.is_empty()));
    match presentation.status.as_deref().map(MirrorStatus::normalize) {
        Some(status) if status != MirrorStatus::Unknown => status,
        _ if has_export => MirrorStatus::Completed,
        _ => MirrorStatus::Unknown,
    }
}

/// Copy artifact links for a job into its presentation mirror.
///
/// Owner ids left `None` keep whatever the row already stores.
pub async fn record_artifacts(
    pool: &DbPool,
    job_id: &str,
    plan_id: &str,
    owner: Owner,
    artifacts: &JobArtifacts,
) -> Result<PresentationMirror, sqlx::Error> {
    let input = UpsertPresentationMirror {
        plan_id: plan_id.to_string(),
        job_id: Some(job_id.to_string()),
        user_id: owner.user_id,
        org_id: owner.org_id,
        status: artifacts_status(artifacts).as_str().to_string(),
        slides_count: (!artifacts.slides.is_empty())
            .then(|| i32::try_from(artifacts.slides.len()).unwrap_or(i32::MAX)),
        pptx_url: artifacts.pptx_url.clone(),
        pdf_url: artifacts.pdf_url.clone(),
        html_url: artifacts.html_url.clone(),
        ..UpsertPresentationMirror::default()
    };
    PresentationMirrorRepo::upsert(pool, &input).await
}

/// Fetch a presentation from the kernel and copy it into the mirror.
pub async fn sync_presentation(
    pool: &DbPool,
    kernel: &KernelApi,
    plan_id: &str,
) -> AppResult<PresentationMirror> {
    let presentation = kernel.get_presentation(plan_id).await?;
    let status = presentation_status(&presentation);

    let input = UpsertPresentationMirror {
        plan_id: plan_id.to_string(),
        job_id: presentation.job_id,
        title: presentation.title,
        status: status.as_str().to_string(),
        language: presentation.language,
        slides_count: presentation.slides_count,
        pptx_url: presentation.pptx_url,
        pdf_url: presentation.pdf_url,
        html_url: presentation.html_url,
        ..UpsertPresentationMirror::default()
    };
    let mirror = PresentationMirrorRepo::upsert(pool, &input).await?;
    tracing::debug!(plan_id, status = %status, "Presentation mirror synced");
    Ok(mirror)
}

/// Fetch a dubbing job from the kernel and copy it into the mirror.
pub async fn sync_dubbing(
    pool: &DbPool,
    kernel: &KernelApi,
    job_id: &str,
) -> AppResult<DubbingMirror> {
    let job = kernel.get_dubbing_job(job_id).await?;
    let existing = DubbingMirrorRepo::find_by_job_id(pool, job_id).await?;

    let language = |reported: Option<String>, stored: Option<&str>| {
        reported
            .or_else(|| stored.map(str::to_string))
            .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string())
    };
    let status = MirrorStatus::normalize(job.status.as_deref().unwrap_or_default());

    let input = UpsertDubbingMirror {
        job_id: job_id.to_string(),
        source_language: language(
            job.source_language,
            existing.as_ref().map(|m| m.source_language.as_str()),
        ),
        target_language: language(
            job.target_language,
            existing.as_ref().map(|m| m.target_language.as_str()),
        ),
        status: status.as_str().to_string(),
        output_url: job.output_url,
        ..UpsertDubbingMirror::default()
    };
    let mirror = DubbingMirrorRepo::upsert(pool, &input).await?;
    tracing::debug!(job_id, status = %status, "Dubbing mirror synced");
    Ok(mirror)
}
