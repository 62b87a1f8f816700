//! Workbench handlers: forward user work to the Agentic Kernel.
//!
//! Each submission is validated locally first, then forwarded. On success
//! the matching mirror row and an audit entry are written; those writes are
//! best-effort and never fail a request the kernel accepted.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use sharayeh_core::artifacts::{extract_ids, JobArtifacts};
use sharayeh_core::mirror_status::MirrorStatus;
use sharayeh_core::validation::{DubbingRequest, SlidesGenerateRequest, UploadConstraints};
use sharayeh_db::models::audit::actions;
use sharayeh_db::models::dubbing::UpsertDubbingMirror;
use sharayeh_db::models::presentation::UpsertPresentationMirror;
use sharayeh_db::repositories::{DubbingMirrorRepo, PresentationMirrorRepo};

use crate::background::job_tracker;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::mirror;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest mirror title derived from a prompt.
const TITLE_MAX_CHARS: usize = 80;

#[derive(Debug, Serialize)]
pub struct CreatedJobView {
    pub job_id: String,
    pub plan_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArtifactsView {
    pub artifacts: JobArtifacts,
    pub ready: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadView {
    pub upload_id: String,
    pub file_name: String,
    pub size_bytes: u64,
}

fn title_from_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();
    match trimmed.char_indices().nth(TITLE_MAX_CHARS) {
        Some((idx, _)) => format!("{}…", trimmed[..idx].trim_end()),
        None => trimmed.to_string(),
    }
}

/// POST /api/v1/workbench/slides
pub async fn create_slides(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<SlidesGenerateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedJobView>>)> {
    let created = state.kernel.create_slides_job(&input).await?;
    tracing::info!(
        job_id = %created.job_id,
        plan_id = ?created.plan_id,
        user_id = %user.user_id,
        "Slides job submitted"
    );

    let owner = mirror::resolve_owner(&state.pool, &user).await;

    if let Some(plan_id) = &created.plan_id {
        let row = UpsertPresentationMirror {
            plan_id: plan_id.clone(),
            job_id: Some(created.job_id.clone()),
            user_id: owner.user_id,
            org_id: owner.org_id,
            title: Some(title_from_prompt(&input.prompt)),
            status: MirrorStatus::Queued.as_str().to_string(),
            language: Some(input.language.clone()),
            slides_count: i32::try_from(input.slides_count).ok(),
            ..UpsertPresentationMirror::default()
        };
        if let Err(e) = PresentationMirrorRepo::upsert(&state.pool, &row).await {
            tracing::warn!(plan_id = %plan_id, error = %e, "Presentation mirror write failed");
        }
    }

    mirror::audit(
        &state.pool,
        Some(&user.user_id),
        actions::SLIDES_JOB_CREATED,
        "slides_job",
        &created.job_id,
        json!({
            "plan_id": created.plan_id,
            "slides_count": input.slides_count,
            "language": input.language,
        }),
    )
    .await;

    job_tracker::spawn(&state, created.job_id.clone(), created.plan_id.clone(), owner);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedJobView {
                job_id: created.job_id,
                plan_id: created.plan_id,
            },
        }),
    ))
}

/// GET /api/v1/workbench/jobs/{job_id}/artifacts
///
/// Only the owner of a mirrored job (or an admin) may read it. Jobs with no
/// mirror row are not attributed to anyone and stay readable.
pub async fn job_artifacts(
    user: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<DataResponse<ArtifactsView>>> {
    let existing = PresentationMirrorRepo::find_by_job_id(&state.pool, &job_id).await?;
    mirror::ensure_owner(&state.pool, &user, existing.as_ref().and_then(|m| m.user_id)).await?;

    let mut artifacts = state.kernel.get_artifacts(&job_id).await?;
    artifacts.fill_from_log(&extract_ids(&artifacts.logs.join("\n")));
    let ready = artifacts.is_ready();

    let plan_id = artifacts
        .plan_id
        .clone()
        .or_else(|| existing.map(|m| m.plan_id));

    if let Some(plan_id) = plan_id {
        let owner = mirror::Owner::default();
        if let Err(e) =
            mirror::record_artifacts(&state.pool, &job_id, &plan_id, owner, &artifacts).await
        {
            tracing::warn!(job_id = %job_id, error = %e, "Presentation mirror write failed");
        }
    }

    Ok(Json(DataResponse {
        data: ArtifactsView { artifacts, ready },
    }))
}

/// POST /api/v1/workbench/uploads (multipart, field `file`)
pub async fn upload(
    user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadView>>)> {
    let site = &state.config.site;
    if !site.feature_uploads {
        return Err(AppError::FeatureDisabled("uploads"));
    }
    let constraints = UploadConstraints::from_megabytes(site.max_upload_mb);

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("The file part must have a file name".into()))?;
        let content_type = field.content_type().map(str::to_string);

        // Reject a disallowed type before reading the body.
        constraints.check(&file_name, 1)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            bytes.extend_from_slice(&chunk);
            if bytes.len() as u64 > constraints.max_bytes {
                break;
            }
        }
        let size_bytes = bytes.len() as u64;
        constraints.check(&file_name, size_bytes)?;

        let uploaded = state
            .kernel
            .upload(&file_name, content_type.as_deref(), bytes)
            .await?;
        tracing::info!(upload_id = %uploaded.upload_id, size_bytes, "Upload forwarded");

        mirror::audit(
            &state.pool,
            Some(&user.user_id),
            actions::UPLOAD_FORWARDED,
            "upload",
            &uploaded.upload_id,
            json!({ "file_name": file_name, "size_bytes": size_bytes }),
        )
        .await;

        return Ok((
            StatusCode::CREATED,
            Json(DataResponse {
                data: UploadView {
                    upload_id: uploaded.upload_id,
                    file_name,
                    size_bytes,
                },
            }),
        ));
    }

    Err(AppError::BadRequest(
        "Multipart field 'file' is required".into(),
    ))
}

/// POST /api/v1/workbench/dubbing
pub async fn create_dubbing(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<DubbingRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedJobView>>)> {
    if !state.config.site.feature_dubbing {
        return Err(AppError::FeatureDisabled("dubbing"));
    }

    let created = state.kernel.create_dubbing_job(&input).await?;
    tracing::info!(job_id = %created.job_id, user_id = %user.user_id, "Dubbing job submitted");

    let owner = mirror::resolve_owner(&state.pool, &user).await;
    let row = UpsertDubbingMirror {
        job_id: created.job_id.clone(),
        user_id: owner.user_id,
        org_id: owner.org_id,
        source_language: input.source_language.clone(),
        target_language: input.target_language.clone(),
        status: MirrorStatus::Queued.as_str().to_string(),
        ..UpsertDubbingMirror::default()
    };
    if let Err(e) = DubbingMirrorRepo::upsert(&state.pool, &row).await {
        tracing::warn!(job_id = %created.job_id, error = %e, "Dubbing mirror write failed");
    }

    mirror::audit(
        &state.pool,
        Some(&user.user_id),
        actions::DUBBING_JOB_CREATED,
        "dubbing_job",
        &created.job_id,
        json!({
            "source_language": input.source_language,
            "target_language": input.target_language,
        }),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedJobView {
                job_id: created.job_id,
                plan_id: None,
            },
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_prompt_is_kept_as_title() {
        assert_eq!(title_from_prompt("  Solar energy 101 "), "Solar energy 101");
    }

    #[test]
    fn long_prompt_is_cut_on_a_char_boundary() {
        let prompt = "ب".repeat(200);
        let title = title_from_prompt(&prompt);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 1);
        assert!(title.ends_with('…'));
    }
}
