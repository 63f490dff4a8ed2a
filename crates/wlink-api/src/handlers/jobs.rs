//! Candidate-side job workflow handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use wlink_models::{Applicant, ApplicantStatus, JobAdId, MediaId, UserId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::validate_payload;
use crate::services::{BulkApplyOutcome, CurrentApplication, JobAdDetails};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    #[validate(length(min = 1, max = 5000))]
    pub cover_letter: String,
    pub resume: Option<String>,
}

#[derive(Serialize)]
pub struct ApplyResponse {
    pub applicant: Applicant,
}

/// Submit an application to one job ad.
pub async fn apply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<Json<ApplyResponse>> {
    validate_payload(&request)?;
    let applicant = state
        .applications
        .apply(
            &user.id,
            &JobAdId::from_string(job_id),
            request.cover_letter,
            request.resume.map(MediaId::from_string),
        )
        .await?;
    Ok(Json(ApplyResponse { applicant }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkApplyRequest {
    #[validate(length(min = 1, max = 50))]
    pub job_ids: Vec<String>,
    #[validate(length(min = 1, max = 5000))]
    pub cover_letter: String,
    pub resume: Option<String>,
}

#[derive(Serialize)]
pub struct BulkApplyResponse {
    pub results: Vec<BulkApplyOutcome>,
}

/// Apply the same cover letter and resume to several job ads.
pub async fn bulk_apply(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<BulkApplyRequest>,
) -> ApiResult<Json<BulkApplyResponse>> {
    validate_payload(&request)?;
    let job_ids: Vec<JobAdId> = request
        .job_ids
        .iter()
        .map(|id| JobAdId::from_string(id.clone()))
        .collect();
    let results = state
        .applications
        .bulk_apply(
            &user.id,
            &job_ids,
            &request.cover_letter,
            request.resume.map(MediaId::from_string),
        )
        .await?;
    Ok(Json(BulkApplyResponse { results }))
}

#[derive(Serialize)]
pub struct WithdrawResponse {
    pub status: String,
}

/// Withdraw an application.
pub async fn withdraw(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<WithdrawResponse>> {
    state
        .applications
        .withdraw(&user.id, &JobAdId::from_string(job_id))
        .await?;
    Ok(Json(WithdrawResponse {
        status: "withdrawn".to_string(),
    }))
}

#[derive(Serialize)]
pub struct ToggleSaveResponse {
    pub saved: bool,
}

/// Flip the job's presence in the caller's saved list.
pub async fn toggle_save(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ToggleSaveResponse>> {
    let saved = state
        .applications
        .toggle_save(&user.id, &JobAdId::from_string(job_id))
        .await?;
    Ok(Json(ToggleSaveResponse { saved }))
}

/// Job ad details with the applicant list as visible to the caller.
pub async fn job_details(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobAdDetails>> {
    let details = state
        .applications
        .job_details(&user.id, &JobAdId::from_string(job_id))
        .await?;
    Ok(Json(details))
}

#[derive(Serialize)]
pub struct CurrentApplicationsResponse {
    pub applications: Vec<CurrentApplication>,
}

async fn current_by_status(
    state: AppState,
    caller: AuthUser,
    path_user: String,
    status: ApplicantStatus,
) -> ApiResult<Json<CurrentApplicationsResponse>> {
    // The token decides whose applications are visible
    if caller.id != UserId::from_string(path_user) {
        return Err(ApiError::forbidden("Cannot read another user's applications"));
    }

    let applications = state
        .applications
        .current_applications(&caller.id, status)
        .await?;
    Ok(Json(CurrentApplicationsResponse { applications }))
}

/// `GET /jobs/current/:user_id/pending`
pub async fn current_pending(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path_user): Path<String>,
) -> ApiResult<Json<CurrentApplicationsResponse>> {
    current_by_status(state, user, path_user, ApplicantStatus::Pending).await
}

/// `GET /jobs/current/:user_id/shortlisted`
pub async fn current_shortlisted(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path_user): Path<String>,
) -> ApiResult<Json<CurrentApplicationsResponse>> {
    current_by_status(state, user, path_user, ApplicantStatus::Shortlisted).await
}

/// `GET /jobs/current/:user_id/selected`
pub async fn current_selected(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path_user): Path<String>,
) -> ApiResult<Json<CurrentApplicationsResponse>> {
    current_by_status(state, user, path_user, ApplicantStatus::Selected).await
}

/// `GET /jobs/current/:user_id/rejected`
pub async fn current_rejected(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path_user): Path<String>,
) -> ApiResult<Json<CurrentApplicationsResponse>> {
    current_by_status(state, user, path_user, ApplicantStatus::Rejected).await
}
