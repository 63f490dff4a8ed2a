//! Organization-side handlers: profile, hiring team, job ads,
//! applicant management.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use wlink_firestore::JobAdRepository;
use wlink_models::{
    new_entity_id, Applicant, ApplicantStatus, JobAd, JobAdId, JobAdStatus, OrgProject,
    OrganizationProfile, SocialLink, UserId,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::{validate_payload, StatusResponse};
use crate::services::{JobAdDetails, JobAdSummary, JobApplications};
use crate::state::AppState;

#[derive(Serialize)]
pub struct OrganizationResponse {
    pub profile: OrganizationProfile,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterOrganizationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// Create the employer profile for the calling account.
pub async fn register_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RegisterOrganizationRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    validate_payload(&request)?;
    let account = state.accounts.get(&user.id).await?;
    let profile = state
        .profiles
        .register_organization(&account, &request.name)
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

/// The caller's own organization profile.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<OrganizationResponse>> {
    let profile = state.profiles.require_organization(&user.id).await?;
    Ok(Json(OrganizationResponse { profile }))
}

#[derive(Debug, Deserialize)]
pub struct OrganizationUpdateRequest {
    pub name: Option<String>,
    pub about: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<OrganizationUpdateRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    if let Some(website) = &request.website {
        url::Url::parse(website)
            .map_err(|e| ApiError::bad_request(format!("Invalid URL '{}': {}", website, e)))?;
    }
    let profile = state
        .profiles
        .mutate_organization(&user.id, |org| {
            if let Some(name) = request.name {
                org.name = name;
            }
            if request.about.is_some() {
                org.about = request.about;
            }
            if request.website.is_some() {
                org.website = request.website;
            }
            if request.industry.is_some() {
                org.industry = request.industry;
            }
            Ok(())
        })
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

// ============================================================================
// Hiring team
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct TeamMemberRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub role: String,
}

pub async fn add_team_member(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<TeamMemberRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    validate_payload(&request)?;
    let (profile, _member) = state
        .profiles
        .add_team_member(&user.id, &request.email, &request.name, &request.role)
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct TeamMemberUpdateRequest {
    #[validate(length(min = 1))]
    pub role: String,
}

pub async fn update_team_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<TeamMemberUpdateRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    validate_payload(&request)?;
    let profile = state
        .profiles
        .mutate_organization(&user.id, |org| {
            let member = org
                .team_members
                .get_mut(&id)
                .ok_or_else(|| ApiError::not_found("Team member"))?;
            member.role = request.role;
            Ok(())
        })
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

pub async fn delete_team_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<OrganizationResponse>> {
    let profile = state
        .profiles
        .mutate_organization(&user.id, |org| {
            org.team_members
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("Team member"))
        })
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

// ============================================================================
// Organization projects
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct OrgProjectRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

pub async fn add_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<OrgProjectRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    validate_payload(&request)?;
    if let Some(raw) = &request.url {
        url::Url::parse(raw)
            .map_err(|e| ApiError::bad_request(format!("Invalid URL '{}': {}", raw, e)))?;
    }
    let profile = state
        .profiles
        .mutate_organization(&user.id, |org| {
            let project = OrgProject {
                id: new_entity_id(),
                name: request.name,
                description: request.description,
                url: request.url,
                created_at: Utc::now(),
            };
            org.projects.insert(project.id.clone(), project);
            Ok(())
        })
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

#[derive(Debug, Deserialize)]
pub struct OrgProjectUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

pub async fn update_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<OrgProjectUpdateRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    if let Some(raw) = &request.url {
        url::Url::parse(raw)
            .map_err(|e| ApiError::bad_request(format!("Invalid URL '{}': {}", raw, e)))?;
    }
    let profile = state
        .profiles
        .mutate_organization(&user.id, |org| {
            let project = org
                .projects
                .get_mut(&id)
                .ok_or_else(|| ApiError::not_found("Project"))?;
            if let Some(name) = request.name {
                project.name = name;
            }
            if request.description.is_some() {
                project.description = request.description;
            }
            if request.url.is_some() {
                project.url = request.url;
            }
            Ok(())
        })
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

pub async fn delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<OrganizationResponse>> {
    let profile = state
        .profiles
        .mutate_organization(&user.id, |org| {
            org.projects
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("Project"))
        })
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

// ============================================================================
// Social links
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SocialLinkRequest {
    #[validate(length(min = 1, max = 50))]
    pub label: String,
    #[validate(length(min = 1))]
    pub url: String,
}

pub async fn add_social_link(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SocialLinkRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    validate_payload(&request)?;
    url::Url::parse(&request.url)
        .map_err(|e| ApiError::bad_request(format!("Invalid URL '{}': {}", request.url, e)))?;
    let profile = state
        .profiles
        .mutate_organization(&user.id, |org| {
            let link = SocialLink {
                id: new_entity_id(),
                label: request.label,
                url: request.url,
                created_at: Utc::now(),
            };
            org.social_links.insert(link.id.clone(), link);
            Ok(())
        })
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

pub async fn delete_social_link(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<OrganizationResponse>> {
    let profile = state
        .profiles
        .mutate_organization(&user.id, |org| {
            org.social_links
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("Social link"))
        })
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

// ============================================================================
// Job ads
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct PostJobRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 20000))]
    pub description: String,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Serialize)]
pub struct JobAdResponse {
    pub job: JobAd,
}

/// Post a new job ad owned by the caller's organization.
pub async fn post_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<PostJobRequest>,
) -> ApiResult<Json<JobAdResponse>> {
    validate_payload(&request)?;
    let org = state.profiles.require_organization(&user.id).await?;

    let mut job = JobAd::new(org.id.clone(), request.title, request.description);
    job.location = request.location;
    job.employment_type = request.employment_type;
    job.salary_min = request.salary_min;
    job.salary_max = request.salary_max;
    job.currency = request.currency;

    JobAdRepository::new((*state.store).clone()).create(&job).await?;

    let job_id = job.id.clone();
    state
        .profiles
        .mutate_organization(&user.id, move |org| {
            org.add_posted_job(job_id);
            Ok(())
        })
        .await?;

    Ok(Json(JobAdResponse { job }))
}

#[derive(Serialize)]
pub struct JobAdListResponse {
    pub jobs: Vec<JobAdSummary>,
}

/// Summaries of the caller's posted job ads.
pub async fn list_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<JobAdListResponse>> {
    let org = state.profiles.require_organization(&user.id).await?;
    let jobs = JobAdRepository::new((*state.store).clone())
        .get_many(&org.posted_job_ads)
        .await?;
    Ok(Json(JobAdListResponse {
        jobs: jobs.iter().map(JobAdSummary::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct JobUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub currency: Option<String>,
}

async fn require_owned_job(
    state: &AppState,
    caller: &UserId,
    job_id: &str,
) -> ApiResult<JobAd> {
    let repo = JobAdRepository::new((*state.store).clone());
    let job = repo
        .get(&JobAdId::from_string(job_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Job ad"))?;
    state.applications.require_owning_org(caller, &job).await?;
    Ok(job)
}

/// Update fields on an owned job ad.
pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
    Json(request): Json<JobUpdateRequest>,
) -> ApiResult<Json<JobAdResponse>> {
    let mut job = require_owned_job(&state, &user.id, &job_id).await?;

    if let Some(title) = request.title {
        job.title = title;
    }
    if let Some(description) = request.description {
        job.description = description;
    }
    if request.location.is_some() {
        job.location = request.location;
    }
    if request.employment_type.is_some() {
        job.employment_type = request.employment_type;
    }
    if request.salary_min.is_some() {
        job.salary_min = request.salary_min;
    }
    if request.salary_max.is_some() {
        job.salary_max = request.salary_max;
    }
    if request.currency.is_some() {
        job.currency = request.currency;
    }
    job.updated_at = Utc::now();

    JobAdRepository::new((*state.store).clone()).update(&job).await?;
    Ok(Json(JobAdResponse { job }))
}

/// Close an owned job ad to new applications.
pub async fn close_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobAdResponse>> {
    let mut job = require_owned_job(&state, &user.id, &job_id).await?;
    job.status = JobAdStatus::Closed;
    job.updated_at = Utc::now();
    JobAdRepository::new((*state.store).clone()).update(&job).await?;
    Ok(Json(JobAdResponse { job }))
}

/// Job ad details with the full applicant list (owner view).
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

// ============================================================================
// Applicant management
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct ApplicantResponse {
    pub applicant: Applicant,
}

/// Overwrite one applicant's status (validated against the allowed set).
pub async fn update_applicant_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path((job_id, applicant_user)): Path<(String, String)>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<Json<ApplicantResponse>> {
    let applicant = state
        .applications
        .update_status(
            &user.id,
            &JobAdId::from_string(job_id),
            &UserId::from_string(applicant_user),
            &request.status,
        )
        .await?;
    Ok(Json(ApplicantResponse { applicant }))
}

#[derive(Serialize)]
pub struct ApplicationsResponse {
    pub jobs: Vec<JobApplications>,
}

fn parse_status(status: &str) -> ApiResult<ApplicantStatus> {
    ApplicantStatus::parse(status).ok_or_else(|| {
        ApiError::validation(format!(
            "Invalid status '{}', expected one of: pending, shortlisted, selected, rejected",
            status
        ))
    })
}

/// Applications across the caller's own posted jobs, filtered by status.
pub async fn applications_by_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(status): Path<String>,
) -> ApiResult<Json<ApplicationsResponse>> {
    let status = parse_status(&status)?;
    let org = state.profiles.require_organization(&user.id).await?;
    let jobs = state.applications.applications_by_status(&org, status).await?;
    Ok(Json(ApplicationsResponse { jobs }))
}

/// Applications across a named organization's posted jobs. Restricted
/// to that organization's owner.
pub async fn applications_by_org_and_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, status)): Path<(String, String)>,
) -> ApiResult<Json<ApplicationsResponse>> {
    let status = parse_status(&status)?;
    let org = state.profiles.organization_by_id(&org_id).await?;
    if org.user != user.id {
        return Err(ApiError::forbidden(
            "Applications belong to a different organization",
        ));
    }
    let jobs = state.applications.applications_by_status(&org, status).await?;
    Ok(Json(ApplicationsResponse { jobs }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct EvaluationRoundRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub scheduled_at: Option<chrono::DateTime<Utc>>,
}

/// Attach an evaluation round to one applicant.
pub async fn add_evaluation_round(
    State(state): State<AppState>,
    user: AuthUser,
    Path((job_id, applicant_user)): Path<(String, String)>,
    Json(request): Json<EvaluationRoundRequest>,
) -> ApiResult<Json<ApplicantResponse>> {
    validate_payload(&request)?;
    let mut job = require_owned_job(&state, &user.id, &job_id).await?;

    let applicant = job
        .applicants
        .get_mut(&applicant_user)
        .ok_or_else(|| ApiError::not_found("Application"))?;
    applicant.evaluation_rounds.push(wlink_models::EvaluationRound {
        id: new_entity_id(),
        name: request.name,
        scheduled_at: request.scheduled_at,
        feedback: None,
        result: None,
    });
    applicant.updated_at = Utc::now();
    let updated = applicant.clone();

    JobAdRepository::new((*state.store).clone()).update(&job).await?;
    Ok(Json(ApplicantResponse { applicant: updated }))
}

// ============================================================================
// Saved candidates
// ============================================================================

/// Save a candidate to the organization's shortlist.
pub async fn save_candidate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(candidate): Path<String>,
) -> ApiResult<Json<OrganizationResponse>> {
    let candidate = UserId::from_string(candidate);
    state.accounts.get(&candidate).await?;

    let profile = state
        .profiles
        .mutate_organization(&user.id, move |org| {
            if !org.save_candidate(candidate) {
                return Err(ApiError::conflict("Candidate already saved"));
            }
            Ok(())
        })
        .await?;
    Ok(Json(OrganizationResponse { profile }))
}

#[derive(Serialize)]
pub struct FollowResponse {
    pub following: bool,
}

/// Flip whether the organization follows a candidate's activity.
pub async fn follow_candidate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(candidate): Path<String>,
) -> ApiResult<Json<FollowResponse>> {
    let candidate = UserId::from_string(candidate);
    state.accounts.get(&candidate).await?;

    let mut following = false;
    state
        .profiles
        .mutate_organization(&user.id, |org| {
            if let Some(pos) = org.candidate_followers.iter().position(|c| c == &candidate) {
                org.candidate_followers.remove(pos);
            } else {
                org.candidate_followers.push(candidate);
                following = true;
            }
            Ok(())
        })
        .await?;
    Ok(Json(FollowResponse { following }))
}

/// Remove a candidate from the shortlist.
pub async fn unsave_candidate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(candidate): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let candidate = UserId::from_string(candidate);
    state
        .profiles
        .mutate_organization(&user.id, move |org| {
            let before = org.saved_candidates.len();
            org.saved_candidates.retain(|c| c != &candidate);
            if org.saved_candidates.len() == before {
                return Err(ApiError::not_found("Saved candidate"));
            }
            Ok(())
        })
        .await?;
    Ok(Json(StatusResponse {
        status: "removed".to_string(),
    }))
}
