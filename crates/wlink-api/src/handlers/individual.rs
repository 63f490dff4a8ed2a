//! Individual profile handlers: registration, sub-entity CRUD, profile
//! videos, job alerts, recommendations.
//!
//! Every sub-entity family follows the same shape: Add generates an id
//! and inserts into the keyed map, Update shallow-merges the provided
//! fields over the existing entry, Delete removes by id. The parent
//! document is persisted whole each time.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use wlink_firestore::{JobAlertRepository, RecommendationRepository};
use wlink_models::{
    new_entity_id, Certification, Education, Experience, IndividualProfile, JobAlert, MediaKind,
    Position, Project, Recommendation, Skill, UserId,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::validate_payload;
use crate::state::AppState;

/// Syntax-check a list of URLs (project links, credential URLs).
fn validate_urls(urls: &[String]) -> ApiResult<()> {
    for raw in urls {
        url::Url::parse(raw)
            .map_err(|e| ApiError::bad_request(format!("Invalid URL '{}': {}", raw, e)))?;
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: IndividualProfile,
}

/// Create the candidate profile for the calling account.
pub async fn register_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let account = state.accounts.get(&user.id).await?;
    let profile = state.profiles.register_individual(&account).await?;
    Ok(Json(ProfileResponse { profile }))
}

/// The caller's own profile.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state.profiles.require_individual(&user.id).await?;
    Ok(Json(ProfileResponse { profile }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    pub headline: Option<String>,
    #[validate(length(max = 5000))]
    pub summary: Option<String>,
}

/// Update top-level profile fields.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_payload(&request)?;
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            if let Some(headline) = request.headline {
                p.headline = Some(headline);
            }
            if let Some(summary) = request.summary {
                p.summary = Some(summary);
            }
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

// ============================================================================
// Education
// ============================================================================

#[derive(Serialize)]
pub struct EducationListResponse {
    pub education: Vec<Education>,
}

/// Education entries, oldest first.
pub async fn list_education(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<EducationListResponse>> {
    let profile = state.profiles.require_individual(&user.id).await?;
    let education = wlink_models::individual::ordered_by_creation(&profile.education, |e| {
        e.created_at
    })
    .into_iter()
    .cloned()
    .collect();
    Ok(Json(EducationListResponse { education }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct EducationRequest {
    #[validate(length(min = 1))]
    pub school: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub grade: Option<String>,
}

pub async fn add_education(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<EducationRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_payload(&request)?;
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let entry = Education {
                id: new_entity_id(),
                school: request.school,
                degree: request.degree,
                field_of_study: request.field_of_study,
                start_year: request.start_year,
                end_year: request.end_year,
                grade: request.grade,
                created_at: Utc::now(),
            };
            p.education.insert(entry.id.clone(), entry);
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

#[derive(Debug, Deserialize)]
pub struct EducationUpdateRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub grade: Option<String>,
}

pub async fn update_education(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<EducationUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let entry = p
                .education
                .get_mut(&id)
                .ok_or_else(|| ApiError::not_found("Education entry"))?;
            if let Some(school) = request.school {
                entry.school = school;
            }
            if request.degree.is_some() {
                entry.degree = request.degree;
            }
            if request.field_of_study.is_some() {
                entry.field_of_study = request.field_of_study;
            }
            if request.start_year.is_some() {
                entry.start_year = request.start_year;
            }
            if request.end_year.is_some() {
                entry.end_year = request.end_year;
            }
            if request.grade.is_some() {
                entry.grade = request.grade;
            }
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

pub async fn delete_education(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            p.education
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("Education entry"))
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

// ============================================================================
// Experience and nested positions
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ExperienceRequest {
    #[validate(length(min = 1))]
    pub company: String,
    pub location: Option<String>,
}

pub async fn add_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ExperienceRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_payload(&request)?;
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let entry = Experience {
                id: new_entity_id(),
                company: request.company,
                location: request.location,
                positions: Default::default(),
                created_at: Utc::now(),
            };
            p.experience.insert(entry.id.clone(), entry);
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

#[derive(Debug, Deserialize)]
pub struct ExperienceUpdateRequest {
    pub company: Option<String>,
    pub location: Option<String>,
}

pub async fn update_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<ExperienceUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let entry = p
                .experience
                .get_mut(&id)
                .ok_or_else(|| ApiError::not_found("Experience entry"))?;
            if let Some(company) = request.company {
                entry.company = company;
            }
            if request.location.is_some() {
                entry.location = request.location;
            }
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

pub async fn delete_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            p.experience
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("Experience entry"))
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PositionRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub employment_type: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub description: Option<String>,
}

pub async fn add_position(
    State(state): State<AppState>,
    user: AuthUser,
    Path(experience_id): Path<String>,
    Json(request): Json<PositionRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_payload(&request)?;
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let experience = p
                .experience
                .get_mut(&experience_id)
                .ok_or_else(|| ApiError::not_found("Experience entry"))?;
            let position = Position {
                id: new_entity_id(),
                title: request.title,
                employment_type: request.employment_type,
                start_date: request.start_date,
                end_date: request.end_date,
                description: request.description,
                created_at: Utc::now(),
            };
            experience.positions.insert(position.id.clone(), position);
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

#[derive(Debug, Deserialize)]
pub struct PositionUpdateRequest {
    pub title: Option<String>,
    pub employment_type: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub description: Option<String>,
}

pub async fn update_position(
    State(state): State<AppState>,
    user: AuthUser,
    Path((experience_id, position_id)): Path<(String, String)>,
    Json(request): Json<PositionUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let experience = p
                .experience
                .get_mut(&experience_id)
                .ok_or_else(|| ApiError::not_found("Experience entry"))?;
            let position = experience
                .positions
                .get_mut(&position_id)
                .ok_or_else(|| ApiError::not_found("Position"))?;
            if let Some(title) = request.title {
                position.title = title;
            }
            if request.employment_type.is_some() {
                position.employment_type = request.employment_type;
            }
            if request.start_date.is_some() {
                position.start_date = request.start_date;
            }
            if request.end_date.is_some() {
                position.end_date = request.end_date;
            }
            if request.description.is_some() {
                position.description = request.description;
            }
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

pub async fn delete_position(
    State(state): State<AppState>,
    user: AuthUser,
    Path((experience_id, position_id)): Path<(String, String)>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let experience = p
                .experience
                .get_mut(&experience_id)
                .ok_or_else(|| ApiError::not_found("Experience entry"))?;
            experience
                .positions
                .remove(&position_id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("Position"))
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

// ============================================================================
// Skills
// ============================================================================

#[derive(Serialize)]
pub struct SkillListResponse {
    pub skills: Vec<Skill>,
}

/// Skills, oldest first.
pub async fn list_skills(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<SkillListResponse>> {
    let profile = state.profiles.require_individual(&user.id).await?;
    let skills = wlink_models::individual::ordered_by_creation(&profile.skills, |s| s.created_at)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(SkillListResponse { skills }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SkillRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub proficiency: Option<String>,
}

pub async fn add_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SkillRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_payload(&request)?;
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let skill = Skill {
                id: new_entity_id(),
                name: request.name,
                proficiency: request.proficiency,
                created_at: Utc::now(),
            };
            p.skills.insert(skill.id.clone(), skill);
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

#[derive(Debug, Deserialize)]
pub struct SkillUpdateRequest {
    pub name: Option<String>,
    pub proficiency: Option<String>,
}

pub async fn update_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<SkillUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let skill = p
                .skills
                .get_mut(&id)
                .ok_or_else(|| ApiError::not_found("Skill"))?;
            if let Some(name) = request.name {
                skill.name = name;
            }
            if request.proficiency.is_some() {
                skill.proficiency = request.proficiency;
            }
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

pub async fn delete_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            p.skills
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("Skill"))
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

// ============================================================================
// Certifications
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CertificationRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub authority: Option<String>,
    pub credential_url: Option<String>,
    pub issued_on: Option<chrono::NaiveDate>,
}

pub async fn add_certification(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CertificationRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_payload(&request)?;
    if let Some(url) = &request.credential_url {
        validate_urls(std::slice::from_ref(url))?;
    }
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let cert = Certification {
                id: new_entity_id(),
                name: request.name,
                authority: request.authority,
                credential_url: request.credential_url,
                issued_on: request.issued_on,
                created_at: Utc::now(),
            };
            p.certifications.insert(cert.id.clone(), cert);
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

#[derive(Debug, Deserialize)]
pub struct CertificationUpdateRequest {
    pub name: Option<String>,
    pub authority: Option<String>,
    pub credential_url: Option<String>,
    pub issued_on: Option<chrono::NaiveDate>,
}

pub async fn update_certification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<CertificationUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    if let Some(url) = &request.credential_url {
        validate_urls(std::slice::from_ref(url))?;
    }
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let cert = p
                .certifications
                .get_mut(&id)
                .ok_or_else(|| ApiError::not_found("Certification"))?;
            if let Some(name) = request.name {
                cert.name = name;
            }
            if request.authority.is_some() {
                cert.authority = request.authority;
            }
            if request.credential_url.is_some() {
                cert.credential_url = request.credential_url;
            }
            if request.issued_on.is_some() {
                cert.issued_on = request.issued_on;
            }
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

pub async fn delete_certification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            p.certifications
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("Certification"))
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ProjectRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

pub async fn add_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ProjectRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_payload(&request)?;
    validate_urls(&request.links)?;
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let project = Project {
                id: new_entity_id(),
                title: request.title,
                description: request.description,
                links: request.links,
                created_at: Utc::now(),
            };
            p.projects.insert(project.id.clone(), project);
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

#[derive(Debug, Deserialize)]
pub struct ProjectUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub links: Option<Vec<String>>,
}

pub async fn update_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<ProjectUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    if let Some(links) = &request.links {
        validate_urls(links)?;
    }
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            let project = p
                .projects
                .get_mut(&id)
                .ok_or_else(|| ApiError::not_found("Project"))?;
            if let Some(title) = request.title {
                project.title = title;
            }
            if request.description.is_some() {
                project.description = request.description;
            }
            if let Some(links) = request.links {
                project.links = links;
            }
            Ok(())
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

pub async fn delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .mutate_individual(&user.id, |p| {
            p.projects
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found("Project"))
        })
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

// ============================================================================
// Profile videos
// ============================================================================

async fn upload_video_field(
    state: &AppState,
    user: &UserId,
    mut multipart: Multipart,
) -> ApiResult<wlink_models::MediaAsset> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("video") {
            continue;
        }
        let filename = field.file_name().unwrap_or("video.mp4").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        return state
            .media_library
            .upload(user, MediaKind::Video, &filename, &content_type, bytes.to_vec())
            .await;
    }
    Err(ApiError::bad_request("Missing 'video' field"))
}

#[derive(Serialize)]
pub struct VideoResponse {
    pub media: wlink_models::MediaAsset,
}

/// Upload and attach the profile intro video, replacing any previous one.
pub async fn upload_intro_video(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<VideoResponse>> {
    let asset = upload_video_field(&state, &user.id, multipart).await?;

    let mut previous = None;
    state
        .profiles
        .mutate_individual(&user.id, |p| {
            previous = p.intro_video.replace(asset.id.clone());
            Ok(())
        })
        .await?;

    if let Some(old) = previous {
        state.media_library.delete_replaced(&user.id, &old).await;
    }

    Ok(Json(VideoResponse { media: asset }))
}

/// Upload and attach the video resume, replacing any previous one.
pub async fn upload_video_resume(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<VideoResponse>> {
    let asset = upload_video_field(&state, &user.id, multipart).await?;

    let mut previous = None;
    state
        .profiles
        .mutate_individual(&user.id, |p| {
            previous = p.video_resume.replace(asset.id.clone());
            Ok(())
        })
        .await?;

    if let Some(old) = previous {
        state.media_library.delete_replaced(&user.id, &old).await;
    }

    Ok(Json(VideoResponse { media: asset }))
}

// ============================================================================
// Job alerts
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct JobAlertRequest {
    #[validate(length(min = 1, max = 20))]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

#[derive(Serialize)]
pub struct JobAlertResponse {
    pub alert: JobAlert,
}

pub async fn create_job_alert(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<JobAlertRequest>,
) -> ApiResult<Json<JobAlertResponse>> {
    validate_payload(&request)?;
    let alert = JobAlert::new(user.id.clone(), request.keywords, request.locations);
    JobAlertRepository::new((*state.store).clone())
        .create(&alert)
        .await?;
    Ok(Json(JobAlertResponse { alert }))
}

#[derive(Serialize)]
pub struct JobAlertsResponse {
    pub alerts: Vec<JobAlert>,
}

pub async fn list_job_alerts(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<JobAlertsResponse>> {
    let alerts = JobAlertRepository::new((*state.store).clone())
        .list_for_owner(&user.id)
        .await?;
    Ok(Json(JobAlertsResponse { alerts }))
}

pub async fn delete_job_alert(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<crate::handlers::auth::StatusResponse>> {
    let repo = JobAlertRepository::new((*state.store).clone());
    let alert = repo
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job alert"))?;
    if alert.owner != user.id {
        return Err(ApiError::forbidden("Job alert belongs to a different user"));
    }
    repo.delete(&id).await?;
    Ok(Json(crate::handlers::auth::StatusResponse {
        status: "deleted".to_string(),
    }))
}

// ============================================================================
// Recommendations
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Serialize)]
pub struct RecommendationResponse {
    pub recommendation: Recommendation,
}

/// Write a recommendation for a candidate.
pub async fn create_recommendation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(candidate): Path<String>,
    Json(request): Json<RecommendationRequest>,
) -> ApiResult<Json<RecommendationResponse>> {
    validate_payload(&request)?;
    let candidate = UserId::from_string(candidate);
    // The candidate must exist
    state.accounts.get(&candidate).await?;

    let recommendation = Recommendation::new(candidate, user.id.clone(), request.note);
    RecommendationRepository::new((*state.store).clone())
        .create(&recommendation)
        .await?;
    Ok(Json(RecommendationResponse { recommendation }))
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

/// Recommendations written for the caller.
pub async fn list_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<RecommendationsResponse>> {
    let recommendations = RecommendationRepository::new((*state.store).clone())
        .list_for_candidate(&user.id)
        .await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}
