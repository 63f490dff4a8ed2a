//! The job-application workflow.
//!
//! Apply, withdraw, status updates, save-toggling, bulk apply and the
//! status-filtered views on both sides of the marketplace. Apply and
//! withdraw mutate two documents (job ad + candidate profile); both
//! writes go through one atomic batch commit.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use wlink_firestore::{
    IndividualRepository, JobAdRepository, OrganizationRepository, StoreClient, UserRepository,
};
use wlink_mailer::{MailTemplate, MailerClient};
use wlink_models::{
    Applicant, ApplicantStatus, ApplicantView, IndividualProfile, JobAd, JobAdId,
    OrganizationProfile, UserId,
};

use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// Trimmed job ad shape used in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct JobAdSummary {
    pub id: JobAdId,
    pub organization: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    pub status: wlink_models::JobAdStatus,
}

impl From<&JobAd> for JobAdSummary {
    fn from(job: &JobAd) -> Self {
        Self {
            id: job.id.clone(),
            organization: job.organization.clone(),
            title: job.title.clone(),
            location: job.location.clone(),
            employment_type: job.employment_type.clone(),
            status: job.status,
        }
    }
}

/// One of the candidate's applications together with its job.
#[derive(Debug, Serialize)]
pub struct CurrentApplication {
    pub job: JobAdSummary,
    pub applicant: Applicant,
}

/// One job with the applicants matching a status filter.
#[derive(Debug, Serialize)]
pub struct JobApplications {
    pub job: JobAdSummary,
    pub applicants: Vec<Applicant>,
}

/// Full job ad with the applicant list as the caller may see it.
#[derive(Debug, Serialize)]
pub struct JobAdDetails {
    #[serde(flatten)]
    pub job: JobAdSummary,
    pub description: String,
    pub applicants: Vec<ApplicantView>,
}

/// Per-job outcome of a bulk apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkApplyStatus {
    Applied,
    NotFound,
    AlreadyApplied,
}

#[derive(Debug, Serialize)]
pub struct BulkApplyOutcome {
    pub job_id: JobAdId,
    pub status: BulkApplyStatus,
}

/// Service for the applicant state machine and its queries.
#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<StoreClient>,
    mailer: Arc<MailerClient>,
}

impl ApplicationService {
    pub fn new(store: Arc<StoreClient>, mailer: Arc<MailerClient>) -> Self {
        Self { store, mailer }
    }

    fn jobs(&self) -> JobAdRepository {
        JobAdRepository::new((*self.store).clone())
    }

    fn individuals(&self) -> IndividualRepository {
        IndividualRepository::new((*self.store).clone())
    }

    fn organizations(&self) -> OrganizationRepository {
        OrganizationRepository::new((*self.store).clone())
    }

    fn users(&self) -> UserRepository {
        UserRepository::new((*self.store).clone())
    }

    async fn require_job(&self, job_id: &JobAdId) -> ApiResult<JobAd> {
        self.jobs()
            .get(job_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Job ad"))
    }

    async fn require_profile(&self, user: &UserId) -> ApiResult<IndividualProfile> {
        self.individuals()
            .get_by_user(user)
            .await?
            .ok_or_else(|| ApiError::not_found("Individual profile"))
    }

    /// Submit an application. At most one application per (job, user);
    /// the second attempt conflicts. The job ad and the candidate's
    /// applied list commit atomically.
    pub async fn apply(
        &self,
        caller: &UserId,
        job_id: &JobAdId,
        cover_letter: String,
        resume: Option<wlink_models::MediaId>,
    ) -> ApiResult<Applicant> {
        let mut job = self.require_job(job_id).await?;
        if job.has_applicant(caller) {
            return Err(ApiError::conflict("Already applied to this job"));
        }

        let mut profile = self.require_profile(caller).await?;

        let applicant = Applicant::new(caller.clone(), cover_letter, resume.clone());
        job.applicants
            .insert(caller.as_str().to_string(), applicant.clone());
        profile.job_activity.add_applied(job.id.clone());

        // The submitted resume also lands in the candidate's library
        if let Some(resume) = resume {
            if !profile.resumes.contains(&resume) {
                profile.resumes.push(resume);
            }
        }

        self.jobs().commit_with_activity(&job, &profile).await?;
        metrics::record_application_event("apply");

        self.notify_job_owner(&job, caller).await;

        Ok(applicant)
    }

    /// Withdraw an application. Removes the applicant entry and the
    /// job id from the candidate's applied list, atomically.
    pub async fn withdraw(&self, caller: &UserId, job_id: &JobAdId) -> ApiResult<()> {
        let mut job = self.require_job(job_id).await?;
        if job.applicants.remove(caller.as_str()).is_none() {
            return Err(ApiError::not_found("Application"));
        }

        let mut profile = self.require_profile(caller).await?;
        profile.job_activity.remove_applied(&job.id);

        self.jobs().commit_with_activity(&job, &profile).await?;
        metrics::record_application_event("withdraw");
        Ok(())
    }

    /// Overwrite an applicant's status. The new status is validated
    /// against the allowed set only; there is no transition matrix.
    /// The change is persisted, a history entry appended, and the
    /// applicant notified.
    pub async fn update_status(
        &self,
        caller: &UserId,
        job_id: &JobAdId,
        applicant_user: &UserId,
        new_status: &str,
    ) -> ApiResult<Applicant> {
        let status = ApplicantStatus::parse(new_status).ok_or_else(|| {
            ApiError::validation(format!(
                "Invalid status '{}', expected one of: pending, shortlisted, selected, rejected",
                new_status
            ))
        })?;

        let mut job = self.require_job(job_id).await?;
        let org = self.require_owning_org(caller, &job).await?;

        let applicant = job
            .applicants
            .get_mut(applicant_user.as_str())
            .ok_or_else(|| ApiError::not_found("Application"))?;
        applicant.set_status(status);
        let updated = applicant.clone();

        self.jobs().update(&job).await?;
        metrics::record_application_event("update_status");

        self.notify_applicant_status(&job, &org, applicant_user, status)
            .await;

        Ok(updated)
    }

    /// Flip the job's presence in the candidate's saved list. Returns
    /// whether the job is saved after the call.
    pub async fn toggle_save(&self, caller: &UserId, job_id: &JobAdId) -> ApiResult<bool> {
        let job = self.require_job(job_id).await?;
        let mut profile = self.require_profile(caller).await?;

        let saved = profile.job_activity.toggle_saved(job.id.clone());
        profile.updated_at = chrono::Utc::now();
        self.individuals().update(&profile).await?;

        metrics::record_application_event("toggle_save");
        Ok(saved)
    }

    /// Apply the same cover letter and resume to several jobs. Each job
    /// is processed independently; the candidate's applied list is
    /// updated once afterwards.
    pub async fn bulk_apply(
        &self,
        caller: &UserId,
        job_ids: &[JobAdId],
        cover_letter: &str,
        resume: Option<wlink_models::MediaId>,
    ) -> ApiResult<Vec<BulkApplyOutcome>> {
        let mut profile = self.require_profile(caller).await?;
        let mut outcomes = Vec::with_capacity(job_ids.len());
        let mut applied = Vec::new();

        for job_id in job_ids {
            let Some(mut job) = self.jobs().get(job_id).await? else {
                outcomes.push(BulkApplyOutcome {
                    job_id: job_id.clone(),
                    status: BulkApplyStatus::NotFound,
                });
                continue;
            };

            if job.has_applicant(caller) {
                outcomes.push(BulkApplyOutcome {
                    job_id: job_id.clone(),
                    status: BulkApplyStatus::AlreadyApplied,
                });
                continue;
            }

            let applicant = Applicant::new(caller.clone(), cover_letter, resume.clone());
            job.applicants
                .insert(caller.as_str().to_string(), applicant);
            self.jobs().update(&job).await?;

            applied.push(job_id.clone());
            outcomes.push(BulkApplyOutcome {
                job_id: job_id.clone(),
                status: BulkApplyStatus::Applied,
            });
        }

        if !applied.is_empty() {
            for job_id in &applied {
                profile.job_activity.add_applied(job_id.clone());
            }
            profile.updated_at = chrono::Utc::now();
            self.individuals().update(&profile).await?;
            metrics::record_application_event("bulk_apply");
        }

        Ok(outcomes)
    }

    /// Candidate side: the caller's applications currently at `status`.
    pub async fn current_applications(
        &self,
        caller: &UserId,
        status: ApplicantStatus,
    ) -> ApiResult<Vec<CurrentApplication>> {
        let profile = self.require_profile(caller).await?;
        let jobs = self.jobs().get_many(&profile.job_activity.applied).await?;

        Ok(jobs
            .iter()
            .filter_map(|job| {
                job.applicant_for(caller)
                    .filter(|a| a.status == status)
                    .map(|a| CurrentApplication {
                        job: JobAdSummary::from(job),
                        applicant: a.clone(),
                    })
            })
            .collect())
    }

    /// Organization side: every posted job with its applicants filtered
    /// to `status`. Jobs without a matching applicant are dropped.
    pub async fn applications_by_status(
        &self,
        org: &OrganizationProfile,
        status: ApplicantStatus,
    ) -> ApiResult<Vec<JobApplications>> {
        let jobs = self.jobs().get_many(&org.posted_job_ads).await?;

        Ok(jobs
            .iter()
            .filter_map(|job| {
                let applicants: Vec<Applicant> = job
                    .applicants_with_status(status)
                    .into_iter()
                    .cloned()
                    .collect();
                if applicants.is_empty() {
                    None
                } else {
                    Some(JobApplications {
                        job: JobAdSummary::from(job),
                        applicants,
                    })
                }
            })
            .collect())
    }

    /// Full job ad as seen by `caller`: the owning organization sees
    /// every applicant, anyone else sees only their own entry in full
    /// and bare user references for the rest.
    pub async fn job_details(&self, caller: &UserId, job_id: &JobAdId) -> ApiResult<JobAdDetails> {
        let job = self.require_job(job_id).await?;

        let is_owner = match self.organizations().get_by_user(caller).await? {
            Some(org) => org.id == job.organization,
            None => false,
        };

        Ok(JobAdDetails {
            job: JobAdSummary::from(&job),
            description: job.description.clone(),
            applicants: job.applicant_views(caller, is_owner),
        })
    }

    /// The caller's organization profile, which must own `job`.
    pub async fn require_owning_org(
        &self,
        caller: &UserId,
        job: &JobAd,
    ) -> ApiResult<OrganizationProfile> {
        let org = self
            .organizations()
            .get_by_user(caller)
            .await?
            .ok_or_else(|| ApiError::forbidden("Caller has no organization profile"))?;
        if org.id != job.organization {
            return Err(ApiError::forbidden(
                "Job ad belongs to a different organization",
            ));
        }
        Ok(org)
    }

    async fn notify_job_owner(&self, job: &JobAd, applicant: &UserId) {
        let owner_email = match self.organizations().get(&job.organization).await {
            Ok(Some(org)) => match self.users().get(&org.user).await {
                Ok(Some(owner)) => Some(owner.email),
                _ => None,
            },
            _ => None,
        };

        let Some(owner_email) = owner_email else {
            warn!(job = %job.id, "Could not resolve job owner for notification");
            return;
        };

        let mut vars = HashMap::new();
        vars.insert("job_title".to_string(), job.title.clone());
        vars.insert("applicant".to_string(), applicant.as_str().to_string());
        super::notify(
            &self.mailer,
            MailTemplate::ApplicantNotification,
            &owner_email,
            vars,
        )
        .await;
    }

    async fn notify_applicant_status(
        &self,
        job: &JobAd,
        org: &OrganizationProfile,
        applicant_user: &UserId,
        status: ApplicantStatus,
    ) {
        let Ok(Some(user)) = self.users().get(applicant_user).await else {
            warn!(user = %applicant_user, "Could not resolve applicant for notification");
            return;
        };

        let mut vars = HashMap::new();
        vars.insert("job_title".to_string(), job.title.clone());
        vars.insert("organization".to_string(), org.name.clone());
        vars.insert("status".to_string(), status.as_str().to_string());
        super::notify(
            &self.mailer,
            MailTemplate::ApplicantStatusChanged,
            &user.email,
            vars,
        )
        .await;
    }
}
