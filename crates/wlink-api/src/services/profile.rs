//! Profile documents and their embedded sub-entity families.
//!
//! Sub-entity CRUD follows one pattern everywhere: the handler mutates
//! the keyed map inside a closure, the service persists the whole
//! parent document (last write wins).

use std::sync::Arc;

use tracing::info;

use wlink_firestore::{
    IndividualRepository, OrganizationRepository, StoreClient, UserRepository,
};
use wlink_models::{
    IndividualProfile, OrganizationProfile, ProfileType, TeamMember, User, UserId,
};

use crate::error::{ApiError, ApiResult};

/// Service for individual and organization profile documents.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<StoreClient>,
}

impl ProfileService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
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

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create the candidate profile for an account and point the
    /// account at it. One profile per account.
    pub async fn register_individual(&self, user: &User) -> ApiResult<IndividualProfile> {
        if user.profile.is_some() {
            return Err(ApiError::conflict("Account already has a profile"));
        }

        let profile = IndividualProfile::new(user.id.clone());
        self.individuals().create(&profile).await?;

        let updated = user
            .clone()
            .with_profile(ProfileType::IndividualUser, profile.id.clone());
        self.users().update(&updated).await?;

        info!(user = %user.id, profile = %profile.id, "Registered individual profile");
        Ok(profile)
    }

    /// Create the employer profile for an account and point the
    /// account at it.
    pub async fn register_organization(
        &self,
        user: &User,
        name: &str,
    ) -> ApiResult<OrganizationProfile> {
        if user.profile.is_some() {
            return Err(ApiError::conflict("Account already has a profile"));
        }

        let profile = OrganizationProfile::new(user.id.clone(), name);
        self.organizations().create(&profile).await?;

        let updated = user
            .clone()
            .with_profile(ProfileType::OrganizationalUser, profile.id.clone());
        self.users().update(&updated).await?;

        info!(user = %user.id, profile = %profile.id, "Registered organization profile");
        Ok(profile)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub async fn require_individual(&self, user: &UserId) -> ApiResult<IndividualProfile> {
        self.individuals()
            .get_by_user(user)
            .await?
            .ok_or_else(|| ApiError::not_found("Individual profile"))
    }

    pub async fn require_organization(&self, user: &UserId) -> ApiResult<OrganizationProfile> {
        self.organizations()
            .get_by_user(user)
            .await?
            .ok_or_else(|| ApiError::not_found("Organization profile"))
    }

    pub async fn organization_by_id(&self, id: &str) -> ApiResult<OrganizationProfile> {
        self.organizations()
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Organization profile"))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Load the caller's candidate profile, apply a mutation, persist.
    pub async fn mutate_individual<F>(
        &self,
        user: &UserId,
        mutate: F,
    ) -> ApiResult<IndividualProfile>
    where
        F: FnOnce(&mut IndividualProfile) -> ApiResult<()>,
    {
        let mut profile = self.require_individual(user).await?;
        mutate(&mut profile)?;
        profile.updated_at = chrono::Utc::now();
        self.individuals().update(&profile).await?;
        Ok(profile)
    }

    /// Load the caller's employer profile, apply a mutation, persist.
    pub async fn mutate_organization<F>(
        &self,
        user: &UserId,
        mutate: F,
    ) -> ApiResult<OrganizationProfile>
    where
        F: FnOnce(&mut OrganizationProfile) -> ApiResult<()>,
    {
        let mut profile = self.require_organization(user).await?;
        mutate(&mut profile)?;
        profile.updated_at = chrono::Utc::now();
        self.organizations().update(&profile).await?;
        Ok(profile)
    }

    /// Add a hiring-team member by email. The wrapped account is
    /// created on first use with profile type OrganizationMember.
    pub async fn add_team_member(
        &self,
        owner: &UserId,
        email: &str,
        name: &str,
        role: &str,
    ) -> ApiResult<(OrganizationProfile, TeamMember)> {
        let org = self.require_organization(owner).await?;

        let member_user = match self.users().get_by_email(email).await? {
            Some(existing) => existing,
            None => {
                // Member accounts point at the organization they belong to
                let user = User::new(email, name)
                    .with_profile(ProfileType::OrganizationMember, org.id.clone());
                self.users().create(&user).await?;
                user
            }
        };

        let member = TeamMember {
            id: wlink_models::new_entity_id(),
            user: member_user.id.clone(),
            role: role.to_string(),
            added_at: chrono::Utc::now(),
        };

        let member_clone = member.clone();
        let profile = self
            .mutate_organization(owner, move |org| {
                if org.team_members.values().any(|m| m.user == member_clone.user) {
                    return Err(ApiError::conflict("User is already a team member"));
                }
                org.team_members.insert(member_clone.id.clone(), member_clone);
                Ok(())
            })
            .await?;

        Ok((profile, member))
    }
}
