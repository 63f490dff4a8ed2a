//! Account lifecycle: registration, login, OTP verification, social
//! login, deletion.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use tracing::info;

use wlink_firestore::repos::{OtpRecord, OTP_MAX_ATTEMPTS};
use wlink_firestore::{OtpRepository, StoreClient, UserRepository};
use wlink_mailer::{MailTemplate, MailerClient};
use wlink_models::{ProfileType, SocialLogin, SocialProvider, User, UserId};

use crate::error::{ApiError, ApiResult};
use crate::oauth::ProviderProfile;

/// Service for the base account identity records.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<StoreClient>,
    mailer: Arc<MailerClient>,
}

impl AccountService {
    pub fn new(store: Arc<StoreClient>, mailer: Arc<MailerClient>) -> Self {
        Self { store, mailer }
    }

    fn users(&self) -> UserRepository {
        UserRepository::new((*self.store).clone())
    }

    fn otps(&self) -> OtpRepository {
        OtpRepository::new((*self.store).clone())
    }

    /// Register a credential-based account. Duplicate emails conflict.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: Option<String>,
    ) -> ApiResult<User> {
        if self.users().get_by_email(email).await?.is_some() {
            return Err(ApiError::conflict("An account with this email already exists"));
        }

        let mut user = User::new(email, first_name);
        user.last_name = last_name;
        user.password_hash = Some(hash_password(password)?);
        self.users().create(&user).await?;

        let mut vars = HashMap::new();
        vars.insert("first_name".to_string(), user.first_name.clone());
        super::notify(&self.mailer, MailTemplate::Welcome, email, vars).await;

        Ok(user)
    }

    /// Verify credentials. Unknown email and wrong password are the
    /// same error, so login cannot be used to probe for accounts.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let invalid = || ApiError::unauthorized("Invalid email or password");

        let user = self.users().get_by_email(email).await?.ok_or_else(invalid)?;
        let hash = user.password_hash.as_deref().ok_or_else(invalid)?;

        let parsed = PasswordHash::new(hash)
            .map_err(|e| ApiError::internal(format!("Stored hash unreadable: {}", e)))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| invalid())?;

        Ok(user)
    }

    /// Issue a fresh email verification code.
    pub async fn send_email_otp(&self, email: &str) -> ApiResult<()> {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32));
        let record = OtpRecord::new(email, &code);
        self.otps().put(&record).await?;

        let mut vars = HashMap::new();
        vars.insert("code".to_string(), code);
        super::notify(&self.mailer, MailTemplate::EmailOtp, email, vars).await;

        info!(email, "Issued email OTP");
        Ok(())
    }

    /// Verify a submitted code and mark the account's email verified.
    pub async fn verify_otp(&self, email: &str, code: &str) -> ApiResult<()> {
        let otps = self.otps();
        let mut record = otps
            .get(email)
            .await?
            .ok_or_else(|| ApiError::not_found("No pending verification code"))?;

        if record.is_expired() {
            otps.delete(email).await?;
            return Err(ApiError::validation("Verification code expired"));
        }
        if record.attempts >= OTP_MAX_ATTEMPTS {
            otps.delete(email).await?;
            return Err(ApiError::validation("Too many attempts, request a new code"));
        }
        if !record.matches(code) {
            record.attempts += 1;
            otps.put(&record).await?;
            return Err(ApiError::validation("Incorrect verification code"));
        }

        otps.delete(email).await?;

        if let Some(mut user) = self.users().get_by_email(email).await? {
            user.email_verified = true;
            user.updated_at = chrono::Utc::now();
            self.users().update(&user).await?;
        }

        Ok(())
    }

    /// Get or create the account behind a social-login profile.
    pub async fn social_auth(
        &self,
        provider: SocialProvider,
        profile: ProviderProfile,
    ) -> ApiResult<User> {
        if let Some(mut user) = self.users().get_by_email(&profile.email).await? {
            // Existing account: remember the provider on first social login
            if user.social_login.is_none() {
                user.social_login = Some(SocialLogin {
                    provider,
                    subject: profile.subject,
                });
                user.updated_at = chrono::Utc::now();
                self.users().update(&user).await?;
            }
            return Ok(user);
        }

        let user = User::from_social(
            profile.email.clone(),
            profile.first_name,
            profile.last_name,
            SocialLogin {
                provider,
                subject: profile.subject,
            },
        );
        self.users().create(&user).await?;
        info!(provider = provider.as_str(), "Created account via social login");

        let mut vars = HashMap::new();
        vars.insert("first_name".to_string(), user.first_name.clone());
        super::notify(&self.mailer, MailTemplate::Welcome, &profile.email, vars).await;

        Ok(user)
    }

    /// Get an account by id.
    pub async fn get(&self, id: &UserId) -> ApiResult<User> {
        self.users()
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User account"))
    }

    /// Persist a changed account record.
    pub async fn update(&self, user: &User) -> ApiResult<()> {
        self.users().update(user).await.map_err(Into::into)
    }

    /// Explicit account deletion: the role profile goes first, then the
    /// identity record.
    pub async fn delete_account(&self, id: &UserId) -> ApiResult<()> {
        let user = self.get(id).await?;

        if let Some(profile) = &user.profile {
            match profile.profile_type {
                ProfileType::IndividualUser => {
                    wlink_firestore::IndividualRepository::new((*self.store).clone())
                        .delete(&profile.profile_id)
                        .await?;
                }
                ProfileType::OrganizationalUser => {
                    wlink_firestore::OrganizationRepository::new((*self.store).clone())
                        .delete(&profile.profile_id)
                        .await?;
                }
                ProfileType::OrganizationMember => {}
            }
        }

        self.users().delete(id).await?;
        info!(user = %id, "Deleted account");
        Ok(())
    }
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::internal(format!("Password hashing failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("hunter2hunter2").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"hunter2hunter2", &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong-password", &parsed)
            .is_err());
    }
}
