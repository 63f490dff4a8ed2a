//! Account identity models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::media::MediaId;

/// Unique identifier for a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which role-specific profile document a user account points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ProfileType {
    IndividualUser,
    OrganizationalUser,
    OrganizationMember,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::IndividualUser => "IndividualUser",
            ProfileType::OrganizationalUser => "OrganizationalUser",
            ProfileType::OrganizationMember => "OrganizationMember",
        }
    }

    /// Parse from the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IndividualUser" => Some(ProfileType::IndividualUser),
            "OrganizationalUser" => Some(ProfileType::OrganizationalUser),
            "OrganizationMember" => Some(ProfileType::OrganizationMember),
            _ => None,
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pointer from a user account to its role-specific profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileRef {
    pub profile_type: ProfileType,
    pub profile_id: String,
}

/// Supported social-login providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Google,
    Facebook,
    Github,
    Twitter,
    Apple,
    Linkedin,
    Microsoft,
}

impl SocialProvider {
    /// All providers, in registration order.
    pub const ALL: [SocialProvider; 7] = [
        SocialProvider::Google,
        SocialProvider::Facebook,
        SocialProvider::Github,
        SocialProvider::Twitter,
        SocialProvider::Apple,
        SocialProvider::Linkedin,
        SocialProvider::Microsoft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialProvider::Google => "google",
            SocialProvider::Facebook => "facebook",
            SocialProvider::Github => "github",
            SocialProvider::Twitter => "twitter",
            SocialProvider::Apple => "apple",
            SocialProvider::Linkedin => "linkedin",
            SocialProvider::Microsoft => "microsoft",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "google" => Some(SocialProvider::Google),
            "facebook" => Some(SocialProvider::Facebook),
            "github" => Some(SocialProvider::Github),
            "twitter" => Some(SocialProvider::Twitter),
            "apple" => Some(SocialProvider::Apple),
            "linkedin" => Some(SocialProvider::Linkedin),
            "microsoft" => Some(SocialProvider::Microsoft),
            _ => None,
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Social-login descriptor attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SocialLogin {
    pub provider: SocialProvider,
    /// Provider-side subject (stable account identifier).
    pub subject: String,
}

/// Base account identity record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct User {
    /// Unique user ID
    pub id: UserId,

    /// Email address (unique across accounts)
    pub email: String,

    /// Whether the email has been verified via OTP
    #[serde(default)]
    pub email_verified: bool,

    /// Optional phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default)]
    pub phone_verified: bool,

    pub first_name: String,

    /// May be absent for providers that only supply a display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Argon2 hash; absent for social-only accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Social-login descriptor, if the account was created via a provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_login: Option<SocialLogin>,

    /// Role-specific profile pointer, set once the user picks a role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileRef>,

    /// Profile picture media reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<MediaId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new credential-based account (email not yet verified).
    pub fn new(email: impl Into<String>, first_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email: email.into(),
            email_verified: false,
            phone: None,
            phone_verified: false,
            first_name: first_name.into(),
            last_name: None,
            password_hash: None,
            social_login: None,
            profile: None,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an account from a social-login profile. Social providers
    /// vouch for the email, so it starts verified.
    pub fn from_social(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: Option<String>,
        login: SocialLogin,
    ) -> Self {
        let mut user = Self::new(email, first_name);
        user.email_verified = true;
        user.last_name = last_name;
        user.social_login = Some(login);
        user
    }

    /// Attach the role-specific profile pointer.
    pub fn with_profile(mut self, profile_type: ProfileType, profile_id: impl Into<String>) -> Self {
        self.profile = Some(ProfileRef {
            profile_type,
            profile_id: profile_id.into(),
        });
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_generation() {
        let id1 = UserId::new();
        let id2 = UserId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_profile_type_round_trip() {
        for pt in [
            ProfileType::IndividualUser,
            ProfileType::OrganizationalUser,
            ProfileType::OrganizationMember,
        ] {
            assert_eq!(ProfileType::parse(pt.as_str()), Some(pt));
        }
        assert_eq!(ProfileType::parse("Admin"), None);
    }

    #[test]
    fn test_social_account_starts_verified() {
        let user = User::from_social(
            "dev@example.com",
            "Dev",
            None,
            SocialLogin {
                provider: SocialProvider::Github,
                subject: "gh-123".to_string(),
            },
        );
        assert!(user.email_verified);
        assert!(user.last_name.is_none());
        assert!(user.password_hash.is_none());
    }

    #[test]
    fn test_provider_parse_is_case_insensitive() {
        assert_eq!(SocialProvider::parse("LinkedIn"), Some(SocialProvider::Linkedin));
        assert_eq!(SocialProvider::parse("myspace"), None);
    }
}
