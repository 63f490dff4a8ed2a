//! OAuth provider registry.
//!
//! One data-driven descriptor per provider instead of per-provider code
//! paths. Provider quirks (GitHub supplying a single display name,
//! Microsoft calling the email field `mail`) are field mappings in the
//! descriptor table.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use wlink_models::SocialProvider;

use crate::error::{ApiError, ApiResult};

/// Static descriptor for one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: SocialProvider,
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub profile_url: String,
    /// Field holding the provider-side stable account id
    pub subject_field: &'static str,
    pub email_field: &'static str,
    /// Separate given/family name fields, when the provider has them
    pub given_name_field: Option<&'static str>,
    pub family_name_field: Option<&'static str>,
    /// Single display-name field, for providers without split names
    pub display_name_field: Option<&'static str>,
}

/// Normalized profile returned by every provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderProfile {
    pub subject: String,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

struct ProviderEndpoints {
    token_url: &'static str,
    profile_url: &'static str,
    subject_field: &'static str,
    email_field: &'static str,
    given_name_field: Option<&'static str>,
    family_name_field: Option<&'static str>,
    display_name_field: Option<&'static str>,
}

fn endpoints(provider: SocialProvider) -> ProviderEndpoints {
    match provider {
        SocialProvider::Google => ProviderEndpoints {
            token_url: "https://oauth2.googleapis.com/token",
            profile_url: "https://openidconnect.googleapis.com/v1/userinfo",
            subject_field: "sub",
            email_field: "email",
            given_name_field: Some("given_name"),
            family_name_field: Some("family_name"),
            display_name_field: None,
        },
        SocialProvider::Facebook => ProviderEndpoints {
            token_url: "https://graph.facebook.com/v12.0/oauth/access_token",
            profile_url: "https://graph.facebook.com/me?fields=id,email,first_name,last_name",
            subject_field: "id",
            email_field: "email",
            given_name_field: Some("first_name"),
            family_name_field: Some("last_name"),
            display_name_field: None,
        },
        SocialProvider::Github => ProviderEndpoints {
            token_url: "https://github.com/login/oauth/access_token",
            profile_url: "https://api.github.com/user",
            subject_field: "id",
            email_field: "email",
            given_name_field: None,
            family_name_field: None,
            display_name_field: Some("name"),
        },
        SocialProvider::Twitter => ProviderEndpoints {
            token_url: "https://api.twitter.com/2/oauth2/token",
            profile_url: "https://api.twitter.com/2/users/me",
            subject_field: "id",
            email_field: "email",
            given_name_field: None,
            family_name_field: None,
            display_name_field: Some("name"),
        },
        SocialProvider::Apple => ProviderEndpoints {
            token_url: "https://appleid.apple.com/auth/token",
            profile_url: "https://appleid.apple.com/auth/userinfo",
            subject_field: "sub",
            email_field: "email",
            given_name_field: Some("given_name"),
            family_name_field: Some("family_name"),
            display_name_field: None,
        },
        SocialProvider::Linkedin => ProviderEndpoints {
            token_url: "https://www.linkedin.com/oauth/v2/accessToken",
            profile_url: "https://api.linkedin.com/v2/userinfo",
            subject_field: "sub",
            email_field: "email",
            given_name_field: Some("given_name"),
            family_name_field: Some("family_name"),
            display_name_field: None,
        },
        SocialProvider::Microsoft => ProviderEndpoints {
            token_url: "https://login.microsoftonline.com/common/oauth2/v2.0/token",
            profile_url: "https://graph.microsoft.com/v1.0/me",
            subject_field: "id",
            email_field: "mail",
            given_name_field: Some("givenName"),
            family_name_field: Some("surname"),
            display_name_field: Some("displayName"),
        },
    }
}

/// All configured providers, validated at startup.
pub struct OAuthRegistry {
    http: Client,
    providers: HashMap<SocialProvider, ProviderConfig>,
}

impl OAuthRegistry {
    /// Build the registry from `{PROVIDER}_CLIENT_ID` /
    /// `{PROVIDER}_CLIENT_SECRET`. Every provider is required; a missing
    /// credential pair aborts startup.
    pub fn from_env() -> ApiResult<Self> {
        let mut providers = HashMap::new();

        for provider in SocialProvider::ALL {
            let prefix = provider.as_str().to_uppercase();
            let client_id = std::env::var(format!("{}_CLIENT_ID", prefix)).map_err(|_| {
                ApiError::internal(format!("{}_CLIENT_ID not set", prefix))
            })?;
            let client_secret =
                std::env::var(format!("{}_CLIENT_SECRET", prefix)).map_err(|_| {
                    ApiError::internal(format!("{}_CLIENT_SECRET not set", prefix))
                })?;

            let ep = endpoints(provider);
            providers.insert(
                provider,
                ProviderConfig {
                    provider,
                    client_id,
                    client_secret,
                    token_url: ep.token_url.to_string(),
                    profile_url: ep.profile_url.to_string(),
                    subject_field: ep.subject_field,
                    email_field: ep.email_field,
                    given_name_field: ep.given_name_field,
                    family_name_field: ep.family_name_field,
                    display_name_field: ep.display_name_field,
                },
            );
        }

        let http = Client::builder()
            .user_agent(concat!("wlink-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::internal(format!("Failed to build OAuth client: {}", e)))?;

        Ok(Self { http, providers })
    }

    fn config(&self, provider: SocialProvider) -> ApiResult<&ProviderConfig> {
        self.providers
            .get(&provider)
            .ok_or_else(|| ApiError::internal(format!("Provider {} not configured", provider)))
    }

    /// Exchange an authorization code for the provider's profile.
    pub async fn exchange_code(
        &self,
        provider: SocialProvider,
        code: &str,
        redirect_uri: &str,
    ) -> ApiResult<ProviderProfile> {
        let config = self.config(provider)?;

        debug!(provider = provider.as_str(), "Exchanging OAuth code");

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let token: TokenResponse = self
            .http
            .post(&config.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("OAuth token exchange failed: {}", e)))?
            .error_for_status()
            .map_err(|e| ApiError::unauthorized(format!("OAuth code rejected: {}", e)))?
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("Invalid token response: {}", e)))?;

        let profile_json: JsonValue = self
            .http
            .get(&config.profile_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("OAuth profile fetch failed: {}", e)))?
            .error_for_status()
            .map_err(|e| ApiError::Upstream(format!("OAuth profile fetch failed: {}", e)))?
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("Invalid profile response: {}", e)))?;

        extract_profile(config, &profile_json)
    }
}

/// Map a raw provider profile document through the descriptor's fields.
pub fn extract_profile(config: &ProviderConfig, json: &JsonValue) -> ApiResult<ProviderProfile> {
    let subject = match json.get(config.subject_field) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        _ => {
            return Err(ApiError::Upstream(format!(
                "{} profile missing {}",
                config.provider, config.subject_field
            )))
        }
    };

    let email = json
        .get(config.email_field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ApiError::validation(format!(
                "{} did not supply an email address",
                config.provider
            ))
        })?;

    // Prefer split name fields; fall back to splitting a display name.
    let (first_name, last_name) = if let Some(given_field) = config.given_name_field {
        let first = json
            .get(given_field)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let last = config
            .family_name_field
            .and_then(|f| json.get(f))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        (first, last)
    } else if let Some(display_field) = config.display_name_field {
        split_display_name(
            json.get(display_field)
                .and_then(|v| v.as_str())
                .unwrap_or_default(),
        )
    } else {
        (String::new(), None)
    };

    if first_name.is_empty() {
        return Err(ApiError::Upstream(format!(
            "{} profile missing a usable name",
            config.provider
        )));
    }

    Ok(ProviderProfile {
        subject,
        email,
        first_name,
        last_name,
    })
}

/// Split a single display name into first name and the rest.
fn split_display_name(name: &str) -> (String, Option<String>) {
    let mut words = name.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = words.collect();
    let last = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github_config() -> ProviderConfig {
        let ep = endpoints(SocialProvider::Github);
        ProviderConfig {
            provider: SocialProvider::Github,
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            token_url: ep.token_url.to_string(),
            profile_url: ep.profile_url.to_string(),
            subject_field: ep.subject_field,
            email_field: ep.email_field,
            given_name_field: ep.given_name_field,
            family_name_field: ep.family_name_field,
            display_name_field: ep.display_name_field,
        }
    }

    fn google_config() -> ProviderConfig {
        let ep = endpoints(SocialProvider::Google);
        ProviderConfig {
            provider: SocialProvider::Google,
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            token_url: ep.token_url.to_string(),
            profile_url: ep.profile_url.to_string(),
            subject_field: ep.subject_field,
            email_field: ep.email_field,
            given_name_field: ep.given_name_field,
            family_name_field: ep.family_name_field,
            display_name_field: ep.display_name_field,
        }
    }

    #[test]
    fn test_google_profile_uses_split_names() {
        let json = serde_json::json!({
            "sub": "g-1",
            "email": "dev@example.com",
            "given_name": "Ada",
            "family_name": "Lovelace"
        });
        let profile = extract_profile(&google_config(), &json).unwrap();
        assert_eq!(profile.subject, "g-1");
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name.as_deref(), Some("Lovelace"));
    }

    #[test]
    fn test_github_numeric_id_and_display_name() {
        let json = serde_json::json!({
            "id": 12345,
            "email": "dev@example.com",
            "name": "Ada Lovelace King"
        });
        let profile = extract_profile(&github_config(), &json).unwrap();
        assert_eq!(profile.subject, "12345");
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name.as_deref(), Some("Lovelace King"));
    }

    #[test]
    fn test_github_single_word_name_has_no_last_name() {
        let json = serde_json::json!({
            "id": 1,
            "email": "dev@example.com",
            "name": "Ada"
        });
        let profile = extract_profile(&github_config(), &json).unwrap();
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name, None);
    }

    #[test]
    fn test_missing_email_is_a_validation_error() {
        let json = serde_json::json!({"id": 1, "name": "Ada"});
        let result = extract_profile(&github_config(), &json);
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_every_provider_has_endpoints() {
        for provider in SocialProvider::ALL {
            let ep = endpoints(provider);
            assert!(ep.token_url.starts_with("https://"));
            assert!(ep.profile_url.starts_with("https://"));
        }
    }
}
