//! Application state.
//!
//! Every vendor client is constructed once at startup and injected
//! here; nothing reads credentials at call time.

use std::sync::Arc;

use wlink_firestore::StoreClient;
use wlink_mailer::MailerClient;
use wlink_media::MediaCdnClient;
use wlink_payments::PaymentGatewayClient;

use crate::auth::AuthKeys;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::oauth::OAuthRegistry;
use crate::services::{AccountService, ApplicationService, MediaLibrary, ProfileService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub auth: Arc<AuthKeys>,
    pub oauth: Arc<OAuthRegistry>,
    pub store: Arc<StoreClient>,
    pub media: Arc<MediaCdnClient>,
    pub payments: Arc<PaymentGatewayClient>,
    pub mailer: Arc<MailerClient>,
    pub accounts: AccountService,
    pub applications: ApplicationService,
    pub profiles: ProfileService,
    pub media_library: MediaLibrary,
}

impl AppState {
    /// Create new application state. Any missing vendor credential
    /// (document store, CDN, gateway, mail, JWT secret, OAuth client
    /// pairs) fails here and aborts startup.
    pub async fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let store = Arc::new(
            StoreClient::from_env()
                .await
                .map_err(|e| ApiError::internal(format!("Document store: {}", e)))?,
        );
        let media = Arc::new(
            MediaCdnClient::from_env()
                .map_err(|e| ApiError::internal(format!("Media CDN: {}", e)))?,
        );
        let payments = Arc::new(
            PaymentGatewayClient::from_env()
                .map_err(|e| ApiError::internal(format!("Payment gateway: {}", e)))?,
        );
        let mailer = Arc::new(
            MailerClient::from_env()
                .map_err(|e| ApiError::internal(format!("Mail API: {}", e)))?,
        );
        let auth = Arc::new(AuthKeys::from_env()?);
        let oauth = Arc::new(OAuthRegistry::from_env()?);

        let accounts = AccountService::new(Arc::clone(&store), Arc::clone(&mailer));
        let applications = ApplicationService::new(Arc::clone(&store), Arc::clone(&mailer));
        let profiles = ProfileService::new(Arc::clone(&store));
        let media_library = MediaLibrary::new(Arc::clone(&store), Arc::clone(&media));

        Ok(Self {
            config,
            auth,
            oauth,
            store,
            media,
            payments,
            mailer,
            accounts,
            applications,
            profiles,
            media_library,
        })
    }
}
