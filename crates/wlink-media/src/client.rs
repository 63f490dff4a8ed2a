//! Media CDN HTTP client.
//!
//! Uploads go out as multipart requests carrying a transcoding profile;
//! the CDN answers with the delivery URL(s) and a public id used for
//! later deletion. Every call runs under the shared vendor retry
//! policy; video and image uploads retry identically.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use wlink_models::{MediaKind, Rendition, RetryPolicy};

use crate::error::{MediaError, MediaResult};

/// Transcoding profiles requested per media kind.
///
/// Videos get a rendition ladder; images get one optimized rendition.
const VIDEO_PROFILES: &[&str] = &["1080p", "720p", "480p"];
const IMAGE_PROFILES: &[&str] = &["optimized"];

/// Configuration for the media CDN client.
#[derive(Debug, Clone)]
pub struct MediaCdnConfig {
    /// Base URL of the CDN API
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// API secret
    pub api_secret: String,
    /// Upload request timeout (large files)
    pub upload_timeout: Duration,
    /// Retry configuration (shared vendor policy)
    pub retry: RetryPolicy,
}

impl MediaCdnConfig {
    /// Create config from environment variables. The credentials are
    /// required; startup aborts without them.
    pub fn from_env() -> MediaResult<Self> {
        Ok(Self {
            base_url: std::env::var("MEDIA_CDN_URL")
                .map_err(|_| MediaError::config("MEDIA_CDN_URL not set"))?,
            api_key: std::env::var("MEDIA_CDN_KEY")
                .map_err(|_| MediaError::config("MEDIA_CDN_KEY not set"))?,
            api_secret: std::env::var("MEDIA_CDN_SECRET")
                .map_err(|_| MediaError::config("MEDIA_CDN_SECRET not set"))?,
            upload_timeout: Duration::from_secs(
                std::env::var("MEDIA_UPLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            retry: RetryPolicy::from_env("MEDIA_CDN"),
        })
    }
}

/// A successful upload as reported by the CDN.
#[derive(Debug, Clone, Deserialize)]
pub struct CdnUpload {
    pub public_id: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub renditions: Vec<CdnRendition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CdnRendition {
    pub profile: String,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub bitrate_kbps: Option<u32>,
}

impl From<CdnRendition> for Rendition {
    fn from(r: CdnRendition) -> Self {
        Rendition {
            profile: r.profile,
            url: r.url,
            width: r.width,
            height: r.height,
            bitrate_kbps: r.bitrate_kbps,
        }
    }
}

/// Client for the media CDN vendor.
pub struct MediaCdnClient {
    http: Client,
    config: MediaCdnConfig,
}

impl MediaCdnClient {
    /// Create a new client.
    pub fn new(config: MediaCdnConfig) -> MediaResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("wlink-media/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MediaError::Network)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MediaResult<Self> {
        Self::new(MediaCdnConfig::from_env()?)
    }

    /// Upload a file and request the transcoding profile for its kind.
    pub async fn upload(
        &self,
        kind: MediaKind,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> MediaResult<CdnUpload> {
        if bytes.is_empty() {
            return Err(MediaError::Unsupported("empty upload body".to_string()));
        }

        let url = format!("{}/v1/upload", self.config.base_url);
        let profiles = match kind {
            MediaKind::Video => VIDEO_PROFILES,
            MediaKind::Image => IMAGE_PROFILES,
        }
        .join(",");

        debug!(kind = kind.as_str(), filename, "Uploading media to CDN");

        let response = self
            .with_retry("upload", || async {
                let part = Part::bytes(bytes.clone())
                    .file_name(filename.to_string())
                    .mime_str(content_type)
                    .map_err(|e| MediaError::Unsupported(e.to_string()))?;
                let form = Form::new()
                    .text("kind", kind.as_str())
                    .text("profiles", profiles.clone())
                    .part("file", part);

                let response = self
                    .http
                    .post(&url)
                    .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
                    .timeout(self.config.upload_timeout)
                    .multipart(form)
                    .send()
                    .await?;
                Self::check_status(response).await
            })
            .await?;

        let upload: CdnUpload = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        info!(
            public_id = %upload.public_id,
            renditions = upload.renditions.len(),
            "Media uploaded"
        );
        Ok(upload)
    }

    /// Delete an asset by its public id. Callers must not remove their
    /// local record when this fails, or the remote asset is orphaned.
    pub async fn delete(&self, public_id: &str) -> MediaResult<()> {
        let url = format!("{}/v1/assets/{}", self.config.base_url, public_id);

        self.with_retry("delete", || async {
            let response = self
                .http
                .delete(&url)
                .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
                .send()
                .await?;
            Self::check_status(response).await
        })
        .await?;

        info!(public_id, "Media deleted from CDN");
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> MediaResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(MediaError::RequestFailed {
            status: status.as_u16(),
            body,
        })
    }

    /// Execute under the shared vendor retry policy.
    async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> MediaResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MediaResult<T>>,
    {
        let policy = &self.config.retry;
        let mut last_error = None;

        for attempt in 0..=policy.max_retries {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                    let delay = policy.delay_for(attempt, None);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Media CDN call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| MediaError::InvalidResponse("retry loop exhausted".to_string())))
    }
}

/// Extract the CDN public identifier from a delivery URL.
///
/// The public id is the last path segment without its file extension.
pub fn extract_public_id(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let segment = path.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    let id = match segment.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => segment,
    };
    Some(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> MediaCdnConfig {
        MediaCdnConfig {
            base_url,
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            upload_timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_retries: 2,
                base_delay_ms: 1,
                max_delay_ms: 5,
            },
        }
    }

    fn upload_body() -> serde_json::Value {
        serde_json::json!({
            "public_id": "abc123",
            "url": "https://cdn.example.com/assets/abc123.mp4",
            "thumbnail_url": "https://cdn.example.com/assets/abc123.jpg",
            "renditions": [
                {"profile": "720p", "url": "https://cdn.example.com/assets/abc123_720p.mp4", "height": 720}
            ]
        })
    }

    #[tokio::test]
    async fn test_upload_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upload_body()))
            .mount(&server)
            .await;

        let client = MediaCdnClient::new(test_config(server.uri())).unwrap();
        let upload = client
            .upload(MediaKind::Video, "resume.mp4", "video/mp4", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(upload.public_id, "abc123");
        assert_eq!(upload.renditions.len(), 1);
        assert_eq!(upload.renditions[0].profile, "720p");
    }

    #[tokio::test]
    async fn test_upload_retries_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/upload"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upload_body()))
            .mount(&server)
            .await;

        let client = MediaCdnClient::new(test_config(server.uri())).unwrap();
        let upload = client
            .upload(MediaKind::Image, "avatar.png", "image/png", vec![9])
            .await
            .unwrap();
        assert_eq!(upload.public_id, "abc123");
    }

    #[tokio::test]
    async fn test_upload_does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/upload"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = MediaCdnClient::new(test_config(server.uri())).unwrap();
        let result = client
            .upload(MediaKind::Image, "avatar.png", "image/png", vec![9])
            .await;
        assert!(matches!(
            result,
            Err(MediaError::RequestFailed { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected_locally() {
        let server = MockServer::start().await;
        let client = MediaCdnClient::new(test_config(server.uri())).unwrap();
        let result = client
            .upload(MediaKind::Image, "a.png", "image/png", vec![])
            .await;
        assert!(matches!(result, Err(MediaError::Unsupported(_))));
    }

    #[test]
    fn test_extract_public_id() {
        assert_eq!(
            extract_public_id("https://cdn.example.com/assets/abc123.mp4"),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_public_id("https://cdn.example.com/assets/abc123.mp4?sig=x"),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_public_id("https://cdn.example.com/assets/noext"),
            Some("noext".to_string())
        );
        assert_eq!(extract_public_id("https://cdn.example.com/assets/"), None);
    }
}
