//! CDN-backed media asset models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::user::UserId;

/// Unique identifier for a media asset record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of asset, which selects the CDN transcoding profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(MediaKind::Video),
            "image" => Some(MediaKind::Image),
            _ => None,
        }
    }
}

/// One transcoded representation returned by the CDN.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Rendition {
    /// Profile name ("720p", "480p", "optimized", ...)
    pub profile: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
}

/// Local mirror of an asset hosted on the media CDN.
///
/// Deleting the parent that references this asset must cascade to the
/// CDN side first; a CDN failure aborts local deletion so the remote
/// asset is never orphaned without a local pointer to it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaAsset {
    pub id: MediaId,

    /// Owning user account
    pub owner: UserId,

    pub kind: MediaKind,

    /// Primary delivery URL
    pub url: String,

    /// CDN-side identifier used for deletion
    pub public_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Transcoded representations (multiple for video, one for image)
    #[serde(default)]
    pub renditions: Vec<Rendition>,

    pub created_at: DateTime<Utc>,
}

impl MediaAsset {
    pub fn new(
        owner: UserId,
        kind: MediaKind,
        url: impl Into<String>,
        public_id: impl Into<String>,
    ) -> Self {
        Self {
            id: MediaId::new(),
            owner,
            kind,
            url: url.into(),
            public_id: public_id.into(),
            thumbnail_url: None,
            renditions: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_round_trip() {
        assert_eq!(MediaKind::parse("video"), Some(MediaKind::Video));
        assert_eq!(MediaKind::parse("image"), Some(MediaKind::Image));
        assert_eq!(MediaKind::parse("audio"), None);
    }
}
