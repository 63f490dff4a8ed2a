//! Media assets: CDN upload plus the local mirror record.

use std::sync::Arc;

use tracing::{info, warn};

use wlink_firestore::{MediaRepository, StoreClient};
use wlink_media::MediaCdnClient;
use wlink_models::{MediaAsset, MediaId, MediaKind, Rendition, UserId};

use crate::error::{ApiError, ApiResult};

/// Service pairing the CDN with the `media` collection.
#[derive(Clone)]
pub struct MediaLibrary {
    store: Arc<StoreClient>,
    cdn: Arc<MediaCdnClient>,
}

impl MediaLibrary {
    pub fn new(store: Arc<StoreClient>, cdn: Arc<MediaCdnClient>) -> Self {
        Self { store, cdn }
    }

    fn media(&self) -> MediaRepository {
        MediaRepository::new((*self.store).clone())
    }

    /// Upload to the CDN with the kind's transcoding profile, then
    /// persist the mirror record.
    pub async fn upload(
        &self,
        owner: &UserId,
        kind: MediaKind,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<MediaAsset> {
        let upload = self.cdn.upload(kind, filename, content_type, bytes).await?;

        let mut asset = MediaAsset::new(owner.clone(), kind, upload.url, upload.public_id);
        asset.thumbnail_url = upload.thumbnail_url;
        asset.renditions = upload.renditions.into_iter().map(Rendition::from).collect();

        self.media().create(&asset).await?;
        info!(media = %asset.id, owner = %owner, "Recorded media asset");
        Ok(asset)
    }

    pub async fn get(&self, id: &MediaId) -> ApiResult<MediaAsset> {
        self.media()
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Media asset"))
    }

    /// Delete an asset: CDN side first, by public id. A CDN failure
    /// aborts before the local record is touched, so a remote asset is
    /// never left behind without its pointer.
    pub async fn delete(&self, caller: &UserId, id: &MediaId) -> ApiResult<()> {
        let asset = self.get(id).await?;
        if &asset.owner != caller {
            return Err(ApiError::forbidden("Media belongs to a different user"));
        }

        self.cdn.delete(&asset.public_id).await?;
        self.media().delete(id).await?;
        info!(media = %id, "Deleted media asset");
        Ok(())
    }

    /// Cascade used when a profile video is replaced: failure only
    /// logs, so the replacement itself still succeeds.
    pub async fn delete_replaced(&self, caller: &UserId, id: &MediaId) {
        if let Err(e) = self.delete(caller, id).await {
            warn!(media = %id, "Failed to delete replaced media: {}", e);
        }
    }
}
