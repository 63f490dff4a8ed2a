//! Repository for media asset mirror records.

use wlink_models::{MediaAsset, MediaId};

use crate::client::StoreClient;
use crate::error::StoreResult;

const COLLECTION: &str = "media";

/// Repository for the `media` collection.
pub struct MediaRepository {
    client: StoreClient,
}

impl MediaRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &MediaId) -> StoreResult<Option<MediaAsset>> {
        super::fetch(&self.client, COLLECTION, id.as_str()).await
    }

    pub async fn create(&self, asset: &MediaAsset) -> StoreResult<()> {
        super::insert(&self.client, COLLECTION, asset.id.as_str(), asset).await
    }

    /// Remove the local record. Callers must have deleted the CDN-side
    /// asset first; a remote failure aborts before reaching this point.
    pub async fn delete(&self, id: &MediaId) -> StoreResult<()> {
        self.client.delete_document(COLLECTION, id.as_str()).await
    }
}
