//! Typed repositories over the document store.
//!
//! One repository per collection. Documents cross the wire through the
//! serde bridge in [`crate::types`]; repositories only decide ids,
//! masks and collection names.

mod alerts;
mod billing;
mod individuals;
mod job_ads;
mod media;
mod organizations;
mod otps;
mod users;

pub use alerts::{JobAlertRepository, RecommendationRepository};
pub use billing::{PlanRepository, SubscriptionRepository, TransactionRepository};
pub use individuals::IndividualRepository;
pub use job_ads::JobAdRepository;
pub use media::MediaRepository;
pub use organizations::OrganizationRepository;
pub use otps::{OtpRecord, OtpRepository, OTP_MAX_ATTEMPTS, OTP_TTL_MINUTES};
pub use users::UserRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::StoreClient;
use crate::error::StoreResult;
use crate::types::{from_document, to_fields};

/// Fetch one document and bridge it back into a domain type.
pub(crate) async fn fetch<T: DeserializeOwned>(
    client: &StoreClient,
    collection: &str,
    id: &str,
) -> StoreResult<Option<T>> {
    match client.get_document(collection, id).await? {
        Some(doc) => Ok(Some(from_document(&doc)?)),
        None => Ok(None),
    }
}

/// Create one domain document under the given id.
pub(crate) async fn insert<T: Serialize>(
    client: &StoreClient,
    collection: &str,
    id: &str,
    value: &T,
) -> StoreResult<()> {
    let fields = to_fields(value)?;
    client.create_document(collection, id, fields).await?;
    Ok(())
}

/// Replace one domain document under the given id.
pub(crate) async fn replace<T: Serialize>(
    client: &StoreClient,
    collection: &str,
    id: &str,
    value: &T,
) -> StoreResult<()> {
    let fields = to_fields(value)?;
    client.update_document(collection, id, fields, None).await?;
    Ok(())
}
