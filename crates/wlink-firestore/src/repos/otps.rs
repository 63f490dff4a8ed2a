//! One-time-passcode storage for email verification.
//!
//! One record per email address; issuing a new code replaces the old
//! one. Codes are stored hashed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::client::StoreClient;
use crate::error::StoreResult;
use crate::types::to_fields;

const COLLECTION: &str = "otps";

/// How long an issued code stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Verification attempts allowed before the code is burned.
pub const OTP_MAX_ATTEMPTS: u32 = 5;

/// A pending email verification code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
}

impl OtpRecord {
    /// Create a record for a freshly issued code.
    pub fn new(email: impl Into<String>, code: &str) -> Self {
        Self {
            email: email.into(),
            code_hash: hash_code(code),
            expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
            attempts: 0,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check a submitted code against the stored hash.
    pub fn matches(&self, code: &str) -> bool {
        self.code_hash == hash_code(code)
    }
}

fn hash_code(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Repository for the `otps` collection, keyed by email.
pub struct OtpRepository {
    client: StoreClient,
}

impl OtpRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, email: &str) -> StoreResult<Option<OtpRecord>> {
        super::fetch(&self.client, COLLECTION, email).await
    }

    /// Store a record, replacing any previous code for the email.
    pub async fn put(&self, record: &OtpRecord) -> StoreResult<()> {
        let fields = to_fields(record)?;
        self.client
            .update_document(COLLECTION, &record.email, fields, None)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, email: &str) -> StoreResult<()> {
        self.client.delete_document(COLLECTION, email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record_is_not_expired() {
        let record = OtpRecord::new("a@b.com", "123456");
        assert!(!record.is_expired());
        assert_eq!(record.attempts, 0);
    }

    #[test]
    fn test_code_matching_is_hash_based() {
        let record = OtpRecord::new("a@b.com", "123456");
        assert_ne!(record.code_hash, "123456");
        assert!(record.matches("123456"));
        assert!(!record.matches("654321"));
    }
}
