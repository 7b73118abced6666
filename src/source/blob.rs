//! Object storage and encryption collaborators.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use crate::domain::BoxError;

/// Failure reported by a [`BlobStore`].
#[derive(Debug, Error)]
pub enum BlobError {
    /// The object does not exist in the bucket.
    #[error("NoSuchKey: {bucket}/{key}")]
    NoSuchKey { bucket: String, key: String },

    /// The bucket itself does not exist.
    #[error("NoSuchBucket: {0}")]
    NoSuchBucket(String),

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

/// Object storage client.
pub trait BlobStore: Send + Sync {
    /// Fetch the object body.
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BlobError>;

    /// Store an object body, replacing any existing object.
    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), BlobError>;
}

/// Encryption service used for encrypted documents.
pub trait Cipher: Send + Sync {
    /// Encrypt `plaintext` with the given key, returning the ciphertext blob.
    fn encrypt(&self, key_id: Option<&str>, plaintext: &[u8]) -> Result<Vec<u8>, BoxError>;

    /// Decrypt a ciphertext blob.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, BoxError>;
}

/// In-process [`BlobStore`].
///
/// Buckets must be created before objects can be stored in them.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    buckets: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_bucket(&self, bucket: impl Into<String>) {
        self.buckets.write().entry(bucket.into()).or_default();
    }

    /// Raw stored body, if any.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .read()
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BlobError> {
        let buckets = self.buckets.read();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| BlobError::NoSuchBucket(bucket.to_string()))?;
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NoSuchKey {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), BlobError> {
        let mut buckets = self.buckets.write();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| BlobError::NoSuchBucket(bucket.to_string()))?;
        objects.insert(key.to_string(), body);
        Ok(())
    }
}
