//! Section documents stored in an object storage bucket.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use tracing::{debug, warn};

use super::blob::{BlobError, BlobStore, Cipher};
use super::document::parse_section;
use super::{section_file_name, DocumentSource};
use crate::domain::{ConfigError, Result, Section};

/// Bucket plus optional folder prefix, written as `bucket[/folder/...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPath {
    bucket: String,
    prefix: Option<String>,
}

impl BucketPath {
    pub fn new(bucket: impl Into<String>, prefix: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.filter(|p| !p.is_empty()),
        }
    }

    /// Parse `bucket` or `bucket/folder/sub`.
    pub fn parse(location: &str) -> Self {
        let location = location.trim_matches('/');
        match location.split_once('/') {
            Some((bucket, prefix)) => Self::new(bucket, Some(prefix.trim_end_matches('/').to_string())),
            None => Self::new(location, None),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key for a section's document.
    pub fn key_for(&self, section_name: &str) -> String {
        let file_name = section_file_name(section_name);
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, file_name),
            None => file_name,
        }
    }
}

/// Reads (and writes) `<prefix>/<section_name>.yml` objects in a bucket.
///
/// With a cipher configured, stored bodies are base64-encoded ciphertext.
pub struct RemoteSource {
    store: Arc<dyn BlobStore>,
    location: BucketPath,
    cipher: Option<Arc<dyn Cipher>>,
    key_id: Option<String>,
}

impl RemoteSource {
    pub fn new(store: Arc<dyn BlobStore>, location: BucketPath) -> Self {
        Self {
            store,
            location,
            cipher: None,
            key_id: None,
        }
    }

    /// Decrypt documents on read and encrypt them on write.
    pub fn with_encryption(mut self, cipher: Arc<dyn Cipher>, key_id: Option<String>) -> Self {
        self.cipher = Some(cipher);
        self.key_id = key_id;
        self
    }

    pub fn location(&self) -> &BucketPath {
        &self.location
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    fn decrypt(&self, cipher: &dyn Cipher, key: &str, body: &[u8]) -> Option<Vec<u8>> {
        let ciphertext = match general_purpose::STANDARD.decode(body.trim_ascii()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Object {} is not valid base64: {}", key, e);
                return None;
            }
        };
        match cipher.decrypt(&ciphertext) {
            Ok(plaintext) => Some(plaintext),
            Err(e) => {
                warn!("Failed to decrypt object {}: {}", key, e);
                None
            }
        }
    }

    fn storage_error(&self, error: BlobError) -> ConfigError {
        match error {
            BlobError::NoSuchBucket(message) => ConfigError::ConfigurationNotFound {
                bucket: self.location.bucket().to_string(),
                message: format!("NoSuchBucket: {}", message),
            },
            other => ConfigError::Storage(other.to_string()),
        }
    }
}

impl DocumentSource for RemoteSource {
    fn read_section(&self, section_name: &str) -> Result<Section> {
        let bucket = self.location.bucket();
        let key = self.location.key_for(section_name);

        let body = match self.store.get_object(bucket, &key) {
            Ok(body) => body,
            Err(BlobError::NoSuchKey { .. }) => {
                debug!("No object for section '{}' at {}/{}", section_name, bucket, key);
                return Ok(Section::new());
            }
            Err(e) => return Err(self.storage_error(e)),
        };

        let contents = match &self.cipher {
            Some(cipher) => match self.decrypt(cipher.as_ref(), &key, &body) {
                Some(plaintext) => plaintext,
                None => return Ok(Section::new()),
            },
            None => body,
        };

        Ok(parse_section(&format!("{}/{}", bucket, key), &contents))
    }

    fn write_section(&self, section_name: &str, contents: &[u8]) -> Result<Vec<u8>> {
        let body = match &self.cipher {
            Some(cipher) => {
                let ciphertext = cipher
                    .encrypt(self.key_id.as_deref(), contents)
                    .map_err(|e| ConfigError::Crypto(e.to_string()))?;
                general_purpose::STANDARD.encode(ciphertext).into_bytes()
            }
            None => contents.to_vec(),
        };

        let key = self.location.key_for(section_name);
        self.store
            .put_object(self.location.bucket(), &key, body.clone())
            .map_err(|e| self.storage_error(e))?;
        debug!("Stored section '{}' at {}/{}", section_name, self.location.bucket(), key);
        Ok(body)
    }

    fn name(&self) -> String {
        format!("bucket:{}", self.location.bucket())
    }
}

impl fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource")
            .field("location", &self.location)
            .field("encrypted", &self.is_encrypted())
            .field("key_id", &self.key_id)
            .finish()
    }
}
