//! S3-compatible object store
//!
//! Works against AWS S3 and S3-compatible services (DigitalOcean Spaces,
//! Cloudflare R2, MinIO) through a custom endpoint with path-style
//! addressing.
//!
//! # Environment Variables
//!
//! The variable names are configurable; defaults shown.
//!
//! | Variable | Description |
//! |---|---|
//! | `STORE_ACCESS_KEY_ID` | Access key for the bucket |
//! | `STORE_SECRET_ACCESS_KEY` | Secret key for the bucket |

use crate::config::StoreConfig;
use crate::sync::store::{ObjectStore, StoreError};
use crate::ConfigError;
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

/// Object store backed by `aws-sdk-s3`
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Builds a client from configuration, reading credentials from the
    /// environment variables it names
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] if a credential variable is unset.
    pub fn from_config(config: &StoreConfig) -> Result<Self, ConfigError> {
        let access_key = require_env(&config.access_key_env)?;
        let secret_key = require_env(&config.secret_key_env)?;
        let credentials = Credentials::new(&access_key, &secret_key, None, None, "mirror-env");

        let s3_config = aws_sdk_s3::Config::builder()
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                // A missing object means "nothing recorded yet"
                let missing = err
                    .as_service_error()
                    .is_some_and(GetObjectError::is_no_such_key)
                    || err
                        .raw_response()
                        .is_some_and(|response| response.status().as_u16() == 404);
                if missing {
                    return Ok(None);
                }
                return Err(StoreError::Read {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    source: Box::new(err),
                });
            }
        };

        let bytes = output.body.collect().await.map_err(|e| StoreError::Read {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            source: Box::new(e),
        })?;

        Ok(Some(bytes.into_bytes().to_vec()))
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StoreError::Write {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source: Box::new(e),
            })?;

        tracing::debug!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv(name.to_string()))
}
