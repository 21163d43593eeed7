use async_trait::async_trait;
use bytes::Bytes;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    Client,
    config::Credentials,
    error::DisplayErrorContext,
    primitives::ByteStream,
};

use crate::{ObjectStore, StorageError};

/// Connection settings for [`S3Store`].
///
/// When no static access key is given, credentials come from the default
/// provider chain (environment, profile, instance role).
#[derive(Clone, Debug, Default)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

/// S3-backed [`ObjectStore`] bound to a single bucket.
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub async fn connect(settings: &S3Settings) -> Result<Self, StorageError> {
        if settings.bucket.is_empty() {
            return Err(StorageError::Config("bucket name is empty".to_string()));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        match (&settings.access_key_id, &settings.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                loader = loader.credentials_provider(Credentials::new(
                    key_id,
                    secret,
                    settings.session_token.clone(),
                    None,
                    "lks-static",
                ));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(StorageError::Config(
                    "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".to_string(),
                ));
            }
            (None, None) => {
                tracing::debug!("No static AWS credentials configured, using default chain");
            }
        }

        let config = loader.load().await;

        Ok(Self {
            client: Client::new(&config),
            bucket: settings.bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| StorageError::Upload(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key, "Object stored");
        Ok(())
    }
}
