use std::sync::Arc;

use lks_storage::ObjectStore;

use crate::{ApiConfig, error::UpstreamError, upstream::UsersApi};

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct ApiState {
    pub users: UsersApi,
    pub storage: Arc<dyn ObjectStore>,
    pub bucket: String,
    pub region: String,
}

impl ApiState {
    pub fn new(config: &ApiConfig, storage: Arc<dyn ObjectStore>) -> Result<Self, UpstreamError> {
        Ok(Self {
            users: UsersApi::new(&config.api_url)?,
            storage,
            bucket: config.s3_bucket.clone(),
            region: config.aws_region.clone(),
        })
    }

    /// Public URL of an object in the configured bucket.
    pub fn image_url(&self, key: &str) -> String {
        lks_storage::object_url(&self.bucket, &self.region, key)
    }

    pub fn bucket_base_url(&self) -> String {
        lks_storage::bucket_base_url(&self.bucket, &self.region)
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("users", &self.users)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
