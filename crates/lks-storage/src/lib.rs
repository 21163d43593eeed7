//! Object storage for user images.
//!
//! The gateway only ever writes objects; reads go straight from the browser
//! to the bucket through the public URL built by [`object_url`].

pub mod s3;

pub use s3::{S3Settings, S3Store};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Key prefix under which user images are stored.
pub const USER_IMAGE_PREFIX: &str = "users/";

#[derive(Error, Debug)]
pub enum StorageError {
    /// The store rejected or failed the upload. The message is the raw
    /// underlying error text and is surfaced to the client as-is.
    #[error("{0}")]
    Upload(String),
    #[error("storage configuration error: {0}")]
    Config(String),
}

/// A bucket-style object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `body` under `key`, replacing any existing object.
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;
}

/// Object key for an uploaded user image. The client filename is used verbatim.
pub fn user_image_key(filename: &str) -> String {
    format!("{USER_IMAGE_PREFIX}{filename}")
}

/// Public URL of an object. Derived from bucket, region and key; never returned by the store.
pub fn object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3-{region}.amazonaws.com/{key}")
}

/// Base URL used to resolve relative image links on the index page.
pub fn bucket_base_url(bucket: &str, region: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/")
}
