//! Client for the upstream users API.
//!
//! Every call is attempted exactly once with a fixed timeout. Status codes
//! are returned to the caller untouched; only transport failures are errors.

use std::time::Duration;

use axum::{body::Bytes, http::StatusCode};
use serde::de::IgnoredAny;

use crate::{
    error::UpstreamError,
    user::model::{NewUser, User},
};

/// Timeout applied to every upstream call.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and raw body of an upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_json(&self) -> bool {
        serde_json::from_slice::<IgnoredAny>(&self.body).is_ok()
    }

    pub fn json(&self) -> Result<serde_json::Value, UpstreamError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    async fn read(response: reqwest::Response) -> Result<Self, UpstreamError> {
        let status = response.status();
        let body = response.bytes().await?;
        Ok(Self { status, body })
    }
}

#[derive(Clone, Debug)]
pub struct UsersApi {
    client: reqwest::Client,
    base_url: String,
}

impl UsersApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn user_url(&self, id: i64) -> String {
        format!("{}/{id}", self.base_url)
    }

    /// `GET <base>`, decoded as a list of users.
    pub async fn list(&self) -> Result<Vec<User>, UpstreamError> {
        let response = self.client.get(&self.base_url).send().await?;
        tracing::debug!(status = %response.status(), "User list fetched");
        let body = response.bytes().await?;
        let records: Vec<serde_json::Value> = serde_json::from_slice(&body)?;

        Ok(records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed user record");
                    None
                }
            })
            .collect())
    }

    /// `GET <base>?email=<email>`. The upstream signals a taken email with 409.
    pub async fn check_email(&self, email: &str) -> Result<StatusCode, UpstreamError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("email", email)])
            .send()
            .await?;
        Ok(response.status())
    }

    /// `POST <base>` with the user as JSON.
    pub async fn create(&self, user: &NewUser) -> Result<StatusCode, UpstreamError> {
        let response = self.client.post(&self.base_url).json(user).send().await?;
        Ok(response.status())
    }

    /// `GET <base>/<id>`.
    pub async fn get(&self, id: i64) -> Result<UpstreamResponse, UpstreamError> {
        let response = self.client.get(self.user_url(id)).send().await?;
        UpstreamResponse::read(response).await
    }

    /// `PUT <base>/<id>` with `body` forwarded as JSON.
    pub async fn update(
        &self,
        id: i64,
        body: &serde_json::Value,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let response = self.client.put(self.user_url(id)).json(body).send().await?;
        UpstreamResponse::read(response).await
    }

    /// `DELETE <base>/<id>`.
    pub async fn delete(&self, id: i64) -> Result<UpstreamResponse, UpstreamError> {
        let response = self.client.delete(self.user_url(id)).send().await?;
        UpstreamResponse::read(response).await
    }
}
