//! Location upload to the backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::debug;

use crate::error::PresenceError;

/// Body of a location update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Sends location updates on behalf of the authenticated worker.
#[async_trait]
pub trait LocationUploader: Send + Sync {
    async fn upload(&self, token: &str, update: LocationUpdate) -> Result<(), PresenceError>;
}

/// Posts updates as JSON to the backend's worker location endpoint.
pub struct HttpLocationUploader {
    client: reqwest::Client,
    url: String,
}

impl HttpLocationUploader {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, PresenceError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| PresenceError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl LocationUploader for HttpLocationUploader {
    async fn upload(&self, token: &str, update: LocationUpdate) -> Result<(), PresenceError> {
        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .json(&update)
            .send()
            .await
            .map_err(|e| PresenceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PresenceError::Rejected {
                status: status.as_u16(),
            });
        }
        debug!(
            latitude = update.latitude,
            longitude = update.longitude,
            "Location update accepted"
        );
        Ok(())
    }
}
