//! HTTP client for the pharmacy backend.
//!
//! Every endpoint is bearer-authenticated. The credential is passed in per
//! call; this crate never stores it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{LocatorError, Result};
use crate::traits::PharmacyDirectory;
use crate::types::{Coordinate, Pharmacy, PharmacyId, PharmacyRecord};

#[derive(Debug, Clone)]
pub struct PharmacyApiConfig {
    /// Base URL of the backend, e.g. `https://api.example.com`.
    pub host: String,
    pub timeout_secs: u64,
}

impl PharmacyApiConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PharmacyApiClient {
    host: String,
    client: Client,
}

impl PharmacyApiClient {
    pub fn new(config: PharmacyApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            host: config.host.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// All pharmacies known to the backend (`GET /pharmacies`).
    pub async fn list_all(&self, credential: &str) -> Result<Vec<Pharmacy>> {
        let request = self.client.get(format!("{}/pharmacies", self.host));
        self.fetch_list(request, credential).await
    }

    /// A single pharmacy by id (`GET /pharmacies/{id}`).
    pub async fn get(&self, id: &PharmacyId, credential: &str) -> Result<Pharmacy> {
        let request = self
            .client
            .get(format!("{}/pharmacies/{}", self.host, id.as_str()));
        let record: PharmacyRecord = self.send(request, credential).await?;
        Ok(record.into())
    }

    async fn fetch_list(&self, request: RequestBuilder, credential: &str) -> Result<Vec<Pharmacy>> {
        let records: Vec<PharmacyRecord> = self.send(request, credential).await?;
        Ok(records.into_iter().map(Pharmacy::from).collect())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, credential: &str) -> Result<T> {
        if credential.trim().is_empty() {
            return Err(LocatorError::Unauthenticated);
        }

        let response = request.bearer_auth(credential).send().await?;
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(%status, "backend rejected credential");
            return Err(LocatorError::Unauthenticated);
        }
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            warn!(%status, ?message, "backend request failed");
            return Err(LocatorError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PharmacyDirectory for PharmacyApiClient {
    async fn find_nearby(&self, origin: Coordinate, credential: &str) -> Result<Vec<Pharmacy>> {
        let request = self
            .client
            .get(format!("{}/pharmacies/nearby-guard", self.host))
            .query(&[("lat", origin.latitude), ("lng", origin.longitude)]);

        let pharmacies = self.fetch_list(request, credential).await?;
        debug!(
            lat = origin.latitude,
            lng = origin.longitude,
            count = pharmacies.len(),
            "nearby pharmacies"
        );
        Ok(pharmacies)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
