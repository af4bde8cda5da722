//! OSRM HTTP adapter for driving routes.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{LocatorError, Result};
use crate::traits::RouteProvider;
use crate::types::Coordinate;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Route URL for `origin` to `destination`.
    ///
    /// OSRM takes `longitude,latitude` pairs.
    pub fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        let coords = [origin, destination]
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.longitude, c.latitude))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=polyline",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }
}

#[async_trait]
impl RouteProvider for OsrmClient {
    async fn fetch_route(&self, origin: Coordinate, destination: Coordinate) -> Result<String> {
        let url = self.route_url(origin, destination);
        debug!(%url, "requesting route");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body: OsrmRouteResponse = match response.json().await {
            Ok(body) => body,
            // OSRM answers NoRoute/NoSegment with a 400 and a JSON body; anything
            // unparseable on an error status is a plain HTTP failure.
            Err(err) if !status.is_success() => {
                warn!(%status, "route request failed");
                return Err(LocatorError::Backend {
                    status: status.as_u16(),
                    message: Some(err.to_string()),
                });
            }
            Err(err) => return Err(err.into()),
        };

        if body.code.as_deref().is_some_and(is_no_route_code) {
            debug!(code = ?body.code, "router reported no route");
            return Err(LocatorError::NoRouteFound);
        }
        if !status.is_success() {
            warn!(%status, code = ?body.code, "route request failed");
            return Err(LocatorError::Backend {
                status: status.as_u16(),
                message: body.message.or(body.code),
            });
        }

        // Only the first candidate is used; alternates are discarded.
        body.routes
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|route| route.geometry)
            .filter(|geometry| !geometry.is_empty())
            .ok_or(LocatorError::NoRouteFound)
    }
}

fn is_no_route_code(code: &str) -> bool {
    matches!(code, "NoRoute" | "NoSegment")
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: Option<String>,
    message: Option<String>,
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: Option<String>,
}
