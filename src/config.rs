//! Runtime configuration loaded from the environment.

use std::env;
use std::time::Duration;

use crate::error::{LocatorError, Result};
use crate::osrm::OsrmConfig;
use crate::pharmacy::PharmacyApiConfig;

pub const API_HOST_VAR: &str = "PHARMACY_API_HOST";
pub const OSRM_BASE_URL_VAR: &str = "OSRM_BASE_URL";
pub const OSRM_PROFILE_VAR: &str = "OSRM_PROFILE";
pub const TIMEOUT_VAR: &str = "LOCATOR_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct LocatorConfig {
    pub api: PharmacyApiConfig,
    pub router: OsrmConfig,
    /// Upper bound for every external call made by the view model.
    pub request_timeout_secs: u64,
}

impl LocatorConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(API_HOST_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| LocatorError::Config(format!("{API_HOST_VAR} is not set")))?;

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mut router = OsrmConfig {
            timeout_secs,
            ..OsrmConfig::default()
        };
        if let Some(base_url) = lookup(OSRM_BASE_URL_VAR) {
            router.base_url = base_url;
        }
        if let Some(profile) = lookup(OSRM_PROFILE_VAR) {
            router.profile = profile;
        }

        Ok(Self {
            api: PharmacyApiConfig {
                host,
                timeout_secs,
            },
            router,
            request_timeout_secs: timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_timeout(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(LocatorError::Config(format!(
            "{TIMEOUT_VAR} must be a positive number of seconds, got {raw:?}"
        ))),
        Ok(secs) => Ok(secs),
    }
}
