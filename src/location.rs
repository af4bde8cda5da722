//! Location sources built on top of a platform position provider.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{LocatorError, Result};
use crate::traits::LocationSource;
use crate::types::Coordinate;

/// Outcome of a foreground location permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not answered and the prompt cannot be shown.
    Undetermined,
}

/// The platform's location API: a one-shot permission prompt and a
/// one-shot position fix.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    /// Resolves with the current position, or a provider error message.
    async fn current_position(&self) -> std::result::Result<Coordinate, String>;
}

/// Location source backed by the device: asks for permission, then takes
/// a single fix.
#[derive(Debug, Clone)]
pub struct DeviceLocation<P> {
    provider: P,
}

impl<P: PositionProvider> DeviceLocation<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: PositionProvider> LocationSource for DeviceLocation<P> {
    async fn request_current_location(&self) -> Result<Coordinate> {
        match self.provider.request_permission().await {
            PermissionStatus::Granted => {}
            status => {
                warn!(?status, "location permission not granted");
                return Err(LocatorError::PermissionDenied);
            }
        }

        let position = self.provider.current_position().await.map_err(|reason| {
            warn!(%reason, "location provider failed");
            LocatorError::LocationUnavailable(reason)
        })?;

        debug!(lat = position.latitude, lng = position.longitude, "location fix");
        Ok(position)
    }
}

/// A location source that always reports the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn request_current_location(&self) -> Result<Coordinate> {
        Ok(self.0)
    }
}
