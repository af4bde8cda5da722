//! Seams between the map screen and the outside world.
//!
//! Each trait stands for one external collaborator: the device's location
//! service, the pharmacy backend, and the routing service. The HTTP-backed
//! implementations live in `pharmacy` and `osrm`; tests substitute their own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Coordinate, Pharmacy};

/// Yields the device's current position, once.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Requests permission if needed, then resolves with the first fix.
    ///
    /// Fails with `PermissionDenied` or `LocationUnavailable`. Never retries.
    async fn request_current_location(&self) -> Result<Coordinate>;
}

/// Finds pharmacies near a coordinate.
///
/// Results come back in backend order; ranking is the caller's job.
/// "No results" is an empty vector, not an error.
#[async_trait]
pub trait PharmacyDirectory: Send + Sync {
    async fn find_nearby(&self, origin: Coordinate, credential: &str) -> Result<Vec<Pharmacy>>;
}

/// Fetches a driving route between two points.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Returns the encoded polyline geometry of the first route candidate.
    async fn fetch_route(&self, origin: Coordinate, destination: Coordinate) -> Result<String>;
}

#[async_trait]
impl<T: LocationSource + ?Sized> LocationSource for Arc<T> {
    async fn request_current_location(&self) -> Result<Coordinate> {
        (**self).request_current_location().await
    }
}

#[async_trait]
impl<T: PharmacyDirectory + ?Sized> PharmacyDirectory for Arc<T> {
    async fn find_nearby(&self, origin: Coordinate, credential: &str) -> Result<Vec<Pharmacy>> {
        (**self).find_nearby(origin, credential).await
    }
}

#[async_trait]
impl<T: RouteProvider + ?Sized> RouteProvider for Arc<T> {
    async fn fetch_route(&self, origin: Coordinate, destination: Coordinate) -> Result<String> {
        (**self).fetch_route(origin, destination).await
    }
}
