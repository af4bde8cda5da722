//! pharmacy-locator core
//!
//! Proximity search and driving directions for a pharmacy map screen:
//! device location, nearby search against the pharmacy backend, distance
//! ranking, OSRM routes and polyline decoding, tied together by a screen
//! state machine.

pub mod cancel;
pub mod config;
pub mod error;
pub mod haversine;
pub mod location;
pub mod notice;
pub mod osrm;
pub mod pharmacy;
pub mod polyline;
pub mod ranking;
pub mod snapshot;
pub mod traits;
pub mod types;
pub mod view_model;

pub use error::{LocatorError, Result};
pub use types::{Coordinate, DistanceEntry, Pharmacy, PharmacyId};
pub use view_model::MapViewModel;
