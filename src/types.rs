//! Core value types shared by every component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rounds both axes to the 5-decimal precision used by polyline encoding.
    pub fn rounded(&self) -> Self {
        Self {
            latitude: (self.latitude * 1e5).round() / 1e5,
            longitude: (self.longitude * 1e5).round() / 1e5,
        }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// Stable identity of a pharmacy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PharmacyId(String);

impl PharmacyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds a key for records the backend sent without an identifier.
    pub fn synthesize(name: &str, address: &str, location: Coordinate) -> Self {
        Self(format!(
            "{}|{}|{:.5},{:.5}",
            name, address, location.latitude, location.longitude
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PharmacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pharmacy as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pharmacy {
    pub id: PharmacyId,
    pub name: String,
    pub address: String,
    pub location: Coordinate,
}

impl Pharmacy {
    pub fn new(
        id: PharmacyId,
        name: impl Into<String>,
        address: impl Into<String>,
        location: Coordinate,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            location,
        }
    }
}

/// Wire shape of a pharmacy record: `{ id|_id?, name, address, location: { lat, lng } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct PharmacyRecord {
    #[serde(default, alias = "_id")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    address: String,
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<PharmacyRecord> for Pharmacy {
    fn from(record: PharmacyRecord) -> Self {
        let location = Coordinate::new(record.location.lat, record.location.lng);
        let id = match record.id {
            Some(id) if !id.is_empty() => PharmacyId::new(id),
            _ => PharmacyId::synthesize(&record.name, &record.address, location),
        };

        Self {
            id,
            name: record.name,
            address: record.address,
            location,
        }
    }
}

/// A pharmacy paired with its distance from a reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceEntry {
    pub pharmacy: Pharmacy,
    pub distance_km: f64,
}

impl DistanceEntry {
    /// Distance formatted for display, e.g. `"3.20 km"`.
    pub fn label(&self) -> String {
        format!("{:.2} km", self.distance_km)
    }
}
