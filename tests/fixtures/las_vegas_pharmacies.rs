//! Las Vegas area pharmacies for realistic test fixtures.

use pharmacy_locator::{Coordinate, Pharmacy, PharmacyId};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub id: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        address: &'static str,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            id,
            name,
            address,
            lat,
            lng,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    pub fn pharmacy(&self) -> Pharmacy {
        Pharmacy::new(
            PharmacyId::new(self.id),
            self.name,
            self.address,
            self.coordinate(),
        )
    }

    /// The record as the backend serializes it.
    pub fn json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "address": self.address,
            "location": { "lat": self.lat, "lng": self.lng },
        })
    }
}

/// Where the user stands: the Bellagio fountains.
pub const USER: Location = Location::new(
    "user",
    "Bellagio",
    "3600 S Las Vegas Blvd",
    36.1126,
    -115.1767,
);

/// Listed in backend order, which is deliberately not nearest-first.
pub const PHARMACIES: &[Location] = &[
    Location::new(
        "ph-henderson",
        "Green Valley Pharmacy",
        "2460 W Horizon Ridge Pkwy",
        36.0190,
        -115.0870,
    ),
    Location::new("ph-strip", "Strip Drugs", "3717 S Las Vegas Blvd", 36.1075, -115.1722),
    Location::new("ph-downtown", "Fremont Apothecary", "301 Fremont St", 36.1710, -115.1436),
    Location::new("ph-flamingo", "Flamingo Rx", "3555 S Las Vegas Blvd", 36.1162, -115.1745),
];

pub fn pharmacies() -> Vec<Pharmacy> {
    PHARMACIES.iter().map(Location::pharmacy).collect()
}

pub fn pharmacies_json() -> serde_json::Value {
    serde_json::Value::Array(PHARMACIES.iter().map(Location::json).collect())
}
