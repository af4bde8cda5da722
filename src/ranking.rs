//! Ranking pharmacies by straight-line distance.

use crate::haversine::distance_km;
use crate::types::{Coordinate, DistanceEntry, Pharmacy};

/// Pairs every pharmacy with its distance from `origin`, nearest first.
///
/// The sort is stable: pharmacies at equal distance keep their input order.
pub fn rank_by_distance(origin: Coordinate, pharmacies: &[Pharmacy]) -> Vec<DistanceEntry> {
    let mut entries: Vec<DistanceEntry> = pharmacies
        .iter()
        .map(|pharmacy| DistanceEntry {
            distance_km: distance_km(origin, pharmacy.location),
            pharmacy: pharmacy.clone(),
        })
        .collect();

    entries.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    entries
}
