//! Read-only view of the screen handed to the map renderer.

use crate::polyline::RouteGeometry;
use crate::ranking::rank_by_distance;
use crate::types::{Coordinate, DistanceEntry};
use crate::view_model::ScreenState;

/// Span of the initial viewport around the user, in degrees.
pub const INITIAL_REGION_DELTA: f64 = 0.05;

pub const USER_MARKER_TITLE: &str = "Your Location";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRegion {
    pub center: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub fn around(center: Coordinate) -> Self {
        Self {
            center,
            latitude_delta: INITIAL_REGION_DELTA,
            longitude_delta: INITIAL_REGION_DELTA,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coordinate: Coordinate,
    pub title: String,
    pub description: Option<String>,
}

/// Everything the renderer needs for one frame.
///
/// `region` is `None` until the location resolves; the renderer shows a
/// full-screen spinner in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSnapshot<'a> {
    pub region: Option<MapRegion>,
    pub markers: Vec<Marker>,
    pub route: Option<&'a RouteGeometry>,
    /// Contents of the selection modal, nearest first, when it is open.
    pub list: Option<Vec<DistanceEntry>>,
    pub is_searching: bool,
    pub is_routing: bool,
}

impl<'a> MapSnapshot<'a> {
    pub fn capture(state: &'a ScreenState) -> Self {
        let Some(location) = state.location() else {
            return Self {
                region: None,
                markers: Vec::new(),
                route: None,
                list: None,
                is_searching: false,
                is_routing: false,
            };
        };

        let mut markers = Vec::with_capacity(state.pharmacies().len() + 1);
        markers.push(Marker {
            coordinate: location,
            title: USER_MARKER_TITLE.to_string(),
            description: None,
        });
        markers.extend(state.pharmacies().iter().map(|pharmacy| Marker {
            coordinate: pharmacy.location,
            title: pharmacy.name.clone(),
            description: Some(pharmacy.address.clone()),
        }));

        let list = state
            .is_list_visible()
            .then(|| rank_by_distance(location, state.pharmacies()));

        Self {
            region: Some(MapRegion::around(location)),
            markers,
            route: state.route(),
            list,
            is_searching: state.is_searching(),
            is_routing: state.is_routing(),
        }
    }

    /// Label for the search button.
    pub fn search_label(&self) -> &'static str {
        if self.is_searching {
            "Loading..."
        } else {
            "Get Nearby Pharmacies"
        }
    }
}
