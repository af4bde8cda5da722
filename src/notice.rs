//! User-visible alerts raised by the map screen.

use crate::error::LocatorError;

const FALLBACK_ERROR: &str = "An error occurred.";

/// An alert the screen should show. Every failure ends up as one of these;
/// none of them is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PermissionDenied,
    LocationUnavailable,
    /// A search was attempted before the location resolved.
    LocationNotReady,
    /// A search was attempted without a credential.
    NotSignedIn,
    NoPharmaciesFound,
    SearchFailed { message: Option<String> },
    NoRouteFound,
    DirectionsFailed,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Self::LocationNotReady => "Location Not Available",
            Self::NoPharmaciesFound => "No Pharmacies Found",
            _ => "Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::PermissionDenied => "Permission to access location was denied",
            Self::LocationUnavailable => "Your location could not be determined.",
            Self::LocationNotReady => "Please try again.",
            Self::NotSignedIn => "Authentication token not found. Please log in again.",
            Self::NoPharmaciesFound => "No nearby pharmacies were found.",
            Self::SearchFailed { message } => message.as_deref().unwrap_or(FALLBACK_ERROR),
            Self::NoRouteFound => "No route found.",
            Self::DirectionsFailed => "Failed to fetch directions.",
        }
    }

    pub(crate) fn from_location_error(err: &LocatorError) -> Self {
        match err {
            LocatorError::PermissionDenied => Self::PermissionDenied,
            _ => Self::LocationUnavailable,
        }
    }

    pub(crate) fn from_search_error(err: &LocatorError) -> Self {
        match err {
            LocatorError::Unauthenticated => Self::NotSignedIn,
            LocatorError::Backend { message, .. } => Self::SearchFailed {
                message: message.clone(),
            },
            _ => Self::SearchFailed { message: None },
        }
    }

    pub(crate) fn from_route_error(err: &LocatorError) -> Self {
        if err.is_route_failure() {
            Self::NoRouteFound
        } else {
            Self::DirectionsFailed
        }
    }
}
