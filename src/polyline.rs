//! Encoded polyline codec and the decoded route geometry.
//!
//! Implements the standard polyline algorithm used by OSRM and most map
//! APIs: each coordinate is stored as a delta from the previous one, scaled
//! by 1e5, zig-zag signed, then split into 5-bit chunks with a continuation
//! bit and offset into printable ASCII.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Coordinate;

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: u64 = 0x1f;
const CONTINUATION: u64 = 0x20;
const ASCII_OFFSET: u8 = 63;
// The largest byte a chunk can produce is 63 + 0x3f.
const MAX_BYTE: u8 = ASCII_OFFSET + 0x3f;
const MAX_SHIFT: u32 = 60;
const MAX_LATITUDE: i64 = 90 * 100_000;
const MAX_LONGITUDE: i64 = 180 * 100_000;

/// Why an encoded polyline could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("polyline truncated at byte {position}: continuation bit never cleared")]
    Truncated { position: usize },

    #[error("invalid polyline byte {byte:#04x} at position {position}")]
    InvalidByte { position: usize, byte: u8 },

    #[error("polyline value starting at byte {position} overflows 64 bits")]
    Overflow { position: usize },

    #[error("polyline ends with a latitude at byte {position} but no longitude")]
    UnpairedLatitude { position: usize },

    #[error("polyline point starting at byte {position} lies outside valid coordinates")]
    OutOfRange { position: usize },
}

/// Decodes an encoded polyline into coordinates.
///
/// An empty string yields an empty sequence.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut position = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while position < bytes.len() {
        let lat_start = position;
        lat = accumulate(lat, read_value(bytes, &mut position)?, lat_start)?;
        if position >= bytes.len() {
            return Err(DecodeError::UnpairedLatitude {
                position: lat_start,
            });
        }
        let lng_start = position;
        lng = accumulate(lng, read_value(bytes, &mut position)?, lng_start)?;

        if !(-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat)
            || !(-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lng)
        {
            return Err(DecodeError::OutOfRange {
                position: lat_start,
            });
        }

        points.push(Coordinate::new(
            lat as f64 / PRECISION,
            lng as f64 / PRECISION,
        ));
    }

    Ok(points)
}

/// Encodes coordinates as a polyline.
///
/// Coordinates are rounded to 5 decimal places; `decode(&encode(p))`
/// returns `p` exactly when every point of `p` is already rounded.
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = scale(point.latitude);
        let lng = scale(point.longitude);
        write_value(lat - prev_lat, &mut out);
        write_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn scale(degrees: f64) -> i64 {
    (degrees * PRECISION).round() as i64
}

fn accumulate(total: i64, delta: i64, position: usize) -> Result<i64, DecodeError> {
    total
        .checked_add(delta)
        .ok_or(DecodeError::Overflow { position })
}

fn read_value(bytes: &[u8], position: &mut usize) -> Result<i64, DecodeError> {
    let start = *position;
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*position) else {
            return Err(DecodeError::Truncated { position: start });
        };
        if !(ASCII_OFFSET..=MAX_BYTE).contains(&byte) {
            return Err(DecodeError::InvalidByte {
                position: *position,
                byte,
            });
        }
        if shift > MAX_SHIFT {
            return Err(DecodeError::Overflow { position: start });
        }
        *position += 1;

        let chunk = u64::from(byte - ASCII_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    // zig-zag
    let value = (result >> 1) as i64;
    Ok(if result & 1 == 1 { !value } else { value })
}

fn write_value(value: i64, out: &mut String) {
    let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;

    while zigzag >= CONTINUATION {
        let chunk = (CONTINUATION | (zigzag & CHUNK_MASK)) as u8 + ASCII_OFFSET;
        out.push(char::from(chunk));
        zigzag >>= CHUNK_BITS;
    }
    out.push(char::from(zigzag as u8 + ASCII_OFFSET));
}

/// A route geometry as decoded coordinates.
///
/// Decoded once from the router's polyline and never mutated afterwards;
/// a new route replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    points: Vec<Coordinate>,
}

impl RouteGeometry {
    /// Creates a geometry from already decoded points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline string.
    pub fn decode(encoded: &str) -> Result<Self, DecodeError> {
        decode(encoded).map(Self::new)
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the geometry and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Re-encodes the geometry as a polyline.
    pub fn encode(&self) -> String {
        encode(&self.points)
    }
}
