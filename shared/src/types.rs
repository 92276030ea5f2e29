//! Common types used across the platform

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kilometres per degree of latitude (equirectangular approximation)
pub const KM_PER_DEGREE: f64 = 111.32;

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl GpsCoordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Coordinates rounded to 4 decimals (~11 m), used for cache keys and seeds
    pub fn rounded(&self) -> (f64, f64) {
        let round = |v: f64| (v * 10_000.0).round() / 10_000.0;
        (round(self.longitude), round(self.latitude))
    }

    /// Bounding box around this point with the given buffer radius in km
    pub fn bbox(&self, buffer_km: f64) -> BoundingBox {
        BoundingBox::around(*self, buffer_km)
    }
}

/// Geographic bounding box `[west, south, east, north]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Build a box from a center point and buffer radius.
    ///
    /// Uses `buffer_km / 111.32` degrees on both axes, which ignores the
    /// longitude shrink towards the poles. Good enough at farm scale.
    pub fn around(center: GpsCoordinates, buffer_km: f64) -> Self {
        let delta = buffer_km.max(0.0) / KM_PER_DEGREE;
        Self {
            west: (center.longitude - delta).max(-180.0),
            south: (center.latitude - delta).max(-90.0),
            east: (center.longitude + delta).min(180.0),
            north: (center.latitude + delta).min(90.0),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn contains(&self, point: GpsCoordinates) -> bool {
        point.longitude >= self.west
            && point.longitude <= self.east
            && point.latitude >= self.south
            && point.latitude <= self.north
    }
}

/// Date range for queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, swapping the bounds if they arrive reversed
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// The last `days` days ending today (UTC)
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now().date_naive();
        Self::new(end - Duration::days(days), end)
    }

    /// STAC `datetime` interval covering both days completely
    pub fn to_stac_interval(&self) -> String {
        format!(
            "{}T00:00:00Z/{}T23:59:59Z",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::last_days(30)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
