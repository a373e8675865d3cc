use serde::{Deserialize, Serialize};

/// A geographic coordinate. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn euclidean(&self, other: &Point) -> f64 {
        let dx = self.lat - other.lat;
        let dy = self.lng - other.lng;
        (dx * dx + dy * dy).sqrt()
    }
}
