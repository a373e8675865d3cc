//! Distance matrix and derived travel-time matrix over an ordered point
//! list, depot at index 0, deliveries at 1..n (SPEC_FULL.md §2).

use crate::model::Point;

#[derive(Debug, Clone)]
pub struct TravelTimeMatrix {
    distance: Vec<Vec<f64>>,
    time: Vec<Vec<f64>>,
}

impl TravelTimeMatrix {
    /// `speed` is in distance-units per minute; travel time is Euclidean
    /// distance divided by speed. A `speed` of 0.1 reproduces the "10 *
    /// Euclidean" convention used by the scenario fixtures in SPEC_FULL.md §8.
    pub fn build(points: &[Point], speed: f64) -> Self {
        assert!(speed > 0.0, "travel speed must be positive");
        let n = points.len();
        let mut distance = vec![vec![0.0; n]; n];
        let mut time = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                let d = points[i].euclidean(&points[j]);
                distance[i][j] = d;
                time[i][j] = d / speed;
            }
        }
        Self { distance, time }
    }

    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distance[from][to]
    }

    pub fn time(&self, from: usize, to: usize) -> f64 {
        self.time[from][to]
    }
}
