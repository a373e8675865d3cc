//! The route evaluator (SPEC_FULL.md §4.1). Pure and deterministic; every
//! optimizer in `optimize/` must funnel its cost comparisons through this
//! function so costs stay comparable across algorithms.

use ordered_float::OrderedFloat;

use crate::geometry::TravelTimeMatrix;

/// Lexicographic cost: penalty first, on-road duration second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteCost {
    pub penalty: f64,
    pub duration: f64,
}

impl RouteCost {
    pub const fn zero() -> Self {
        Self {
            penalty: 0.0,
            duration: 0.0,
        }
    }

    /// Sentinel for a DP cell or chromosome that could not produce a
    /// feasible solution (SPEC_FULL.md §4.7, infeasibility penalty).
    pub const fn infeasible() -> Self {
        Self {
            penalty: f64::INFINITY,
            duration: f64::INFINITY,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        self.penalty.is_infinite() || self.duration.is_infinite()
    }

    pub fn add(&self, other: &Self) -> Self {
        Self {
            penalty: self.penalty + other.penalty,
            duration: self.duration + other.duration,
        }
    }

    fn key(&self) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        (OrderedFloat(self.penalty), OrderedFloat(self.duration))
    }
}

impl Eq for RouteCost {}

impl PartialOrd for RouteCost {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RouteCost {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Debug, Clone)]
pub struct EvalResult {
    pub cost: RouteCost,
    pub arrivals: Vec<f64>,
}

/// `sequence` holds point indices (depot excluded); `deadlines` is indexed by
/// point index (the depot's entry, index 0, is never read). `t0` is the
/// vehicle's departure time from the depot, in minutes relative to whatever
/// reference timestamp the caller chose (SPEC_FULL.md §4.1).
pub fn evaluate_sequence(
    sequence: &[usize],
    t0: f64,
    travel: &TravelTimeMatrix,
    deadlines: &[f64],
) -> EvalResult {
    const DEPOT: usize = 0;
    let mut t = t0;
    let mut prev = DEPOT;
    let mut penalty = 0.0;
    let mut arrivals = Vec::with_capacity(sequence.len());

    for &d in sequence {
        t += travel.time(prev, d);
        arrivals.push(t);
        penalty += (t - deadlines[d]).max(0.0);
        prev = d;
    }

    let duration = match sequence.last() {
        Some(&last) => (t + travel.time(last, DEPOT)) - t0,
        None => 0.0,
    };

    EvalResult {
        cost: RouteCost { penalty, duration },
        arrivals,
    }
}
