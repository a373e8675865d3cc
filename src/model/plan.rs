use std::collections::BTreeMap;

use serde::Serialize;

use super::delivery::DeliveryId;
use super::vehicle::VehicleId;

/// One vehicle's entry in a route plan: the visit sequence plus the intended
/// departure time from the depot, as decided by the dispatch policy.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub sequence: Vec<DeliveryId>,
    pub departure_time: f64,
}

/// Output of a decision tick: one entry per vehicle that received a
/// non-empty route. Invariants (SPEC_FULL.md §3): every ready delivery
/// appears in at most one entry; each entry's summed size is <= that
/// vehicle's capacity.
pub type RoutePlan = BTreeMap<VehicleId, PlanEntry>;
