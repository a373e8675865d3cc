use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::delivery::DeliveryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub i64);

impl Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    Idle,
    OnRoute,
}

/// Every vehicle starts and ends each route at the depot; the depot itself is
/// never stored in `current_route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub capacity: i64,
    pub status: VehicleStatus,
    pub current_route: Vec<DeliveryId>,
    pub route_end_time: Option<f64>,
}

impl Vehicle {
    pub fn new(id: VehicleId, capacity: i64) -> Self {
        Self {
            id,
            capacity,
            status: VehicleStatus::Idle,
            current_route: Vec::new(),
            route_end_time: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.status, VehicleStatus::Idle)
    }
}

#[derive(Debug, Deserialize)]
pub struct VehicleRecord {
    pub id: i64,
    pub capacity: i64,
}

impl From<VehicleRecord> for Vehicle {
    fn from(record: VehicleRecord) -> Self {
        Vehicle::new(VehicleId(record.id), record.capacity)
    }
}
