use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::point::Point;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeliveryId(pub String);

impl Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeliveryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Pending,
    Ready,
    Dispatched,
    Delivered,
}

/// An order in flight. Only `status` (and the bookkeeping timestamps derived
/// from events) mutate after construction; everything else is fixed at
/// `submit_order` time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub point: Point,
    pub size: i64,
    pub preparation_minutes: f64,
    pub service_minutes: f64,
    pub receipt_time: f64,
    pub status: DeliveryStatus,
}

impl Delivery {
    pub fn new(
        id: DeliveryId,
        point: Point,
        size: i64,
        preparation_minutes: f64,
        service_minutes: f64,
        receipt_time: f64,
    ) -> Self {
        Self {
            id,
            point,
            size,
            preparation_minutes,
            service_minutes,
            receipt_time,
            status: DeliveryStatus::Pending,
        }
    }

    pub fn ready_time(&self) -> f64 {
        self.receipt_time + self.preparation_minutes
    }

    pub fn deadline(&self) -> f64 {
        self.receipt_time + self.service_minutes
    }
}

/// A CSV-loadable fixture row, mirroring the teacher's `*Info::load` CSV
/// convention, for offline/batch scenario construction (SPEC_FULL.md §3).
#[derive(Debug, Deserialize)]
pub struct DeliveryRecord {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub size: i64,
    pub preparation_minutes: f64,
    pub service_minutes: f64,
    pub receipt_time: f64,
}

impl From<DeliveryRecord> for Delivery {
    fn from(record: DeliveryRecord) -> Self {
        Delivery::new(
            DeliveryId(record.id),
            Point::new(record.lat, record.lng),
            record.size,
            record.preparation_minutes,
            record.service_minutes,
            record.receipt_time,
        )
    }
}
