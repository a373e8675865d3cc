//! CSV fixture loading for offline/batch scenario construction (SPEC_FULL.md
//! §3 "Scenario fixtures"), mirroring the teacher's `*Info::load` convention.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::model::{Delivery, DeliveryRecord, Point, Vehicle, VehicleRecord};

fn read_csv<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<Vec<T>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV fixture at {}", path.display()))?;
    let records: Result<Vec<T>, csv::Error> = reader.deserialize().collect();
    records.with_context(|| format!("deserializing CSV fixture at {}", path.display()))
}

/// A complete offline scenario: depot coordinate plus vehicle and delivery
/// fixtures, each loaded from its own CSV file.
pub struct Scenario {
    pub depot: Point,
    pub vehicles: Vec<Vehicle>,
    pub deliveries: Vec<Delivery>,
}

impl Scenario {
    pub fn load(
        depot: Point,
        vehicles_path: impl AsRef<Path>,
        deliveries_path: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        let vehicles: Vec<Vehicle> = read_csv::<VehicleRecord>(vehicles_path)?
            .into_iter()
            .map(Vehicle::from)
            .collect();
        let deliveries: Vec<Delivery> = read_csv::<DeliveryRecord>(deliveries_path)?
            .into_iter()
            .map(Delivery::from)
            .collect();

        Ok(Self {
            depot,
            vehicles,
            deliveries,
        })
    }
}
