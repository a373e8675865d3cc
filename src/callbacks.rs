//! Dispatch-trace hooks (SPEC_FULL.md §6 "Dispatch-trace callback"): a
//! cloneable visitor invoked at the simulation's decision points, mirroring
//! the teacher's dispatch-logging callback.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use dyn_clone::DynClone;
use serde::Serialize;

use crate::model::{RoutePlan, VehicleId};
use crate::simulation::event::SimEvent;

pub trait SimulationCallback: DynClone {
    fn visit_event(&mut self, _event: &SimEvent) {}
    fn visit_dispatch_input(&mut self, _now: f64, _idle_vehicles: &[VehicleId]) {}
    fn visit_dispatch_output(&mut self, _plan: &RoutePlan) {}
}

dyn_clone::clone_trait_object!(SimulationCallback);

/// Writes `value` as pretty JSON to `path`, creating parent directories as
/// needed.
pub fn dump_json<T>(path: impl AsRef<Path>, value: &T) -> anyhow::Result<()>
where
    T: ?Sized + Serialize,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// Dumps each decision tick's dispatch input/output to `logs/<name>/<n>/`,
/// the same layout the teacher's log-dispatch callback uses.
pub struct JsonTraceCallback {
    name: String,
    iteration: usize,
}

impl JsonTraceCallback {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iteration: 0,
        }
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        PathBuf::from("logs")
            .join(&self.name)
            .join(self.iteration.to_string())
            .join(filename)
    }
}

impl Clone for JsonTraceCallback {
    fn clone(&self) -> Self {
        Self {
            name: format!("{}_cloned", self.name),
            iteration: self.iteration,
        }
    }
}

impl SimulationCallback for JsonTraceCallback {
    fn visit_dispatch_input(&mut self, now: f64, idle_vehicles: &[VehicleId]) {
        let record = (now, idle_vehicles);
        if let Err(err) = dump_json(self.path_for("dispatch_input.json"), &record) {
            tracing::warn!(error = %err, "failed to write dispatch input trace");
        }
    }

    fn visit_dispatch_output(&mut self, plan: &RoutePlan) {
        if let Err(err) = dump_json(self.path_for("dispatch_output.json"), plan) {
            tracing::warn!(error = %err, "failed to write dispatch output trace");
        }
        self.iteration += 1;
    }
}
