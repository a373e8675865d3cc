//! The discrete-event simulation driver (SPEC_FULL.md §4.9). Owns all
//! mutable state; optimizers and the evaluator remain pure functions called
//! from here.

use std::collections::BTreeMap;

use tracing::{info, instrument, warn};

use crate::callbacks::SimulationCallback;
use crate::config::Config;
use crate::dispatch_policy::compute_departure;
use crate::error::Error;
use crate::eval::evaluate_sequence;
use crate::geometry::TravelTimeMatrix;
use crate::model::{
    Delivery, DeliveryId, DeliveryStatus, PlanEntry, Point, RoutePlan, Vehicle, VehicleId,
    VehicleStatus,
};
use crate::monitor::Monitor;
use crate::optimize::{deadline_from_budget, PlanningContext, Strategy};

use super::event::{EventKind, EventQueue, SimEvent};

pub struct Simulator {
    config: Config,
    strategy: Strategy,
    clock: f64,
    queue: EventQueue,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    deliveries: BTreeMap<DeliveryId, Delivery>,
    /// Point list index 0 = depot; deliveries keep the index they were
    /// assigned at `submit_order` time, looked up via `point_index`.
    points: Vec<Point>,
    point_index: BTreeMap<DeliveryId, usize>,
    travel: TravelTimeMatrix,
    monitor: Monitor,
    callbacks: Vec<Box<dyn SimulationCallback>>,
}

impl Simulator {
    pub fn new(config: Config, depot: Point) -> Result<Self, Error> {
        config.validate()?;
        let strategy = Strategy::new(&config)?;
        Ok(Self {
            config,
            strategy,
            clock: 0.0,
            queue: EventQueue::new(),
            vehicles: BTreeMap::new(),
            deliveries: BTreeMap::new(),
            points: vec![depot],
            point_index: BTreeMap::new(),
            travel: TravelTimeMatrix::build(&[depot], 1.0),
            monitor: Monitor::new(),
            callbacks: Vec::new(),
        })
    }

    pub fn add_callback(&mut self, callback: Box<dyn SimulationCallback>) {
        self.callbacks.push(callback);
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn delivery(&self, id: &DeliveryId) -> Option<&Delivery> {
        self.deliveries.get(id)
    }

    // -- ingestion surface (SPEC_FULL.md §6) --------------------------------

    pub fn register_vehicle(&mut self, id: VehicleId, capacity: i64) {
        self.vehicles.insert(id, Vehicle::new(id, capacity));
    }

    /// `receipt_time` is always set to the current clock, per the ingestion
    /// surface contract (SPEC_FULL.md §6) — any value the caller set on
    /// `delivery.receipt_time` is overwritten.
    pub fn submit_order(&mut self, mut delivery: Delivery) {
        let index = self.points.len();
        self.points.push(delivery.point);
        self.point_index.insert(delivery.id.clone(), index);
        self.travel = TravelTimeMatrix::build(&self.points, self.config.speed);

        let receipt_time = self.clock;
        delivery.receipt_time = receipt_time;
        let ready_time = receipt_time + delivery.preparation_minutes;
        let id = delivery.id.clone();
        self.deliveries.insert(id.clone(), delivery);

        self.queue
            .push(SimEvent::new(receipt_time, EventKind::OrderReceived(id.clone())));
        self.queue
            .push(SimEvent::new(ready_time, EventKind::OrderReady(id)));
    }

    pub fn advance_time(&mut self, minutes: u32) {
        let target = self.clock + minutes as f64;
        while self.clock < target {
            self.tick();
        }
    }

    pub fn trigger_decision(&mut self) {
        self.run_decision_tick();
    }

    // -- per-tick loop (SPEC_FULL.md §4.9) ----------------------------------

    fn tick(&mut self) {
        self.drain_due_events();

        let interval = self.config.decision_interval_minutes as i64;
        if (self.clock.round() as i64).rem_euclid(interval) == 0 {
            self.run_decision_tick();
        }

        self.clock += 1.0;
    }

    fn drain_due_events(&mut self) {
        while let Some(time) = self.queue.peek_time() {
            if time > self.clock {
                break;
            }
            let event = self.queue.pop().unwrap();
            self.handle_event(event);
        }
    }

    #[instrument(skip(self))]
    fn handle_event(&mut self, event: SimEvent) {
        for callback in &mut self.callbacks {
            callback.visit_event(&event);
        }

        match event.kind {
            EventKind::OrderReceived(_) => {}
            EventKind::OrderReady(id) => {
                if let Some(delivery) = self.deliveries.get_mut(&id) {
                    delivery.status = DeliveryStatus::Ready;
                }
            }
            EventKind::VehicleDepart(vehicle_id) => {
                if let Some(vehicle) = self.vehicles.get_mut(&vehicle_id) {
                    vehicle.status = VehicleStatus::OnRoute;
                }
            }
            EventKind::ExpectedDelivery(vehicle_id, delivery_id) => {
                let lateness = self
                    .deliveries
                    .get(&delivery_id)
                    .map(|d| (event.time - d.deadline()).max(0.0))
                    .unwrap_or(0.0);
                if let Some(delivery) = self.deliveries.get_mut(&delivery_id) {
                    assert!(
                        delivery.status == DeliveryStatus::Dispatched,
                        "delivery {delivery_id} reached EXPECTED_DELIVERY without being DISPATCHED"
                    );
                    delivery.status = DeliveryStatus::Delivered;
                }
                self.monitor.record_delivery(lateness);
                let _ = vehicle_id;
            }
            EventKind::VehicleReturn(vehicle_id) => {
                if let Some(vehicle) = self.vehicles.get_mut(&vehicle_id) {
                    vehicle.status = VehicleStatus::Idle;
                    vehicle.current_route.clear();
                    vehicle.route_end_time = None;
                }
            }
            EventKind::DecisionTick => self.run_decision_tick(),
        }
    }

    #[instrument(skip(self), fields(clock = self.clock))]
    fn run_decision_tick(&mut self) {
        tracing::debug!("decision tick invoked");
        let ready: Vec<DeliveryId> = self
            .deliveries
            .values()
            .filter(|d| d.status == DeliveryStatus::Ready)
            .map(|d| d.id.clone())
            .collect();
        let idle: Vec<VehicleId> = self
            .vehicles
            .values()
            .filter(|v| v.is_idle())
            .map(|v| v.id)
            .collect();

        for callback in &mut self.callbacks {
            callback.visit_dispatch_input(self.clock, &idle);
        }

        if ready.is_empty() || idle.is_empty() {
            return;
        }

        let n = self.points.len();
        let mut sizes = vec![0i64; n];
        let mut deadlines = vec![0.0; n];
        for id in &ready {
            let delivery = &self.deliveries[id];
            let idx = self.point_index[id];
            sizes[idx] = delivery.size;
            deadlines[idx] = delivery.deadline();
        }

        let ready_indices: Vec<usize> = ready.iter().map(|id| self.point_index[id]).collect();
        let capacities: Vec<i64> = idle.iter().map(|&v| self.vehicles[&v].capacity).collect();

        let ctx = PlanningContext {
            travel: &self.travel,
            points: &self.points,
            deadlines: &deadlines,
            sizes: &sizes,
            now: self.clock,
            deadline_instant: Some(deadline_from_budget(self.config.optimizer_deadline_s)),
        };

        tracing::debug!(ready = ready_indices.len(), idle = capacities.len(), "invoking optimizer");
        let solve_started = std::time::Instant::now();
        let outcome = self.strategy.plan(&ctx, &ready_indices, &capacities);
        tracing::debug!(
            elapsed = %humantime::format_duration(solve_started.elapsed()),
            "optimizer returned"
        );

        // A delivery left unassigned is only a genuine InfeasibleAssignment
        // (SPEC_FULL.md §7) if no vehicle in the whole fleet could ever carry
        // it; a delivery that merely lost out to this tick's idle capacity
        // crunch stays READY and is retried once a vehicle returns, without
        // counting against the monitor (SPEC_FULL.md §8 scenario S2).
        let max_fleet_capacity = self.vehicles.values().map(|v| v.capacity).max().unwrap_or(0);
        for &idx in &outcome.unassigned {
            if sizes[idx] > max_fleet_capacity {
                warn!(size = sizes[idx], max_fleet_capacity, "delivery exceeds every vehicle's capacity");
                self.monitor.record_infeasible();
            }
        }

        let mut plan: RoutePlan = RoutePlan::new();
        for (slot, sequence) in outcome.routes.iter().enumerate() {
            if sequence.is_empty() {
                continue;
            }
            let vehicle_id = idle[slot];
            let load: i64 = sequence.iter().map(|&i| sizes[i]).sum();
            assert!(
                load <= self.vehicles[&vehicle_id].capacity,
                "optimizer returned an overloaded route for vehicle {vehicle_id}"
            );

            let next_decision_tick = self.clock + self.config.decision_interval_minutes as f64;
            let departure = compute_departure(
                self.config.dispatch_policy,
                sequence,
                self.clock,
                next_decision_tick,
                &self.travel,
                &deadlines,
            );
            let eval = evaluate_sequence(sequence, departure, &self.travel, &deadlines);

            let index_to_id: BTreeMap<usize, DeliveryId> = self
                .point_index
                .iter()
                .map(|(id, &idx)| (idx, id.clone()))
                .collect();
            let delivery_sequence: Vec<DeliveryId> = sequence
                .iter()
                .map(|idx| index_to_id[idx].clone())
                .collect();

            for &idx in sequence.iter() {
                let id = &index_to_id[&idx];
                if let Some(delivery) = self.deliveries.get_mut(id) {
                    delivery.status = DeliveryStatus::Dispatched;
                }
            }

            let vehicle = self.vehicles.get_mut(&vehicle_id).unwrap();
            vehicle.current_route = delivery_sequence.clone();
            vehicle.route_end_time = Some(departure + eval.cost.duration);

            self.queue
                .push(SimEvent::new(departure, EventKind::VehicleDepart(vehicle_id)));
            self.queue.push(SimEvent::new(
                departure + eval.cost.duration,
                EventKind::VehicleReturn(vehicle_id),
            ));

            for (arrival, id) in eval.arrivals.iter().zip(delivery_sequence.iter()) {
                self.queue.push(SimEvent::new(
                    *arrival,
                    EventKind::ExpectedDelivery(vehicle_id, id.clone()),
                ));
            }

            self.monitor.record_route(eval.cost.duration);
            plan.insert(
                vehicle_id,
                PlanEntry {
                    sequence: delivery_sequence,
                    departure_time: departure,
                },
            );
        }

        if !plan.is_empty() {
            for callback in &mut self.callbacks {
                callback.visit_dispatch_output(&plan);
            }
            info!(vehicles = plan.len(), clock = self.clock, "decision tick produced a plan");
        }
    }
}
