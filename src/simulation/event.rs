//! Event kinds and the min-heap event queue (SPEC_FULL.md §3, §4.9). Adapted
//! from the teacher's generic `Event`/`EventQueue` pair, specialized to a
//! simulated-minutes clock instead of wall-clock timestamps.

use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::model::{DeliveryId, VehicleId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    OrderReceived(DeliveryId),
    OrderReady(DeliveryId),
    VehicleDepart(VehicleId),
    ExpectedDelivery(VehicleId, DeliveryId),
    VehicleReturn(VehicleId),
    DecisionTick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
}

impl SimEvent {
    pub fn new(time: f64, kind: EventKind) -> Self {
        Self { time, kind }
    }
}

/// Wraps a `SimEvent` with an insertion counter so the heap never relies on
/// tie-break stability (SPEC_FULL.md §9 "Event tie-breaking").
#[derive(Debug, Clone)]
struct QueueEntry {
    time: OrderedFloat<f64>,
    seq: u64,
    event: SimEvent,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // reversed: BinaryHeap is a max-heap, the queue needs the smallest
        // (time, seq) pair out first.
        other.time.cmp(&self.time).then(other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueueEntry>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry {
            time: OrderedFloat(event.time),
            seq,
            event,
        });
    }

    pub fn pop(&mut self) -> Option<SimEvent> {
        self.heap.pop().map(|entry| entry.event)
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.time.0)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
