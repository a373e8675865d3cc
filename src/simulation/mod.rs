//! Discrete-event simulation: the event queue and the driver that consumes
//! it (SPEC_FULL.md §4.9).

pub mod driver;
pub mod event;

pub use driver::Simulator;
pub use event::{EventKind, EventQueue, SimEvent};
