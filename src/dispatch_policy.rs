//! Departure-time policies applied after a route is planned (SPEC_FULL.md
//! §4.8). Both policies share the same evaluator; JIT only ever delays
//! departure within the slack ASAP already banked, so it can never turn an
//! on-time route late.

use crate::config::DispatchPolicyKind;
use crate::eval::evaluate_sequence;
use crate::geometry::TravelTimeMatrix;

/// Computes the departure time for a planned route given the earliest
/// possible departure `asap_t0` (typically "now") and the time of the next
/// decision tick. Returns `asap_t0` unmodified for [`DispatchPolicyKind::Asap`].
///
/// For [`DispatchPolicyKind::Jit`], the vehicle departs as late as possible
/// without introducing lateness anywhere on the route, capped so it cannot
/// miss the next decision tick: the slack is the smallest margin between any
/// stop's deadline and its ASAP arrival, and the delay is
/// `min(slack, next_decision_tick - asap_t0)` (SPEC_FULL.md §4.8). A route
/// with zero slack departs at `asap_t0` exactly, same as ASAP.
pub fn compute_departure(
    policy: DispatchPolicyKind,
    sequence: &[usize],
    asap_t0: f64,
    next_decision_tick: f64,
    travel: &TravelTimeMatrix,
    deadlines: &[f64],
) -> f64 {
    match policy {
        DispatchPolicyKind::Asap => asap_t0,
        DispatchPolicyKind::Jit => {
            if sequence.is_empty() {
                return asap_t0;
            }
            let asap = evaluate_sequence(sequence, asap_t0, travel, deadlines);
            let slack = asap
                .arrivals
                .iter()
                .zip(sequence.iter())
                .map(|(&arrival, &d)| deadlines[d] - arrival)
                .fold(f64::INFINITY, f64::min)
                .max(0.0);
            let max_delay = (next_decision_tick - asap_t0).max(0.0);
            asap_t0 + slack.min(max_delay)
        }
    }
}
