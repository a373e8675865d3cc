//! Global cheapest-insertion hybrid: clustering and routing collapse into a
//! single pass that considers every (delivery, vehicle, position) triple
//! directly (SPEC_FULL.md §4.6).

use crate::eval::evaluate_sequence;

use super::{ordered, Hybrid, HybridOutcome, PlanningContext};

pub struct GreedyInsertionHybrid;

/// Tie-break key: insertion delta first, then delivery id, vehicle id,
/// position, all ascending (SPEC_FULL.md §4.6).
type Key = (
    ordered_float::OrderedFloat<f64>,
    ordered_float::OrderedFloat<f64>,
    usize,
    usize,
    usize,
);

impl Hybrid for GreedyInsertionHybrid {
    fn solve(
        &self,
        ctx: &PlanningContext,
        delivery_indices: &[usize],
        capacities: &[i64],
    ) -> HybridOutcome {
        let mut routes: Vec<Vec<usize>> = vec![Vec::new(); capacities.len()];
        let mut loads = vec![0i64; capacities.len()];
        let mut remaining: Vec<usize> = delivery_indices.to_vec();

        loop {
            // Scan every (delivery, vehicle, position) triple still open and
            // take the single global minimum-delta insertion, re-evaluating
            // from scratch each round since every insertion changes the base
            // cost of the route it landed in.
            let mut best: Option<(Key, usize, usize, usize)> = None;

            for &d in &remaining {
                let size = ctx.sizes[d];
                for (v, route) in routes.iter().enumerate() {
                    if loads[v] + size > capacities[v] {
                        continue;
                    }
                    let base_cost = evaluate_sequence(route, ctx.now, ctx.travel, ctx.deadlines).cost;
                    for pos in 0..=route.len() {
                        let mut candidate = route.clone();
                        candidate.insert(pos, d);
                        let cost =
                            evaluate_sequence(&candidate, ctx.now, ctx.travel, ctx.deadlines).cost;
                        let key = (
                            ordered(cost.penalty - base_cost.penalty),
                            ordered(cost.duration - base_cost.duration),
                            d,
                            v,
                            pos,
                        );
                        if best.as_ref().map_or(true, |(b, ..)| key < *b) {
                            best = Some((key, d, v, pos));
                        }
                    }
                }
            }

            match best {
                Some((_, d, v, pos)) => {
                    routes[v].insert(pos, d);
                    loads[v] += ctx.sizes[d];
                    remaining.retain(|&x| x != d);
                }
                None => break,
            }
        }

        HybridOutcome {
            routes,
            unassigned: remaining,
        }
    }
}
