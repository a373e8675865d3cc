//! BRKGA-driven giant tour with an optimal DP split into per-vehicle routes
//! (SPEC_FULL.md §4.7).

use crate::config::BrkgaConfig;
use crate::eval::{evaluate_sequence, RouteCost};

use super::brkga::{run_brkga, BrkgaDecoder, Chromosome};
use super::{Hybrid, HybridOutcome, PlanningContext};

struct GiantTourDecoder<'a, 'b> {
    ctx: &'a PlanningContext<'a>,
    deliveries: &'b [usize],
    capacities: &'b [i64],
}

impl BrkgaDecoder for GiantTourDecoder<'_, '_> {
    fn chromosome_len(&self) -> usize {
        self.deliveries.len()
    }

    fn decode_cost(&self, chromosome: &Chromosome) -> RouteCost {
        let tour = decode_tour(self.deliveries, chromosome);
        let result = split_tour(self.ctx, &tour, self.capacities);
        // A chromosome whose giant tour can't be split across M capacity-feasible
        // segments is infeasible (SPEC_FULL.md §4.7 point 3), not merely cheaper:
        // `best_cost` alone is the cost of the longest coverable prefix, which is
        // always lower than any full-coverage split and would bias the GA toward
        // dropping deliveries.
        if result.unassigned.is_empty() {
            result.best_cost
        } else {
            RouteCost::infeasible()
        }
    }
}

fn decode_tour(deliveries: &[usize], chromosome: &Chromosome) -> Vec<usize> {
    let mut order: Vec<usize> = (0..deliveries.len()).collect();
    order.sort_by(|&a, &b| chromosome[a].partial_cmp(&chromosome[b]).unwrap());
    order.iter().map(|&i| deliveries[i]).collect()
}

struct SplitResult {
    routes: Vec<Vec<usize>>,
    unassigned: Vec<usize>,
    best_cost: RouteCost,
}

/// Splits a single giant tour into up to `capacities.len()` contiguous,
/// capacity-feasible segments minimizing total lexicographic cost, via DP
/// over an incrementally-built segment-cost table (SPEC_FULL.md §4.7).
///
/// `seg_cost[start][end]` is the route cost of serving tour[start..end] as
/// one vehicle's route, built in O(n^2) by extending each start index one
/// stop at a time rather than re-evaluating every subsequence from scratch.
fn split_tour(ctx: &PlanningContext, tour: &[usize], capacities: &[i64]) -> SplitResult {
    let n = tour.len();
    let m = capacities.len();

    if n == 0 {
        return SplitResult {
            routes: vec![Vec::new(); m],
            unassigned: Vec::new(),
            best_cost: RouteCost::zero(),
        };
    }

    // seg_cost[start][len] = cost of serving tour[start..start+len] alone.
    let mut seg_cost = vec![vec![RouteCost::infeasible(); n + 1]; n];
    let mut seg_load = vec![vec![0i64; n + 1]; n];
    for start in 0..n {
        let mut running_load = 0i64;
        for len in 1..=(n - start) {
            running_load += ctx.sizes[tour[start + len - 1]];
            seg_load[start][len] = running_load;
            let segment = &tour[start..start + len];
            seg_cost[start][len] =
                evaluate_sequence(segment, ctx.now, ctx.travel, ctx.deadlines).cost;
        }
    }

    // f[k][i] = best cost of serving tour[0..i] using at most k of the first
    // k vehicles, choice[k][i] = the split point that achieves it.
    let mut f = vec![vec![RouteCost::infeasible(); n + 1]; m + 1];
    let mut choice = vec![vec![0usize; n + 1]; m + 1];
    for row in f.iter_mut() {
        row[0] = RouteCost::zero();
    }

    for k in 1..=m {
        for i in 1..=n {
            let capacity = capacities[k - 1];
            let mut best = f[k - 1][i]; // vehicle k left unused
            let mut best_start = i;
            for start in 0..i {
                let len = i - start;
                if seg_load[start][len] > capacity {
                    continue;
                }
                let candidate = f[k - 1][start].add(&seg_cost[start][len]);
                if !candidate.is_infeasible() && candidate < best {
                    best = candidate;
                    best_start = start;
                }
            }
            f[k][i] = best;
            choice[k][i] = best_start;
        }
    }

    let served = (0..=n)
        .filter(|&i| !f[m][i].is_infeasible())
        .max()
        .unwrap_or(0);

    let mut routes = vec![Vec::new(); m];
    let mut i = served;
    for k in (1..=m).rev() {
        let start = choice[k][i];
        if start < i {
            routes[k - 1] = tour[start..i].to_vec();
        }
        i = start;
    }

    let unassigned = tour[served..].to_vec();

    SplitResult {
        routes,
        unassigned,
        best_cost: f[m][served],
    }
}

pub struct BrkgaSplitHybrid {
    config: BrkgaConfig,
}

impl BrkgaSplitHybrid {
    pub fn new(config: BrkgaConfig) -> Self {
        Self { config }
    }
}

impl Hybrid for BrkgaSplitHybrid {
    fn solve(
        &self,
        ctx: &PlanningContext,
        delivery_indices: &[usize],
        capacities: &[i64],
    ) -> HybridOutcome {
        if delivery_indices.is_empty() || capacities.is_empty() {
            return HybridOutcome {
                routes: vec![Vec::new(); capacities.len()],
                unassigned: delivery_indices.to_vec(),
            };
        }

        let decoder = GiantTourDecoder {
            ctx,
            deliveries: delivery_indices,
            capacities,
        };
        let (chromosome, _) = run_brkga(&decoder, &self.config, ctx);
        let tour = decode_tour(delivery_indices, &chromosome);
        let result = split_tour(ctx, &tour, capacities);

        HybridOutcome {
            routes: result.routes,
            unassigned: result.unassigned,
        }
    }
}
