//! Cheapest-insertion router, one cluster at a time (SPEC_FULL.md §4.4).

use super::{ordered, PlanningContext, Router};

pub struct CheapestInsertionRouter;

impl Router for CheapestInsertionRouter {
    fn route(&self, ctx: &PlanningContext, cluster: &[usize]) -> Vec<usize> {
        if cluster.is_empty() {
            return Vec::new();
        }

        let start = *cluster
            .iter()
            .min_by_key(|&&d| (ordered(ctx.travel.distance(0, d)), d))
            .unwrap();

        let mut route = vec![start];
        let mut remaining: Vec<usize> = cluster.iter().copied().filter(|&d| d != start).collect();

        while !remaining.is_empty() {
            // find the (delivery, position) pair with minimum insertion delta
            let mut best: Option<(ordered_float::OrderedFloat<f64>, usize, usize)> = None;
            for &candidate in &remaining {
                for p in 0..=route.len() {
                    let i = if p == 0 { 0 } else { route[p - 1] };
                    let j = if p == route.len() { 0 } else { route[p] };
                    let delta =
                        ctx.travel.time(i, candidate) + ctx.travel.time(candidate, j) - ctx.travel.time(i, j);
                    let key = (ordered(delta), candidate, p);
                    if best.map_or(true, |b| key < b) {
                        best = Some(key);
                    }
                }
            }
            let (_, chosen, pos) = best.unwrap();
            route.insert(pos, chosen);
            remaining.retain(|&d| d != chosen);
        }

        route
    }
}
