//! Greedy sequential clusterer (SPEC_FULL.md §4.3).

use super::{ClusterOutcome, Clusterer, PlanningContext};

pub struct GreedySequentialClusterer;

impl Clusterer for GreedySequentialClusterer {
    fn cluster(
        &self,
        ctx: &PlanningContext,
        delivery_indices: &[usize],
        capacities: &[i64],
    ) -> ClusterOutcome {
        let mut sorted: Vec<usize> = delivery_indices.to_vec();
        sorted.sort_by(|&a, &b| {
            ctx.travel
                .distance(0, b)
                .partial_cmp(&ctx.travel.distance(0, a))
                .unwrap()
                .then(a.cmp(&b))
        });

        let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); capacities.len()];
        let mut loads = vec![0i64; capacities.len()];
        let mut unassigned = Vec::new();

        for d in sorted {
            let size = ctx.sizes[d];
            match (0..capacities.len()).find(|&v| loads[v] + size <= capacities[v]) {
                Some(v) => {
                    clusters[v].push(d);
                    loads[v] += size;
                }
                None => unassigned.push(d),
            }
        }

        ClusterOutcome {
            clusters,
            unassigned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TravelTimeMatrix;
    use crate::model::Point;

    #[test]
    fn places_in_first_fitting_vehicle() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
        ];
        let travel = TravelTimeMatrix::build(&points, 1.0);
        let sizes = vec![0, 5, 5, 5];
        let deadlines = vec![0.0, 100.0, 100.0, 100.0];
        let ctx = PlanningContext {
            travel: &travel,
            points: &points,
            deadlines: &deadlines,
            sizes: &sizes,
            now: 0.0,
            deadline_instant: None,
        };
        let clusterer = GreedySequentialClusterer;
        let outcome = clusterer.cluster(&ctx, &[1, 2, 3], &[10, 10]);
        assert_eq!(outcome.unassigned, Vec::<usize>::new());
        assert_eq!(outcome.clusters.iter().map(|c| c.len()).sum::<usize>(), 3);
    }

    #[test]
    fn overflow_left_unassigned() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        let travel = TravelTimeMatrix::build(&points, 1.0);
        let sizes = vec![0, 7, 7];
        let deadlines = vec![0.0, 100.0, 100.0];
        let ctx = PlanningContext {
            travel: &travel,
            points: &points,
            deadlines: &deadlines,
            sizes: &sizes,
            now: 0.0,
            deadline_instant: None,
        };
        let clusterer = GreedySequentialClusterer;
        let outcome = clusterer.cluster(&ctx, &[1, 2], &[10]);
        assert_eq!(outcome.clusters[0].len(), 1);
        assert_eq!(outcome.unassigned.len(), 1);
    }
}
