//! Capacitated K-Means clusterer: iterate {assign-by-MIP, update-centroids}
//! until centroids stabilize (SPEC_FULL.md §4.2).

use good_lp::{constraint, variable, Expression, Solution, SolverModel};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::config::CKMeansConfig;
use crate::model::Point;

use super::greedy_cluster::GreedySequentialClusterer;
use super::{ClusterOutcome, Clusterer, PlanningContext};

pub struct CapacitatedKMeans {
    config: CKMeansConfig,
}

impl CapacitatedKMeans {
    pub fn new(config: CKMeansConfig) -> Self {
        Self { config }
    }

    /// K-Means++ seeding over raw coordinates, ignoring capacities.
    fn seed_centroids(&self, points: &[Point], m: usize) -> Vec<Point> {
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let mut centroids = Vec::with_capacity(m);
        let first = rng.random_range(0..points.len());
        centroids.push(points[first]);

        while centroids.len() < m {
            let weights: Vec<f64> = points
                .iter()
                .map(|p| {
                    centroids
                        .iter()
                        .map(|c| {
                            let d = p.euclidean(c);
                            d * d
                        })
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                // all remaining points coincide with an existing centroid
                centroids.push(points[centroids.len() % points.len()]);
                continue;
            }
            let mut pick = rng.random_range(0.0..total);
            let mut chosen = points.len() - 1;
            for (idx, w) in weights.iter().enumerate() {
                if pick < *w {
                    chosen = idx;
                    break;
                }
                pick -= w;
            }
            centroids.push(points[chosen]);
        }

        centroids
    }

    /// Solve the capacitated assignment MIP; `None` on solver failure
    /// (caller falls back to greedy first-fit per SPEC_FULL.md §7).
    fn assign_by_mip(
        &self,
        points: &[Point],
        ids: &[usize],
        sizes: &[i64],
        centroids: &[Point],
        capacities: &[i64],
    ) -> Option<Vec<Vec<usize>>> {
        let n = ids.len();
        let m = centroids.len();
        if n == 0 {
            return Some(vec![Vec::new(); m]);
        }

        let mut problem = good_lp::variables!();
        let mut x = vec![vec![good_lp::Variable::at(0); m]; n];
        for (i, row) in x.iter_mut().enumerate() {
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = problem.add(variable().binary().name(format!("x_{i}_{j}")));
            }
        }

        let objective: Expression = (0..n)
            .flat_map(|i| (0..m).map(move |j| (i, j)))
            .map(|(i, j)| {
                let d = points[ids[i]].euclidean(&centroids[j]);
                d * x[i][j]
            })
            .sum();

        let mut model = problem.minimise(objective).using(good_lp::microlp);

        for row in &x {
            let row_sum: Expression = row.iter().map(|&v| v.into()).sum();
            model = model.with(constraint!(row_sum == 1));
        }
        for j in 0..m {
            let load: Expression = (0..n).map(|i| sizes[i] as f64 * x[i][j]).sum();
            model = model.with(constraint!(load <= capacities[j] as f64));
        }

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(err) => {
                warn!(error = %err, "capacitated k-means MIP solve failed, falling back to greedy assignment");
                return None;
            }
        };

        let mut clusters = vec![Vec::new(); m];
        for (i, row) in x.iter().enumerate() {
            let assigned = (0..m)
                .max_by(|&a, &b| {
                    solution
                        .value(row[a])
                        .partial_cmp(&solution.value(row[b]))
                        .unwrap()
                })
                .unwrap();
            clusters[assigned].push(ids[i]);
        }
        Some(clusters)
    }

    fn update_centroids(
        &self,
        clusters: &[Vec<usize>],
        points: &[Point],
        sizes: &[i64],
        previous: &[Point],
    ) -> Vec<Point> {
        clusters
            .iter()
            .zip(previous.iter())
            .map(|(cluster, prev)| {
                let total_weight: i64 = cluster.iter().map(|&d| sizes[d]).sum();
                if total_weight == 0 {
                    return *prev;
                }
                let (sum_lat, sum_lng) = cluster.iter().fold((0.0, 0.0), |(lat, lng), &d| {
                    let w = sizes[d] as f64;
                    (lat + w * points[d].lat, lng + w * points[d].lng)
                });
                Point::new(sum_lat / total_weight as f64, sum_lng / total_weight as f64)
            })
            .collect()
    }
}

impl Clusterer for CapacitatedKMeans {
    fn cluster(
        &self,
        ctx: &PlanningContext,
        delivery_indices: &[usize],
        capacities: &[i64],
    ) -> ClusterOutcome {
        let m = capacities.len();
        if delivery_indices.is_empty() || m == 0 {
            return ClusterOutcome {
                clusters: vec![Vec::new(); m],
                unassigned: delivery_indices.to_vec(),
            };
        }

        let mut centroids = self.seed_centroids_from_indices(ctx, delivery_indices, m);
        let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); m];

        for _ in 0..self.config.max_iters {
            let assigned = self
                .assign_by_mip_indices(ctx, delivery_indices, &centroids, capacities)
                .unwrap_or_else(|| {
                    let fallback = GreedySequentialClusterer;
                    let outcome = fallback.cluster(ctx, delivery_indices, capacities);
                    outcome.clusters
                });

            let new_centroids = self.update_centroids_indices(&assigned, ctx, &centroids);
            let shift = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| a.euclidean(b))
                .fold(0.0, f64::max);

            clusters = assigned;
            centroids = new_centroids;

            if shift < self.config.tol {
                break;
            }
        }

        let assigned_set: std::collections::HashSet<usize> =
            clusters.iter().flatten().copied().collect();
        let unassigned = delivery_indices
            .iter()
            .copied()
            .filter(|d| !assigned_set.contains(d))
            .collect();

        ClusterOutcome {
            clusters,
            unassigned,
        }
    }
}

impl CapacitatedKMeans {
    fn seed_centroids_from_indices(
        &self,
        ctx: &PlanningContext,
        indices: &[usize],
        m: usize,
    ) -> Vec<Point> {
        let points: Vec<Point> = indices.iter().map(|&d| ctx.points[d]).collect();
        self.seed_centroids(&points, m)
    }

    fn assign_by_mip_indices(
        &self,
        ctx: &PlanningContext,
        indices: &[usize],
        centroids: &[Point],
        capacities: &[i64],
    ) -> Option<Vec<Vec<usize>>> {
        let sizes: Vec<i64> = indices.iter().map(|&d| ctx.sizes[d]).collect();
        self.assign_by_mip(ctx.points, indices, &sizes, centroids, capacities)
    }

    fn update_centroids_indices(
        &self,
        clusters: &[Vec<usize>],
        ctx: &PlanningContext,
        previous: &[Point],
    ) -> Vec<Point> {
        self.update_centroids(clusters, ctx.points, ctx.sizes, previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TravelTimeMatrix;
    use crate::model::Point as P;

    #[test]
    fn partitions_all_deliveries_when_capacity_suffices() {
        let points = vec![
            P::new(0.0, 0.0),
            P::new(1.0, 0.0),
            P::new(2.0, 0.0),
            P::new(10.0, 0.0),
            P::new(11.0, 0.0),
        ];
        let travel = TravelTimeMatrix::build(&points, 1.0);
        let sizes = vec![0, 2, 2, 2, 2];
        let deadlines = vec![0.0; 5];
        let ctx = PlanningContext {
            travel: &travel,
            points: &points,
            deadlines: &deadlines,
            sizes: &sizes,
            now: 0.0,
            deadline_instant: None,
        };
        let kmeans = CapacitatedKMeans::new(CKMeansConfig {
            max_iters: 10,
            tol: 1e-3,
            seed: 7,
        });
        let outcome = kmeans.cluster(&ctx, &[1, 2, 3, 4], &[10, 10]);
        assert!(outcome.unassigned.is_empty());
        let total: usize = outcome.clusters.iter().map(|c| c.len()).sum();
        assert_eq!(total, 4);
    }
}
