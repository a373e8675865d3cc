//! The optimization core: clusterers, routers and hybrids, behind a small
//! strategy-selector (SPEC_FULL.md §4, §9 "Polymorphic strategies").

pub mod brkga;
pub mod brkga_hybrid;
pub mod greedy_cluster;
pub mod greedy_hybrid;
pub mod greedy_router;
pub mod kmeans;

use std::time::{Duration, Instant};

use crate::config::{ClusterAlgo, Config, HybridAlgo, RouteAlgo, StrategyConfig};
use crate::error::Error;
use crate::geometry::TravelTimeMatrix;
use crate::model::Point;

/// Everything an optimizer needs to evaluate candidate routes, shared
/// read-only for the duration of one decision tick (SPEC_FULL.md §5).
pub struct PlanningContext<'a> {
    pub travel: &'a TravelTimeMatrix,
    /// Raw coordinates indexed by point index; index 0 is the depot. Needed
    /// by the k-means clusterer, which operates on real Euclidean centroids
    /// rather than on travel times alone.
    pub points: &'a [Point],
    /// Deadlines indexed by point index; index 0 (the depot) is unused.
    pub deadlines: &'a [f64],
    /// Delivery sizes indexed by point index; index 0 (the depot) is unused.
    pub sizes: &'a [i64],
    /// The decision-tick clock, the reference timestamp every evaluator call
    /// is relative to.
    pub now: f64,
    pub deadline_instant: Option<Instant>,
}

impl PlanningContext<'_> {
    pub fn time_exceeded(&self) -> bool {
        self.deadline_instant
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

pub fn deadline_from_budget(budget_s: f64) -> Instant {
    Instant::now() + Duration::from_secs_f64(budget_s)
}

/// Partition of ready deliveries into per-vehicle clusters, aligned by index
/// with the `capacities` slice passed to `cluster`.
pub struct ClusterOutcome {
    pub clusters: Vec<Vec<usize>>,
    pub unassigned: Vec<usize>,
}

pub trait Clusterer {
    fn cluster(
        &self,
        ctx: &PlanningContext,
        delivery_indices: &[usize],
        capacities: &[i64],
    ) -> ClusterOutcome;
}

pub trait Router {
    /// Returns the visit sequence for a single cluster (point indices, depot
    /// excluded). An empty cluster yields an empty sequence.
    fn route(&self, ctx: &PlanningContext, cluster: &[usize]) -> Vec<usize>;
}

pub struct HybridOutcome {
    pub routes: Vec<Vec<usize>>,
    pub unassigned: Vec<usize>,
}

pub trait Hybrid {
    fn solve(
        &self,
        ctx: &PlanningContext,
        delivery_indices: &[usize],
        capacities: &[i64],
    ) -> HybridOutcome;
}

pub struct PlanOutcome {
    pub routes: Vec<Vec<usize>>,
    pub unassigned: Vec<usize>,
}

pub enum Strategy {
    TwoStage {
        clusterer: Box<dyn Clusterer + Send + Sync>,
        router: Box<dyn Router + Send + Sync>,
    },
    Hybrid(Box<dyn Hybrid + Send + Sync>),
}

impl Strategy {
    pub fn new(config: &Config) -> Result<Self, Error> {
        match &config.strategy {
            StrategyConfig::TwoStage {
                clustering_algo,
                routing_algo,
            } => {
                let clusterer: Box<dyn Clusterer + Send + Sync> = match clustering_algo {
                    ClusterAlgo::CKMeans => Box::new(kmeans::CapacitatedKMeans::new(
                        config.ckmeans.clone(),
                    )),
                    ClusterAlgo::GreedySequential => {
                        Box::new(greedy_cluster::GreedySequentialClusterer)
                    }
                };
                let router: Box<dyn Router + Send + Sync> = match routing_algo {
                    RouteAlgo::Brkga => Box::new(brkga::BrkgaRouter::new(config.brkga.clone())),
                    RouteAlgo::CheapestInsertion => {
                        Box::new(greedy_router::CheapestInsertionRouter)
                    }
                };
                Ok(Strategy::TwoStage { clusterer, router })
            }
            StrategyConfig::Hybrid { hybrid_algo } => {
                let hybrid: Box<dyn Hybrid + Send + Sync> = match hybrid_algo {
                    HybridAlgo::GreedyInsertion => {
                        Box::new(greedy_hybrid::GreedyInsertionHybrid)
                    }
                    HybridAlgo::BrkgaSplit => Box::new(
                        brkga_hybrid::BrkgaSplitHybrid::new(config.brkga.clone()),
                    ),
                };
                Ok(Strategy::Hybrid(hybrid))
            }
        }
    }

    pub fn plan(
        &self,
        ctx: &PlanningContext,
        delivery_indices: &[usize],
        capacities: &[i64],
    ) -> PlanOutcome {
        match self {
            Strategy::TwoStage { clusterer, router } => {
                let outcome = clusterer.cluster(ctx, delivery_indices, capacities);
                let routes = outcome
                    .clusters
                    .iter()
                    .map(|cluster| router.route(ctx, cluster))
                    .collect();
                PlanOutcome {
                    routes,
                    unassigned: outcome.unassigned,
                }
            }
            Strategy::Hybrid(hybrid) => {
                let outcome = hybrid.solve(ctx, delivery_indices, capacities);
                PlanOutcome {
                    routes: outcome.routes,
                    unassigned: outcome.unassigned,
                }
            }
        }
    }
}

/// Lexicographic tie-break helper used across the greedy optimizers:
/// `(delta_penalty, delta_duration, ...ids)` ascending.
pub(crate) fn ordered(x: f64) -> ordered_float::OrderedFloat<f64> {
    ordered_float::OrderedFloat(x)
}
