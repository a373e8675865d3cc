//! Flat, validated configuration surface (SPEC_FULL.md §6). Mutually
//! exclusive strategy branches are a tagged enum rather than a pair of
//! optional field groups, so an inconsistent combination is unrepresentable
//! once parsed -- the remaining validation is about ranges, not shape.

use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterAlgo {
    CKMeans,
    GreedySequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgo {
    Brkga,
    CheapestInsertion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HybridAlgo {
    GreedyInsertion,
    BrkgaSplit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicyKind {
    Asap,
    Jit,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "strategy_kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    TwoStage {
        clustering_algo: ClusterAlgo,
        routing_algo: RouteAlgo,
    },
    Hybrid {
        hybrid_algo: HybridAlgo,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrkgaConfig {
    pub population_size: usize,
    pub elite_fraction: f64,
    pub mutant_fraction: f64,
    pub elite_bias: f64,
    pub generations: usize,
    pub stall_generations: usize,
    pub seed: u64,
}

impl Default for BrkgaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            elite_fraction: 0.2,
            mutant_fraction: 0.15,
            elite_bias: 0.7,
            generations: 100,
            stall_generations: 20,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CKMeansConfig {
    pub max_iters: usize,
    pub tol: f64,
    pub seed: u64,
}

impl Default for CKMeansConfig {
    fn default() -> Self {
        Self {
            max_iters: 50,
            tol: 1e-4,
            seed: 0xC0FFEE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub strategy: StrategyConfig,
    pub dispatch_policy: DispatchPolicyKind,
    pub decision_interval_minutes: u32,
    #[serde(default)]
    pub brkga: BrkgaConfig,
    #[serde(default)]
    pub ckmeans: CKMeansConfig,
    pub optimizer_deadline_s: f64,
    /// Distance units per minute used to derive the travel-time matrix from
    /// raw coordinates (ambient geometry parameter; SPEC_FULL.md §3).
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_speed() -> f64 {
    1.0
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.decision_interval_minutes < 1 {
            return Err(Error::Configuration(
                "decision_interval_minutes must be >= 1".into(),
            ));
        }
        if self.optimizer_deadline_s <= 0.0 {
            return Err(Error::Configuration(
                "optimizer_deadline_s must be positive".into(),
            ));
        }
        if self.speed <= 0.0 {
            return Err(Error::Configuration("speed must be positive".into()));
        }

        let b = &self.brkga;
        if b.population_size == 0 {
            return Err(Error::Configuration(
                "brkga.population_size must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&b.elite_fraction) || !(0.0..=1.0).contains(&b.mutant_fraction) {
            return Err(Error::Configuration(
                "brkga.elite_fraction and brkga.mutant_fraction must be within [0, 1]".into(),
            ));
        }
        if b.elite_fraction + b.mutant_fraction > 1.0 {
            return Err(Error::Configuration(
                "brkga.elite_fraction + brkga.mutant_fraction must not exceed 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&b.elite_bias) {
            return Err(Error::Configuration(
                "brkga.elite_bias must be within [0, 1]".into(),
            ));
        }
        if b.generations == 0 {
            return Err(Error::Configuration(
                "brkga.generations must be positive".into(),
            ));
        }
        if b.stall_generations == 0 {
            return Err(Error::Configuration(
                "brkga.stall_generations must be positive".into(),
            ));
        }

        let k = &self.ckmeans;
        if k.max_iters == 0 {
            return Err(Error::Configuration(
                "ckmeans.max_iters must be positive".into(),
            ));
        }
        if k.tol <= 0.0 {
            return Err(Error::Configuration("ckmeans.tol must be positive".into()));
        }

        Ok(())
    }
}
