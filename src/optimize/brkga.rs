//! Biased Random-Key Genetic Algorithm engine plus a single-cluster router
//! built on top of it (SPEC_FULL.md §4.5).

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::config::BrkgaConfig;
use crate::eval::{evaluate_sequence, RouteCost};

use super::{ordered, PlanningContext, Router};

/// A chromosome is a vector of random keys in `[0, 1)`; decoders turn keys
/// into a concrete candidate solution by sorting indices by key value.
pub type Chromosome = Vec<f64>;

/// Anything BRKGA can search over: decode a chromosome into a cost, keeping
/// the GA loop itself blind to what a "solution" means.
pub trait BrkgaDecoder {
    fn chromosome_len(&self) -> usize;
    fn decode_cost(&self, chromosome: &Chromosome) -> RouteCost;
}

struct Population {
    chromosomes: Vec<Chromosome>,
    costs: Vec<RouteCost>,
}

impl Population {
    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.chromosomes.len()).collect();
        order.sort_by_key(|&i| (ordered(self.costs[i].penalty), ordered(self.costs[i].duration)));
        self.chromosomes = order.iter().map(|&i| self.chromosomes[i].clone()).collect();
        self.costs = order.iter().map(|&i| self.costs[i]).collect();
    }

    fn best(&self) -> RouteCost {
        self.costs[0]
    }
}

/// Runs the BRKGA main loop against `decoder`, returning the best chromosome
/// found and its cost. Stops at `config.generations` or after
/// `config.stall_generations` generations with no improvement to the best
/// cost, whichever comes first (SPEC_FULL.md §4.5, property #4).
pub fn run_brkga(
    decoder: &dyn BrkgaDecoder,
    config: &BrkgaConfig,
    ctx: &PlanningContext,
) -> (Chromosome, RouteCost) {
    let n = decoder.chromosome_len();
    let mut rng = SmallRng::seed_from_u64(config.seed);

    if n == 0 {
        return (Vec::new(), decoder.decode_cost(&Vec::new()));
    }

    let mut population = Population {
        chromosomes: (0..config.population_size)
            .map(|_| (0..n).map(|_| rng.random::<f64>()).collect())
            .collect(),
        costs: Vec::new(),
    };
    population.costs = population
        .chromosomes
        .iter()
        .map(|c| decoder.decode_cost(c))
        .collect();
    population.sort();

    let elite_count = ((config.population_size as f64) * config.elite_fraction).ceil() as usize;
    let elite_count = elite_count.max(1).min(config.population_size);
    let mutant_count = ((config.population_size as f64) * config.mutant_fraction).floor() as usize;
    let mutant_count = mutant_count.min(config.population_size - elite_count);

    let mut best_cost = population.best();
    let mut stall = 0usize;

    for _ in 0..config.generations {
        if ctx.time_exceeded() {
            break;
        }
        if stall >= config.stall_generations {
            break;
        }

        let elites: Vec<Chromosome> = population.chromosomes[..elite_count].to_vec();
        let non_elites: Vec<Chromosome> = population.chromosomes[elite_count..].to_vec();

        let mut next: Vec<Chromosome> = Vec::with_capacity(config.population_size);
        next.extend(elites.iter().cloned());

        for _ in 0..mutant_count {
            next.push((0..n).map(|_| rng.random::<f64>()).collect());
        }

        while next.len() < config.population_size {
            let elite_parent = elites.choose(&mut rng).unwrap();
            let other_parent = if non_elites.is_empty() {
                elites.choose(&mut rng).unwrap()
            } else {
                non_elites.choose(&mut rng).unwrap()
            };
            let child: Chromosome = (0..n)
                .map(|i| {
                    if rng.random::<f64>() < config.elite_bias {
                        elite_parent[i]
                    } else {
                        other_parent[i]
                    }
                })
                .collect();
            next.push(child);
        }
        next.truncate(config.population_size);

        population.chromosomes = next;
        population.costs = population
            .chromosomes
            .iter()
            .map(|c| decoder.decode_cost(c))
            .collect();
        population.sort();

        let candidate_best = population.best();
        if candidate_best < best_cost {
            best_cost = candidate_best;
            stall = 0;
        } else {
            stall += 1;
        }
    }

    (population.chromosomes[0].clone(), population.best())
}

/// Decodes a chromosome into a visit order by sorting cluster members by
/// key value (the standard BRKGA random-key decoding for permutations).
struct RouteDecoder<'a, 'b> {
    ctx: &'a PlanningContext<'a>,
    cluster: &'b [usize],
}

impl BrkgaDecoder for RouteDecoder<'_, '_> {
    fn chromosome_len(&self) -> usize {
        self.cluster.len()
    }

    fn decode_cost(&self, chromosome: &Chromosome) -> RouteCost {
        let sequence = decode_permutation(self.cluster, chromosome);
        evaluate_sequence(&sequence, self.ctx.now, self.ctx.travel, self.ctx.deadlines).cost
    }
}

fn decode_permutation(cluster: &[usize], chromosome: &Chromosome) -> Vec<usize> {
    let mut order: Vec<usize> = (0..cluster.len()).collect();
    order.sort_by(|&a, &b| chromosome[a].partial_cmp(&chromosome[b]).unwrap());
    order.iter().map(|&i| cluster[i]).collect()
}

pub struct BrkgaRouter {
    config: BrkgaConfig,
}

impl BrkgaRouter {
    pub fn new(config: BrkgaConfig) -> Self {
        Self { config }
    }
}

impl Router for BrkgaRouter {
    fn route(&self, ctx: &PlanningContext, cluster: &[usize]) -> Vec<usize> {
        if cluster.len() <= 1 {
            return cluster.to_vec();
        }

        let decoder = RouteDecoder { ctx, cluster };
        let (chromosome, _) = run_brkga(&decoder, &self.config, ctx);
        let sequence = decode_permutation(cluster, &chromosome);

        let sequence = two_opt_to_fixpoint(ctx, sequence);
        let sequence = or_opt_to_fixpoint(ctx, sequence);
        relocate_to_fixpoint(ctx, sequence)
    }
}

fn cost_of(ctx: &PlanningContext, sequence: &[usize]) -> RouteCost {
    evaluate_sequence(sequence, ctx.now, ctx.travel, ctx.deadlines).cost
}

/// Repeatedly apply the best-improving 2-opt edge swap until none improves
/// the route's cost (SPEC_FULL.md §4.5 local search, fixed operator order).
pub fn two_opt_to_fixpoint(ctx: &PlanningContext, mut sequence: Vec<usize>) -> Vec<usize> {
    loop {
        let current = cost_of(ctx, &sequence);
        let mut best: Option<(RouteCost, usize, usize)> = None;

        for i in 0..sequence.len() {
            for j in (i + 1)..sequence.len() {
                let mut candidate = sequence.clone();
                candidate[i..=j].reverse();
                let cost = cost_of(ctx, &candidate);
                if cost < current && best.as_ref().map_or(true, |(b, ..)| cost < *b) {
                    best = Some((cost, i, j));
                }
            }
        }

        match best {
            Some((_, i, j)) => sequence[i..=j].reverse(),
            None => break,
        }
    }
    sequence
}

/// Or-opt: relocate contiguous segments of length 1, 2 or 3 to a better
/// position in the route, repeated to a fixpoint.
pub fn or_opt_to_fixpoint(ctx: &PlanningContext, mut sequence: Vec<usize>) -> Vec<usize> {
    loop {
        let current = cost_of(ctx, &sequence);
        let mut best: Option<(RouteCost, Vec<usize>)> = None;

        for seg_len in 1..=3usize {
            if seg_len >= sequence.len() {
                continue;
            }
            for start in 0..=(sequence.len() - seg_len) {
                let segment: Vec<usize> = sequence[start..start + seg_len].to_vec();
                let mut rest = sequence.clone();
                rest.drain(start..start + seg_len);

                for pos in 0..=rest.len() {
                    let mut candidate = rest.clone();
                    for (offset, &d) in segment.iter().enumerate() {
                        candidate.insert(pos + offset, d);
                    }
                    if candidate == sequence {
                        continue;
                    }
                    let cost = cost_of(ctx, &candidate);
                    if cost < current && best.as_ref().map_or(true, |(b, _)| cost < *b) {
                        best = Some((cost, candidate));
                    }
                }
            }
        }

        match best {
            Some((_, candidate)) => sequence = candidate,
            None => break,
        }
    }
    sequence
}

/// Single-delivery relocate, the seg_len == 1 specialization of or-opt kept
/// as its own pass since it converges independently and cheaply after 2-opt
/// and or-opt have already settled.
pub fn relocate_to_fixpoint(ctx: &PlanningContext, mut sequence: Vec<usize>) -> Vec<usize> {
    loop {
        let current = cost_of(ctx, &sequence);
        let mut best: Option<(RouteCost, usize, usize)> = None;

        for from in 0..sequence.len() {
            for to in 0..sequence.len() {
                if from == to {
                    continue;
                }
                let mut candidate = sequence.clone();
                let d = candidate.remove(from);
                let insert_at = if to > from { to - 1 } else { to };
                candidate.insert(insert_at, d);
                let cost = cost_of(ctx, &candidate);
                if cost < current && best.as_ref().map_or(true, |(b, ..)| cost < *b) {
                    best = Some((cost, from, to));
                }
            }
        }

        match best {
            Some((_, from, to)) => {
                let d = sequence.remove(from);
                let insert_at = if to > from { to - 1 } else { to };
                sequence.insert(insert_at, d);
            }
            None => break,
        }
    }
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TravelTimeMatrix;
    use crate::model::Point;

    fn line_ctx(n: usize) -> (TravelTimeMatrix, Vec<Point>, Vec<f64>, Vec<i64>) {
        let points: Vec<Point> = (0..n).map(|i| Point::new(i as f64, 0.0)).collect();
        let travel = TravelTimeMatrix::build(&points, 1.0);
        let deadlines = vec![1000.0; n];
        let sizes = vec![0i64; n];
        (travel, points, deadlines, sizes)
    }

    #[test]
    fn brkga_finds_monotone_order_on_a_line() {
        let (travel, points, deadlines, sizes) = line_ctx(5);
        let ctx = PlanningContext {
            travel: &travel,
            points: &points,
            deadlines: &deadlines,
            sizes: &sizes,
            now: 0.0,
            deadline_instant: None,
        };
        let router = BrkgaRouter::new(BrkgaConfig {
            population_size: 30,
            elite_fraction: 0.2,
            mutant_fraction: 0.2,
            elite_bias: 0.7,
            generations: 40,
            stall_generations: 15,
            seed: 42,
        });
        let route = router.route(&ctx, &[4, 2, 1, 3]);
        let cost = cost_of(&ctx, &route);
        assert!(cost.penalty == 0.0);
        let optimal = cost_of(&ctx, &[1, 2, 3, 4]);
        assert_eq!(cost, optimal);
    }

    #[test]
    fn two_opt_fixes_a_crossed_route() {
        let (travel, points, deadlines, sizes) = line_ctx(4);
        let ctx = PlanningContext {
            travel: &travel,
            points: &points,
            deadlines: &deadlines,
            sizes: &sizes,
            now: 0.0,
            deadline_instant: None,
        };
        let improved = two_opt_to_fixpoint(&ctx, vec![3, 2, 1]);
        assert_eq!(cost_of(&ctx, &improved), cost_of(&ctx, &[1, 2, 3]));
    }
}
