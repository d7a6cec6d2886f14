//! Offspring generation from a mating pool.

use log::debug;
use thiserror::Error;

use super::candidate::{Candidate, SearchRng, Variation};

#[derive(Debug, Error)]
pub enum ReproductionError {
    #[error("Mating pool is empty; cannot draw parents for {target} offspring")]
    EmptyMatingPool { target: usize },

    #[error(
        "Produced {produced}/{target} offspring in {attempts} attempts ({crossover_failures} crossover failures, {mutation_failures} mutation failures)"
    )]
    Exhausted {
        produced: usize,
        target: usize,
        attempts: usize,
        crossover_failures: usize,
        mutation_failures: usize,
    },
}

/// Counters from one reproduction round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReproductionStats {
    pub attempts: usize,
    pub crossover_failures: usize,
    pub mutation_failures: usize,
}

/// Produce exactly `target` viable offspring.
///
/// Each attempt draws two parents uniformly from the pool (possibly the same
/// one), applies crossover and then mutation. An attempt that yields no
/// child, or an invalid one, is discarded and retried. After `max_attempts`
/// attempts without reaching `target` the round fails.
pub fn reproduce<C, V>(
    mating_pool: &[&C],
    target: usize,
    mutation_rate: f64,
    variation: &V,
    rng: &mut SearchRng,
    max_attempts: usize,
) -> Result<(Vec<C>, ReproductionStats), ReproductionError>
where
    C: Candidate,
    V: Variation<C> + ?Sized,
{
    let mut offspring = Vec::with_capacity(target);
    let mut stats = ReproductionStats::default();

    if target > 0 && mating_pool.is_empty() {
        return Err(ReproductionError::EmptyMatingPool { target });
    }

    while offspring.len() < target {
        if stats.attempts >= max_attempts {
            return Err(ReproductionError::Exhausted {
                produced: offspring.len(),
                target,
                attempts: stats.attempts,
                crossover_failures: stats.crossover_failures,
                mutation_failures: stats.mutation_failures,
            });
        }
        stats.attempts += 1;

        let parent_a = mating_pool[rng.index(mating_pool.len())];
        let parent_b = mating_pool[rng.index(mating_pool.len())];

        let Some(child) = variation
            .crossover(parent_a, parent_b, rng)
            .filter(C::is_valid)
        else {
            stats.crossover_failures += 1;
            continue;
        };

        let Some(mutated) = variation
            .mutate(child, mutation_rate, rng)
            .filter(C::is_valid)
        else {
            stats.mutation_failures += 1;
            continue;
        };

        offspring.push(mutated);
    }

    debug!(
        "Reproduced {} offspring in {} attempts ({} crossover / {} mutation failures)",
        offspring.len(),
        stats.attempts,
        stats.crossover_failures,
        stats.mutation_failures
    );

    Ok((offspring, stats))
}
