//! Run and batch configuration for evolutionary search.

use serde::{Deserialize, Serialize};

/// Immutable settings for one evolutionary run.
///
/// Constructed once before a run starts and never mutated while it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of individuals kept after every sanitization.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of parents drawn (with replacement) into the mating pool.
    #[serde(default = "default_mating_pool_size")]
    pub mating_pool_size: usize,
    /// Mutation probability handed to the variation operators (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Maximum number of generations after the initial population.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Stop early once the best score reaches this value.
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    /// Deduplicate by canonical identity when building each generation.
    #[serde(default)]
    pub prune_population: bool,
    /// Deduplicate the initial population as well.
    ///
    /// Pruning the initial ranking can leave fewer than `population_size`
    /// members when the seed pool is small.
    #[serde(default)]
    pub prune_initial_population: bool,
    /// Reproduction attempts allowed per requested offspring before a
    /// generation is declared exhausted.
    #[serde(default = "default_attempts_per_offspring")]
    pub attempts_per_offspring: usize,
    /// Seed for the run's random number generator.
    #[serde(default)]
    pub random_seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            mating_pool_size: default_mating_pool_size(),
            mutation_rate: default_mutation_rate(),
            max_generations: default_max_generations(),
            max_score: default_max_score(),
            prune_population: false,
            prune_initial_population: false,
            attempts_per_offspring: default_attempts_per_offspring(),
            random_seed: 0,
        }
    }
}

fn default_population_size() -> usize {
    100
}
fn default_mating_pool_size() -> usize {
    20
}
fn default_mutation_rate() -> f64 {
    0.05
}
fn default_max_generations() -> usize {
    100
}
fn default_max_score() -> f64 {
    1000.0
}
fn default_attempts_per_offspring() -> usize {
    1000
}

impl RunConfig {
    /// Total reproduction attempts allowed in one generation.
    pub fn reproduction_budget(&self) -> usize {
        self.population_size
            .saturating_mul(self.attempts_per_offspring)
    }

    /// Validate run configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.mating_pool_size == 0 {
            return Err(ConfigError::EmptyMatingPool);
        }
        if !self.mutation_rate.is_finite() || !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        if self.max_score.is_nan() {
            return Err(ConfigError::InvalidMaxScore);
        }
        if self.attempts_per_offspring == 0 {
            return Err(ConfigError::NoReproductionAttempts);
        }
        Ok(())
    }
}

/// Settings for a batch of independent runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of independent runs.
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// Run `i` is seeded with `seed_offset + i`.
    #[serde(default = "default_seed_offset")]
    pub seed_offset: u64,
    /// Execute runs on the rayon pool instead of one after another.
    #[serde(default)]
    pub parallel: bool,
    /// Settings shared by every run. `random_seed` is overwritten per run.
    #[serde(default)]
    pub run: RunConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            seed_offset: default_seed_offset(),
            parallel: false,
            run: RunConfig::default(),
        }
    }
}

fn default_runs() -> usize {
    10
}
fn default_seed_offset() -> u64 {
    10
}

impl BatchConfig {
    /// Deterministic seed for a run index.
    pub fn seed_for(&self, run_index: usize) -> u64 {
        self.seed_offset.wrapping_add(run_index as u64)
    }

    /// Configuration for a single run of the batch.
    pub fn run_config(&self, run_index: usize) -> RunConfig {
        RunConfig {
            random_seed: self.seed_for(run_index),
            ..self.run.clone()
        }
    }

    /// Validate batch configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run.validate()
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must be at least 1")]
    EmptyPopulation,
    #[error("Mating pool size must be at least 1")]
    EmptyMatingPool,
    #[error("Mutation rate {0} must lie in [0, 1]")]
    InvalidMutationRate(f64),
    #[error("Maximum score must not be NaN")]
    InvalidMaxScore,
    #[error("At least one reproduction attempt per offspring is required")]
    NoReproductionAttempts,
}
