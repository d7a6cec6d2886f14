//! Generational search loop.

use log::{debug, info, warn};

use crate::schema::{EvolutionPhase, GenerationReport, RunConfig, RunResult, Score, StopReason};

use super::candidate::{Candidate, EvaluationContext, Evaluator, SearchRng, Variation};
use super::error::SearchError;
use super::fitness::FitnessDistribution;
use super::reproduction::reproduce;
use super::sanitize::{Population, sanitize};
use super::selection::make_mating_pool;

/// Evolution engine that runs one search.
///
/// Owns the run's random generator and live population; collaborators are
/// borrowed for the duration of the run.
pub struct EvolutionEngine<'a, C, E: ?Sized, V: ?Sized> {
    config: RunConfig,
    rng: SearchRng,
    seeds: &'a [C],
    evaluator: &'a E,
    variation: &'a V,
    context: EvaluationContext,
    phase: EvolutionPhase,
}

impl<'a, C, E, V> EvolutionEngine<'a, C, E, V>
where
    C: Candidate,
    E: Evaluator<C> + ?Sized,
    V: Variation<C> + ?Sized,
{
    /// Create a new evolution engine.
    pub fn new(config: RunConfig, seeds: &'a [C], evaluator: &'a E, variation: &'a V) -> Self {
        let rng = SearchRng::new(config.random_seed);
        Self {
            config,
            rng,
            seeds,
            evaluator,
            variation,
            context: EvaluationContext::default(),
            phase: EvolutionPhase::Initializing,
        }
    }

    /// Set the run index and artifact location passed to the evaluator.
    pub fn with_context(mut self, context: EvaluationContext) -> Self {
        self.context = context;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    /// Sample the initial population uniformly, with replacement, from the
    /// valid seed candidates.
    pub fn initialize(&mut self) -> Result<Vec<C>, SearchError> {
        self.phase = EvolutionPhase::Initializing;

        let pool: Vec<&C> = self.seeds.iter().filter(|c| c.is_valid()).collect();
        if pool.is_empty() {
            return Err(SearchError::EmptySeedPool);
        }
        if pool.len() < self.seeds.len() {
            warn!(
                "Ignoring {} invalid seed candidates",
                self.seeds.len() - pool.len()
            );
        }

        Ok((0..self.config.population_size)
            .map(|_| pool[self.rng.index(pool.len())].clone())
            .collect())
    }

    /// Score a batch, checking the one-score-per-candidate contract.
    fn evaluate(&mut self, candidates: &[C], generation: usize) -> Result<Vec<Score>, SearchError> {
        self.phase = EvolutionPhase::Evaluating;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let context = EvaluationContext {
            generation,
            ..self.context.clone()
        };
        let scores = self
            .evaluator
            .evaluate(candidates, &context)
            .map_err(|source| SearchError::Evaluator { generation, source })?;

        if scores.len() != candidates.len() {
            return Err(SearchError::ScoreCountMismatch {
                generation,
                expected: candidates.len(),
                actual: scores.len(),
            });
        }

        // Non-finite payloads become the sentinel before they reach the population.
        let scores: Vec<Score> = scores.into_iter().map(|s| Score::from(s.value())).collect();

        let invalid = scores.iter().filter(|s| !s.is_valid()).count();
        if invalid > 0 {
            warn!(
                "Generation {}: {}/{} candidates could not be scored",
                generation,
                invalid,
                candidates.len()
            );
        }

        Ok(scores)
    }

    fn report(&self, population: &Population<C>, generation: usize) -> GenerationReport {
        let best = population.history_entry();
        GenerationReport {
            run_index: self.context.run_index,
            generation,
            max_generations: self.config.max_generations,
            best_score: best.best_score,
            best_id: best.best_id,
            population_len: population.len(),
            valid_count: population.valid_count(),
            mean_score: population.mean_score(),
            phase: self.phase,
        }
    }

    /// Run one generation: select, reproduce, evaluate offspring, sanitize.
    fn step_generation(
        &mut self,
        population: Population<C>,
        generation: usize,
    ) -> Result<Population<C>, SearchError> {
        self.phase = EvolutionPhase::Selecting;
        let fitness = FitnessDistribution::from_scores(population.scores())
            .map_err(|source| SearchError::Fitness { generation, source })?;
        let pool = make_mating_pool(
            population.members(),
            &fitness,
            self.config.mating_pool_size,
            &mut self.rng,
        )
        .map_err(|source| SearchError::Fitness { generation, source })?;

        self.phase = EvolutionPhase::Reproducing;
        let (offspring, stats) = reproduce(
            &pool,
            self.config.population_size,
            self.config.mutation_rate,
            self.variation,
            &mut self.rng,
            self.config.reproduction_budget(),
        )
        .map_err(|source| SearchError::Reproduction {
            generation,
            mutation_rate: self.config.mutation_rate,
            mating_pool_size: self.config.mating_pool_size,
            source,
        })?;
        debug!(
            "Generation {}: {} offspring from {} attempts",
            generation,
            offspring.len(),
            stats.attempts
        );

        let offspring_scores = self.evaluate(&offspring, generation)?;

        self.phase = EvolutionPhase::Sanitizing;
        Ok(sanitize(
            population
                .into_pairs()
                .chain(offspring.into_iter().zip(offspring_scores)),
            self.config.population_size,
            self.config.prune_population,
        ))
    }

    /// Run evolution with progress callback.
    ///
    /// The callback fires after the initial ranking and after every
    /// completed generation.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<RunResult<C>, SearchError>
    where
        F: FnMut(&GenerationReport),
    {
        self.config.validate()?;

        let initial = self.initialize()?;
        let initial_scores = self.evaluate(&initial, 0)?;

        self.phase = EvolutionPhase::Sanitizing;
        let mut population = sanitize(
            initial.into_iter().zip(initial_scores),
            self.config.population_size,
            self.config.prune_initial_population,
        );
        let mut history = vec![population.history_entry()];
        info!(
            "Run {}: initial population of {}, best {} ({})",
            self.context.run_index,
            population.len(),
            history[0].best_score,
            history[0].best_id
        );
        callback(&self.report(&population, 0));

        let mut generations_run = 0;
        let mut stop_reason = StopReason::MaxGenerations;

        while generations_run < self.config.max_generations {
            let generation = generations_run + 1;
            population = self.step_generation(population, generation)?;
            generations_run = generation;

            let entry = population.history_entry();
            info!(
                "Run {}: generation {}/{}: best {} ({})",
                self.context.run_index,
                generation,
                self.config.max_generations,
                entry.best_score,
                entry.best_id
            );
            history.push(entry);

            self.phase = EvolutionPhase::CheckingTermination;
            callback(&self.report(&population, generation));
            if population.best_score().reaches(self.config.max_score) {
                stop_reason = StopReason::TargetReached;
                break;
            }
        }

        self.phase = EvolutionPhase::Terminated;
        info!(
            "Run {}: finished after {} generations ({:?})",
            self.context.run_index, generations_run, stop_reason
        );

        let (population, scores) = population.into_parts();
        Ok(RunResult {
            scores,
            population,
            history,
            generations_run,
            stop_reason,
        })
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> Result<RunResult<C>, SearchError> {
        self.run_with_callback(|_| {})
    }
}
