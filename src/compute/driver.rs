//! Batches of independent, resumable runs.

use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::schema::{BatchConfig, ConfigError, Score};

use super::archive::{CheckpointError, CheckpointStore};
use super::candidate::{Candidate, EvaluationContext, Evaluator, Variation};
use super::error::SearchError;
use super::search::EvolutionEngine;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Invalid batch configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Run {run_index} failed: {source}")]
    Run {
        run_index: usize,
        #[source]
        source: SearchError,
    },

    #[error("Run {run_index} could not be saved: {source}")]
    Checkpoint {
        run_index: usize,
        #[source]
        source: CheckpointError,
    },
}

/// A run computed in this invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedRun {
    pub run_index: usize,
    /// Best final score.
    pub best_score: Score,
    pub generations_run: usize,
}

/// Outcome of one run index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    /// A result was already persisted; nothing was computed.
    Skipped,
    /// The run finished and its result was persisted.
    Completed(CompletedRun),
}

/// What a batch did, per run index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Runs computed in this invocation, in index order.
    pub completed: Vec<CompletedRun>,
    /// Runs skipped because a result already existed.
    pub skipped: Vec<usize>,
}

impl BatchSummary {
    fn record(&mut self, run_index: usize, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Skipped => self.skipped.push(run_index),
            RunOutcome::Completed(run) => self.completed.push(run),
        }
    }

    /// Indices of the completed runs.
    pub fn completed_indices(&self) -> Vec<usize> {
        self.completed.iter().map(|run| run.run_index).collect()
    }
}

/// Runs a batch of independent searches and persists each result.
///
/// Re-running a batch over the same store skips every index that already
/// has a result, so an interrupted batch resumes where it stopped. A failed
/// run leaves no result behind and is retried on the next invocation.
pub struct BatchRunner {
    config: BatchConfig,
    store: CheckpointStore,
}

impl BatchRunner {
    pub fn new(config: BatchConfig, store: CheckpointStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Run every index of the batch.
    ///
    /// Sequential batches stop at the first failed run. Parallel batches let
    /// the other runs finish and then report the lowest failed index.
    pub fn run<C, E, V>(
        &self,
        seeds: &[C],
        evaluator: &E,
        variation: &V,
    ) -> Result<BatchSummary, DriverError>
    where
        C: Candidate + Serialize + Send + Sync,
        E: Evaluator<C> + Sync + ?Sized,
        V: Variation<C> + Sync + ?Sized,
    {
        self.config.validate()?;

        let mut summary = BatchSummary::default();

        if self.config.parallel {
            let outcomes: Vec<(usize, Result<RunOutcome, DriverError>)> = (0..self.config.runs)
                .into_par_iter()
                .map(|run_index| (run_index, self.run_one(run_index, seeds, evaluator, variation)))
                .collect();

            for (run_index, outcome) in outcomes {
                summary.record(run_index, outcome?);
            }
        } else {
            for run_index in 0..self.config.runs {
                let outcome = self.run_one(run_index, seeds, evaluator, variation)?;
                summary.record(run_index, outcome);
            }
        }

        info!(
            "Batch finished: {} completed, {} skipped",
            summary.completed.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Run a single index unless its result already exists.
    pub fn run_one<C, E, V>(
        &self,
        run_index: usize,
        seeds: &[C],
        evaluator: &E,
        variation: &V,
    ) -> Result<RunOutcome, DriverError>
    where
        C: Candidate + Serialize,
        E: Evaluator<C> + ?Sized,
        V: Variation<C> + ?Sized,
    {
        if self.store.exists(run_index) {
            info!(
                "Skipping run {}: {} already exists",
                run_index,
                self.store.result_path(run_index).display()
            );
            return Ok(RunOutcome::Skipped);
        }

        let run_config = self.config.run_config(run_index);
        info!(
            "Starting run {}/{} (seed {})",
            run_index + 1,
            self.config.runs,
            run_config.random_seed
        );

        let context = EvaluationContext::new(run_index).with_artifact_dir(self.store.dir());
        let mut engine =
            EvolutionEngine::new(run_config, seeds, evaluator, variation).with_context(context);

        let result = engine.run().map_err(|source| {
            error!("Run {run_index} failed: {source}");
            DriverError::Run { run_index, source }
        })?;

        let path = self
            .store
            .save(run_index, &result)
            .map_err(|source| DriverError::Checkpoint { run_index, source })?;
        info!(
            "Run {} saved to {} (best {})",
            run_index,
            path.display(),
            result.best_score()
        );

        Ok(RunOutcome::Completed(CompletedRun {
            run_index,
            best_score: result.best_score(),
            generations_run: result.generations_run,
        }))
    }
}
