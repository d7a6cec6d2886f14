//! Mock collaborators shared by the engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use crate::schema::Score;

use super::candidate::{EvaluationContext, Evaluator, SearchRng, Variation};
use super::error::EvaluatorError;

/// Crossover returns the first parent unchanged; mutation is a no-op.
pub struct IdentityVariation;

impl Variation<String> for IdentityVariation {
    fn crossover(&self, parent_a: &String, _: &String, _: &mut SearchRng) -> Option<String> {
        Some(parent_a.clone())
    }

    fn mutate(&self, child: String, _: f64, _: &mut SearchRng) -> Option<String> {
        Some(child)
    }
}

/// Never produces offspring.
pub struct NoOffspring;

impl Variation<String> for NoOffspring {
    fn crossover(&self, _: &String, _: &String, _: &mut SearchRng) -> Option<String> {
        None
    }

    fn mutate(&self, _: String, _: f64, _: &mut SearchRng) -> Option<String> {
        None
    }
}

/// Each operator fails half of the time.
pub struct FlakyVariation;

impl Variation<String> for FlakyVariation {
    fn crossover(&self, parent_a: &String, parent_b: &String, rng: &mut SearchRng) -> Option<String> {
        rng.gen_bool(0.5).then(|| format!("{parent_a}{parent_b}"))
    }

    fn mutate(&self, child: String, _: f64, rng: &mut SearchRng) -> Option<String> {
        rng.gen_bool(0.5).then_some(child)
    }
}

/// Scores candidates from a fixed table; unknown candidates are invalid.
#[derive(Default)]
pub struct TableEvaluator {
    table: HashMap<String, f64>,
    calls: AtomicUsize,
    evaluated: AtomicUsize,
}

impl TableEvaluator {
    pub fn new(entries: &[(&str, f64)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(id, score)| (id.to_string(), *score))
                .collect(),
            ..Default::default()
        }
    }

    /// Number of batch calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Total candidates scored across all calls.
    pub fn evaluated(&self) -> usize {
        self.evaluated.load(Ordering::Relaxed)
    }
}

impl Evaluator<String> for TableEvaluator {
    fn evaluate(
        &self,
        candidates: &[String],
        _context: &EvaluationContext,
    ) -> Result<Vec<Score>, EvaluatorError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.evaluated.fetch_add(candidates.len(), Ordering::Relaxed);
        Ok(candidates
            .iter()
            .map(|c| Score::from(self.table.get(c).copied()))
            .collect())
    }
}

/// Fails every batch from a given generation on.
pub struct FailingEvaluator {
    pub from_generation: usize,
    pub inner: TableEvaluator,
}

impl Evaluator<String> for FailingEvaluator {
    fn evaluate(
        &self,
        candidates: &[String],
        context: &EvaluationContext,
    ) -> Result<Vec<Score>, EvaluatorError> {
        if context.generation >= self.from_generation {
            return Err(EvaluatorError::new("docking backend crashed"));
        }
        self.inner.evaluate(candidates, context)
    }
}

/// Fails every batch of the listed run indices.
pub struct FailingRuns {
    pub runs: Vec<usize>,
    pub inner: TableEvaluator,
}

impl Evaluator<String> for FailingRuns {
    fn evaluate(
        &self,
        candidates: &[String],
        context: &EvaluationContext,
    ) -> Result<Vec<Score>, EvaluatorError> {
        if self.runs.contains(&context.run_index) {
            return Err(EvaluatorError::new("scoring service unavailable"));
        }
        self.inner.evaluate(candidates, context)
    }
}

pub fn seeds(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
