//! Collaborator interfaces: candidates, variation operators and evaluators.
//!
//! The engine never looks inside a candidate. It only needs a canonical
//! identity for deduplication, a validity check, two variation operators
//! that may fail, and a batch evaluator.

use std::path::PathBuf;

use rand::prelude::*;
use rayon::prelude::*;

use crate::schema::Score;

use super::archive::run_artifact_name;
use super::error::EvaluatorError;

/// One point in the search space.
pub trait Candidate: Clone {
    /// Canonical identity used for deduplication and history.
    fn canonical_id(&self) -> String;

    /// Malformed candidates are treated as absent.
    fn is_valid(&self) -> bool {
        true
    }
}

impl Candidate for String {
    fn canonical_id(&self) -> String {
        self.clone()
    }

    fn is_valid(&self) -> bool {
        !self.is_empty()
    }
}

/// Crossover and mutation operators.
///
/// Either operator may return `None` for inputs it cannot combine or
/// perturb; the engine retries instead of failing.
pub trait Variation<C> {
    /// Combine two parents into a child.
    fn crossover(&self, parent_a: &C, parent_b: &C, rng: &mut SearchRng) -> Option<C>;

    /// Perturb a child. `mutation_rate` controls probability or intensity.
    fn mutate(&self, child: C, mutation_rate: f64, rng: &mut SearchRng) -> Option<C>;
}

/// Batch scoring of candidates.
///
/// Implementations return exactly one score per input, in input order.
/// A candidate that cannot be scored gets [`Score::Invalid`]; an `Err`
/// means the whole batch failed and ends the run.
pub trait Evaluator<C> {
    fn evaluate(
        &self,
        candidates: &[C],
        context: &EvaluationContext,
    ) -> Result<Vec<Score>, EvaluatorError>;
}

/// Where an evaluation call happens, for evaluators that keep per-run artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationContext {
    /// Index of the run within its batch.
    pub run_index: usize,
    /// 0 for the initial population, then the generation being evaluated.
    pub generation: usize,
    /// Directory for per-run artifacts, if the run is persisted.
    pub artifact_dir: Option<PathBuf>,
}

impl EvaluationContext {
    pub fn new(run_index: usize) -> Self {
        Self {
            run_index,
            ..Default::default()
        }
    }

    /// Set the artifact directory.
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Path for an artifact named after this run, e.g. `scored.jsonl` ->
    /// `scored_3.jsonl` for run 3.
    pub fn artifact_path(&self, name: &str) -> Option<PathBuf> {
        self.artifact_dir
            .as_ref()
            .map(|dir| dir.join(run_artifact_name(name, self.run_index)))
    }
}

/// Evaluator built from a per-candidate scoring function.
///
/// Candidates are scored in parallel; `None` from the function becomes the
/// invalid sentinel.
pub struct ParallelEvaluator<F> {
    score_fn: F,
}

impl<F> ParallelEvaluator<F> {
    pub fn new(score_fn: F) -> Self {
        Self { score_fn }
    }
}

impl<C, F> Evaluator<C> for ParallelEvaluator<F>
where
    C: Sync,
    F: Fn(&C) -> Option<f64> + Sync,
{
    fn evaluate(
        &self,
        candidates: &[C],
        _context: &EvaluationContext,
    ) -> Result<Vec<Score>, EvaluatorError> {
        Ok(candidates
            .par_iter()
            .map(|candidate| Score::from((self.score_fn)(candidate)))
            .collect())
    }
}

/// Random number generator owned by a single run.
///
/// Every random decision of a run (initial sampling, mating pool draws,
/// parent picks, operator internals) goes through one instance, so runs with
/// the same seed are reproducible and concurrent runs never interfere.
pub struct SearchRng {
    rng: StdRng,
}

impl SearchRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

}

impl RngCore for SearchRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SearchRng::new(7);
        let mut b = SearchRng::new(7);
        let xs: Vec<usize> = (0..16).map(|_| a.index(100)).collect();
        let ys: Vec<usize> = (0..16).map(|_| b.index(100)).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_parallel_evaluator_preserves_order() {
        let evaluator = ParallelEvaluator::new(|s: &String| {
            if s == "bad" { None } else { Some(s.len() as f64) }
        });
        let batch: Vec<String> = ["a", "bad", "ccc", "dd"].map(String::from).to_vec();
        let scores = evaluator
            .evaluate(&batch, &EvaluationContext::default())
            .unwrap();
        assert_eq!(
            scores,
            vec![
                Score::new(1.0),
                Score::Invalid,
                Score::new(3.0),
                Score::new(2.0)
            ]
        );
    }

    #[test]
    fn test_artifact_path() {
        let context = EvaluationContext::new(3).with_artifact_dir("/tmp/out");
        assert_eq!(
            context.artifact_path("scored.jsonl"),
            Some(PathBuf::from("/tmp/out/scored_3.jsonl"))
        );
        assert_eq!(EvaluationContext::new(3).artifact_path("scored.jsonl"), None);
    }

    #[test]
    fn test_string_candidate() {
        assert!("abc".to_string().is_valid());
        assert!(!String::new().is_valid());
        assert_eq!("abc".to_string().canonical_id(), "abc");
    }
}
