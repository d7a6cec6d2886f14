//! Score, history and result types produced by evolutionary runs.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Scores
// ============================================================================

/// Fitness of a candidate, or the sentinel for a candidate that could not be scored.
///
/// The sentinel ranks below every valid score and never takes part in
/// arithmetic such as normalization or averaging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Score {
    /// A finite fitness value.
    Valid(f64),
    /// Unscored or failed candidate.
    Invalid,
}

impl Score {
    /// Wrap a raw value. NaN and infinities become [`Score::Invalid`].
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self::Valid(value)
        } else {
            Self::Invalid
        }
    }

    /// The numeric value, if this score is valid.
    pub fn value(&self) -> Option<f64> {
        match *self {
            Self::Valid(v) if v.is_finite() => Some(v),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.value().is_some()
    }

    /// Key used for ranking; the sentinel maps to negative infinity.
    pub fn rank_key(&self) -> f64 {
        self.value().unwrap_or(f64::NEG_INFINITY)
    }

    /// Total ordering used for ranking (sentinel = minimum).
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.rank_key().total_cmp(&other.rank_key())
    }

    /// Whether this score reaches a threshold. The sentinel never does.
    pub fn reaches(&self, threshold: f64) -> bool {
        self.value().is_some_and(|v| v >= threshold)
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Option<f64>> for Score {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Invalid, Self::new)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{v:.3}"),
            None => f.write_str("invalid"),
        }
    }
}

// ============================================================================
// History and results
// ============================================================================

/// Best score and identity of the leading candidate after one ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Best score in the population.
    pub best_score: Score,
    /// Canonical identity of the best candidate.
    pub best_id: String,
}

/// Reason a run stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Reached maximum generations.
    MaxGenerations,
    /// Best score reached `max_score`.
    TargetReached,
}

/// Terminal output of one evolutionary run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult<C> {
    /// Final scores, parallel to `population`, sorted descending.
    pub scores: Vec<Score>,
    /// Final population.
    pub population: Vec<C>,
    /// One entry for the initial population plus one per completed generation.
    pub history: Vec<HistoryEntry>,
    /// Number of completed generations, not counting the initial pass.
    pub generations_run: usize,
    /// Why the run stopped.
    pub stop_reason: StopReason,
}

impl<C> RunResult<C> {
    /// Best candidate and its score.
    pub fn best(&self) -> Option<(&C, Score)> {
        self.population.first().zip(self.scores.first().copied())
    }

    /// Best final score, or the sentinel for an empty population.
    pub fn best_score(&self) -> Score {
        self.scores.first().copied().unwrap_or(Score::Invalid)
    }
}

// ============================================================================
// Progress reporting
// ============================================================================

/// Stage of the generational loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvolutionPhase {
    /// Sampling the initial population from the seed pool.
    #[default]
    Initializing,
    /// Scoring candidates.
    Evaluating,
    /// Drawing the mating pool.
    Selecting,
    /// Creating offspring.
    Reproducing,
    /// Merging, deduplicating, ranking and truncating.
    Sanitizing,
    /// Checking the stop conditions.
    CheckingTermination,
    /// Run finished.
    Terminated,
}

/// Snapshot handed to progress callbacks after each ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Index of the run within its batch.
    pub run_index: usize,
    /// Completed generations (0 for the initial population).
    pub generation: usize,
    /// Configured generation limit.
    pub max_generations: usize,
    /// Best score in the population.
    pub best_score: Score,
    /// Canonical identity of the best candidate.
    pub best_id: String,
    /// Current population size.
    pub population_len: usize,
    /// Members with a valid score.
    pub valid_count: usize,
    /// Mean over valid scores.
    pub mean_score: Option<f64>,
    /// `Sanitizing` for the initial ranking, `CheckingTermination` after a
    /// generation (the stop conditions are evaluated right after the report).
    pub phase: EvolutionPhase,
}
