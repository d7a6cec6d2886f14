//! Run-fatal errors and their classification.

use thiserror::Error;

use crate::schema::ConfigError;

use super::fitness::FitnessError;
use super::reproduction::ReproductionError;

/// Failure of a whole evaluation batch, e.g. a crashed external tool.
///
/// Per-candidate failures are not errors; they are reported as
/// [`Score::Invalid`](crate::schema::Score::Invalid).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EvaluatorError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EvaluatorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Broad class of a fatal run error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad configuration or data (empty seed pool, zero-sum fitness).
    Data,
    /// The evaluator failed for a whole batch.
    EvaluatorInfrastructure,
    /// Offspring could not be produced within the attempt budget.
    ReproductionExhaustion,
}

/// Errors that end an evolutionary run.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid run configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed pool contains no valid candidates")]
    EmptySeedPool,

    #[error("Generation {generation}: fitness distribution is unusable: {source}")]
    Fitness {
        generation: usize,
        #[source]
        source: FitnessError,
    },

    #[error("Generation {generation}: evaluator failed: {source}")]
    Evaluator {
        generation: usize,
        #[source]
        source: EvaluatorError,
    },

    #[error("Generation {generation}: evaluator returned {actual} scores for {expected} candidates")]
    ScoreCountMismatch {
        generation: usize,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Generation {generation}: reproduction failed (mutation rate {mutation_rate}, mating pool size {mating_pool_size}): {source}"
    )]
    Reproduction {
        generation: usize,
        mutation_rate: f64,
        mating_pool_size: usize,
        #[source]
        source: ReproductionError,
    },
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::EmptySeedPool | Self::Fitness { .. } => ErrorKind::Data,
            Self::Evaluator { .. } | Self::ScoreCountMismatch { .. } => {
                ErrorKind::EvaluatorInfrastructure
            }
            Self::Reproduction { .. } => ErrorKind::ReproductionExhaustion,
        }
    }
}
