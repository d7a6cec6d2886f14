//! Fitness normalization and fitness-proportional sampling weights.

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use thiserror::Error;

use crate::schema::Score;

use super::candidate::SearchRng;

#[derive(Debug, Error)]
pub enum FitnessError {
    #[error("Cannot normalize an empty score list")]
    Empty,
    #[error("Score at index {index} is invalid")]
    InvalidScore { index: usize },
    #[error("Score at index {index} is negative ({value})")]
    NegativeScore { index: usize, value: f64 },
    #[error("Scores sum to {0}; a positive finite total is required")]
    DegenerateSum(f64),
    #[error("Population has {population} members but the distribution has {weights} weights")]
    LengthMismatch { population: usize, weights: usize },
    #[error("Failed to create weighted distribution: {source}")]
    Distribution {
        #[from]
        source: WeightedError,
    },
}

/// Convert scores into weights that sum to 1 (`weight[i] = score[i] / sum`).
///
/// Every score must be valid and non-negative, and the total must be
/// positive and finite.
pub fn normalize_fitness(scores: &[Score]) -> Result<Vec<f64>, FitnessError> {
    if scores.is_empty() {
        return Err(FitnessError::Empty);
    }

    let mut values = Vec::with_capacity(scores.len());
    for (index, score) in scores.iter().enumerate() {
        let value = score
            .value()
            .ok_or(FitnessError::InvalidScore { index })?;
        if value < 0.0 {
            return Err(FitnessError::NegativeScore { index, value });
        }
        values.push(value);
    }

    let total: f64 = values.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(FitnessError::DegenerateSum(total));
    }

    Ok(values.into_iter().map(|v| v / total).collect())
}

/// Selection probabilities over a ranked population.
///
/// Members with an invalid or negative score are not eligible for
/// selection and get weight zero.
#[derive(Debug, Clone)]
pub struct FitnessDistribution {
    weights: Vec<f64>,
    index: WeightedIndex<f64>,
    excluded: usize,
}

impl FitnessDistribution {
    /// Build the distribution for a population's scores.
    pub fn from_scores(scores: &[Score]) -> Result<Self, FitnessError> {
        let mut excluded = 0;
        let eligible: Vec<Score> = scores
            .iter()
            .map(|score| match score.value() {
                Some(v) if v >= 0.0 => *score,
                _ => {
                    excluded += 1;
                    Score::Valid(0.0)
                }
            })
            .collect();

        let weights = normalize_fitness(&eligible)?;
        let index = WeightedIndex::new(&weights)?;

        Ok(Self {
            weights,
            index,
            excluded,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Number of members that were not eligible for selection.
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Draw one population index with probability `weight[i]`.
    pub fn sample_index(&self, rng: &mut SearchRng) -> usize {
        self.index.sample(rng)
    }
}
