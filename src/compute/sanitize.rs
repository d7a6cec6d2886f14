//! Population sanitization: merge, deduplicate, rank and truncate.

use std::collections::HashSet;

use crate::schema::{HistoryEntry, Score};

use super::candidate::Candidate;

/// Ranked population with parallel scores.
///
/// Only [`sanitize`] builds one, so members are always sorted by
/// non-increasing score (invalid last) and bounded by the requested size.
#[derive(Debug, Clone, PartialEq)]
pub struct Population<C> {
    members: Vec<C>,
    scores: Vec<Score>,
}

impl<C: Candidate> Population<C> {
    pub fn members(&self) -> &[C] {
        &self.members
    }

    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Best score, or the sentinel when empty.
    pub fn best_score(&self) -> Score {
        self.scores.first().copied().unwrap_or(Score::Invalid)
    }

    /// History entry for the current leader.
    pub fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            best_score: self.best_score(),
            best_id: self
                .members
                .first()
                .map(Candidate::canonical_id)
                .unwrap_or_default(),
        }
    }

    /// Members with a valid score.
    pub fn valid_count(&self) -> usize {
        self.scores.iter().filter(|s| s.is_valid()).count()
    }

    /// Mean over valid scores.
    pub fn mean_score(&self) -> Option<f64> {
        let valid: Vec<f64> = self.scores.iter().filter_map(Score::value).collect();
        if valid.is_empty() {
            None
        } else {
            Some(valid.iter().sum::<f64>() / valid.len() as f64)
        }
    }

    /// (member, score) pairs in rank order.
    pub fn into_pairs(self) -> impl Iterator<Item = (C, Score)> {
        self.members.into_iter().zip(self.scores)
    }

    pub fn into_parts(self) -> (Vec<C>, Vec<Score>) {
        (self.members, self.scores)
    }
}

/// Build the next population from scored pairs.
///
/// With `prune` set, only the first pair seen for each canonical identity is
/// kept. Pairs are then stably sorted by descending score, with the invalid
/// sentinel ranked last, and truncated to `population_size`.
///
/// Pruning trades diversity for uniqueness: duplicates of a strong candidate
/// no longer crowd the population, but a lineage can also be lost for good.
pub fn sanitize<C, I>(pairs: I, population_size: usize, prune: bool) -> Population<C>
where
    C: Candidate,
    I: IntoIterator<Item = (C, Score)>,
{
    let mut ranked: Vec<(C, Score)> = if prune {
        let mut seen = HashSet::new();
        pairs
            .into_iter()
            .filter(|(candidate, _)| seen.insert(candidate.canonical_id()))
            .collect()
    } else {
        pairs.into_iter().collect()
    };

    ranked.sort_by(|a, b| b.1.rank_cmp(&a.1));
    ranked.truncate(population_size);

    let (members, scores) = ranked.into_iter().unzip();
    Population { members, scores }
}
