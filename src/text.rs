//! String candidates for the command-line runner.
//!
//! A small concrete domain: candidates are whitespace-free strings, crossover
//! splices a prefix of one parent onto a suffix of the other, mutation
//! substitutes, inserts or deletes one symbol, and fitness is positional
//! similarity to a target string.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use log::debug;
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::compute::{Candidate, EvaluationContext, Evaluator, EvaluatorError, SearchRng, Variation};
use crate::schema::Score;

/// A non-empty string without whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextCandidate(String);

impl TextCandidate {
    /// Parse one seed line. Blank lines, `#` comments and lines with inner
    /// whitespace yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.contains(char::is_whitespace) {
            return None;
        }
        Some(Self(line.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_chars(chars: &[char]) -> Self {
        Self(chars.iter().collect())
    }
}

impl Candidate for TextCandidate {
    fn canonical_id(&self) -> String {
        self.0.clone()
    }

    fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for TextCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse seed candidates, one per line, skipping malformed lines.
pub fn parse_seeds(text: &str) -> Vec<TextCandidate> {
    text.lines()
        .enumerate()
        .filter_map(|(number, line)| {
            let parsed = TextCandidate::parse(line);
            if parsed.is_none() && !line.trim().is_empty() && !line.trim().starts_with('#') {
                debug!("Skipping malformed seed on line {}: {:?}", number + 1, line);
            }
            parsed
        })
        .collect()
}

/// Load seed candidates from a file.
pub fn load_seed_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<TextCandidate>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_seeds(&content))
}

/// Cut-and-splice crossover with single-symbol mutations.
#[derive(Debug, Clone)]
pub struct SpliceVariation {
    alphabet: Vec<char>,
    max_len: usize,
}

impl SpliceVariation {
    pub fn new(alphabet: &str, max_len: usize) -> Self {
        Self {
            alphabet: alphabet.chars().filter(|c| !c.is_whitespace()).collect(),
            max_len,
        }
    }
}

impl Variation<TextCandidate> for SpliceVariation {
    fn crossover(
        &self,
        parent_a: &TextCandidate,
        parent_b: &TextCandidate,
        rng: &mut SearchRng,
    ) -> Option<TextCandidate> {
        let a: Vec<char> = parent_a.0.chars().collect();
        let b: Vec<char> = parent_b.0.chars().collect();

        let cut_a = rng.gen_range(0..=a.len());
        let cut_b = rng.gen_range(0..=b.len());

        let child: Vec<char> = a[..cut_a].iter().chain(&b[cut_b..]).copied().collect();
        if child.is_empty() || child.len() > self.max_len {
            return None;
        }
        Some(TextCandidate::from_chars(&child))
    }

    fn mutate(
        &self,
        child: TextCandidate,
        mutation_rate: f64,
        rng: &mut SearchRng,
    ) -> Option<TextCandidate> {
        if rng.r#gen::<f64>() >= mutation_rate {
            return Some(child);
        }
        let &symbol = self.alphabet.choose(rng)?;
        let mut chars: Vec<char> = child.0.chars().collect();

        match rng.gen_range(0..3) {
            // Substitute
            0 => {
                let pos = rng.gen_range(0..chars.len());
                chars[pos] = symbol;
            }
            // Insert
            1 => {
                if chars.len() >= self.max_len {
                    return None;
                }
                let pos = rng.gen_range(0..=chars.len());
                chars.insert(pos, symbol);
            }
            // Delete
            _ => {
                if chars.len() <= 1 {
                    return None;
                }
                let pos = rng.gen_range(0..chars.len());
                chars.remove(pos);
            }
        }

        Some(TextCandidate::from_chars(&chars))
    }
}

/// Scores candidates by positional similarity to a target string.
///
/// A perfect match scores 100. Each matching position adds one point and
/// each symbol of length difference costs half a point, floored at zero.
#[derive(Debug, Clone)]
pub struct TargetEvaluator {
    target: Vec<char>,
    artifact_name: Option<String>,
}

#[derive(Serialize)]
struct ScoredRecord<'r> {
    generation: usize,
    candidate: &'r str,
    score: Score,
}

impl TargetEvaluator {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.chars().collect(),
            artifact_name: None,
        }
    }

    /// Record every scored candidate in a per-run JSON-lines artifact. The
    /// file is rewritten when the initial population is scored.
    pub fn with_artifacts(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = Some(name.into());
        self
    }

    /// Score one candidate. An empty target cannot score anything.
    pub fn score(&self, candidate: &TextCandidate) -> Option<f64> {
        if self.target.is_empty() {
            return None;
        }
        let chars: Vec<char> = candidate.0.chars().collect();
        let matches = chars
            .iter()
            .zip(&self.target)
            .filter(|(a, b)| a == b)
            .count() as f64;
        let penalty = chars.len().abs_diff(self.target.len()) as f64 * 0.5;
        Some((matches - penalty).max(0.0) / self.target.len() as f64 * 100.0)
    }

    fn record(
        &self,
        path: &Path,
        generation: usize,
        candidates: &[TextCandidate],
        scores: &[Score],
    ) -> io::Result<()> {
        // Generation 0 starts a run; records of an earlier attempt are replaced.
        let mut file = if generation == 0 {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?
        } else {
            OpenOptions::new().create(true).append(true).open(path)?
        };
        for (candidate, score) in candidates.iter().zip(scores) {
            let record = ScoredRecord {
                generation,
                candidate: candidate.as_str(),
                score: *score,
            };
            let line = serde_json::to_string(&record)?;
            writeln!(file, "{line}")?;
        }
        Ok(())
    }
}

impl Evaluator<TextCandidate> for TargetEvaluator {
    fn evaluate(
        &self,
        candidates: &[TextCandidate],
        context: &EvaluationContext,
    ) -> Result<Vec<Score>, EvaluatorError> {
        let scores: Vec<Score> = candidates
            .par_iter()
            .map(|candidate| Score::from(self.score(candidate)))
            .collect();

        if let Some(path) = self
            .artifact_name
            .as_deref()
            .and_then(|name| context.artifact_path(name))
        {
            self.record(&path, context.generation, candidates, &scores)
                .map_err(|e| {
                    EvaluatorError::with_source(format!("failed to write {}", path.display()), e)
                })?;
        }

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{CheckpointStore, EvolutionEngine};
    use crate::schema::RunConfig;

    fn candidate(s: &str) -> TextCandidate {
        TextCandidate::parse(s).unwrap()
    }

    #[test]
    fn test_parse_seeds_skips_malformed() {
        let seeds = parse_seeds("GATT\n\n# comment\nGA TT\n  ACGT  \n");
        assert_eq!(seeds, vec![candidate("GATT"), candidate("ACGT")]);
    }

    #[test]
    fn test_load_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.txt");
        fs::write(&path, "AAAA\nCCCC\n").unwrap();
        assert_eq!(load_seed_file(&path).unwrap().len(), 2);
        assert!(load_seed_file(dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_target_score() {
        let evaluator = TargetEvaluator::new("GATTACA");
        assert_eq!(evaluator.score(&candidate("GATTACA")), Some(100.0));
        assert_eq!(evaluator.score(&candidate("CCCCCCC")), Some(100.0 / 7.0));
        assert_eq!(evaluator.score(&candidate("T")), Some(0.0));
        assert_eq!(TargetEvaluator::new("").score(&candidate("A")), None);
    }

    #[test]
    fn test_crossover_and_mutation_bounds() {
        let variation = SpliceVariation::new("ACGT", 8);
        let mut rng = SearchRng::new(9);
        let a = candidate("AAAAAA");
        let b = candidate("CCCCCC");

        for _ in 0..200 {
            if let Some(child) = variation.crossover(&a, &b, &mut rng) {
                assert!(!child.as_str().is_empty());
                assert!(child.as_str().chars().count() <= 8);
                if let Some(mutated) = variation.mutate(child, 1.0, &mut rng) {
                    assert!(mutated.is_valid());
                    assert!(mutated.as_str().chars().count() <= 8);
                }
            }
        }
    }

    #[test]
    fn test_zero_rate_mutation_is_identity() {
        let variation = SpliceVariation::new("ACGT", 8);
        let mut rng = SearchRng::new(1);
        let child = candidate("ACG");
        assert_eq!(variation.mutate(child.clone(), 0.0, &mut rng), Some(child));
    }

    #[test]
    fn test_artifacts_written_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();
        let evaluator = TargetEvaluator::new("ACGT").with_artifacts("scored.jsonl");
        let context = EvaluationContext::new(2).with_artifact_dir(store.dir());

        evaluator
            .evaluate(&[candidate("ACGT"), candidate("AC")], &context)
            .unwrap();

        let written = fs::read_to_string(store.artifact_path(2, "scored.jsonl")).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.contains("\"candidate\":\"ACGT\""));
    }

    #[test]
    fn test_rerun_replaces_artifacts_of_failed_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let evaluator = TargetEvaluator::new("ACGT").with_artifacts("scored.jsonl");
        let batch = [candidate("ACGT"), candidate("AC"), candidate("GG")];
        let path = dir.path().join("scored_0.jsonl");

        // first attempt: initial population and one generation, then a crash
        let mut context = EvaluationContext::new(0).with_artifact_dir(dir.path());
        evaluator.evaluate(&batch, &context).unwrap();
        context.generation = 1;
        evaluator.evaluate(&batch, &context).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 6);

        // the resumed run starts again from generation 0
        context.generation = 0;
        evaluator.evaluate(&batch, &context).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 3);
        assert!(written.lines().all(|line| line.contains("\"generation\":0")));
    }

    #[test]
    fn test_search_improves_on_seeds() {
        let seeds = parse_seeds("AAAAAAAA\nCCCCCCCC\nGGGGGGGG\nTTTTTTTT\n");
        let evaluator = TargetEvaluator::new("GATTACAG");
        let variation = SpliceVariation::new("ACGT", 16);
        let config = RunConfig {
            population_size: 30,
            mating_pool_size: 15,
            mutation_rate: 0.5,
            max_generations: 30,
            max_score: 100.0,
            random_seed: 3,
            ..Default::default()
        };

        let mut engine = EvolutionEngine::new(config, &seeds, &evaluator, &variation);
        let result = engine.run().unwrap();

        let initial = result.history[0].best_score.rank_key();
        let last = result.history.last().unwrap().best_score.rank_key();
        assert!(last >= initial);
        assert!(result.generations_run >= 1);
    }
}
