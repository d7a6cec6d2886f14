//! Compute module - The evolutionary search engine.
//!
//! # Overview
//!
//! One generation flows through:
//!
//! - **Selection** (`selection`): fitness-proportional mating pool, drawn with replacement
//! - **Reproduction** (`reproduction`): crossover + mutation retried until enough offspring exist
//! - **Sanitization** (`sanitize`): merge parents and offspring, optional dedup, rank, truncate
//! - **Fitness** (`fitness`): scores normalized into selection weights for the next round
//!
//! `search` drives that loop for a single run, `driver` runs resumable
//! batches of independent runs and `archive` persists their results.
//!
//! # Example
//!
//! ```rust,no_run
//! use evo_search::compute::{EvolutionEngine, ParallelEvaluator, SearchRng, Variation};
//! use evo_search::schema::RunConfig;
//!
//! struct Splice;
//!
//! impl Variation<String> for Splice {
//!     fn crossover(&self, a: &String, b: &String, _: &mut SearchRng) -> Option<String> {
//!         let cut = a.len().min(b.len()) / 2;
//!         Some(format!("{}{}", &a[..cut], &b[cut..]))
//!     }
//!     fn mutate(&self, child: String, _: f64, _: &mut SearchRng) -> Option<String> {
//!         Some(child)
//!     }
//! }
//!
//! let seeds = vec!["CCO".to_string(), "CCN".to_string(), "c1ccccc1".to_string()];
//! let evaluator = ParallelEvaluator::new(|s: &String| Some(s.len() as f64));
//!
//! let mut engine = EvolutionEngine::new(RunConfig::default(), &seeds, &evaluator, &Splice);
//! let result = engine.run().expect("run failed");
//! println!("Best: {:?} after {} generations", result.best(), result.generations_run);
//! ```

mod archive;
mod candidate;
mod driver;
mod error;
mod fitness;
mod reproduction;
mod sanitize;
mod search;
mod selection;

#[cfg(test)]
mod testing;

pub use archive::*;
pub use candidate::*;
pub use driver::*;
pub use error::*;
pub use fitness::*;
pub use reproduction::*;
pub use sanitize::*;
pub use search::*;
pub use selection::*;
