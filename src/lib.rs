//! Evo Search - Generational evolutionary search over opaque candidates.
//!
//! The engine breeds a population of candidates through fitness-proportional
//! selection, crossover and mutation, keeping the best survivors each
//! generation until a generation cap or a target score is reached.
//! Candidates, variation operators and the evaluator are supplied by the
//! caller through the traits in [`compute`].
//!
//! # Architecture
//!
//! - `schema`: Configuration, scores and run results
//! - `compute`: The engine (selection, reproduction, sanitization, search loop, batches)
//! - `text`: A concrete string domain used by the command-line runner
//!
//! # Example
//!
//! ```rust,no_run
//! use evo_search::{
//!     compute::{CheckpointStore, BatchRunner},
//!     schema::BatchConfig,
//!     text::{SpliceVariation, TargetEvaluator, parse_seeds},
//! };
//!
//! let seeds = parse_seeds("AAAA\nCCCC\nGGGG\nTTTT\n");
//! let evaluator = TargetEvaluator::new("GATTACA");
//! let variation = SpliceVariation::new("ACGT", 16);
//!
//! let store = CheckpointStore::new("out").expect("output directory");
//! let runner = BatchRunner::new(BatchConfig::default(), store);
//! let summary = runner.run(&seeds, &evaluator, &variation).expect("batch failed");
//!
//! println!("Completed {} runs", summary.completed.len());
//! ```

pub mod compute;
pub mod schema;
pub mod text;

// Re-export commonly used types
pub use compute::{BatchRunner, CheckpointStore, EvolutionEngine};
pub use schema::{BatchConfig, RunConfig, RunResult, Score};
