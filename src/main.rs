//! Evo Search CLI - Run batches of string searches from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use evo_search::{
    compute::{BatchRunner, CheckpointStore},
    schema::BatchConfig,
    text::{SpliceVariation, TargetEvaluator, load_seed_file},
};

/// Batch settings plus the string domain being searched.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CliConfig {
    #[serde(flatten)]
    batch: BatchConfig,
    /// String the evaluator scores candidates against.
    target: String,
    /// Symbols available to mutation.
    #[serde(default = "default_alphabet")]
    alphabet: String,
    /// Longest candidate the variation operators may produce.
    #[serde(default = "default_max_len")]
    max_len: usize,
    /// Write every scored candidate to `scored_{run}.jsonl`.
    #[serde(default)]
    record_artifacts: bool,
}

fn default_alphabet() -> String {
    "ACGT".to_string()
}
fn default_max_len() -> usize {
    64
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            target: "GATTACA".to_string(),
            alphabet: default_alphabet(),
            max_len: default_max_len(),
            record_artifacts: false,
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() < 4 {
        eprintln!("Usage: {} <config.json> <seeds.txt> <output_dir>", args[0]);
        eprintln!();
        eprintln!("Run a batch of evolutionary searches from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to batch configuration file");
        eprintln!("  seeds.txt    Seed candidates, one per line");
        eprintln!("  output_dir   Directory for results_{{run}}.json files");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    let config_path = PathBuf::from(&args[1]);
    let seeds_path = PathBuf::from(&args[2]);
    let output_dir = PathBuf::from(&args[3]);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: CliConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    // Load seeds
    let seeds = load_seed_file(&seeds_path).unwrap_or_else(|e| {
        eprintln!("Error reading seed file: {}", e);
        std::process::exit(1);
    });

    let store = CheckpointStore::new(&output_dir).unwrap_or_else(|e| {
        eprintln!("Error opening output directory: {}", e);
        std::process::exit(1);
    });

    let run = &config.batch.run;
    println!("Evolutionary Search");
    println!("===================");
    println!("Target: {} ({} symbols)", config.target, config.target.chars().count());
    println!("Seeds: {}", seeds.len());
    println!(
        "Runs: {} (seeds {}..), {}",
        config.batch.runs,
        config.batch.seed_offset,
        if config.batch.parallel { "parallel" } else { "sequential" }
    );
    println!(
        "Population: {}, mating pool: {}, mutation rate: {}",
        run.population_size, run.mating_pool_size, run.mutation_rate
    );
    println!(
        "Generations: {}, target score: {}",
        run.max_generations, run.max_score
    );
    println!("Output: {}", store.dir().display());
    println!();

    let mut evaluator = TargetEvaluator::new(&config.target);
    if config.record_artifacts {
        evaluator = evaluator.with_artifacts("scored.jsonl");
    }
    let variation = SpliceVariation::new(&config.alphabet, config.max_len);

    let runner = BatchRunner::new(config.batch.clone(), store);

    println!("Running batch...");
    let start = Instant::now();

    let summary = runner
        .run(&seeds, &evaluator, &variation)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let elapsed = start.elapsed();

    println!();
    for run in &summary.completed {
        println!(
            "  Run {}: best {} after {} generations",
            run.run_index, run.best_score, run.generations_run
        );
    }
    if !summary.skipped.is_empty() {
        println!("  Skipped (already done): {:?}", summary.skipped);
    }
    println!();
    println!(
        "Completed {} runs, skipped {} in {:.2}s",
        summary.completed.len(),
        summary.skipped.len(),
        elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    match serde_json::to_string_pretty(&CliConfig::default()) {
        Ok(json) => {
            println!("Example configuration (config.json):");
            println!("{}", json);
        }
        Err(e) => {
            eprintln!("Error serializing example config: {}", e);
            std::process::exit(1);
        }
    }
}
