//! Per-run checkpoint storage.
//!
//! Each finished run is written to `results_{index}.json` in the output
//! directory. Writes go to a temporary file first and are renamed into
//! place, so a file under the final name always holds a complete result.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::schema::RunResult;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed checkpoint {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Directory of persisted run results.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open (and create if needed) an output directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, CheckpointError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| CheckpointError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the result of a run.
    pub fn result_path(&self, run_index: usize) -> PathBuf {
        self.dir.join(format!("results_{run_index}.json"))
    }

    /// Path for a per-run artifact, e.g. `scored.jsonl` -> `scored_2.jsonl`.
    pub fn artifact_path(&self, run_index: usize, name: &str) -> PathBuf {
        self.dir.join(run_artifact_name(name, run_index))
    }

    /// Whether a run already has a persisted result.
    pub fn exists(&self, run_index: usize) -> bool {
        self.result_path(run_index).is_file()
    }

    /// Persist a run result.
    pub fn save<C: Serialize>(
        &self,
        run_index: usize,
        result: &RunResult<C>,
    ) -> Result<PathBuf, CheckpointError> {
        let path = self.result_path(run_index);
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(result).map_err(|source| {
            CheckpointError::Serialization {
                path: path.clone(),
                source,
            }
        })?;

        fs::write(&tmp, json).map_err(|source| CheckpointError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| CheckpointError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }

    /// Load a persisted run result.
    pub fn load<C: DeserializeOwned>(&self, run_index: usize) -> Result<RunResult<C>, CheckpointError> {
        let path = self.result_path(run_index);
        let content = fs::read_to_string(&path).map_err(|source| CheckpointError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content)
            .map_err(|source| CheckpointError::Serialization { path, source })
    }

    /// Indices of all persisted runs, ascending.
    pub fn completed_runs(&self) -> Result<Vec<usize>, CheckpointError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| CheckpointError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut indices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CheckpointError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            if let Some(index) = name
                .to_str()
                .and_then(|n| n.strip_prefix("results_"))
                .and_then(|n| n.strip_suffix(".json"))
                .and_then(|n| n.parse::<usize>().ok())
            {
                indices.push(index);
            }
        }

        indices.sort_unstable();
        Ok(indices)
    }
}

/// Insert the run index before the extension: `name.ext` -> `name_{index}.ext`.
pub fn run_artifact_name(name: &str, run_index: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{run_index}.{ext}"),
        _ => format!("{name}_{run_index}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HistoryEntry, Score, StopReason};

    fn sample_result() -> RunResult<String> {
        RunResult {
            scores: vec![Score::new(2.5), Score::Invalid],
            population: vec!["CCO".to_string(), "C1CC1".to_string()],
            history: vec![
                HistoryEntry {
                    best_score: Score::new(1.0),
                    best_id: "C".to_string(),
                },
                HistoryEntry {
                    best_score: Score::new(2.5),
                    best_id: "CCO".to_string(),
                },
            ],
            generations_run: 1,
            stop_reason: StopReason::MaxGenerations,
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();

        assert!(!store.exists(0));
        let path = store.save(0, &sample_result()).unwrap();
        assert_eq!(path, dir.path().join("results_0.json"));
        assert!(store.exists(0));
        assert!(!path.with_extension("json.tmp").exists());

        let loaded: RunResult<String> = store.load(0).unwrap();
        assert_eq!(loaded, sample_result());
    }

    #[test]
    fn test_completed_runs() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("nested")).unwrap();

        store.save(3, &sample_result()).unwrap();
        store.save(1, &sample_result()).unwrap();
        fs::write(store.dir().join("results_x.json"), "{}").unwrap();
        fs::write(store.dir().join("notes.txt"), "").unwrap();

        assert_eq!(store.completed_runs().unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_load_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();
        fs::write(store.result_path(0), "not json").unwrap();

        let result: Result<RunResult<String>, _> = store.load(0);
        assert!(matches!(result, Err(CheckpointError::Serialization { .. })));
    }

    #[test]
    fn test_artifact_names() {
        assert_eq!(run_artifact_name("all_gnina.sdf", 4), "all_gnina_4.sdf");
        assert_eq!(run_artifact_name("trace", 0), "trace_0");
        assert_eq!(run_artifact_name(".hidden", 2), ".hidden_2");
    }
}
