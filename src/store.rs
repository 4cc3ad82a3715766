//! Read-only data access
//!
//! Persistence is an external collaborator. The engine only needs to read
//! the current state, once per query; new samples inserted by the ingestion
//! process during a run are simply not part of that read. No snapshot
//! isolation is attempted.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{default_criteria, Criterion, Sample, Subject};
use crate::error::{EngineError, EngineResult};

/// Read access to subjects, samples and the criterion table.
pub trait SampleStore {
    fn subjects(&self) -> EngineResult<Vec<Subject>>;

    /// All samples of one subject, any concentration.
    fn samples_of(&self, external_id: &str) -> EngineResult<Vec<Sample>>;

    /// Every sample in the store, unfiltered. Diagnostics run on this.
    fn all_samples(&self) -> EngineResult<Vec<Sample>>;

    /// Snapshot of the active criterion configuration.
    fn active_criteria(&self) -> EngineResult<Vec<Criterion>>;
}

/// On-disk dataset document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub subjects: Vec<Subject>,
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

/// In-memory store backing tests and the CLI.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    subjects: Vec<Subject>,
    samples: Vec<Sample>,
    criteria: Vec<Criterion>,
}

impl MemoryStore {
    pub fn from_dataset(dataset: Dataset) -> EngineResult<Self> {
        let mut seen = HashSet::new();
        for subject in &dataset.subjects {
            if !seen.insert(subject.external_id.as_str()) {
                return Err(EngineError::Store(format!(
                    "duplicate subject identifier '{}'",
                    subject.external_id
                )));
            }
        }

        for sample in &dataset.samples {
            if !seen.contains(sample.subject_id.as_str()) {
                return Err(EngineError::Store(format!(
                    "sample references unknown subject '{}'",
                    sample.subject_id
                )));
            }
            if sample.concentration_ppm < 0.0 || !sample.concentration_ppm.is_finite() {
                return Err(EngineError::Store(format!(
                    "sample for '{}' has invalid concentration {}",
                    sample.subject_id, sample.concentration_ppm
                )));
            }
        }

        Ok(Self {
            subjects: dataset.subjects,
            samples: dataset.samples,
            criteria: dataset.criteria,
        })
    }

    pub fn from_json(text: &str) -> EngineResult<Self> {
        let dataset: Dataset = serde_json::from_str(text)
            .map_err(|e| EngineError::Store(format!("dataset parse: {e}")))?;
        Self::from_dataset(dataset)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| EngineError::Store(format!("read {}: {e}", path.as_ref().display())))?;
        Self::from_json(&text)
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl SampleStore for MemoryStore {
    fn subjects(&self) -> EngineResult<Vec<Subject>> {
        Ok(self.subjects.clone())
    }

    fn samples_of(&self, external_id: &str) -> EngineResult<Vec<Sample>> {
        Ok(self
            .samples
            .iter()
            .filter(|s| s.subject_id == external_id)
            .cloned()
            .collect())
    }

    fn all_samples(&self) -> EngineResult<Vec<Sample>> {
        Ok(self.samples.clone())
    }

    fn active_criteria(&self) -> EngineResult<Vec<Criterion>> {
        let source = if self.criteria.is_empty() {
            default_criteria()
        } else {
            self.criteria.clone()
        };
        Ok(source.into_iter().filter(|c| c.active).collect())
    }
}
