//! Scoring pipeline
//!
//! [`RiskAnalyzer`] drives extract -> normalize -> score -> classify with a
//! criteria snapshot taken at construction. A run either produces a
//! complete report or fails outright; per-subject extraction errors are the
//! only tolerated partiality, surfaced as a skip count.

use serde::{Deserialize, Serialize};

use crate::domain::Criterion;
use crate::error::{EngineError, EngineResult};
use crate::metrics::extractor::{extract, SubjectMetrics};
use crate::metrics::filter::SampleFilter;
use crate::scoring::calculator::score_rows;
use crate::scoring::classifier::{ClassifierConfig, RiskTier};
use crate::scoring::normalize::NormalizationPolicy;
use crate::store::SampleStore;
use crate::weights::{solve, EigenSolver, PowerIteration, WeightInput, WeightVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Highest risk first.
    #[default]
    Descending,
    Ascending,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub filter: SampleFilter,
    /// Top-N cut applied after sorting.
    pub limit: Option<usize>,
    pub sort: SortDirection,
}

/// One scored subject. Ephemeral output, never persisted by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreRecord {
    pub external_id: String,
    pub display_name: String,
    pub category: String,
    /// Max concentration (ppm) within the filter.
    pub severity_metric: f64,
    /// Qualifying sample count within the filter.
    pub frequency_metric: u64,
    pub score: f64,
    pub tier: RiskTier,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TierBreakdown {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierBreakdown {
    fn count(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::Critical => self.critical += 1,
            RiskTier::High => self.high += 1,
            RiskTier::Medium => self.medium += 1,
            RiskTier::Low => self.low += 1,
        }
    }
}

/// Population statistics over the full scored set, before any top-N cut.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisSummary {
    pub total_subjects: usize,
    pub mean_score: f64,
    pub max_score: f64,
    pub tiers: TierBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub records: Vec<ScoreRecord>,
    pub skipped_subjects: usize,
    pub weights: WeightVector,
    pub summary: AnalysisSummary,
}

pub struct RiskAnalyzer<'a> {
    store: &'a dyn SampleStore,
    criteria: Vec<Criterion>,
    weights: WeightVector,
    classifier: ClassifierConfig,
    normalization: NormalizationPolicy,
}

impl<'a> RiskAnalyzer<'a> {
    /// Generic constructor: any criteria snapshot with any weight input.
    /// Weight derivation failures are fatal; no partial vector survives.
    pub fn new(
        store: &'a dyn SampleStore,
        criteria: Vec<Criterion>,
        input: &WeightInput,
        solver: &dyn EigenSolver,
    ) -> EngineResult<Self> {
        let active: Vec<&Criterion> = criteria.iter().filter(|c| c.active).collect();
        if active.is_empty() {
            return Err(EngineError::Configuration(
                "no active criteria configured".to_string(),
            ));
        }
        let solved = solve(input, solver)?;
        if solved.len() != active.len() {
            return Err(EngineError::Configuration(format!(
                "{} weights solved for {} active criteria",
                solved.len(),
                active.len()
            )));
        }
        let names = active.iter().map(|c| c.name.clone()).collect();
        let weights = WeightVector::from_parts(names, solved)?;
        Ok(Self {
            store,
            criteria,
            weights,
            classifier: ClassifierConfig::default(),
            normalization: NormalizationPolicy::MaxValue,
        })
    }

    /// Severity-vs-frequency rating driven by a single pairwise comparison:
    /// severity is `pairwise_value` times as important as frequency.
    pub fn with_pairwise(store: &'a dyn SampleStore, pairwise_value: f64) -> EngineResult<Self> {
        let solver = PowerIteration::default();
        let solved = solve(&WeightInput::Comparison(pairwise_value), &solver)?;
        let criteria = vec![
            Criterion {
                name: "Severity".to_string(),
                metric: "max_concentration".to_string(),
                weight: solved[0],
                active: true,
            },
            Criterion {
                name: "Frequency".to_string(),
                metric: "positive_count".to_string(),
                weight: solved[1],
                active: true,
            },
        ];
        let weights = WeightVector::from_parts(
            vec!["Severity".to_string(), "Frequency".to_string()],
            solved,
        )?;
        Ok(Self {
            store,
            criteria,
            weights,
            classifier: ClassifierConfig::default(),
            normalization: NormalizationPolicy::MaxValue,
        })
    }

    /// Criterion-table rating: the snapshot's own weights, direct-normalized.
    pub fn from_criteria(store: &'a dyn SampleStore, criteria: Vec<Criterion>) -> EngineResult<Self> {
        let active: Vec<&Criterion> = criteria.iter().filter(|c| c.active).collect();
        for criterion in &active {
            if !criterion.weight.is_finite() || criterion.weight <= 0.0 {
                return Err(EngineError::Configuration(format!(
                    "criterion '{}' has non-positive weight {}",
                    criterion.name, criterion.weight
                )));
            }
        }
        let raw: Vec<f64> = active.iter().map(|c| c.weight).collect();
        let input = WeightInput::Direct(raw);
        Self::new(store, criteria, &input, &PowerIteration::default())
    }

    pub fn with_classifier(mut self, config: ClassifierConfig) -> EngineResult<Self> {
        config.validate()?;
        self.classifier = config;
        Ok(self)
    }

    pub fn with_normalization(mut self, policy: NormalizationPolicy) -> Self {
        self.normalization = policy;
        self
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Run the full pipeline. An empty filtered population yields an empty
    /// report, not an error.
    pub fn analyze(&self, request: &AnalysisRequest) -> EngineResult<AnalysisReport> {
        let outcome = extract(self.store, &request.filter)?;
        log::info!(
            "extracted {} subjects ({} skipped)",
            outcome.rows.len(),
            outcome.skipped_subjects
        );

        if outcome.rows.is_empty() {
            return Ok(AnalysisReport {
                records: Vec::new(),
                skipped_subjects: outcome.skipped_subjects,
                weights: self.weights.clone(),
                summary: AnalysisSummary::default(),
            });
        }

        let scores = score_rows(
            &outcome.rows,
            &self.criteria,
            &self.weights,
            self.normalization,
        )?;

        let mut records: Vec<ScoreRecord> = outcome
            .rows
            .iter()
            .zip(scores)
            .map(|(row, score)| self.to_record(row, score))
            .collect();

        let summary = summarize(&records);

        match request.sort {
            SortDirection::Descending => {
                records.sort_by(|a, b| b.score.total_cmp(&a.score));
            }
            SortDirection::Ascending => {
                records.sort_by(|a, b| a.score.total_cmp(&b.score));
            }
        }
        if let Some(limit) = request.limit {
            records.truncate(limit);
        }

        Ok(AnalysisReport {
            records,
            skipped_subjects: outcome.skipped_subjects,
            weights: self.weights.clone(),
            summary,
        })
    }

    fn to_record(&self, row: &SubjectMetrics, score: f64) -> ScoreRecord {
        ScoreRecord {
            external_id: row.external_id.clone(),
            display_name: row.display_name.clone(),
            category: row.category.clone(),
            severity_metric: row.max_concentration,
            frequency_metric: row.positive_count,
            score,
            tier: self.classifier.classify(score, row),
        }
    }
}

fn summarize(records: &[ScoreRecord]) -> AnalysisSummary {
    let mut summary = AnalysisSummary {
        total_subjects: records.len(),
        ..Default::default()
    };
    if records.is_empty() {
        return summary;
    }
    let mut total = 0.0;
    for record in records {
        total += record.score;
        summary.max_score = summary.max_score.max(record.score);
        summary.tiers.count(record.tier);
    }
    summary.mean_score = total / records.len() as f64;
    summary
}
