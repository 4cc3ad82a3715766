//! Per-subject metric extraction
//!
//! A subject enters the output only with at least one qualifying sample
//! (positive concentration inside the filter). An error while processing
//! one subject never aborts the batch: the subject is skipped, logged, and
//! surfaced as a count.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{MetricKind, Sample, Subject};
use crate::error::EngineResult;
use crate::metrics::filter::SampleFilter;
use crate::store::SampleStore;

/// Fixed, typed per-subject metric record. Every consumer relies on this
/// schema instead of runtime key lookups.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectMetrics {
    pub external_id: String,
    pub display_name: String,
    pub category: String,
    pub max_concentration: f64,
    /// Count of qualifying samples.
    pub positive_count: u64,
    pub mean_concentration: f64,
    pub std_deviation: f64,
    /// Qualifying samples per elapsed day of activity.
    pub sample_density: f64,
    pub first_sample: DateTime<Utc>,
    pub last_sample: DateTime<Utc>,
}

impl SubjectMetrics {
    pub fn metric(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::MaxConcentration => self.max_concentration,
            MetricKind::PositiveCount => self.positive_count as f64,
            MetricKind::MeanConcentration => self.mean_concentration,
            MetricKind::StdDeviation => self.std_deviation,
            MetricKind::SampleDensity => self.sample_density,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    /// Order is undefined here; the scoring pipeline sorts.
    pub rows: Vec<SubjectMetrics>,
    /// Subjects dropped by isolated extraction failures.
    pub skipped_subjects: usize,
}

/// Extract metric rows for every subject passing the filter.
pub fn extract<S: SampleStore + ?Sized>(
    store: &S,
    filter: &SampleFilter,
) -> EngineResult<ExtractionOutcome> {
    let subjects = store.subjects()?;
    let mut outcome = ExtractionOutcome::default();

    for subject in subjects {
        if !filter.matches_category(&subject.category) {
            continue;
        }
        match subject_metrics(store, &subject, filter) {
            Ok(Some(row)) => outcome.rows.push(row),
            Ok(None) => {} // no qualifying samples
            Err(err) => {
                let err = crate::error::EngineError::SubjectExtraction {
                    id: subject.external_id.clone(),
                    reason: err.to_string(),
                };
                log::warn!("skipping {err}");
                outcome.skipped_subjects += 1;
            }
        }
    }

    Ok(outcome)
}

fn subject_metrics<S: SampleStore + ?Sized>(
    store: &S,
    subject: &Subject,
    filter: &SampleFilter,
) -> EngineResult<Option<SubjectMetrics>> {
    let samples = store.samples_of(&subject.external_id)?;
    let qualifying: Vec<&Sample> = samples.iter().filter(|s| filter.qualifies(s)).collect();
    if qualifying.is_empty() {
        return Ok(None);
    }

    let count = qualifying.len() as u64;
    let mut max = 0.0f64;
    let mut sum = 0.0f64;
    let mut first = qualifying[0].taken_at;
    let mut last = qualifying[0].taken_at;
    for sample in &qualifying {
        max = max.max(sample.concentration_ppm);
        sum += sample.concentration_ppm;
        if sample.taken_at < first {
            first = sample.taken_at;
        }
        if sample.taken_at > last {
            last = sample.taken_at;
        }
    }

    let mean = sum / count as f64;
    let variance = qualifying
        .iter()
        .map(|s| (s.concentration_ppm - mean).powi(2))
        .sum::<f64>()
        / count as f64;

    // First and last qualifying day, inclusive.
    let elapsed_days = (last.date_naive() - first.date_naive()).num_days() + 1;
    let sample_density = count as f64 / elapsed_days.max(1) as f64;

    Ok(Some(SubjectMetrics {
        external_id: subject.external_id.clone(),
        display_name: subject.display_name.clone(),
        category: subject.category.clone(),
        max_concentration: max,
        positive_count: count,
        mean_concentration: mean,
        std_deviation: variance.sqrt(),
        sample_density,
        first_sample: first,
        last_sample: last,
    }))
}

/// Distinct categories of subjects holding at least one positive sample,
/// sorted.
pub fn categories<S: SampleStore + ?Sized>(store: &S) -> EngineResult<Vec<String>> {
    let mut found = BTreeSet::new();
    for subject in store.subjects()? {
        let samples = store.samples_of(&subject.external_id)?;
        if samples.iter().any(Sample::is_positive) {
            found.insert(subject.category);
        }
    }
    Ok(found.into_iter().collect())
}

/// Timestamp range of positive samples across the whole store.
pub fn sample_date_range<S: SampleStore + ?Sized>(
    store: &S,
) -> EngineResult<Option<(DateTime<Utc>, DateTime<Utc>)>> {
    let mut range: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    for sample in store.all_samples()? {
        if !sample.is_positive() {
            continue;
        }
        range = Some(match range {
            None => (sample.taken_at, sample.taken_at),
            Some((min, max)) => (min.min(sample.taken_at), max.max(sample.taken_at)),
        });
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Criterion;
    use crate::error::EngineError;
    use crate::store::{Dataset, MemoryStore};
    use chrono::TimeZone;

    fn subject(id: &str, category: &str) -> Subject {
        Subject {
            external_id: id.to_string(),
            display_name: format!("Subject {id}"),
            category: category.to_string(),
            enrolled_on: None,
        }
    }

    fn sample(id: &str, ppm: f64, day: u32) -> Sample {
        Sample {
            subject_id: id.to_string(),
            raw_reading: 300,
            voltage: 1.47,
            concentration_ppm: ppm,
            taken_at: Utc.with_ymd_and_hms(2025, 6, day, 10, 0, 0).unwrap(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::from_dataset(Dataset {
            subjects: vec![
                subject("EMP001", "Logistics"),
                subject("EMP002", "Sales"),
                subject("EMP003", "Sales"),
            ],
            samples: vec![
                sample("EMP001", 100.0, 1),
                sample("EMP001", 50.0, 3),
                sample("EMP001", 0.0, 4), // not qualifying
                sample("EMP002", 20.0, 10),
                // EMP003 only ever blows clean
                sample("EMP003", 0.0, 12),
            ],
            criteria: vec![],
        })
        .unwrap()
    }

    #[test]
    fn test_excludes_subjects_without_positive_samples() {
        let outcome = extract(&store(), &SampleFilter::default()).unwrap();
        let ids: Vec<&str> = outcome.rows.iter().map(|r| r.external_id.as_str()).collect();
        assert!(ids.contains(&"EMP001"));
        assert!(ids.contains(&"EMP002"));
        assert!(!ids.contains(&"EMP003"));
        assert_eq!(outcome.skipped_subjects, 0);
    }

    #[test]
    fn test_aggregates() {
        let outcome = extract(&store(), &SampleFilter::default()).unwrap();
        let row = outcome
            .rows
            .iter()
            .find(|r| r.external_id == "EMP001")
            .unwrap();

        assert_eq!(row.positive_count, 2);
        assert!((row.max_concentration - 100.0).abs() < 1e-12);
        assert!((row.mean_concentration - 75.0).abs() < 1e-12);
        assert!((row.std_deviation - 25.0).abs() < 1e-12);
        // 2 samples over 3 elapsed days (June 1 through June 3)
        assert!((row.sample_density - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_density() {
        let outcome = extract(&store(), &SampleFilter::default()).unwrap();
        let row = outcome
            .rows
            .iter()
            .find(|r| r.external_id == "EMP002")
            .unwrap();
        assert_eq!(row.positive_count, 1);
        assert!((row.sample_density - 1.0).abs() < 1e-12);
        assert!((row.std_deviation - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_category_filter() {
        let filter = SampleFilter::parse(Some("Sales"), None, None).unwrap();
        let outcome = extract(&store(), &filter).unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].external_id, "EMP002");
    }

    #[test]
    fn test_date_filter_narrows_population() {
        let filter = SampleFilter::parse(None, Some("2025-06-02"), Some("2025-06-30")).unwrap();
        let outcome = extract(&store(), &filter).unwrap();
        let row = outcome
            .rows
            .iter()
            .find(|r| r.external_id == "EMP001")
            .unwrap();
        // June 1 sample excluded, only the June 3 one remains
        assert_eq!(row.positive_count, 1);
        assert!((row.max_concentration - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_failure_isolation() {
        struct FlakyStore {
            inner: MemoryStore,
        }

        impl SampleStore for FlakyStore {
            fn subjects(&self) -> EngineResult<Vec<Subject>> {
                self.inner.subjects()
            }

            fn samples_of(&self, external_id: &str) -> EngineResult<Vec<Sample>> {
                if external_id == "EMP002" {
                    return Err(EngineError::Store("connection reset".to_string()));
                }
                self.inner.samples_of(external_id)
            }

            fn all_samples(&self) -> EngineResult<Vec<Sample>> {
                self.inner.all_samples()
            }

            fn active_criteria(&self) -> EngineResult<Vec<Criterion>> {
                self.inner.active_criteria()
            }
        }

        let flaky = FlakyStore { inner: store() };
        let outcome = extract(&flaky, &SampleFilter::default()).unwrap();
        assert_eq!(outcome.skipped_subjects, 1);
        assert!(outcome.rows.iter().any(|r| r.external_id == "EMP001"));
        assert!(!outcome.rows.iter().any(|r| r.external_id == "EMP002"));
    }

    #[test]
    fn test_categories_helper() {
        let listed = categories(&store()).unwrap();
        // EMP003 never registered a positive sample but EMP002 covers Sales
        assert_eq!(listed, vec!["Logistics".to_string(), "Sales".to_string()]);
    }

    #[test]
    fn test_sample_date_range() {
        let range = sample_date_range(&store()).unwrap().unwrap();
        assert_eq!(range.0, Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap());
        assert_eq!(range.1, Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap());
    }
}
