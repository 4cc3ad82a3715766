//! Sensor and tenure diagnostics
//!
//! Both diagnostics need at least two data points; anything less is an
//! indeterminate verdict, not a computational error.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{SENSOR_LINEARITY_THRESHOLD, TENURE_SIGNIFICANCE_BAND};
use crate::correlation::pearson::pearson;
use crate::domain::Subject;
use crate::error::EngineResult;
use crate::store::SampleStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorVerdict {
    WellCalibrated,
    NeedsReview,
    Indeterminate,
}

impl SensorVerdict {
    pub fn summary(&self) -> &'static str {
        match self {
            SensorVerdict::WellCalibrated => "Sensors calibrated (excellent linearity)",
            SensorVerdict::NeedsReview => {
                "Review sensors (possible noise or missing calibration)"
            }
            SensorVerdict::Indeterminate => {
                "Correlation cannot be computed (insufficient data or variance)"
            }
        }
    }
}

/// Hardware diagnostic: how linearly voltage tracks concentration.
#[derive(Debug, Clone, Serialize)]
pub struct SensorDiagnostic {
    pub coefficient: Option<f64>,
    pub verdict: SensorVerdict,
    pub scatter_points: Vec<(f64, f64)>,
}

/// Voltage vs concentration over every sample in the store, unfiltered.
pub fn diagnose_sensors<S: SampleStore + ?Sized>(store: &S) -> EngineResult<SensorDiagnostic> {
    let samples = store.all_samples()?;
    let scatter_points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| (s.voltage, s.concentration_ppm))
        .collect();

    let voltages: Vec<f64> = scatter_points.iter().map(|(v, _)| *v).collect();
    let concentrations: Vec<f64> = scatter_points.iter().map(|(_, c)| *c).collect();

    let (coefficient, verdict) = match pearson(&voltages, &concentrations) {
        Some(r) if r > SENSOR_LINEARITY_THRESHOLD => (Some(r), SensorVerdict::WellCalibrated),
        Some(r) => (Some(r), SensorVerdict::NeedsReview),
        None => (None, SensorVerdict::Indeterminate),
    };

    Ok(SensorDiagnostic {
        coefficient,
        verdict,
        scatter_points,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenureVerdict {
    /// Longer-tenured subjects register fewer incidents.
    LongTenureProtective,
    /// Newer subjects register more incidents.
    NewSubjectsAtRisk,
    NoSignificantTrend,
    Indeterminate,
}

impl TenureVerdict {
    pub fn summary(&self) -> &'static str {
        match self {
            TenureVerdict::LongTenureProtective => {
                "Longer tenure correlates with fewer incidents"
            }
            TenureVerdict::NewSubjectsAtRisk => "Newer subjects show more incidents",
            TenureVerdict::NoSignificantTrend => {
                "No significant correlation between tenure and incidents"
            }
            TenureVerdict::Indeterminate => {
                "Correlation cannot be computed (insufficient data)"
            }
        }
    }
}

/// Demographic diagnostic: tenure vs concentration plus per-category means.
#[derive(Debug, Clone, Serialize)]
pub struct TenureDiagnostic {
    pub coefficient: Option<f64>,
    pub verdict: TenureVerdict,
    /// Mean concentration per category, descending by mean.
    pub category_means: Vec<(String, f64)>,
}

pub fn diagnose_tenure<S: SampleStore + ?Sized>(store: &S) -> EngineResult<TenureDiagnostic> {
    diagnose_tenure_at(store, Utc::now())
}

/// Tenure diagnostic with an explicit as-of time. Subjects without an
/// enrollment date are excluded from the correlation but still count
/// toward the category means.
pub fn diagnose_tenure_at<S: SampleStore + ?Sized>(
    store: &S,
    as_of: DateTime<Utc>,
) -> EngineResult<TenureDiagnostic> {
    let subjects = store.subjects()?;
    let by_id: HashMap<&str, &Subject> = subjects
        .iter()
        .map(|s| (s.external_id.as_str(), s))
        .collect();

    let mut tenure_days = Vec::new();
    let mut concentrations = Vec::new();
    let mut per_category: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for sample in store.all_samples()? {
        let Some(subject) = by_id.get(sample.subject_id.as_str()) else {
            continue;
        };

        let entry = per_category.entry(subject.category.clone()).or_insert((0.0, 0));
        entry.0 += sample.concentration_ppm;
        entry.1 += 1;

        if let Some(enrolled) = subject.enrolled_on {
            let days = (as_of.date_naive() - enrolled).num_days();
            tenure_days.push(days as f64);
            concentrations.push(sample.concentration_ppm);
        }
    }

    let coefficient = pearson(&tenure_days, &concentrations);
    let verdict = match coefficient {
        None => TenureVerdict::Indeterminate,
        Some(r) if r < -TENURE_SIGNIFICANCE_BAND => TenureVerdict::LongTenureProtective,
        Some(r) if r > TENURE_SIGNIFICANCE_BAND => TenureVerdict::NewSubjectsAtRisk,
        Some(_) => TenureVerdict::NoSignificantTrend,
    };

    let mut category_means: Vec<(String, f64)> = per_category
        .into_iter()
        .map(|(category, (total, count))| (category, total / count as f64))
        .collect();
    category_means.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(TenureDiagnostic {
        coefficient,
        verdict,
        category_means,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sample, Subject};
    use crate::store::{Dataset, MemoryStore};
    use chrono::{NaiveDate, TimeZone};

    fn subject(id: &str, category: &str, enrolled: Option<(i32, u32, u32)>) -> Subject {
        Subject {
            external_id: id.to_string(),
            display_name: format!("Subject {id}"),
            category: category.to_string(),
            enrolled_on: enrolled.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    fn sample(id: &str, voltage: f64, ppm: f64) -> Sample {
        Sample {
            subject_id: id.to_string(),
            raw_reading: (voltage * 1023.0 / 5.0) as i32,
            voltage,
            concentration_ppm: ppm,
            taken_at: Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap(),
        }
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_linear_sensor_is_well_calibrated() {
        let store = MemoryStore::from_dataset(Dataset {
            subjects: vec![subject("EMP001", "Ops", None)],
            samples: (1..=10)
                .map(|i| sample("EMP001", i as f64 * 0.4, i as f64 * 20.0))
                .collect(),
            criteria: vec![],
        })
        .unwrap();

        let diagnostic = diagnose_sensors(&store).unwrap();
        assert_eq!(diagnostic.verdict, SensorVerdict::WellCalibrated);
        assert!(diagnostic.coefficient.unwrap() > 0.9);
        assert_eq!(diagnostic.scatter_points.len(), 10);
    }

    #[test]
    fn test_noisy_sensor_needs_review() {
        let readings = [
            (0.5, 80.0),
            (1.0, 10.0),
            (1.5, 90.0),
            (2.0, 5.0),
            (2.5, 60.0),
            (3.0, 15.0),
        ];
        let store = MemoryStore::from_dataset(Dataset {
            subjects: vec![subject("EMP001", "Ops", None)],
            samples: readings
                .iter()
                .map(|(v, p)| sample("EMP001", *v, *p))
                .collect(),
            criteria: vec![],
        })
        .unwrap();

        let diagnostic = diagnose_sensors(&store).unwrap();
        assert_eq!(diagnostic.verdict, SensorVerdict::NeedsReview);
    }

    #[test]
    fn test_single_sample_is_indeterminate() {
        let store = MemoryStore::from_dataset(Dataset {
            subjects: vec![subject("EMP001", "Ops", None)],
            samples: vec![sample("EMP001", 1.0, 50.0)],
            criteria: vec![],
        })
        .unwrap();

        let diagnostic = diagnose_sensors(&store).unwrap();
        assert_eq!(diagnostic.verdict, SensorVerdict::Indeterminate);
        assert!(diagnostic.coefficient.is_none());
    }

    #[test]
    fn test_flat_voltage_is_indeterminate_not_nan() {
        let store = MemoryStore::from_dataset(Dataset {
            subjects: vec![subject("EMP001", "Ops", None)],
            samples: (1..=5).map(|i| sample("EMP001", 2.5, i as f64 * 10.0)).collect(),
            criteria: vec![],
        })
        .unwrap();

        let diagnostic = diagnose_sensors(&store).unwrap();
        assert_eq!(diagnostic.verdict, SensorVerdict::Indeterminate);
        assert!(diagnostic.coefficient.is_none());
    }

    #[test]
    fn test_long_tenure_protective() {
        // Short tenure pairs with high readings: negative correlation
        let store = MemoryStore::from_dataset(Dataset {
            subjects: vec![
                subject("NEW", "Ops", Some((2025, 5, 1))),
                subject("OLD", "Ops", Some((2020, 5, 1))),
            ],
            samples: vec![
                sample("NEW", 2.0, 180.0),
                sample("NEW", 2.1, 160.0),
                sample("OLD", 0.6, 10.0),
                sample("OLD", 0.5, 5.0),
            ],
            criteria: vec![],
        })
        .unwrap();

        let diagnostic = diagnose_tenure_at(&store, as_of()).unwrap();
        assert_eq!(diagnostic.verdict, TenureVerdict::LongTenureProtective);
        assert!(diagnostic.coefficient.unwrap() < -0.3);
    }

    #[test]
    fn test_positive_trend_flags_tenure_band() {
        // Readings climb with tenure: positive correlation
        let store = MemoryStore::from_dataset(Dataset {
            subjects: vec![
                subject("NEW", "Ops", Some((2025, 5, 1))),
                subject("OLD", "Ops", Some((2020, 5, 1))),
            ],
            samples: vec![
                sample("NEW", 0.5, 5.0),
                sample("NEW", 0.6, 8.0),
                sample("OLD", 2.0, 150.0),
                sample("OLD", 2.2, 170.0),
            ],
            criteria: vec![],
        })
        .unwrap();

        let diagnostic = diagnose_tenure_at(&store, as_of()).unwrap();
        assert_eq!(diagnostic.verdict, TenureVerdict::NewSubjectsAtRisk);
        assert!(diagnostic.coefficient.unwrap() > 0.3);
    }

    #[test]
    fn test_unenrolled_subjects_excluded_from_correlation() {
        let store = MemoryStore::from_dataset(Dataset {
            subjects: vec![
                subject("EMP001", "Ops", None),
                subject("EMP002", "Sales", None),
            ],
            samples: vec![sample("EMP001", 1.0, 50.0), sample("EMP002", 2.0, 90.0)],
            criteria: vec![],
        })
        .unwrap();

        let diagnostic = diagnose_tenure_at(&store, as_of()).unwrap();
        assert_eq!(diagnostic.verdict, TenureVerdict::Indeterminate);
        // Category means still cover everyone
        assert_eq!(diagnostic.category_means.len(), 2);
    }

    #[test]
    fn test_category_means_descending() {
        let store = MemoryStore::from_dataset(Dataset {
            subjects: vec![
                subject("EMP001", "Warehouse", None),
                subject("EMP002", "Sales", None),
                subject("EMP003", "Admin", None),
            ],
            samples: vec![
                sample("EMP001", 1.5, 100.0),
                sample("EMP001", 1.6, 120.0),
                sample("EMP002", 1.0, 60.0),
                sample("EMP003", 0.4, 5.0),
            ],
            criteria: vec![],
        })
        .unwrap();

        let diagnostic = diagnose_tenure_at(&store, as_of()).unwrap();
        let names: Vec<&str> = diagnostic
            .category_means
            .iter()
            .map(|(c, _)| c.as_str())
            .collect();
        assert_eq!(names, vec!["Warehouse", "Sales", "Admin"]);
        assert!((diagnostic.category_means[0].1 - 110.0).abs() < 1e-12);
    }
}
