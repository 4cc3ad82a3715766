//! Score calculation
//!
//! `score = sum(weight_i * normalized_metric_i) * 100` over the criteria
//! that actually resolve to an extracted metric. Criteria that do not
//! resolve drop out, and the remaining weights are rescaled so the result
//! reflects 100% of the weight actually applied.

use crate::domain::{Criterion, MetricKind};
use crate::error::{EngineError, EngineResult};
use crate::metrics::extractor::SubjectMetrics;
use crate::scoring::normalize::{normalize, NormalizationPolicy};
use crate::weights::WeightVector;

/// One score per metric row, each in [0, 100]. Full precision; rounding
/// happens at export boundaries only.
pub fn score_rows(
    rows: &[SubjectMetrics],
    criteria: &[Criterion],
    weights: &WeightVector,
    policy: NormalizationPolicy,
) -> EngineResult<Vec<f64>> {
    let mut applied: Vec<(f64, MetricKind)> = Vec::new();
    for criterion in criteria.iter().filter(|c| c.active) {
        let weight = weights.get(&criterion.name).ok_or_else(|| {
            EngineError::Configuration(format!(
                "no weight solved for criterion '{}'",
                criterion.name
            ))
        })?;
        match MetricKind::parse(&criterion.metric) {
            Some(kind) => applied.push((weight, kind)),
            None => log::warn!(
                "criterion '{}' binds unknown metric '{}', renormalizing without it",
                criterion.name,
                criterion.metric
            ),
        }
    }

    let weight_total: f64 = applied.iter().map(|(w, _)| w).sum();
    if weight_total <= 0.0 {
        return Err(EngineError::Configuration(
            "applied criterion weights sum to zero".to_string(),
        ));
    }

    // One normalized column per distinct metric kind.
    let mut columns: Vec<(MetricKind, Vec<f64>)> = Vec::new();
    for (_, kind) in &applied {
        if columns.iter().any(|(k, _)| k == kind) {
            continue;
        }
        let raw: Vec<f64> = rows.iter().map(|r| r.metric(*kind)).collect();
        columns.push((*kind, normalize(&raw, policy)));
    }

    let scores = (0..rows.len())
        .map(|i| {
            let weighted: f64 = applied
                .iter()
                .map(|(weight, kind)| {
                    let column = columns
                        .iter()
                        .find(|(k, _)| k == kind)
                        .map(|(_, c)| c[i])
                        .unwrap_or(0.0);
                    weight * column
                })
                .sum();
            (weighted / weight_total * 100.0).clamp(0.0, 100.0)
        })
        .collect();

    Ok(scores)
}
