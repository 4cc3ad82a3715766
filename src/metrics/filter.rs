//! Sample filtering
//!
//! Date bounds are inclusive: the start day opens at 00:00:00 and the end
//! day is extended to 23:59:59, so a bare `YYYY-MM-DD` pair covers whole
//! days.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Sample;
use crate::error::{EngineError, EngineResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleFilter {
    /// Exact-match category filter.
    pub category: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SampleFilter {
    /// Parse raw filter strings. Unparsable dates and inverted ranges are
    /// rejected here, before extraction begins.
    pub fn parse(
        category: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> EngineResult<Self> {
        let start = start.map(parse_date).transpose()?;
        let end = end.map(parse_date).transpose()?;
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(EngineError::InvalidFilter(format!(
                    "start date {s} is after end date {e}"
                )));
            }
        }
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok(Self { category, start, end })
    }

    pub fn start_bound(&self) -> Option<DateTime<Utc>> {
        self.start
            .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
    }

    pub fn end_bound(&self) -> Option<DateTime<Utc>> {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        self.end
            .map(|d| Utc.from_utc_datetime(&d.and_time(end_of_day)))
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(bound) = self.start_bound() {
            if at < bound {
                return false;
            }
        }
        if let Some(bound) = self.end_bound() {
            if at > bound {
                return false;
            }
        }
        true
    }

    pub fn matches_category(&self, category: &str) -> bool {
        self.category.as_deref().map_or(true, |c| c == category)
    }

    /// Positive concentration within the date range. Category is a subject
    /// property and is checked separately.
    pub fn qualifies(&self, sample: &Sample) -> bool {
        sample.is_positive() && self.contains(sample.taken_at)
    }
}

fn parse_date(text: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|e| EngineError::InvalidFilter(format!("unparsable date '{text}': {e}")))
}
