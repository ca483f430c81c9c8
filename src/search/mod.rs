//! Ranking of vehicle records against a partial make/model/year query.
//!
//! Every record is scored; the score is the mean distance over the query
//! fields that were supplied (edit distance for make and model, absolute
//! difference for year). Lower is better and 0 is an exact match.

pub mod distance;

use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::VehicleRecord;

/// Maximum number of results a search returns.
pub const SEARCH_RESULT_LIMIT: usize = 10;

/// A partial vehicle description. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
}

impl SearchQuery {
    /// Number of fields present, which is the divisor of the score.
    #[must_use]
    pub fn factors(&self) -> u32 {
        u32::from(self.make.is_some())
            + u32::from(self.model.is_some())
            + u32::from(self.year.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factors() == 0
    }
}

/// A scored copy of one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub efficiency: f64,
    pub cylinders: u32,
    pub liters: f64,
    pub drive: String,
    pub transmission: String,
    pub score: f64,
}

impl SearchResult {
    fn from_record(record: &VehicleRecord, score: f64) -> Self {
        Self {
            make: record.make.clone(),
            model: record.model.clone(),
            year: record.year,
            efficiency: record.efficiency,
            cylinders: record.cylinders,
            liters: record.liters,
            drive: record.drive.clone(),
            transmission: record.transmission.clone(),
            score,
        }
    }
}

/// Failure while scoring a single record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("year difference between {query} and {record} overflows")]
    YearOverflow { query: i32, record: i32 },
}

/// Score one record against the query.
///
/// An empty query scores every record 0.
///
/// # Errors
///
/// Returns `ScoreError::YearOverflow` when the year difference does not fit in an `i32`.
#[allow(clippy::cast_precision_loss)]
pub fn score(query: &SearchQuery, record: &VehicleRecord) -> Result<f64, ScoreError> {
    let mut total = 0.0;

    if let Some(make) = &query.make {
        total += distance::levenshtein(make, &record.make) as f64;
    }
    if let Some(model) = &query.model {
        total += distance::levenshtein(model, &record.model) as f64;
    }
    if let Some(year) = query.year {
        let difference = year
            .checked_sub(record.year)
            .and_then(i32::checked_abs)
            .ok_or(ScoreError::YearOverflow {
                query: year,
                record: record.year,
            })?;
        total += f64::from(difference);
    }

    let factors = query.factors();
    if factors == 0 {
        return Ok(0.0);
    }
    Ok(total / f64::from(factors))
}

/// Rank `records` against `query` and return the best [`SEARCH_RESULT_LIMIT`] matches.
///
/// Results are sorted by ascending score; equal scores keep load order.
/// If a record fails to score, the scan stops there and only the records
/// scored before it are ranked.
#[must_use]
pub fn search(query: &SearchQuery, records: &[VehicleRecord]) -> Vec<SearchResult> {
    let mut scored: Vec<(f64, usize)> = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        match score(query, record) {
            Ok(value) => scored.push((value, index)),
            Err(e) => {
                error!(
                    "Scoring stopped at record {index} ({} {} {}): {e}; ranking {} of {} records",
                    record.year,
                    record.make,
                    record.model,
                    scored.len(),
                    records.len()
                );
                break;
            }
        }
    }

    // sort_by is stable, so ties stay in load order
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.truncate(SEARCH_RESULT_LIMIT);

    if query.is_empty() {
        debug!("Empty search: first {} records in load order", scored.len());
    } else {
        debug!(
            "Search {:?}: {} candidates, best score {:?}",
            query,
            records.len(),
            scored.first().map(|(value, _)| *value)
        );
    }

    scored
        .into_iter()
        .map(|(value, index)| SearchResult::from_record(&records[index], value))
        .collect()
}
