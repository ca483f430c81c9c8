//! Command implementations shared by CLI and MCP server.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::Path;

use anyhow::Context;

use crate::cache::DatasetHandle;
use crate::config::Config;
use crate::search::{self, SearchQuery, SearchResult};

/// Maximum length for user-provided query strings (make, model).
const MAX_INPUT_LENGTH: usize = 200;

/// Validate a user-provided query string before it reaches the matcher.
fn validate_text(value: &str, field_name: &str) -> anyhow::Result<()> {
    let length = value.chars().count();
    if length > MAX_INPUT_LENGTH {
        anyhow::bail!("{field_name} too long: {length} chars (max {MAX_INPUT_LENGTH})");
    }

    if value.contains('\0') {
        anyhow::bail!("{field_name} contains invalid character: NUL");
    }

    Ok(())
}

/// Reject queries the matcher should not be asked to score.
///
/// # Errors
///
/// Returns an error if make or model is too long or contains a NUL byte.
pub fn validate_query(query: &SearchQuery) -> anyhow::Result<()> {
    if let Some(make) = &query.make {
        validate_text(make, "Make")?;
    }
    if let Some(model) = &query.model {
        validate_text(model, "Model")?;
    }
    Ok(())
}

/// Create the dataset handle for this process.
///
/// `dataset` overrides the configured dataset path.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be loaded.
pub fn open_dataset(dataset: Option<&Path>) -> anyhow::Result<DatasetHandle> {
    let path = match dataset {
        Some(path) => path.to_path_buf(),
        None => Config::load()?.dataset_path(),
    };
    Ok(DatasetHandle::open(path))
}

/// Search the dataset for the vehicles closest to `query`.
///
/// # Returns
///
/// Up to 10 results, best match first. An empty list means no records, not a failure.
///
/// # Errors
///
/// Returns an error if the query is invalid or the dataset cannot be loaded.
pub fn search(dataset: &DatasetHandle, query: &SearchQuery) -> anyhow::Result<Vec<SearchResult>> {
    validate_query(query)?;

    let records = dataset
        .records()
        .with_context(|| format!("Vehicle data unavailable ({})", dataset.location()))?;

    Ok(search::search(query, &records))
}

/// Summary of a successfully loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub records: usize,
    pub makes: usize,
    /// Earliest and latest model year, if there are any records.
    pub years: Option<(i32, i32)>,
    pub electric: usize,
}

/// Load the dataset and summarize it.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded.
pub fn validate(dataset: &DatasetHandle) -> anyhow::Result<DatasetSummary> {
    let records = dataset
        .records()
        .with_context(|| format!("Invalid dataset {}", dataset.location()))?;

    let makes: BTreeSet<&str> = records.iter().map(|r| r.make.as_str()).collect();
    let years = records.iter().map(|r| r.year).fold(None, |range, year| match range {
        None => Some((year, year)),
        Some((lo, hi)) => Some((year.min(lo), year.max(hi))),
    });

    Ok(DatasetSummary {
        records: records.len(),
        makes: makes.len(),
        years,
        electric: records.iter().filter(|r| r.is_electric()).count(),
    })
}

/// Render results as a plain-text ranking, one vehicle per line.
#[must_use]
pub fn render_results(results: &[SearchResult]) -> String {
    let mut output = String::new();
    for (rank, result) in results.iter().enumerate() {
        let _ = writeln!(
            output,
            "{:>2}. [{:.2}] {} {} {} | efficiency {} | {} cyl | {} L | {} | {}",
            rank + 1,
            result.score,
            result.year,
            result.make,
            result.model,
            result.efficiency,
            result.cylinders,
            result.liters,
            result.drive,
            result.transmission
        );
    }
    let _ = writeln!(output, "{} result(s) found", results.len());
    output
}
