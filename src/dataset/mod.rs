//! Vehicle efficiency dataset parsing.
//!
//! The dataset is a comma-separated file whose first line names the columns.
//! Only a handful of the (many) columns are consumed; they are located by
//! header name, so column order and extra columns do not matter.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

/// Header names of the consumed columns.
pub const COLUMN_MAKE: &str = "make";
pub const COLUMN_MODEL: &str = "model";
pub const COLUMN_YEAR: &str = "year";
pub const COLUMN_FUEL_TYPE: &str = "fuelType";
/// Unrounded combined MPG for the primary fuel.
pub const COLUMN_COMBUSTION_EFFICIENCY: &str = "comb08U";
/// Combined kWh/100 miles, meaningful for electric vehicles only.
pub const COLUMN_ELECTRIC_EFFICIENCY: &str = "combE";
pub const COLUMN_CYLINDERS: &str = "cylinders";
/// Engine displacement in liters.
pub const COLUMN_LITERS: &str = "displ";
pub const COLUMN_DRIVE: &str = "drive";
pub const COLUMN_TRANSMISSION: &str = "trany";

/// Fuel type whose efficiency is read from the electric column.
pub const ELECTRIC_FUEL_TYPE: &str = "Electricity";

/// Token the dataset uses for "not applicable" numeric fields.
pub const NOT_APPLICABLE: &str = "NA";

/// Errors that can occur when loading the dataset.
///
/// Row-level variants carry the 1-based line number of the offending line
/// (the header is line 1) and the header name of the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("Dataset is empty: no header row")]
    Empty,

    #[error("Missing required column '{column}' in header on line 1")]
    MissingColumn { column: &'static str },

    #[error("Missing {field} on line {line}")]
    MissingField { line: usize, field: &'static str },

    #[error("Invalid {field} on line {line}: {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Failed to read dataset: {0}")]
    Storage(String),
}

/// One typed row of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRecord {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub fuel_type: String,
    /// MPG for combustion vehicles, kWh/100 miles for electric ones.
    pub efficiency: f64,
    /// 0 when not applicable or unknown.
    pub cylinders: u32,
    /// 0 when not applicable or unknown.
    pub liters: f64,
    pub drive: String,
    pub transmission: String,
}

impl VehicleRecord {
    #[must_use]
    pub fn is_electric(&self) -> bool {
        self.fuel_type == ELECTRIC_FUEL_TYPE
    }
}

/// Positions of the consumed columns, resolved once from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    make: usize,
    model: usize,
    year: usize,
    fuel_type: usize,
    combustion_efficiency: usize,
    electric_efficiency: usize,
    cylinders: usize,
    liters: usize,
    drive: usize,
    transmission: usize,
}

impl ColumnMap {
    fn from_header(header: &str) -> Result<Self, DatasetError> {
        let names = split_line(header);

        // First occurrence wins for duplicated header names.
        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            positions.entry(name.as_str()).or_insert(index);
        }

        let find = |column: &'static str| {
            positions
                .get(column)
                .copied()
                .ok_or(DatasetError::MissingColumn { column })
        };

        Ok(Self {
            make: find(COLUMN_MAKE)?,
            model: find(COLUMN_MODEL)?,
            year: find(COLUMN_YEAR)?,
            fuel_type: find(COLUMN_FUEL_TYPE)?,
            combustion_efficiency: find(COLUMN_COMBUSTION_EFFICIENCY)?,
            electric_efficiency: find(COLUMN_ELECTRIC_EFFICIENCY)?,
            cylinders: find(COLUMN_CYLINDERS)?,
            liters: find(COLUMN_LITERS)?,
            drive: find(COLUMN_DRIVE)?,
            transmission: find(COLUMN_TRANSMISSION)?,
        })
    }
}

/// The split fields of one data line, with its line number for error reporting.
struct Row {
    line: usize,
    fields: Vec<String>,
}

impl Row {
    fn raw(&self, index: usize, field: &'static str) -> Result<&str, DatasetError> {
        self.fields
            .get(index)
            .map(String::as_str)
            .ok_or(DatasetError::MissingField {
                line: self.line,
                field,
            })
    }

    fn text(&self, index: usize, field: &'static str) -> Result<String, DatasetError> {
        let value = self.raw(index, field)?;
        if value.is_empty() {
            return Err(DatasetError::MissingField {
                line: self.line,
                field,
            });
        }
        Ok(value.to_string())
    }

    fn integer(&self, index: usize, field: &'static str) -> Result<i32, DatasetError> {
        let value = self.raw(index, field)?;
        value.parse().map_err(|_| self.invalid(field, value))
    }

    fn float(&self, index: usize, field: &'static str) -> Result<f64, DatasetError> {
        let value = self.raw(index, field)?;
        match value.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(number),
            _ => Err(self.invalid(field, value)),
        }
    }

    /// Blank and `NA` fields read as zero.
    fn count(&self, index: usize, field: &'static str) -> Result<u32, DatasetError> {
        let value = self.raw(index, field)?;
        if is_not_applicable(value) {
            return Ok(0);
        }
        value.parse().map_err(|_| self.invalid(field, value))
    }

    /// Blank and `NA` fields read as zero; negative and infinite values are rejected.
    fn measure(&self, index: usize, field: &'static str) -> Result<f64, DatasetError> {
        let value = self.raw(index, field)?;
        if is_not_applicable(value) {
            return Ok(0.0);
        }
        match value.parse::<f64>() {
            Ok(number) if number.is_finite() && number >= 0.0 => Ok(number),
            _ => Err(self.invalid(field, value)),
        }
    }

    fn invalid(&self, field: &'static str, value: &str) -> DatasetError {
        DatasetError::InvalidNumber {
            line: self.line,
            field,
            value: value.to_string(),
        }
    }
}

fn is_not_applicable(value: &str) -> bool {
    value.is_empty() || value == NOT_APPLICABLE
}

/// Split one line on commas, treating commas inside double quotes as text.
///
/// Quote characters toggle the quoted state and are not kept. There is no
/// escape sequence for a literal quote.
#[must_use]
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

/// Parse the full text of a dataset into records, in file order.
///
/// Any malformed row aborts the whole parse; no partial record set is returned.
///
/// # Errors
///
/// Returns `DatasetError::Empty` if there is no header row,
/// `DatasetError::MissingColumn` if a consumed column is absent from the header,
/// and `DatasetError::MissingField`/`DatasetError::InvalidNumber` for the first
/// row that fails conversion.
pub fn parse_dataset(text: &str) -> Result<Vec<VehicleRecord>, DatasetError> {
    let mut lines = text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

    let header = match lines.next() {
        Some(header) if !header.is_empty() => header,
        _ => return Err(DatasetError::Empty),
    };
    let columns = ColumnMap::from_header(header)?;

    let mut records = Vec::new();
    for (index, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }

        let row = Row {
            // +2: enumerate is 0-based and the header is line 1
            line: index + 2,
            fields: split_line(line),
        };
        records.push(parse_row(&row, &columns)?);
    }

    Ok(records)
}

fn parse_row(row: &Row, columns: &ColumnMap) -> Result<VehicleRecord, DatasetError> {
    let make = row.text(columns.make, COLUMN_MAKE)?;
    let model = row.text(columns.model, COLUMN_MODEL)?;
    let year = row.integer(columns.year, COLUMN_YEAR)?;
    let fuel_type = row.text(columns.fuel_type, COLUMN_FUEL_TYPE)?;

    // Both columns must parse even though only one is kept.
    let combustion = row.float(columns.combustion_efficiency, COLUMN_COMBUSTION_EFFICIENCY)?;
    let electric = row.float(columns.electric_efficiency, COLUMN_ELECTRIC_EFFICIENCY)?;
    let efficiency = if fuel_type == ELECTRIC_FUEL_TYPE {
        electric
    } else {
        combustion
    };

    let cylinders = row.count(columns.cylinders, COLUMN_CYLINDERS)?;
    let liters = row.measure(columns.liters, COLUMN_LITERS)?;
    let drive = row.text(columns.drive, COLUMN_DRIVE)?;
    let transmission = row.text(columns.transmission, COLUMN_TRANSMISSION)?;

    Ok(VehicleRecord {
        make,
        model,
        year,
        fuel_type,
        efficiency,
        cylinders,
        liters,
        drive,
        transmission,
    })
}
