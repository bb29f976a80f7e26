//! Thermolog data model types.
//!
//! The device logs one kind of record: a temperature sample taken at an
//! epoch-second timestamp. On flash it lives as a CSV line `timestamp;temp`
//! under the header `timestamp;temp`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the timestamp and temperature columns.
pub const ROW_SEPARATOR: char = ';';

/// A single temperature sample.
///
/// The timestamp is the uniqueness key: it is the value of the matching
/// selector option and the correlation key for chart labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Epoch seconds.
    pub timestamp: i64,

    /// Degrees Celsius.
    #[serde(rename = "temp")]
    pub temperature: f64,
}

/// Errors produced when parsing a `timestamp;temp` row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowParseError {
    /// The row has no `;` between the columns.
    #[error("Row {0:?} is missing the ';' separator")]
    MissingSeparator(String),

    /// The timestamp column is not an integer.
    #[error("Invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    /// The temperature column is not a number.
    #[error("Invalid temperature {0:?}")]
    InvalidTemperature(String),
}

impl Reading {
    /// Create a new reading.
    pub fn new(timestamp: i64, temperature: f64) -> Self {
        Self {
            timestamp,
            temperature,
        }
    }

    /// Parse a row in the device's `timestamp;temp` format.
    ///
    /// Only the first two columns are looked at; anything after a second `;`
    /// is ignored.
    pub fn parse_row(row: &str) -> Result<Self, RowParseError> {
        let mut columns = row.split(ROW_SEPARATOR);
        let timestamp = columns.next().unwrap_or_default().trim();
        let temperature = columns
            .next()
            .ok_or_else(|| RowParseError::MissingSeparator(row.to_string()))?
            .trim();

        let timestamp = timestamp
            .parse::<i64>()
            .map_err(|_| RowParseError::InvalidTimestamp(timestamp.to_string()))?;
        let temperature = temperature
            .parse::<f64>()
            .map_err(|_| RowParseError::InvalidTemperature(temperature.to_string()))?;

        Ok(Self::new(timestamp, temperature))
    }
}

impl FromStr for Reading {
    type Err = RowParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_row(s)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} °C",
            self.timestamp,
            format_temperature(self.temperature)
        )
    }
}

/// Format a temperature the way the dashboard prints numbers: shortest form,
/// no trailing zeros (`20`, `21.5`).
pub fn format_temperature(value: f64) -> String {
    value.to_string()
}
