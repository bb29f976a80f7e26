//! Dashboard behaviour options.
//!
//! Builds of the device firmware shipped page scripts that differ in three
//! ways. Each difference is an explicit option selected at initialization.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Label shown for a timestamp that cannot be represented as a date.
pub const INVALID_DATE: &str = "Invalid Date";

const LABEL_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// How request bodies are serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// JSON object body (`application/json`).
    Json,
    /// URL-encoded body (`application/x-www-form-urlencoded`).
    #[default]
    Form,
}

/// How the chart orders its points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartOrdering {
    /// Points stay in arrival order.
    Insertion,
    /// Points are kept sorted ascending by timestamp after every update.
    #[default]
    SortedByTimestamp,
}

/// What clearing the log does to local state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClearBehavior {
    /// Throw away local state and rebuild it from the device.
    #[default]
    Reload,
    /// Empty the selector only; the chart keeps its points.
    ResetDropdown,
}

/// Time zone chart labels are rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelZone {
    #[default]
    Local,
    Utc,
}

impl LabelZone {
    /// Render an epoch-second timestamp as a chart label,
    /// e.g. `11/14/2023, 10:13:20 PM`.
    pub fn format(&self, timestamp: i64) -> String {
        let Some(utc) = DateTime::<Utc>::from_timestamp(timestamp, 0) else {
            return INVALID_DATE.to_string();
        };
        match self {
            LabelZone::Local => utc.with_timezone(&Local).format(LABEL_FORMAT).to_string(),
            LabelZone::Utc => utc.format(LABEL_FORMAT).to_string(),
        }
    }

    /// Render a raw selector value as a chart label.
    ///
    /// Values that are not integer timestamps render as [`INVALID_DATE`].
    pub fn format_value(&self, value: &str) -> String {
        match value.trim().parse::<i64>() {
            Ok(timestamp) => self.format(timestamp),
            Err(_) => INVALID_DATE.to_string(),
        }
    }
}

/// The full set of behaviour options for one dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOptions {
    #[serde(default)]
    pub body_encoding: BodyEncoding,

    #[serde(default)]
    pub chart_ordering: ChartOrdering,

    #[serde(default)]
    pub on_clear: ClearBehavior,

    #[serde(default)]
    pub label_zone: LabelZone,
}
