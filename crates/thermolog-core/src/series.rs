//! Chart series model.
//!
//! The line chart is driven by two parallel sequences, labels and values.
//! Both are stored here as one sequence of points so they cannot drift out
//! of index correspondence.

use serde::{Deserialize, Serialize};

use crate::model::Reading;
use crate::options::{ChartOrdering, LabelZone};

/// One point on the temperature chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: i64,
    pub label: String,
    pub value: f64,
}

/// The chart's label/value sequences.
#[derive(Debug, Clone, Default)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
    ordering: ChartOrdering,
    zone: LabelZone,
}

impl ChartSeries {
    /// Create an empty series.
    pub fn new(ordering: ChartOrdering, zone: LabelZone) -> Self {
        Self {
            points: Vec::new(),
            ordering,
            zone,
        }
    }

    /// Add a reading and return the index it landed at.
    ///
    /// In sorted mode the point goes after every point with an equal or
    /// smaller timestamp, which is where a stable re-sort would leave it.
    pub fn push(&mut self, reading: &Reading) -> usize {
        let point = ChartPoint {
            timestamp: reading.timestamp,
            label: self.zone.format(reading.timestamp),
            value: reading.temperature,
        };

        let index = match self.ordering {
            ChartOrdering::Insertion => self.points.len(),
            ChartOrdering::SortedByTimestamp => self
                .points
                .partition_point(|p| p.timestamp <= reading.timestamp),
        };
        self.points.insert(index, point);
        index
    }

    /// Remove the first point carrying `label`.
    ///
    /// Returns `None` and leaves the series untouched when no point matches.
    pub fn remove_by_label(&mut self, label: &str) -> Option<ChartPoint> {
        let index = self.points.iter().position(|p| p.label == label)?;
        Some(self.points.remove(index))
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Chart labels, in display order.
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    /// Chart values, in display order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
