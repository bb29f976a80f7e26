//! Dashboard state.
//!
//! Holds the chart, the selector and the latest-value text, and applies the
//! updates the controller performs after fetches, push messages and
//! commands. Every method runs to completion without suspending, so a
//! caller holding the state's lock applies each update atomically.

use crate::model::{format_temperature, Reading};
use crate::options::DashboardOptions;
use crate::selector::{SelectOption, Selector};
use crate::series::{ChartPoint, ChartSeries};

/// What a delete-row patch removed locally.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    /// The selector option that was removed.
    pub option: SelectOption,
    /// The chart point with the matching label, if one was found.
    pub point: Option<ChartPoint>,
}

/// A cloned view of the dashboard for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub options: Vec<SelectOption>,
    /// Index into `options` of the current option.
    pub selected_index: Option<usize>,
    pub selected: Option<String>,
    pub latest: Option<String>,
}

/// Local mirror of the device's temperature log.
#[derive(Debug, Clone)]
pub struct DashboardState {
    options: DashboardOptions,
    chart: ChartSeries,
    selector: Selector,
    latest: Option<String>,
}

impl DashboardState {
    /// Create empty state for the given options.
    pub fn new(options: DashboardOptions) -> Self {
        Self {
            options,
            chart: ChartSeries::new(options.chart_ordering, options.label_zone),
            selector: Selector::new(),
            latest: None,
        }
    }

    /// Push a reading onto the chart and update the latest-value text.
    pub fn append_reading(&mut self, reading: &Reading) {
        self.chart.push(reading);
        self.latest = Some(format!(
            "Latest Temperature: {} °C",
            format_temperature(reading.temperature)
        ));
    }

    /// Add a selector option for `timestamp`.
    pub fn register_selectable(&mut self, timestamp: i64) {
        self.selector.add(SelectOption {
            value: timestamp.to_string(),
            text: self.options.label_zone.format(timestamp),
        });
    }

    /// Apply a reading the way every source does: chart first, then the
    /// selector.
    pub fn ingest(&mut self, reading: &Reading) {
        self.append_reading(reading);
        self.register_selectable(reading.timestamp);
    }

    /// Select the option with `value`.
    pub fn select(&mut self, value: &str) -> bool {
        self.selector.select(value)
    }

    /// Value of the currently selected option.
    pub fn selected_value(&self) -> Option<&str> {
        self.selector.value()
    }

    /// Remove the selected option and the first chart point whose label
    /// matches it.
    ///
    /// Returns `None` when the selector is empty. A missing chart point is
    /// not an error: the chart is left untouched.
    pub fn delete_selected(&mut self) -> Option<DeleteOutcome> {
        let option = self.selector.remove_selected()?;
        let label = self.options.label_zone.format_value(&option.value);
        let point = self.chart.remove_by_label(&label);
        Some(DeleteOutcome { option, point })
    }

    /// Empty the selector only.
    pub fn reset_selector(&mut self) {
        self.selector.clear();
    }

    /// Drop all local state, as a page reload would.
    pub fn reset(&mut self) {
        self.chart.clear();
        self.selector.clear();
        self.latest = None;
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn chart(&self) -> &ChartSeries {
        &self.chart
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn latest_text(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    /// Clone the renderable parts of the state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            labels: self.chart.labels().into_iter().map(String::from).collect(),
            values: self.chart.values(),
            options: self.selector.options().to_vec(),
            selected_index: self.selector.selected_index(),
            selected: self.selector.value().map(String::from),
            latest: self.latest.clone(),
        }
    }
}
