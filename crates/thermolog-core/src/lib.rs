//! # thermolog-core
//!
//! Core data model for the thermolog device dashboard.
//!
//! This crate provides:
//! - The `Reading` type and the device's `timestamp;temp` row format
//! - Chart series and selector models mirrored from the dashboard page
//! - Dashboard state with the configurable ordering/clear behaviours
//! - Configuration file types
//!
//! This crate is intentionally runtime-agnostic and contains no async code.

pub mod config;
pub mod dashboard;
pub mod model;
pub mod options;
pub mod selector;
pub mod series;

pub use config::{load_config, Config, ConfigError, DeviceConfig};
pub use dashboard::{DashboardSnapshot, DashboardState, DeleteOutcome};
pub use model::{format_temperature, Reading, RowParseError};
pub use options::{BodyEncoding, ChartOrdering, ClearBehavior, DashboardOptions, LabelZone};
pub use selector::{SelectOption, Selector};
pub use series::{ChartPoint, ChartSeries};
