//! # thermolog-client
//!
//! Tokio client for the thermolog device.
//!
//! - [`DashboardController`] mirrors the device's temperature log: initial
//!   batch, live push channel, administrative commands
//! - [`ProvisioningClient`] submits the Wi-Fi credential form in
//!   access-point mode
//!
//! HTTP goes through the [`HttpClient`] trait so both can run against a mock.

pub mod controller;
pub mod error;
pub mod events;
pub mod io;
pub mod notifier;
pub mod provisioning;
pub mod push;

pub use controller::{DashboardController, Startup};
pub use error::{ClientError, Result};
pub use events::DashboardEvent;
pub use io::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use notifier::{Notifier, RecordingNotifier};
pub use provisioning::{ProvisioningClient, StatusMessage, Tone};
pub use push::PushChannel;
