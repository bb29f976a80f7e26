//! Dashboard sync controller.
//!
//! Keeps a local mirror of the device's temperature log:
//! - loads the historical batch from `/initial-data`
//! - applies live readings from the push channel
//! - issues administrative commands and patches local state after each one
//!
//! The device is authoritative. Commands are fire-and-forget: any HTTP
//! status counts as success, nothing is retried and nothing is rolled back.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};

use thermolog_core::{
    ClearBehavior, DashboardOptions, DashboardSnapshot, DashboardState, DeleteOutcome,
    DeviceConfig, Reading,
};
use thermolog_protocol::{decode_initial_data, Command, DeviceEndpoints, Endpoint};

use crate::error::ClientError;
use crate::events::DashboardEvent;
use crate::io::{HttpClient, HttpResponse};
use crate::notifier::Notifier;
use crate::push::PushChannel;

/// Result of [`DashboardController::initialize`].
#[derive(Debug)]
pub struct Startup {
    /// The opened push channel.
    pub channel: PushChannel,

    /// Why the historical batch could not be loaded, if it failed.
    pub batch_error: Option<ClientError>,
}

/// Synchronizes the dashboard state with one device.
pub struct DashboardController {
    endpoints: DeviceEndpoints,
    options: DashboardOptions,
    http: Arc<dyn HttpClient>,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<DashboardState>>,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardController {
    /// Create a controller for the device described by `device`.
    pub fn new(
        device: &DeviceConfig,
        options: DashboardOptions,
        http: Arc<dyn HttpClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_endpoints(
            DeviceEndpoints::new(device.authority()),
            options,
            http,
            notifier,
        )
    }

    /// Create a controller for explicit endpoints.
    pub fn with_endpoints(
        endpoints: DeviceEndpoints,
        options: DashboardOptions,
        http: Arc<dyn HttpClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            endpoints,
            options,
            http,
            notifier,
            state: Arc::new(RwLock::new(DashboardState::new(options))),
            events,
        }
    }

    /// Subscribe to dashboard events.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Shared handle to the dashboard state.
    pub fn state(&self) -> Arc<RwLock<DashboardState>> {
        self.state.clone()
    }

    /// Clone the current chart/selector view.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.read().await.snapshot()
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn endpoints(&self) -> &DeviceEndpoints {
        &self.endpoints
    }

    // ========================================================================
    // Startup
    // ========================================================================

    /// Load the historical batch, then open the push channel.
    ///
    /// A failed batch is not retried; it is logged and handed back in
    /// [`Startup::batch_error`]. The push channel is opened either way.
    pub async fn initialize(&self) -> crate::Result<Startup> {
        let batch_error = match self.load_initial_data().await {
            Ok(count) => {
                info!("Loaded {} readings from {}", count, self.endpoints.authority());
                None
            }
            Err(e) => {
                error!("Initial data load failed: {}", e);
                Some(e)
            }
        };

        let channel = self.open_push_channel().await?;
        Ok(Startup {
            channel,
            batch_error,
        })
    }

    /// Fetch `/initial-data` and ingest every reading in received order.
    pub async fn load_initial_data(&self) -> crate::Result<usize> {
        let url = self.endpoints.http(Endpoint::InitialData);
        let response = self.http.get(&url).await?;
        let batch = decode_initial_data(&response.body)?;

        {
            let mut state = self.state.write().await;
            for reading in &batch {
                state.ingest(reading);
            }
        }

        let _ = self.events.send(DashboardEvent::Redraw);
        Ok(batch.len())
    }

    /// Open the push channel for live readings.
    pub async fn open_push_channel(&self) -> crate::Result<PushChannel> {
        PushChannel::open(
            &self.endpoints.push_channel(),
            self.state.clone(),
            self.events.clone(),
        )
        .await
    }

    /// Throw away local state and rebuild it from the device.
    pub async fn reload(&self) -> crate::Result<usize> {
        self.state.write().await.reset();
        let count = self.load_initial_data().await?;
        let _ = self.events.send(DashboardEvent::Reloaded { readings: count });
        Ok(count)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// POST a command and show its alert once the request completes.
    ///
    /// The response status is not inspected.
    pub async fn submit_command(&self, command: &Command) -> crate::Result<HttpResponse> {
        let url = self.endpoints.http(command.endpoint());
        let body = command.body(self.options.body_encoding);
        let response = self.http.post(&url, &body).await?;
        debug!("{:?} answered with status {}", command, response.status);

        self.notifier.alert(command.success_alert());
        Ok(response)
    }

    /// Append a `timestamp;temperature` row on the device, then locally.
    ///
    /// Empty text does nothing. Text that does not parse is still sent (the
    /// device stores rows verbatim) but returns an error instead of a local
    /// patch.
    pub async fn add_row(&self, row: &str) -> crate::Result<Option<Reading>> {
        if row.is_empty() {
            return Ok(None);
        }

        self.submit_command(&Command::AddRow {
            row: row.to_string(),
        })
        .await?;

        let reading = Reading::parse_row(row)?;
        self.state.write().await.ingest(&reading);
        let _ = self.events.send(DashboardEvent::Redraw);
        Ok(Some(reading))
    }

    /// Select the option for `timestamp` as the delete target.
    pub async fn select(&self, timestamp: &str) -> bool {
        self.state.write().await.select(timestamp)
    }

    /// Delete the selected row on the device, then locally.
    ///
    /// Does nothing when there is no option to select. A chart point whose
    /// label does not match is left alone without error.
    pub async fn delete_selected(&self) -> crate::Result<Option<DeleteOutcome>> {
        let Some(timestamp) = self.state.read().await.selected_value().map(String::from) else {
            return Ok(None);
        };

        self.submit_command(&Command::DeleteRow { timestamp }).await?;

        let outcome = self.state.write().await.delete_selected();
        if let Some(outcome) = &outcome {
            if outcome.point.is_none() {
                debug!("No chart point labelled for {}", outcome.option.value);
            }
        }
        let _ = self.events.send(DashboardEvent::Redraw);
        Ok(outcome)
    }

    /// Clear the device's log, then apply the configured clear behaviour.
    pub async fn clear_csv(&self) -> crate::Result<()> {
        self.submit_command(&Command::ClearCsv).await?;

        match self.options.on_clear {
            ClearBehavior::Reload => {
                self.reload().await?;
            }
            ClearBehavior::ResetDropdown => {
                self.state.write().await.reset_selector();
                let _ = self.events.send(DashboardEvent::Redraw);
            }
        }
        Ok(())
    }

    /// Forget the device's stored Wi-Fi credentials. No local effect.
    pub async fn clear_wifi(&self) -> crate::Result<()> {
        self.submit_command(&Command::ClearWifi).await?;
        Ok(())
    }

    /// Download the device's CSV log to `destination`.
    ///
    /// Returns the number of bytes written.
    pub async fn download_csv(&self, destination: &Path) -> crate::Result<usize> {
        let url = self.endpoints.http(Endpoint::CsvDownload);
        let response = self.http.get(&url).await?;
        tokio::fs::write(destination, response.body.as_bytes()).await?;
        info!(
            "Saved {} bytes of CSV to {}",
            response.body.len(),
            destination.display()
        );
        Ok(response.body.len())
    }
}
