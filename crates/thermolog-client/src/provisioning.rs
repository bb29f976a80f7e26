//! Wi-Fi credential form submission (access-point mode).

use std::sync::Arc;

use tracing::{debug, warn};

use thermolog_core::{BodyEncoding, DeviceConfig};
use thermolog_protocol::{DeviceEndpoints, Endpoint, FormFields};

use crate::io::HttpClient;

pub const SAVE_SUCCEEDED: &str = "Wi-Fi settings saved successfully!";
pub const SAVE_FAILED: &str = "Failed to save Wi-Fi settings.";
pub const SAVE_ERRORED: &str = "An error occurred while saving Wi-Fi settings.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
}

/// Inline status shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub tone: Tone,
}

impl StatusMessage {
    fn success(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tone: Tone::Success,
        }
    }

    fn failure(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tone: Tone::Failure,
        }
    }

    pub fn color(&self) -> &'static str {
        match self.tone {
            Tone::Success => "green",
            Tone::Failure => "red",
        }
    }

    pub fn is_success(&self) -> bool {
        self.tone == Tone::Success
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Posts the credential form to `/save`.
pub struct ProvisioningClient {
    endpoints: DeviceEndpoints,
    encoding: BodyEncoding,
    http: Arc<dyn HttpClient>,
}

impl ProvisioningClient {
    pub fn new(device: &DeviceConfig, encoding: BodyEncoding, http: Arc<dyn HttpClient>) -> Self {
        Self::with_endpoints(DeviceEndpoints::new(device.authority()), encoding, http)
    }

    pub fn with_endpoints(
        endpoints: DeviceEndpoints,
        encoding: BodyEncoding,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            endpoints,
            encoding,
            http,
        }
    }

    /// Submit every field in order and translate the outcome into a status
    /// message. Only exactly 200 counts as saved. This never returns an
    /// error; transport failures become the red error message.
    pub async fn submit(&self, fields: &FormFields) -> StatusMessage {
        let url = self.endpoints.http(Endpoint::Save);
        let body = fields.body(self.encoding);

        match self.http.post(&url, &body).await {
            Ok(response) if response.status == 200 => {
                debug!("Wi-Fi settings accepted by {}", self.endpoints.authority());
                StatusMessage::success(SAVE_SUCCEEDED)
            }
            Ok(response) => {
                warn!("Wi-Fi settings rejected with status {}", response.status);
                StatusMessage::failure(SAVE_FAILED)
            }
            Err(e) => {
                warn!("Wi-Fi settings submit failed: {}", e);
                StatusMessage::failure(SAVE_ERRORED)
            }
        }
    }

    /// Submit the usual `ssid`/`password` pair.
    pub async fn submit_credentials(&self, ssid: &str, password: &str) -> StatusMessage {
        let fields = FormFields::new()
            .with("ssid", ssid)
            .with("password", password);
        self.submit(&fields).await
    }
}
