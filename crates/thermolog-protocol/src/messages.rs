//! Protocol message types for the device's web interface.
//!
//! This module defines everything exchanged with the device:
//! - Device → Client: initial reading batch, pushed readings
//! - Client → Device: administrative commands, Wi-Fi credential form
//!
//! Readings travel as JSON; commands and the form travel as URL-encoded or
//! JSON bodies depending on [`BodyEncoding`].

use serde::{Deserialize, Serialize};
use thermolog_core::{BodyEncoding, Reading};

/// A reading as the device serializes it.
///
/// # Example
/// ```json
/// { "timestamp": 1700000000, "temp": 21.5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadingMessage {
    pub timestamp: i64,
    pub temp: f64,
}

impl From<ReadingMessage> for Reading {
    fn from(msg: ReadingMessage) -> Self {
        Reading::new(msg.timestamp, msg.temp)
    }
}

impl From<&Reading> for ReadingMessage {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp,
            temp: reading.temperature,
        }
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Routes served by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /save` - store Wi-Fi credentials (access-point mode).
    Save,
    /// `GET /initial-data` - most recent readings as a JSON array.
    InitialData,
    /// `GET /ws` - WebSocket upgrade for pushed readings.
    PushChannel,
    /// `POST /add-row`
    AddRow,
    /// `POST /delete-row`
    DeleteRow,
    /// `POST /clear-csv`
    ClearCsv,
    /// `POST /clear-wifi`
    ClearWifi,
    /// `GET /temperature_data.csv`
    CsvDownload,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Save => "/save",
            Endpoint::InitialData => "/initial-data",
            Endpoint::PushChannel => "/ws",
            Endpoint::AddRow => "/add-row",
            Endpoint::DeleteRow => "/delete-row",
            Endpoint::ClearCsv => "/clear-csv",
            Endpoint::ClearWifi => "/clear-wifi",
            Endpoint::CsvDownload => "/temperature_data.csv",
        }
    }
}

/// Absolute URLs for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoints {
    authority: String,
}

impl DeviceEndpoints {
    /// Build URLs for a device reachable at `authority` (`host` or `host:port`).
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    /// HTTP URL for an endpoint.
    pub fn http(&self, endpoint: Endpoint) -> String {
        format!("http://{}{}", self.authority, endpoint.path())
    }

    /// WebSocket URL of the push channel.
    pub fn push_channel(&self) -> String {
        format!("ws://{}{}", self.authority, Endpoint::PushChannel.path())
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }
}

// ============================================================================
// Request bodies
// ============================================================================

/// A serialized request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body at all.
    Empty,
    /// `application/x-www-form-urlencoded` pairs, in order.
    Form(Vec<(String, String)>),
    /// `application/json` object.
    Json(serde_json::Value),
}

impl RequestBody {
    /// Content type header value, if the body has one.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
            RequestBody::Json(_) => Some("application/json"),
        }
    }
}

/// Ordered form fields, as collected from an HTML form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, keeping any earlier field with the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Serialize with the given encoding.
    ///
    /// For JSON, repeated names collapse to the last value, as building an
    /// object from form entries does.
    pub fn body(&self, encoding: BodyEncoding) -> RequestBody {
        match encoding {
            BodyEncoding::Form => RequestBody::Form(self.fields.clone()),
            BodyEncoding::Json => {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .fields
                    .iter()
                    .map(|(n, v)| (n.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                RequestBody::Json(serde_json::Value::Object(object))
            }
        }
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (name, value) in iter {
            fields.push(name, value);
        }
        fields
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Administrative commands issued from the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append a raw `timestamp;temp` row to the log.
    AddRow { row: String },
    /// Remove every row with this timestamp.
    DeleteRow { timestamp: String },
    /// Truncate the log to its header.
    ClearCsv,
    /// Forget the stored Wi-Fi credentials.
    ClearWifi,
}

impl Command {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Command::AddRow { .. } => Endpoint::AddRow,
            Command::DeleteRow { .. } => Endpoint::DeleteRow,
            Command::ClearCsv => Endpoint::ClearCsv,
            Command::ClearWifi => Endpoint::ClearWifi,
        }
    }

    /// Request body for this command.
    pub fn body(&self, encoding: BodyEncoding) -> RequestBody {
        match self {
            Command::AddRow { row } => FormFields::new().with("row", row.as_str()).body(encoding),
            Command::DeleteRow { timestamp } => FormFields::new()
                .with("timestamp", timestamp.as_str())
                .body(encoding),
            Command::ClearCsv | Command::ClearWifi => RequestBody::Empty,
        }
    }

    /// Alert shown once the request completes.
    pub fn success_alert(&self) -> &'static str {
        match self {
            Command::AddRow { .. } => "Row added",
            Command::DeleteRow { .. } => "Row deleted",
            Command::ClearCsv => "CSV data cleared",
            Command::ClearWifi => "WiFi credentials cleared",
        }
    }
}
