//! Push channel for live readings.
//!
//! The device broadcasts every new reading to all clients on `/ws`, one JSON
//! object per text frame. A [`PushChannel`] owns one such connection and
//! applies each reading to the dashboard state as it arrives.
//!
//! There is no reconnect: once the device closes the socket or the
//! connection fails, the channel reports itself as not open and updates
//! stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use thermolog_core::DashboardState;
use thermolog_protocol::{decode_push_message, CodecError};

use crate::events::DashboardEvent;

/// A live connection to the device's push channel.
pub struct PushChannel {
    url: String,
    open: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PushChannel {
    /// Connect to `url` and start applying pushed readings to `state`.
    pub async fn open(
        url: &str,
        state: Arc<RwLock<DashboardState>>,
        events: broadcast::Sender<DashboardEvent>,
    ) -> crate::Result<Self> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url).await?;
        info!("Push channel open at {}", url);

        let open = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(run_channel(
            ws_stream,
            url.to_string(),
            state,
            events,
            open.clone(),
        ));

        Ok(Self {
            url: url.to_string(),
            open,
            task,
        })
    }

    /// Whether readings can still arrive.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Drop the connection.
    pub fn close(self) {
        self.task.abort();
        self.open.store(false, Ordering::Release);
        info!("Push channel at {} closed locally", self.url);
    }

    /// Wait until the device ends the connection.
    pub async fn closed(self) {
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                error!("Push channel task failed: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for PushChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushChannel")
            .field("url", &self.url)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Read frames until the connection ends.
///
/// Frames are handled strictly one at a time.
async fn run_channel(
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    url: String,
    state: Arc<RwLock<DashboardState>>,
    events: broadcast::Sender<DashboardEvent>,
    open: Arc<AtomicBool>,
) {
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                apply_push_message(&text, &state, &events).await;
            }
            Ok(Message::Binary(_)) => {
                warn!("Dropping push message: {}", CodecError::BinaryFrame);
            }
            Ok(Message::Ping(data)) => {
                if let Err(e) = ws_tx.send(Message::Pong(data)).await {
                    error!("Failed to answer ping on {}: {}", url, e);
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("Device closed push channel {}", url);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!("Push channel error on {}: {}", url, e);
                break;
            }
        }
    }

    open.store(false, Ordering::Release);
    let _ = events.send(DashboardEvent::ChannelClosed);
}

/// Apply one text frame. A frame that is not a reading is logged and
/// dropped; the channel keeps running.
async fn apply_push_message(
    text: &str,
    state: &RwLock<DashboardState>,
    events: &broadcast::Sender<DashboardEvent>,
) {
    match decode_push_message(text) {
        Ok(reading) => {
            state.write().await.ingest(&reading);
            debug!("Pushed reading {}", reading);
            let _ = events.send(DashboardEvent::Redraw);
        }
        Err(e) => {
            warn!("Dropping malformed push message {:?}: {}", text, e);
        }
    }
}
