//! Integration tests for the dashboard client.
//!
//! These tests start a mock device (HTTP routes plus the `/ws` push channel)
//! and drive the real reqwest and tokio-tungstenite stack against it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use tokio::sync::broadcast;
use tokio::time::timeout;

use thermolog_client::{
    DashboardController, DashboardEvent, ProvisioningClient, RecordingNotifier,
    ReqwestHttpClient, Tone,
};
use thermolog_core::{
    BodyEncoding, ChartOrdering, ClearBehavior, DashboardOptions, DeviceConfig, LabelZone,
    Reading,
};
use thermolog_protocol::{encode_initial_data, encode_reading};

/// Text that makes the mock device close every push channel.
const CLOSE_SIGNAL: &str = "__close__";

#[derive(Debug, Clone)]
struct RecordedRequest {
    path: &'static str,
    content_type: Option<String>,
    body: String,
}

#[derive(Debug, Default)]
struct DeviceLog {
    rows: Vec<String>,
    log_missing: bool,
    save_status: u16,
    wifi_cleared: bool,
    requests: Vec<RecordedRequest>,
}

/// In-memory stand-in for the device's web server.
#[derive(Clone)]
struct MockDevice {
    log: Arc<Mutex<DeviceLog>>,
    push: broadcast::Sender<String>,
}

impl MockDevice {
    fn new(rows: &[&str]) -> Self {
        let (push, _) = broadcast::channel(64);
        Self {
            log: Arc::new(Mutex::new(DeviceLog {
                rows: rows.iter().map(|r| r.to_string()).collect(),
                save_status: 200,
                ..Default::default()
            })),
            push,
        }
    }

    fn rows(&self) -> Vec<String> {
        self.log.lock().unwrap().rows.clone()
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().requests.clone()
    }

    fn record(&self, path: &'static str, headers: &HeaderMap, body: String) {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.log.lock().unwrap().requests.push(RecordedRequest {
            path,
            content_type,
            body,
        });
    }

    /// Broadcast a raw frame once `clients` push channels are connected.
    async fn push_text(&self, clients: usize, text: &str) {
        let wait = async {
            while self.push.receiver_count() < clients {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        timeout(Duration::from_secs(5), wait)
            .await
            .expect("push channel never connected");
        self.push.send(text.to_string()).unwrap();
    }

    async fn push_reading(&self, reading: Reading) {
        self.push_text(1, &encode_reading(&reading).unwrap()).await;
    }
}

async fn initial_data(State(device): State<MockDevice>) -> Response {
    let log = device.log.lock().unwrap();
    if log.log_missing {
        return "{}".into_response();
    }
    let readings: Vec<Reading> = log
        .rows
        .iter()
        .filter_map(|row| Reading::parse_row(row).ok())
        .collect();
    let start = readings.len().saturating_sub(100);
    (
        [(header::CONTENT_TYPE, "application/json")],
        encode_initial_data(&readings[start..]).unwrap(),
    )
        .into_response()
}

async fn add_row(
    State(device): State<MockDevice>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    let row = params.get("row").cloned().unwrap_or_default();
    device.record("/add-row", &headers, row.clone());
    if row.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing row data");
    }
    device.log.lock().unwrap().rows.push(row);
    (StatusCode::OK, "Row added")
}

async fn delete_row(
    State(device): State<MockDevice>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    let timestamp = params.get("timestamp").cloned().unwrap_or_default();
    device.record("/delete-row", &headers, timestamp.clone());
    device
        .log
        .lock()
        .unwrap()
        .rows
        .retain(|row| row.split(';').next() != Some(timestamp.as_str()));
    (StatusCode::OK, "Row deleted")
}

async fn clear_csv(State(device): State<MockDevice>, headers: HeaderMap) -> &'static str {
    device.record("/clear-csv", &headers, String::new());
    device.log.lock().unwrap().rows.clear();
    "CSV data cleared"
}

async fn clear_wifi(State(device): State<MockDevice>, headers: HeaderMap) -> &'static str {
    device.record("/clear-wifi", &headers, String::new());
    device.log.lock().unwrap().wifi_cleared = true;
    "WiFi credentials cleared"
}

async fn save(State(device): State<MockDevice>, headers: HeaderMap, body: String) -> StatusCode {
    device.record("/save", &headers, body);
    let status = device.log.lock().unwrap().save_status;
    StatusCode::from_u16(status).unwrap()
}

async fn csv_file(State(device): State<MockDevice>) -> String {
    let mut csv = String::from("timestamp;temp\n");
    for row in device.rows() {
        csv.push_str(&row);
        csv.push('\n');
    }
    csv
}

async fn push_channel(State(device): State<MockDevice>, ws: WebSocketUpgrade) -> Response {
    let mut rx = device.push.subscribe();
    ws.on_upgrade(move |mut socket| async move {
        while let Ok(text) = rx.recv().await {
            if text == CLOSE_SIGNAL {
                let _ = socket.send(WsMessage::Close(None)).await;
                break;
            }
            if socket.send(WsMessage::Text(text)).await.is_err() {
                break;
            }
        }
    })
}

/// Start the mock device on an ephemeral port.
async fn start_device(device: MockDevice) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/initial-data", get(initial_data))
        .route("/add-row", post(add_row))
        .route("/delete-row", post(delete_row))
        .route("/clear-csv", post(clear_csv))
        .route("/clear-wifi", post(clear_wifi))
        .route("/save", post(save))
        .route("/temperature_data.csv", get(csv_file))
        .route("/ws", get(push_channel))
        .with_state(device);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, handle)
}

fn device_config(addr: SocketAddr) -> DeviceConfig {
    DeviceConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
    }
}

fn options(ordering: ChartOrdering, on_clear: ClearBehavior) -> DashboardOptions {
    DashboardOptions {
        body_encoding: BodyEncoding::Form,
        chart_ordering: ordering,
        on_clear,
        label_zone: LabelZone::Utc,
    }
}

fn controller(
    addr: SocketAddr,
    options: DashboardOptions,
) -> (DashboardController, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let controller = DashboardController::new(
        &device_config(addr),
        options,
        Arc::new(ReqwestHttpClient::default()),
        notifier.clone(),
    );
    (controller, notifier)
}

/// Wait for `count` events matching `wanted`.
async fn wait_for(
    events: &mut broadcast::Receiver<DashboardEvent>,
    wanted: DashboardEvent,
    count: usize,
) {
    let mut seen = 0;
    while seen < count {
        match timeout(Duration::from_secs(5), events.recv()).await {
            Ok(Ok(event)) if event == wanted => seen += 1,
            Ok(Ok(_)) => {}
            Ok(Err(e)) => panic!("event channel failed: {e}"),
            Err(_) => panic!("timed out waiting for {wanted:?} ({seen}/{count})"),
        }
    }
}

#[tokio::test]
async fn test_push_messages_extend_initial_batch() {
    let device = MockDevice::new(&["100;20.00", "200;21.00"]);
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, _) = controller(
        addr,
        options(ChartOrdering::SortedByTimestamp, ClearBehavior::Reload),
    );

    let startup = controller.initialize().await.unwrap();
    assert!(startup.batch_error.is_none());
    assert!(startup.channel.is_open());
    let mut events = controller.subscribe();

    for (i, temp) in [22.0, 22.5, 23.5].into_iter().enumerate() {
        device
            .push_reading(Reading::new(300 + i as i64, temp))
            .await;
    }
    wait_for(&mut events, DashboardEvent::Redraw, 3).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.labels.len(), 5);
    assert_eq!(snapshot.values.len(), 5);
    assert_eq!(snapshot.options.len(), 5);
    assert_eq!(snapshot.latest.as_deref(), Some("Latest Temperature: 23.5 °C"));

    startup.channel.close();
    handle.abort();
}

#[tokio::test]
async fn test_malformed_push_message_is_skipped() {
    let device = MockDevice::new(&[]);
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, _) = controller(
        addr,
        options(ChartOrdering::Insertion, ClearBehavior::Reload),
    );

    let startup = controller.initialize().await.unwrap();
    let mut events = controller.subscribe();

    device.push_text(1, "{\"timestamp\":").await;
    device.push_reading(Reading::new(100, 19.5)).await;
    wait_for(&mut events, DashboardEvent::Redraw, 1).await;

    assert_eq!(controller.snapshot().await.values, vec![19.5]);
    assert!(startup.channel.is_open());

    startup.channel.close();
    handle.abort();
}

#[tokio::test]
async fn test_device_closing_channel_stops_updates() {
    let device = MockDevice::new(&[]);
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, _) = controller(
        addr,
        options(ChartOrdering::Insertion, ClearBehavior::Reload),
    );

    let startup = controller.initialize().await.unwrap();
    let mut events = controller.subscribe();

    device.push_text(1, CLOSE_SIGNAL).await;
    wait_for(&mut events, DashboardEvent::ChannelClosed, 1).await;
    assert!(!startup.channel.is_open());

    timeout(Duration::from_secs(5), startup.channel.closed())
        .await
        .unwrap();
    handle.abort();
}

#[tokio::test]
async fn test_missing_log_still_opens_channel() {
    let device = MockDevice::new(&[]);
    device.log.lock().unwrap().log_missing = true;
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, _) = controller(
        addr,
        options(ChartOrdering::Insertion, ClearBehavior::Reload),
    );

    let startup = controller.initialize().await.unwrap();
    assert!(matches!(
        startup.batch_error,
        Some(thermolog_client::ClientError::Codec(_))
    ));
    assert!(startup.channel.is_open());

    let mut events = controller.subscribe();
    device.push_reading(Reading::new(100, 20.0)).await;
    wait_for(&mut events, DashboardEvent::Redraw, 1).await;
    assert_eq!(controller.snapshot().await.values, vec![20.0]);

    startup.channel.close();
    handle.abort();
}

#[tokio::test]
async fn test_batch_ordering_modes() {
    let device = MockDevice::new(&["100;20.00", "50;18.00"]);
    let (addr, handle) = start_device(device).await;

    let (sorted, _) = controller(
        addr,
        options(ChartOrdering::SortedByTimestamp, ClearBehavior::Reload),
    );
    sorted.load_initial_data().await.unwrap();
    let snapshot = sorted.snapshot().await;
    assert_eq!(snapshot.values, vec![18.0, 20.0]);
    assert_eq!(
        snapshot.labels,
        vec![LabelZone::Utc.format(50), LabelZone::Utc.format(100)]
    );

    let (insertion, _) = controller(addr, options(ChartOrdering::Insertion, ClearBehavior::Reload));
    insertion.load_initial_data().await.unwrap();
    assert_eq!(insertion.snapshot().await.values, vec![20.0, 18.0]);

    handle.abort();
}

#[tokio::test]
async fn test_add_row() {
    let device = MockDevice::new(&[]);
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, notifier) = controller(
        addr,
        options(ChartOrdering::SortedByTimestamp, ClearBehavior::Reload),
    );

    let reading = controller.add_row("1700000000;21.5").await.unwrap();
    assert_eq!(reading, Some(Reading::new(1_700_000_000, 21.5)));

    let snapshot = controller.snapshot().await;
    assert!(snapshot.options.iter().any(|o| o.value == "1700000000"));
    assert!(snapshot.values.contains(&21.5));
    assert_eq!(notifier.alerts(), vec!["Row added"]);

    assert_eq!(device.rows(), vec!["1700000000;21.5"]);
    let requests = device.requests();
    assert_eq!(requests[0].path, "/add-row");
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );

    handle.abort();
}

#[tokio::test]
async fn test_delete_present_row() {
    let device = MockDevice::new(&["100;20.00", "200;21.00", "300;22.00"]);
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, notifier) = controller(
        addr,
        options(ChartOrdering::SortedByTimestamp, ClearBehavior::Reload),
    );
    controller.load_initial_data().await.unwrap();

    assert!(controller.select("200").await);
    let outcome = controller.delete_selected().await.unwrap().unwrap();
    assert_eq!(outcome.option.value, "200");
    assert!(outcome.point.is_some());

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.labels.len(), 2);
    assert!(!snapshot.labels.contains(&LabelZone::Utc.format(200)));
    assert!(snapshot.options.iter().all(|o| o.value != "200"));
    assert_eq!(notifier.alerts(), vec!["Row deleted"]);
    assert_eq!(device.rows(), vec!["100;20.00", "300;22.00"]);

    handle.abort();
}

#[tokio::test]
async fn test_delete_absent_row_leaves_chart_unchanged() {
    let device = MockDevice::new(&["100;20.00"]);
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, _) = controller(
        addr,
        options(ChartOrdering::Insertion, ClearBehavior::Reload),
    );
    controller.load_initial_data().await.unwrap();
    controller.state().write().await.register_selectable(999);

    assert!(controller.select("999").await);
    let outcome = controller.delete_selected().await.unwrap().unwrap();
    assert!(outcome.point.is_none());

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.values, vec![20.0]);
    assert_eq!(snapshot.options.len(), 1);
    assert_eq!(device.rows(), vec!["100;20.00"]);

    handle.abort();
}

#[tokio::test]
async fn test_clear_with_reload() {
    let device = MockDevice::new(&["100;20.00", "200;21.00"]);
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, notifier) = controller(
        addr,
        options(ChartOrdering::SortedByTimestamp, ClearBehavior::Reload),
    );
    controller.load_initial_data().await.unwrap();
    let mut events = controller.subscribe();

    controller.clear_csv().await.unwrap();
    wait_for(&mut events, DashboardEvent::Reloaded { readings: 0 }, 1).await;

    let snapshot = controller.snapshot().await;
    assert!(snapshot.options.is_empty());
    assert!(snapshot.values.is_empty());
    assert!(snapshot.labels.is_empty());
    assert_eq!(notifier.alerts(), vec!["CSV data cleared"]);
    assert!(device.rows().is_empty());

    handle.abort();
}

#[tokio::test]
async fn test_clear_with_reset_dropdown() {
    let device = MockDevice::new(&["100;20.00", "200;21.00"]);
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, _) = controller(
        addr,
        options(ChartOrdering::Insertion, ClearBehavior::ResetDropdown),
    );
    controller.load_initial_data().await.unwrap();

    controller.clear_csv().await.unwrap();

    let snapshot = controller.snapshot().await;
    assert!(snapshot.options.is_empty());
    assert_eq!(snapshot.values, vec![20.0, 21.0]);
    assert!(device.rows().is_empty());

    handle.abort();
}

#[tokio::test]
async fn test_clear_wifi() {
    let device = MockDevice::new(&["100;20.00"]);
    let (addr, handle) = start_device(device.clone()).await;
    let (controller, notifier) = controller(
        addr,
        options(ChartOrdering::Insertion, ClearBehavior::Reload),
    );
    controller.load_initial_data().await.unwrap();
    let before = controller.snapshot().await;

    controller.clear_wifi().await.unwrap();

    assert_eq!(controller.snapshot().await, before);
    assert_eq!(notifier.alerts(), vec!["WiFi credentials cleared"]);
    assert!(device.log.lock().unwrap().wifi_cleared);

    handle.abort();
}

#[tokio::test]
async fn test_download_csv() {
    let device = MockDevice::new(&["100;20.00", "200;21.00"]);
    let (addr, handle) = start_device(device).await;
    let (controller, _) = controller(
        addr,
        options(ChartOrdering::Insertion, ClearBehavior::Reload),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("temperature_data.csv");
    controller.download_csv(&path).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "timestamp;temp\n100;20.00\n200;21.00\n"
    );

    handle.abort();
}

#[tokio::test]
async fn test_wifi_form_saved() {
    let device = MockDevice::new(&[]);
    let (addr, handle) = start_device(device.clone()).await;
    let client = ProvisioningClient::new(
        &device_config(addr),
        BodyEncoding::Form,
        Arc::new(ReqwestHttpClient::default()),
    );

    let message = client.submit_credentials("home", "secret").await;
    assert_eq!(message.text, "Wi-Fi settings saved successfully!");
    assert_eq!(message.color(), "green");

    let requests = device.requests();
    assert_eq!(requests[0].path, "/save");
    assert_eq!(requests[0].body, "ssid=home&password=secret");
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );

    handle.abort();
}

#[tokio::test]
async fn test_wifi_form_rejected() {
    let device = MockDevice::new(&[]);
    device.log.lock().unwrap().save_status = 400;
    let (addr, handle) = start_device(device.clone()).await;
    let client = ProvisioningClient::new(
        &device_config(addr),
        BodyEncoding::Json,
        Arc::new(ReqwestHttpClient::default()),
    );

    let message = client.submit_credentials("home", "secret").await;
    assert_eq!(message.text, "Failed to save Wi-Fi settings.");
    assert_eq!(message.tone, Tone::Failure);

    let requests = device.requests();
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/json")
    );
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body, serde_json::json!({"ssid": "home", "password": "secret"}));

    handle.abort();
}

#[tokio::test]
async fn test_wifi_form_unreachable_device() {
    let client = ProvisioningClient::new(
        &DeviceConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
        },
        BodyEncoding::Form,
        Arc::new(ReqwestHttpClient::default()),
    );

    let message = client.submit_credentials("home", "secret").await;
    assert_eq!(message.text, "An error occurred while saving Wi-Fi settings.");
    assert_eq!(message.color(), "red");
}
