//! HTTP routes
//!
//! Thin adapter between JSON requests and the core scheduler. All
//! device arbitration lives in the core; handlers only validate,
//! submit, and translate error kinds to status codes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use vfdpos_core::display::{DisplayScheduler, JobPayload};
use vfdpos_core::error::DisplayError;
use vfdpos_core::order::{Order, RawLineItem};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// The single display scheduler
    pub scheduler: Arc<DisplayScheduler>,
    /// Banner shown by `/api/welcome`
    pub welcome_message: Arc<str>,
}

/// JSON reply for welcome/order endpoints
#[derive(Debug, Serialize)]
pub struct ApiReply {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

impl ApiReply {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            kind: None,
        }
    }

    fn failure(error: &DisplayError) -> Self {
        Self {
            status: "error",
            message: error.to_string(),
            kind: Some(error.kind()),
        }
    }
}

/// Build the application router with permissive CORS (the POS frontend
/// is served from a different origin on the LAN).
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/welcome", get(show_welcome))
        .route("/api/receive_order", post(receive_order))
        .route("/api/status", get(status))
        .layer(cors)
        .with_state(state)
}

async fn show_welcome(State(state): State<AppState>) -> Response {
    let payload = JobPayload::Welcome(state.welcome_message.to_string());
    match state.scheduler.submit(payload).await {
        Ok(()) => {
            info!("welcome message displayed");
            (StatusCode::OK, Json(ApiReply::success("Welcome message displayed"))).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to display welcome message");
            (error_status(&e), Json(ApiReply::failure(&e))).into_response()
        }
    }
}

async fn receive_order(
    State(state): State<AppState>,
    Json(items): Json<Vec<RawLineItem>>,
) -> Response {
    info!(items = items.len(), "received order");

    let order = match Order::from_raw_items(&items) {
        Ok(order) => order,
        Err(e) => {
            error!(error = %e, "order rejected");
            return (error_status(&e), Json(ApiReply::failure(&e))).into_response();
        }
    };

    match state.scheduler.submit(JobPayload::Order(order)).await {
        Ok(()) => (StatusCode::OK, Json(ApiReply::success("Order displayed"))).into_response(),
        Err(e) => {
            error!(error = %e, "failed to display order");
            (error_status(&e), Json(ApiReply::failure(&e))).into_response()
        }
    }
}

async fn status(State(state): State<AppState>) -> Response {
    Json(state.scheduler.status().await).into_response()
}

fn error_status(error: &DisplayError) -> StatusCode {
    match error {
        DisplayError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;
    use tokio::sync::Mutex;
    use vfdpos_core::config::{DeviceConfig, SchedulerConfig};
    use vfdpos_core::display::{PortOpener, SessionManager, Transport};

    type WriteLog = Arc<StdMutex<Vec<Vec<u8>>>>;

    struct RecordingTransport {
        writes: WriteLog,
    }

    impl Transport for RecordingTransport {
        fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
            self.writes.lock().unwrap().push(bytes.to_vec());
            Ok(())
        }

        fn probe_alive(&mut self) -> bool {
            true
        }

        fn close(&mut self) {}
    }

    struct RecordingOpener {
        writes: WriteLog,
    }

    impl PortOpener for RecordingOpener {
        fn open(
            &self,
            _port: &str,
            _baud_rate: u32,
        ) -> Result<Box<dyn Transport>, DisplayError> {
            Ok(Box::new(RecordingTransport {
                writes: Arc::clone(&self.writes),
            }))
        }
    }

    fn test_state() -> (AppState, WriteLog) {
        let writes: WriteLog = Arc::new(StdMutex::new(Vec::new()));
        let config = DeviceConfig {
            port: "/dev/ttyFAKE".to_string(),
            baud_rates: vec![9600],
            width: 20,
            height: 2,
            settle_delay: Duration::ZERO,
            write_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
        };
        let session = Arc::new(Mutex::new(SessionManager::new(
            config,
            Box::new(RecordingOpener {
                writes: Arc::clone(&writes),
            }),
        )));
        let scheduler = Arc::new(DisplayScheduler::new(
            session,
            SchedulerConfig {
                dwell: Duration::from_secs(60),
                cancel_wait: Duration::from_millis(50),
            },
        ));
        let state = AppState {
            scheduler,
            welcome_message: "Bienvenue".into(),
        };
        (state, writes)
    }

    fn raw(name: &str, price: &str, quantity: &str) -> RawLineItem {
        RawLineItem {
            name: name.to_string(),
            price: price.to_string(),
            quantity: quantity.to_string(),
        }
    }

    #[tokio::test]
    async fn test_malformed_order_gets_bad_request_and_no_device_write() {
        let (state, writes) = test_state();

        let response =
            receive_order(State(state), Json(vec![raw("Bread", "not-a-number", "2")])).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // Validation rejected the submission before any device I/O
        assert!(writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_order_gets_bad_request_and_no_device_write() {
        let (state, writes) = test_state();

        let response = receive_order(State(state), Json(Vec::new())).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valid_order_reaches_the_device() {
        let (state, writes) = test_state();

        let response = receive_order(State(state), Json(vec![raw("Bread", "2500", "2")])).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!writes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        assert_eq!(
            error_status(&DisplayError::Validation("bad price".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_device_errors_map_to_internal_error() {
        assert_eq!(
            error_status(&DisplayError::ConnectionFailed("/dev/ttyUSB0".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_status(&DisplayError::Io("broken pipe".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_status(&DisplayError::Timeout),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_failure_reply_carries_error_kind() {
        let reply = ApiReply::failure(&DisplayError::Validation("item 0: bad".into()));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "validation");
    }

    #[test]
    fn test_success_reply_omits_kind() {
        let reply = ApiReply::success("Order displayed");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("kind").is_none());
    }
}
