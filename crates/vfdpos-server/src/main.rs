//! vfdpos server entry point
//!
//! Loads configuration from the environment, performs a startup
//! display test, then serves the HTTP boundary. The server starts even
//! when the display is absent; the session manager reconnects on the
//! next request.

mod api;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vfdpos_core::config::{DeviceConfig, SchedulerConfig};
use vfdpos_core::display::{DisplayScheduler, JobPayload, SessionManager};

use api::AppState;

/// Default welcome banner when `VFD_WELCOME` is not set
const WELCOME_MESSAGE: &str = " CAISSE ILO MARKET  Pret a vous servir !";

/// Default HTTP bind address when `VFD_HTTP_ADDR` is not set
const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8086";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let device_config = DeviceConfig::from_env();
    let scheduler_config = SchedulerConfig::from_env();
    let welcome_message =
        std::env::var("VFD_WELCOME").unwrap_or_else(|_| WELCOME_MESSAGE.to_string());

    info!(
        port = %device_config.port,
        width = device_config.width,
        height = device_config.height,
        "starting vfdpos server v{}",
        vfdpos_core::VERSION
    );

    let session = Arc::new(Mutex::new(SessionManager::with_serial(device_config)));
    let scheduler = Arc::new(DisplayScheduler::new(session, scheduler_config));

    // Startup display test, mirrors what /api/welcome does
    match scheduler
        .submit(JobPayload::Welcome(welcome_message.clone()))
        .await
    {
        Ok(()) => info!("display test successful"),
        Err(e) => warn!(error = %e, "display test failed, serving anyway"),
    }

    let state = AppState {
        scheduler: Arc::clone(&scheduler),
        welcome_message: welcome_message.into(),
    };

    let addr = std::env::var("VFD_HTTP_ADDR").unwrap_or_else(|_| DEFAULT_HTTP_ADDR.to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("http server error")?;

    scheduler.shutdown().await;
    Ok(())
}
