//! Device session manager
//!
//! Owns the single transport instance and all connection state. Every
//! public operation assumes the caller holds the one session lock (the
//! scheduler wraps this struct in a `tokio::sync::Mutex`), so methods
//! here are plain `&mut self` and never overlap.

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::encoder;
use super::transport::{PortOpener, SerialOpener, Transport};
use crate::config::DeviceConfig;
use crate::error::DisplayError;
use crate::order::Order;

/// Connection state of the display link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,
    /// Baud-rate sweep in progress
    Connecting,
    /// Connected and ready
    Connected,
    /// Connected but a write failed; link must be re-validated
    Degraded,
}

/// Owns the serial link, the connect/retry policy and the snapshot of
/// the last successfully displayed order.
pub struct SessionManager {
    config: DeviceConfig,
    opener: Box<dyn PortOpener>,
    transport: Option<Box<dyn Transport>>,
    state: ConnectionState,
    current_order: Option<Order>,
}

impl SessionManager {
    /// Create a session with a custom port opener (used by tests)
    pub fn new(config: DeviceConfig, opener: Box<dyn PortOpener>) -> Self {
        info!(
            port = %config.port,
            width = config.width,
            height = config.height,
            "session manager initialized"
        );
        Self {
            config,
            opener,
            transport: None,
            state: ConnectionState::Disconnected,
            current_order: None,
        }
    }

    /// Create a session backed by a real serial port
    pub fn with_serial(config: DeviceConfig) -> Self {
        Self::new(config, Box::new(SerialOpener))
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Snapshot of the last order that fully rendered
    pub fn current_order(&self) -> Option<&Order> {
        self.current_order.as_ref()
    }

    /// Device configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Make sure the link is up, reconnecting if needed.
    ///
    /// Fast path: already connected and the port still answers a
    /// status read. Otherwise sweep the candidate baud rates in
    /// configured order, waiting out the display's power-on grace
    /// period after the first successful open. This is the sole retry
    /// policy; neither the transport nor callers retry on their own.
    pub fn ensure_connected(&mut self) -> Result<(), DisplayError> {
        if self.state == ConnectionState::Connected {
            if let Some(transport) = self.transport.as_mut() {
                if transport.probe_alive() {
                    return Ok(());
                }
            }
            warn!("display link went stale, reconnecting");
        }

        // Drop whatever handle we had before sweeping
        if let Some(mut old) = self.transport.take() {
            old.close();
        }
        self.state = ConnectionState::Connecting;

        let mut last_error: Option<DisplayError> = None;
        let baud_rates = self.config.baud_rates.clone();
        for baud in baud_rates {
            debug!(port = %self.config.port, baud = baud, "trying baud rate");
            match self.opener.open(&self.config.port, baud) {
                Ok(transport) => {
                    // Display power-on grace period before first write
                    thread::sleep(self.config.settle_delay);
                    self.transport = Some(transport);
                    self.state = ConnectionState::Connected;
                    info!(port = %self.config.port, baud = baud, "display connected");
                    return Ok(());
                }
                Err(e) => {
                    warn!(port = %self.config.port, baud = baud, error = %e, "open failed");
                    last_error = Some(e);
                    thread::sleep(self.config.retry_delay);
                }
            }
        }

        self.state = ConnectionState::Disconnected;
        match last_error {
            Some(e @ DisplayError::PermissionDenied(_)) => Err(e),
            _ => Err(DisplayError::ConnectionFailed(self.config.port.clone())),
        }
    }

    /// Clear the display and show a welcome banner.
    ///
    /// The banner is padded to the display width but never truncated;
    /// a long banner wraps onto the second row.
    pub fn show_welcome(&mut self, text: &str) -> Result<(), DisplayError> {
        self.ensure_connected()?;
        let line = encoder::render_welcome(text, self.config.width);
        self.write_checked(encoder::CLEAR)?;
        thread::sleep(self.config.write_delay);
        self.write_checked(line.as_bytes())?;
        debug!("welcome banner displayed");
        Ok(())
    }

    /// Clear the display and render an order.
    ///
    /// The displayed-order snapshot is replaced only when every line
    /// was written; on any failure the previous snapshot stays.
    pub fn show_order(&mut self, order: &Order) -> Result<(), DisplayError> {
        self.ensure_connected()?;
        let lines = encoder::frame_lines(
            &encoder::render_order(order),
            self.config.width,
            self.config.height,
        );

        self.write_checked(encoder::CLEAR)?;
        for line in &lines {
            thread::sleep(self.config.write_delay);
            self.write_checked(line.as_bytes())?;
        }

        // Notification melody is best-effort; a failed beep does not
        // invalidate an order that already rendered
        'melody: for &count in encoder::NOTIFICATION_MELODY {
            for _ in 0..count {
                if let Err(e) = self.write_checked(encoder::BEEP) {
                    warn!(error = %e, "notification melody failed after order render");
                    break 'melody;
                }
                thread::sleep(self.config.write_delay);
            }
        }

        self.current_order = Some(order.clone());
        info!(items = order.len(), total = order.total(), "order displayed");
        Ok(())
    }

    /// Non-mutating liveness check for the status endpoint
    pub fn probe(&mut self) -> bool {
        self.state == ConnectionState::Connected
            && self
                .transport
                .as_mut()
                .map(|t| t.probe_alive())
                .unwrap_or(false)
    }

    /// Close the transport; safe to call from any state.
    pub fn shutdown(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            info!("display session shut down");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Write through the transport, degrading the session on failure.
    fn write_checked(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        let transport = self
            .transport
            .as_mut()
            .ok_or(DisplayError::NotConnected)?;
        match transport.write(bytes) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = ConnectionState::Degraded;
                warn!(error = %e, "write failed, session degraded");
                Err(e)
            }
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
