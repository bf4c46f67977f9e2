//! Serial transport
//!
//! Low-level access to the physical serial link. The transport never
//! retries; connect/retry policy belongs to the session manager.

use std::io::Write;
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, warn};

use super::IO_TIMEOUT_MS;
use crate::error::DisplayError;

/// Raw byte sink for the display link
pub trait Transport: Send {
    /// Write all bytes to the device
    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;

    /// Check the handle is open and still responsive without blocking
    fn probe_alive(&mut self) -> bool;

    /// Close the handle; closing an already-closed handle is a no-op
    fn close(&mut self);
}

/// Factory for transports, one open attempt per call
pub trait PortOpener: Send {
    /// Open `port` at `baud_rate`, 8N1, short read timeout.
    ///
    /// Platform-level denial (port busy, insufficient privilege) maps
    /// to [`DisplayError::PermissionDenied`]; anything else to
    /// [`DisplayError::ConnectionFailed`].
    fn open(&self, port: &str, baud_rate: u32) -> Result<Box<dyn Transport>, DisplayError>;
}

/// Transport over a real serial port
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port: Some(port) }
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        let port = self.port.as_mut().ok_or(DisplayError::NotConnected)?;
        port.write_all(bytes)
            .map_err(|e| DisplayError::Io(e.to_string()))?;
        port.flush().map_err(|e| DisplayError::Io(e.to_string()))?;
        debug!(len = bytes.len(), "wrote bytes to display");
        Ok(())
    }

    fn probe_alive(&mut self) -> bool {
        // A status read that fails means the port went away under us
        // (USB unplug shows up here rather than on open)
        match self.port.as_mut() {
            Some(port) => match port.bytes_to_read() {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "serial port unresponsive");
                    false
                }
            },
            None => false,
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("serial port closed");
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens real serial ports via the serialport crate
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialOpener;

impl PortOpener for SerialOpener {
    fn open(&self, port: &str, baud_rate: u32) -> Result<Box<dyn Transport>, DisplayError> {
        let opened = serialport::new(port, baud_rate)
            .timeout(Duration::from_millis(IO_TIMEOUT_MS))
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| classify_open_error(port, &e))?;

        debug!(port = port, baud = baud_rate, "serial port opened");
        Ok(Box::new(SerialTransport::new(opened)))
    }
}

fn classify_open_error(port: &str, error: &serialport::Error) -> DisplayError {
    match &error.kind {
        serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            DisplayError::PermissionDenied(format!("{port}: {error}"))
        }
        _ => DisplayError::ConnectionFailed(format!("{port}: {error}")),
    }
}
