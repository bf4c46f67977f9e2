//! Shared fakes for session and scheduler tests: an in-memory
//! transport that records every write, and an opener that can accept
//! or reject baud rates on demand.

// Not every test binary exercises every helper
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vfdpos_core::config::DeviceConfig;
use vfdpos_core::display::{PortOpener, Transport};
use vfdpos_core::error::DisplayError;

/// Everything the fake transport observed, shared with the test body.
#[derive(Default)]
pub struct TransportLog {
    writes: Mutex<Vec<Vec<u8>>>,
    /// Writes remaining before a forced failure; negative means never
    fail_countdown: AtomicI64,
    pub closed: AtomicBool,
}

impl TransportLog {
    pub fn new() -> Arc<Self> {
        let log = Self::default();
        log.fail_countdown.store(-1, Ordering::SeqCst);
        Arc::new(log)
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Allow `n` more writes, then fail every write until cleared
    pub fn fail_after(&self, n: i64) {
        self.fail_countdown.store(n, Ordering::SeqCst);
    }

    pub fn clear_failures(&self) {
        self.fail_countdown.store(-1, Ordering::SeqCst);
    }

    /// Lines written since start, lossy-decoded for assertions
    pub fn written_text(&self) -> Vec<String> {
        self.writes()
            .iter()
            .map(|w| String::from_utf8_lossy(w).to_string())
            .collect()
    }
}

pub struct FakeTransport {
    log: Arc<TransportLog>,
}

impl Transport for FakeTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        let remaining = self.log.fail_countdown.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(DisplayError::Io("injected write failure".into()));
        }
        if remaining > 0 {
            self.log.fail_countdown.fetch_sub(1, Ordering::SeqCst);
        }
        self.log.writes.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    fn probe_alive(&mut self) -> bool {
        !self.log.closed.load(Ordering::SeqCst)
    }

    fn close(&mut self) {
        self.log.closed.store(true, Ordering::SeqCst);
    }
}

/// Opener that succeeds only on one configured baud rate.
pub struct FakeOpener {
    log: Arc<TransportLog>,
    accept_baud: Option<u32>,
    permission_denied: bool,
    pub attempts: Arc<AtomicUsize>,
}

impl FakeOpener {
    pub fn accepting(log: Arc<TransportLog>, baud: u32) -> Self {
        Self {
            log,
            accept_baud: Some(baud),
            permission_denied: false,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn rejecting(log: Arc<TransportLog>) -> Self {
        Self {
            log,
            accept_baud: None,
            permission_denied: false,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn denying(log: Arc<TransportLog>) -> Self {
        Self {
            log,
            accept_baud: None,
            permission_denied: true,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PortOpener for FakeOpener {
    fn open(&self, port: &str, baud_rate: u32) -> Result<Box<dyn Transport>, DisplayError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.permission_denied {
            return Err(DisplayError::PermissionDenied(port.to_string()));
        }
        match self.accept_baud {
            Some(accepted) if accepted == baud_rate => {
                self.log.closed.store(false, Ordering::SeqCst);
                Ok(Box::new(FakeTransport {
                    log: Arc::clone(&self.log),
                }))
            }
            _ => Err(DisplayError::ConnectionFailed(format!(
                "{port}@{baud_rate}"
            ))),
        }
    }
}

/// Device config with no sleeps, for fast deterministic tests.
pub fn test_config() -> DeviceConfig {
    DeviceConfig {
        port: "/dev/ttyFAKE".to_string(),
        baud_rates: vec![9600, 2400],
        width: 20,
        height: 2,
        settle_delay: Duration::ZERO,
        write_delay: Duration::ZERO,
        retry_delay: Duration::ZERO,
    }
}
