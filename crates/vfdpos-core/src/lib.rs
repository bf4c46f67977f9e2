//! # vfdpos Core Library
//!
//! Core functionality for the vfdpos customer display controller.
//!
//! This library provides:
//! - Serial transport to a character-based VFD pole display
//! - A pure render encoder (currency formatting, line framing, control
//!   sequences)
//! - A device session manager that owns the serial link, sweeps
//!   candidate baud rates and recovers from write failures
//! - A display job scheduler that serializes renders and lets newer
//!   orders supersede in-flight ones
//!
//! The HTTP boundary lives in the `vfdpos-server` crate; it hands this
//! library validated orders and receives success/failure outcomes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vfdpos_core::{config::DeviceConfig, display::SessionManager};
//!
//! let config = DeviceConfig::from_env();
//! let mut session = SessionManager::with_serial(config);
//! session.show_welcome("Pret a vous servir !")?;
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod display;
pub mod error;
pub mod order;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{DeviceConfig, SchedulerConfig};
    pub use crate::display::{
        ConnectionState, DisplayScheduler, JobPayload, SessionManager, Transport,
    };
    pub use crate::error::DisplayError;
    pub use crate::order::{LineItem, Order, RawLineItem};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
