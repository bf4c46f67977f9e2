//! VFD display control
//!
//! Layered leaf-first: `transport` owns the raw serial link, `encoder`
//! is pure rendering, `session` arbitrates the single device link, and
//! `scheduler` serializes asynchronous display jobs on top of it.

pub mod encoder;
mod scheduler;
mod session;
mod transport;

pub use scheduler::{DisplayScheduler, DisplayStatus, JobPayload};
pub use session::{ConnectionState, SessionManager};
pub use transport::{PortOpener, SerialOpener, SerialTransport, Transport};

/// Serial read/write timeout applied to the opened port
pub const IO_TIMEOUT_MS: u64 = 1000;
