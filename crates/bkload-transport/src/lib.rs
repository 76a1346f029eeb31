//! Exact-size byte transport for BK Precision 85xx electronic loads.
//!
//! The packet codec only needs two things from the link: write exactly N
//! bytes, read exactly N bytes, and report I/O failures. This crate provides
//! that contract ([`Transport`]) and its implementations:
//! - [`SerialTransport`] over a real serial port
//! - [`StreamTransport`] over any `Read + Write` stream
//! - [`ScriptedTransport`] replaying canned responses (tests, offline tooling)
//!
//! This is the lowest layer of bkload. Timeout policy lives here, never in
//! the codec.

pub mod error;
pub mod scripted;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use scripted::ScriptedTransport;
pub use serial::{available_ports, PortInfo, SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};
pub use traits::{StreamTransport, Transport};
