//! Request/response orchestration for BK Precision 85xx electronic loads.
//!
//! [`Device`] ties the catalog to a transport: encode a packet, write it,
//! read exactly one frame back, and turn a non-success Status into
//! [`DeviceError::Status`]. No retries happen here.

pub mod config;
pub mod connector;
pub mod device;
pub mod error;
pub mod sweep;

pub use config::DeviceConfig;
pub use connector::open;
pub use device::Device;
pub use error::{DeviceError, Result};
pub use sweep::{Sample, Sweep, SweepRun, MAX_POINTS};
