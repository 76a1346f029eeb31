//! Host-side driver for BK Precision 85xx DC electronic loads.
//!
//! The load speaks a fixed 26-byte binary protocol over a serial line. This
//! crate re-exports the layers that implement it:
//!
//! - [`transport`]: exact-size byte transport (serial port, scripted)
//! - [`frame`]: frame layout, checksum and field codec
//! - [`catalog`]: command/response definitions and typed packets
//! - [`device`]: request/response orchestration (behind the `device` feature)
//!
//! # Example
//!
//! ```
//! use bkload::catalog::{LimitMode, Mode, Packet};
//!
//! let bytes = Mode::new(LimitMode::CC).encode(0).unwrap();
//! assert_eq!(bytes[2], 0x28);
//! assert_eq!(bytes[25], 0xD2);
//! ```

/// Re-export transport types.
pub mod transport {
    pub use bkload_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use bkload_frame::*;
}

/// Re-export catalog types.
pub mod catalog {
    pub use bkload_catalog::*;
}

/// Re-export device types (requires `device` feature).
#[cfg(feature = "device")]
pub mod device {
    pub use bkload_device::*;
}
