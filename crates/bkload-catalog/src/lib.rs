//! Command/response catalog for BK Precision 85xx electronic loads.
//!
//! The catalog is data: each entry is a static [`CommandDef`] naming its
//! identifiers and payload layout. Typed wrappers implementing [`Packet`]
//! sit on top for callers who prefer structs over value lists.
//!
//! # Example
//!
//! ```
//! use bkload_catalog::{CurrentLevel, Packet};
//!
//! let bytes = CurrentLevel::new(0.02).encode(0).unwrap();
//! assert_eq!(&bytes[..4], &[0xAA, 0x00, 0x2A, 0xC8]);
//! assert_eq!(bytes[25], 0x9C);
//! ```

pub mod catalog;
pub mod definition;
pub mod enums;
pub mod error;
pub mod flags;
pub mod packet;

pub use catalog::{by_command_id, by_id, by_name, by_response_id, Direction, CATALOG, STATUS_ID};
pub use definition::{CommandDef, Decoded, Shape};
pub use enums::{Function, LimitMode, Partition, StatusCode, TransientOperation, TriggerSource};
pub use error::{PacketError, Result};
pub use flags::{
    DemandFlag, DemandState, OperationFlag, OperationState, DEMAND_FLAGS, OPERATION_FLAGS,
};
pub use packet::*;
