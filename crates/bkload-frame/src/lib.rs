//! Fixed-length frame and field codec for BK Precision 85xx electronic loads.
//!
//! Every message, in both directions, is a 26-byte frame:
//! - 1-byte magic `0xAA`
//! - 1-byte device address (0 = unaddressed)
//! - 1-byte command/response identifier
//! - 21-byte payload, laid out per identifier from [`field`] pieces
//! - 1 reserved byte, then an 8-bit sum checksum
//!
//! Encoding and decoding are pure functions; only [`read_frame`] and
//! [`write_frame`] touch a transport.

pub mod codec;
pub mod error;
pub mod field;
pub mod reader;
pub mod writer;

pub use codec::{
    checksum, decode_frame, encode_frame, to_hex, Frame, BROADCAST_ADDRESS, CHECKSUM_OFFSET,
    FRAME_LEN, HEADER_SIZE, MAGIC, PAYLOAD_LEN,
};
pub use error::{DecodeError, EncodeError, FrameError, Result};
pub use field::{
    decode_payload, encode_payload, layout_width, text_lossy, DecodeOptions, EnumDomain, Field,
    FieldKind, FlagSet, Value,
};
pub use reader::read_frame;
pub use writer::write_frame;
