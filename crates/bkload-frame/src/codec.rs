use bytes::{BufMut, BytesMut};

use crate::error::{EncodeError, FrameError, Result};

/// Every frame, in both directions, is exactly this long.
pub const FRAME_LEN: usize = 26;

/// Start-of-frame marker.
pub const MAGIC: u8 = 0xAA;

/// Magic (1) + address (1) + identifier (1).
pub const HEADER_SIZE: usize = 3;

/// Command-specific payload region (bytes 3..=23).
pub const PAYLOAD_LEN: usize = 21;

/// Reserved byte between payload and checksum. Written as 0, ignored on decode.
pub const RESERVED_OFFSET: usize = 24;

/// Position of the checksum byte.
pub const CHECKSUM_OFFSET: usize = 25;

/// The checksum covers bytes `0..CHECKSUM_COVERAGE`.
pub const CHECKSUM_COVERAGE: usize = 24;

/// Address 0: unaddressed / broadcast.
pub const BROADCAST_ADDRESS: u8 = 0;

/// A validated frame: address, identifier and the 21-byte payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Device address (0 = unaddressed).
    pub address: u8,
    /// Command or response identifier.
    pub id: u8,
    /// Payload bytes, meaning defined per identifier.
    pub payload: [u8; PAYLOAD_LEN],
}

impl Frame {
    /// Create a new frame.
    pub fn new(address: u8, id: u8, payload: [u8; PAYLOAD_LEN]) -> Self {
        Self {
            address,
            id,
            payload,
        }
    }

    /// Create a frame from a payload slice that must be exactly [`PAYLOAD_LEN`] long.
    pub fn from_payload(address: u8, id: u8, payload: &[u8]) -> std::result::Result<Self, EncodeError> {
        let payload: [u8; PAYLOAD_LEN] =
            payload
                .try_into()
                .map_err(|_| EncodeError::PayloadLength {
                    expected: PAYLOAD_LEN,
                    actual: payload.len(),
                })?;
        Ok(Self::new(address, id, payload))
    }

    /// The 26 wire bytes of this frame, checksum included.
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut out = [0u8; FRAME_LEN];
        out[0] = MAGIC;
        out[1] = self.address;
        out[2] = self.id;
        out[HEADER_SIZE..HEADER_SIZE + PAYLOAD_LEN].copy_from_slice(&self.payload);
        out[RESERVED_OFFSET] = 0;
        out[CHECKSUM_OFFSET] = checksum(&out[..CHECKSUM_COVERAGE]);
        out
    }
}

/// Unsigned 8-bit sum of `bytes`, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────┬─────────┬────┬──────────────┬──────────┬──────────┐
/// │ Magic │ Address │ ID │ Payload      │ Reserved │ Checksum │
/// │ 0xAA  │ (1B)    │(1B)│ (21B, LE)    │ 0x00     │ Σ[0..24] │
/// └───────┴─────────┴────┴──────────────┴──────────┴──────────┘
/// ```
pub fn encode_frame(
    id: u8,
    address: u8,
    payload: &[u8],
    dst: &mut BytesMut,
) -> std::result::Result<(), EncodeError> {
    let frame = Frame::from_payload(address, id, payload)?;
    dst.reserve(FRAME_LEN);
    dst.put_slice(&frame.to_bytes());
    Ok(())
}

/// Validate one frame and split it into address, identifier and payload.
///
/// Fails on wrong length, bad magic, checksum mismatch, or, when
/// `expected_id` is given, an identifier mismatch. Nothing is corrected.
pub fn decode_frame(src: &[u8], expected_id: Option<u8>) -> Result<Frame> {
    if src.len() != FRAME_LEN {
        return Err(FrameError::WrongLength {
            expected: FRAME_LEN,
            actual: src.len(),
        });
    }

    if src[0] != MAGIC {
        return Err(FrameError::InvalidMagic(src[0]));
    }

    let computed = checksum(&src[..CHECKSUM_COVERAGE]);
    let stored = src[CHECKSUM_OFFSET];
    if computed != stored {
        return Err(FrameError::ChecksumMismatch { stored, computed });
    }

    let id = src[2];
    if let Some(expected) = expected_id {
        if id != expected {
            return Err(FrameError::UnexpectedId {
                expected,
                actual: id,
            });
        }
    }

    let mut payload = [0u8; PAYLOAD_LEN];
    payload.copy_from_slice(&src[HEADER_SIZE..HEADER_SIZE + PAYLOAD_LEN]);
    Ok(Frame {
        address: src[1],
        id,
        payload,
    })
}

/// Space-separated uppercase hex, e.g. `AA 00 20`.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with(prefix: &[u8]) -> [u8; PAYLOAD_LEN] {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[..prefix.len()].copy_from_slice(prefix);
        payload
    }

    #[test]
    fn remote_operation_vector() {
        let bytes = Frame::new(0, 0x20, payload_with(&[0x01])).to_bytes();
        let mut expected = [0u8; FRAME_LEN];
        expected[..4].copy_from_slice(&[0xAA, 0x00, 0x20, 0x01]);
        expected[25] = 0xCB;
        assert_eq!(bytes, expected);
    }

    #[test]
    fn empty_payload_vector() {
        let bytes = Frame::new(0, 0x28, [0u8; PAYLOAD_LEN]).to_bytes();
        assert_eq!(&bytes[..3], &[0xAA, 0x00, 0x28]);
        assert!(bytes[3..25].iter().all(|&b| b == 0));
        assert_eq!(bytes[25], 0xD2);
    }

    #[test]
    fn encode_into_buffer() {
        let mut buf = BytesMut::new();
        encode_frame(0x2A, 0, &payload_with(&[0xC8]), &mut buf).unwrap();
        assert_eq!(buf.len(), FRAME_LEN);
        assert_eq!(buf[3], 0xC8);
        assert_eq!(buf[25], 0x9C);
    }

    #[test]
    fn encode_rejects_wrong_payload_length() {
        let mut buf = BytesMut::new();
        let err = encode_frame(0x20, 0, &[0u8; 22], &mut buf).unwrap_err();
        assert_eq!(
            err,
            EncodeError::PayloadLength {
                expected: 21,
                actual: 22
            }
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_roundtrip_keeps_address() {
        let frame = Frame::new(0x1F, 0x5F, payload_with(&[1, 2, 3]));
        let decoded = decode_frame(&frame.to_bytes(), Some(0x5F)).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let err = decode_frame(&[0xAA; 25], None).unwrap_err();
        assert!(matches!(
            err,
            FrameError::WrongLength {
                expected: 26,
                actual: 25
            }
        ));
    }

    #[test]
    fn decode_rejects_bad_magic() {
        let mut bytes = Frame::new(0, 0x12, [0u8; PAYLOAD_LEN]).to_bytes();
        bytes[0] = 0xAB;
        assert!(matches!(
            decode_frame(&bytes, None),
            Err(FrameError::InvalidMagic(0xAB))
        ));
    }

    #[test]
    fn decode_rejects_checksum_mismatch() {
        let mut bytes = Frame::new(0, 0x12, payload_with(&[0x80])).to_bytes();
        bytes[CHECKSUM_OFFSET] = bytes[CHECKSUM_OFFSET].wrapping_add(1);
        assert!(matches!(
            decode_frame(&bytes, None),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn decode_rejects_corrupted_payload() {
        let mut bytes = Frame::new(0, 0x12, payload_with(&[0x80])).to_bytes();
        bytes[10] ^= 0x40;
        assert!(matches!(
            decode_frame(&bytes, None),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn checksum_property_over_many_frames() {
        // Every stored checksum byte value except the correct one must be rejected.
        let frame = Frame::new(3, 0x5F, payload_with(&[0x10, 0x27, 0, 0, 0x88, 0x13]));
        let good = frame.to_bytes();
        for stored in 0..=u8::MAX {
            let mut bytes = good;
            bytes[CHECKSUM_OFFSET] = stored;
            let expected = checksum(&bytes[..CHECKSUM_COVERAGE]);
            let result = decode_frame(&bytes, None);
            assert_eq!(result.is_ok(), stored == expected, "stored=0x{stored:02X}");
        }
    }

    #[test]
    fn decode_rejects_unexpected_id() {
        let bytes = Frame::new(0, 0x12, payload_with(&[0x80])).to_bytes();
        assert!(matches!(
            decode_frame(&bytes, Some(0x5F)),
            Err(FrameError::UnexpectedId {
                expected: 0x5F,
                actual: 0x12
            })
        ));
        assert!(decode_frame(&bytes, None).is_ok());
    }

    #[test]
    fn reserved_byte_is_ignored_on_decode() {
        let mut bytes = Frame::new(0, 0x12, payload_with(&[0x80])).to_bytes();
        bytes[RESERVED_OFFSET] = 0x55;
        let frame = decode_frame(&bytes, Some(0x12)).unwrap();
        assert_eq!(frame.payload[0], 0x80);
    }

    #[test]
    fn checksum_wraps() {
        assert_eq!(checksum(&[0xAA, 0x2A, 0xC8]), 0x9C);
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(to_hex(&[0xAA, 0x00, 0x2A]), "AA 00 2A");
    }
}
