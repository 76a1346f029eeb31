use bkload_transport::Transport;
use tracing::debug;

use crate::codec::{decode_frame, to_hex, Frame, FRAME_LEN};
use crate::error::Result;

/// Read exactly one frame from `transport` and validate it.
///
/// Blocks until [`FRAME_LEN`] bytes arrive or the transport gives up. The
/// raw bytes are logged at debug level before validation so rejected frames
/// remain diagnosable.
pub fn read_frame<T: Transport + ?Sized>(transport: &mut T, expected_id: Option<u8>) -> Result<Frame> {
    let mut buf = [0u8; FRAME_LEN];
    transport.read_exact(&mut buf)?;
    debug!(bytes = %to_hex(&buf), "rx frame");
    decode_frame(&buf, expected_id)
}

#[cfg(test)]
mod tests {
    use bkload_transport::{ScriptedTransport, TransportError};

    use super::*;
    use crate::codec::PAYLOAD_LEN;
    use crate::error::FrameError;

    #[test]
    fn read_single_frame() {
        let frame = Frame::new(0, 0x12, [0x80; PAYLOAD_LEN]);
        let mut transport = ScriptedTransport::new().with_response(frame.to_bytes().to_vec());

        let read = read_frame(&mut transport, Some(0x12)).unwrap();
        assert_eq!(read, frame);
    }

    #[test]
    fn read_propagates_transport_failure() {
        let mut transport = ScriptedTransport::new();
        let err = read_frame(&mut transport, None).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Timeout(_))
        ));
    }

    #[test]
    fn read_rejects_invalid_frame() {
        let mut bytes = Frame::new(0, 0x12, [0; PAYLOAD_LEN]).to_bytes();
        bytes[0] = 0x55;
        let mut transport = ScriptedTransport::new().with_response(bytes.to_vec());
        assert!(matches!(
            read_frame(&mut transport, None),
            Err(FrameError::InvalidMagic(0x55))
        ));
    }
}
