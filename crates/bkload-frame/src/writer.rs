use bkload_transport::Transport;
use tracing::debug;

use crate::codec::{to_hex, FRAME_LEN};
use crate::error::Result;

/// Write one encoded frame to `transport` (blocking).
pub fn write_frame<T: Transport + ?Sized>(transport: &mut T, bytes: &[u8; FRAME_LEN]) -> Result<()> {
    debug!(bytes = %to_hex(bytes), "tx frame");
    transport.write_exact(bytes)?;
    Ok(())
}
