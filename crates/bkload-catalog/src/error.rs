use bkload_frame::{DecodeError, EncodeError, FrameError};

/// Failure to turn bytes into a typed packet, or a packet into bytes.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, PacketError>;
