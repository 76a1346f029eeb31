use bkload_catalog::{PacketError, StatusCode};
use bkload_frame::{DecodeError, EncodeError, FrameError};
use bkload_transport::TransportError;

/// Errors that can occur while talking to a load.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The request could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The reply was not a valid frame.
    #[error("frame error: {0}")]
    Frame(FrameError),

    /// The reply payload could not be interpreted.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The load answered with a non-success status.
    #[error("{command} rejected by load: {code}")]
    Status {
        command: &'static str,
        code: StatusCode,
    },

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Sweep parameters do not describe a finite range.
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),
}

impl From<FrameError> for DeviceError {
    // Transport failures surface unchanged rather than wrapped in a frame error.
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Transport(inner) => DeviceError::Transport(inner),
            other => DeviceError::Frame(other),
        }
    }
}

impl From<PacketError> for DeviceError {
    fn from(err: PacketError) -> Self {
        match err {
            PacketError::Encode(e) => e.into(),
            PacketError::Frame(e) => e.into(),
            PacketError::Decode(e) => e.into(),
        }
    }
}

impl DeviceError {
    /// The load's rejection code, if this is a status error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DeviceError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;
