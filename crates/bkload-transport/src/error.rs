use std::time::Duration;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial port.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// The transport configuration is not usable.
    #[error("invalid transport config: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device did not answer within the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The stream ended before the requested number of bytes was transferred.
    #[error("stream closed after {transferred} of {expected} bytes")]
    Closed { transferred: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, TransportError>;
