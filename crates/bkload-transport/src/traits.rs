use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use tracing::trace;

use crate::error::{Result, TransportError};

/// The narrow link contract the packet codec depends on.
///
/// Both operations transfer exactly `bytes.len()` / `buf.len()` bytes or
/// fail. The protocol has no request identifiers, so a caller must not start
/// a second exchange before the previous response has been read in full.
pub trait Transport {
    /// Write every byte of `bytes` and flush.
    fn write_exact(&mut self, bytes: &[u8]) -> Result<()>;

    /// Fill `buf` completely.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_exact(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_exact(bytes)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact(buf)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_exact(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_exact(bytes)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact(buf)
    }
}

/// Adapts any blocking `Read + Write` stream to [`Transport`].
///
/// `Interrupted` is retried. `TimedOut` and `WouldBlock` become
/// [`TransportError::Timeout`] carrying the configured timeout, and EOF
/// becomes [`TransportError::Closed`].
#[derive(Debug)]
pub struct StreamTransport<T> {
    inner: T,
    timeout: Duration,
}

impl<T: Read + Write> StreamTransport<T> {
    /// Wrap a stream whose read/write timeout is `timeout`.
    pub fn new(inner: T, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the transport and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Timeout reported when the stream times out.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_io(&self, err: std::io::Error) -> TransportError {
        match err.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => TransportError::Timeout(self.timeout),
            _ => TransportError::Io(err),
        }
    }
}

impl<T: Read + Write> Transport for StreamTransport<T> {
    fn write_exact(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => {
                    return Err(TransportError::Closed {
                        transferred: offset,
                        expected: bytes.len(),
                    })
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.map_io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.map_io(err)),
            }
        }

        trace!(len = bytes.len(), "wrote bytes");
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < buf.len() {
            match self.inner.read(&mut buf[offset..]) {
                Ok(0) => {
                    return Err(TransportError::Closed {
                        transferred: offset,
                        expected: buf.len(),
                    })
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.map_io(err)),
            }
        }

        trace!(len = buf.len(), "read bytes");
        Ok(())
    }
}
