use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// A transport that replays queued responses and records every write.
///
/// Each `read_exact` consumes the next queued response whole; a read whose
/// length differs from the queued response fails with `Closed`. An empty
/// queue reads as a timeout, the way a silent device would.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a future read.
    pub fn push_response(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.responses.push_back(bytes.into());
        self
    }

    /// Builder form of [`push_response`](Self::push_response).
    pub fn with_response(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.responses.push_back(bytes.into());
        self
    }

    /// Every buffer written so far, in order.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Responses that have not been read yet.
    pub fn pending(&self) -> usize {
        self.responses.len()
    }
}

impl Transport for ScriptedTransport {
    fn write_exact(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.push(bytes.to_vec());
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let response = self
            .responses
            .pop_front()
            .ok_or(TransportError::Timeout(Duration::ZERO))?;
        if response.len() != buf.len() {
            return Err(TransportError::Closed {
                transferred: response.len().min(buf.len()),
                expected: buf.len(),
            });
        }
        buf.copy_from_slice(&response);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_responses_in_order() {
        let mut transport = ScriptedTransport::new()
            .with_response(vec![1, 2])
            .with_response(vec![3, 4]);

        let mut buf = [0u8; 2];
        transport.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        transport.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [3, 4]);
        assert_eq!(transport.pending(), 0);
    }

    #[test]
    fn records_writes() {
        let mut transport = ScriptedTransport::new();
        transport.write_exact(&[0xAA]).unwrap();
        transport.write_exact(&[0xBB, 0xCC]).unwrap();
        assert_eq!(transport.written(), &[vec![0xAA], vec![0xBB, 0xCC]]);
    }

    #[test]
    fn empty_queue_reads_as_timeout() {
        let mut transport = ScriptedTransport::new();
        let mut buf = [0u8; 26];
        assert!(matches!(
            transport.read_exact(&mut buf),
            Err(TransportError::Timeout(_))
        ));
    }

    #[test]
    fn short_response_reads_as_closed() {
        let mut transport = ScriptedTransport::new().with_response(vec![0xAA; 10]);
        let mut buf = [0u8; 26];
        assert!(matches!(
            transport.read_exact(&mut buf),
            Err(TransportError::Closed {
                transferred: 10,
                expected: 26
            })
        ));
    }
}
