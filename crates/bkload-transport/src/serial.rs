use std::time::Duration;

use serde::{Deserialize, Serialize};
use serialport::{ClearBuffer, SerialPort, SerialPortType};
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::traits::{StreamTransport, Transport};

/// Factory default baud rate of the 85xx loads.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Baud rates selectable on the instrument front panel.
pub const SUPPORTED_BAUD_RATES: [u32; 4] = [4800, 9600, 19200, 38400];

/// Serial link configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial port path (e.g. "/dev/ttyUSB0", "COM3").
    pub port: String,
    /// Baud rate. Default: 9600.
    pub baud_rate: u32,
    /// Read/write timeout for a single frame transfer.
    pub timeout: Duration,
}

impl SerialConfig {
    /// Configuration for `port` with every other setting at its default.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Reject configurations that can never open a working link.
    ///
    /// Any nonzero baud rate is accepted; rates outside
    /// [`SUPPORTED_BAUD_RATES`] only log a warning.
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(TransportError::InvalidConfig(
                "port path cannot be empty".to_string(),
            ));
        }
        if self.baud_rate == 0 {
            return Err(TransportError::InvalidConfig(
                "baud rate must be greater than zero".to_string(),
            ));
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            warn!(
                baud_rate = self.baud_rate,
                "baud rate is not a front-panel setting of the load"
            );
        }
        if self.timeout.is_zero() {
            return Err(TransportError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_secs(1),
        }
    }
}

/// A [`Transport`] over an open serial port (8N1, no flow control).
pub struct SerialTransport {
    port: String,
    inner: StreamTransport<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Open and configure the serial port described by `config`.
    ///
    /// Pending input is discarded so the first response read belongs to the
    /// first request written.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        config.validate()?;

        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: config.port.clone(),
                source,
            })?;
        port.clear(ClearBuffer::All)
            .map_err(|source| TransportError::Open {
                port: config.port.clone(),
                source,
            })?;

        info!(port = %config.port, baud = config.baud_rate, "serial port opened");
        Ok(Self {
            port: config.port.clone(),
            inner: StreamTransport::new(port, config.timeout),
        })
    }

    /// Port path this transport was opened on.
    pub fn port(&self) -> &str {
        &self.port
    }
}

impl Transport for SerialTransport {
    fn write_exact(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_exact(bytes)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port)
            .field("timeout", &self.inner.timeout())
            .finish()
    }
}

/// A serial port visible to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    /// Port path, usable as [`SerialConfig::port`].
    pub name: String,
    /// Port kind ("usb", "pci", "bluetooth", "unknown").
    pub kind: &'static str,
    /// USB manufacturer string, when reported.
    pub manufacturer: Option<String>,
    /// USB product string, when reported.
    pub product: Option<String>,
}

/// Enumerate serial ports on this host.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()
        .map_err(|err| TransportError::Io(std::io::Error::other(err.to_string())))?;
    debug!(count = ports.len(), "enumerated serial ports");

    Ok(ports
        .into_iter()
        .map(|port| {
            let (kind, manufacturer, product) = match port.port_type {
                SerialPortType::UsbPort(usb) => ("usb", usb.manufacturer, usb.product),
                SerialPortType::PciPort => ("pci", None, None),
                SerialPortType::BluetoothPort => ("bluetooth", None, None),
                SerialPortType::Unknown => ("unknown", None, None),
            };
            PortInfo {
                name: port.port_name,
                kind,
                manufacturer,
                product,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_factory_baud_rate() {
        let config = SerialConfig::new("/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_port() {
        let err = SerialConfig::default().validate().unwrap_err();
        assert!(matches!(err, TransportError::InvalidConfig(_)));
    }

    #[test]
    fn validate_accepts_any_nonzero_baud_rate() {
        let config = SerialConfig {
            baud_rate: 115_200,
            ..SerialConfig::new("/dev/ttyUSB0")
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_baud_rate() {
        let config = SerialConfig {
            baud_rate: 0,
            ..SerialConfig::new("/dev/ttyUSB0")
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TransportError::InvalidConfig(_)));
        assert!(err.to_string().contains("baud rate"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = SerialConfig {
            timeout: Duration::ZERO,
            ..SerialConfig::new("COM3")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn open_fails_before_touching_hardware_on_bad_config() {
        let err = SerialTransport::open(&SerialConfig::default()).unwrap_err();
        assert!(matches!(err, TransportError::InvalidConfig(_)));
    }

    #[test]
    fn config_serializes_to_json() {
        let config = SerialConfig::new("/dev/ttyUSB1");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SerialConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
