use bkload_transport::{SerialConfig, SerialTransport};
use tracing::info;

use crate::config::DeviceConfig;
use crate::device::Device;
use crate::error::Result;

/// Open a serial port and wrap it in a [`Device`].
pub fn open(serial: &SerialConfig, config: DeviceConfig) -> Result<Device<SerialTransport>> {
    let transport = SerialTransport::open(serial)?;
    info!(
        port = %serial.port,
        baud_rate = serial.baud_rate,
        address = config.address,
        "connected to load"
    );
    Ok(Device::new(transport, config))
}

#[cfg(test)]
mod tests {
    use bkload_transport::TransportError;

    use super::*;
    use crate::error::DeviceError;

    #[test]
    fn invalid_config_fails_before_opening() {
        let serial = SerialConfig {
            baud_rate: 0,
            ..SerialConfig::new("/dev/null")
        };
        let err = open(&serial, DeviceConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::Transport(TransportError::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_port_is_an_open_error() {
        let serial = SerialConfig::new("/dev/bkload-does-not-exist");
        let err = open(&serial, DeviceConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::Transport(TransportError::Open { .. })
        ));
    }
}
