use bkload_catalog::{
    Barcode, CurrentLevel, EnableLoad, LimitMode, MaximumCurrent, MaximumPower,
    MaximumVoltage, Measure, Mode, Packet, PowerLevel, RemoteOperation, ResistanceLevel, Status,
    Trigger, Version, VoltageLevel, STATUS_ID,
};
use bkload_frame::{read_frame, write_frame, EncodeError, Frame, FrameError};
use bkload_transport::Transport;
use tracing::{debug, warn};

use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};

/// A load reached through a [`Transport`].
///
/// Every call is one blocking exchange: write a frame, read one frame back.
/// Methods take `&mut self`, so a connection has at most one request in
/// flight; wrap the device in a `Mutex` to share it between threads.
#[derive(Debug)]
pub struct Device<T> {
    transport: T,
    config: DeviceConfig,
}

impl<T: Transport> Device<T> {
    pub fn new(transport: T, config: DeviceConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn address(&self) -> u8 {
        self.config.address
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send a command and check the Status acknowledgement.
    pub fn command<P: Packet>(&mut self, packet: &P) -> Result<()> {
        let name = P::definition().name;
        let bytes = packet.encode(self.config.address)?;
        debug!(command = name, address = self.config.address, "sending command");
        write_frame(&mut self.transport, &bytes)?;

        let frame = read_frame(&mut self.transport, Some(STATUS_ID))?;
        self.check_status(name, &frame)
    }

    /// Ask the load for the current value of `P`.
    ///
    /// The request carries `P`'s response identifier and an empty payload.
    /// A Status frame in reply means the load refused the query.
    pub fn query<P: Packet>(&mut self) -> Result<P> {
        let def = P::definition();
        let expected = def.response_id.ok_or(EncodeError::NotQueryable(def.name))?;
        let bytes = def.request(self.config.address)?;
        debug!(query = def.name, address = self.config.address, "sending query");
        write_frame(&mut self.transport, &bytes)?;

        let frame = read_frame(&mut self.transport, None)?;
        if frame.id != expected {
            if frame.id == STATUS_ID {
                self.check_status(def.name, &frame)?;
            }
            return Err(DeviceError::Frame(FrameError::UnexpectedId {
                expected,
                actual: frame.id,
            }));
        }
        Ok(P::from_frame(&frame, self.config.decode_options())?)
    }

    /// Send a command, then read the value back through its response.
    pub fn set_confirmed<P: Packet>(&mut self, packet: &P) -> Result<P> {
        self.command(packet)?;
        self.query::<P>()
    }

    fn check_status(&self, command: &'static str, frame: &Frame) -> Result<()> {
        let status = Status::from_frame(frame, self.config.decode_options())?;
        if !status.is_success() {
            warn!(command, code = %status.code, "load rejected command");
            return Err(DeviceError::Status {
                command,
                code: status.code,
            });
        }
        Ok(())
    }

    /// Switch between front-panel and remote control.
    pub fn enable_remote(&mut self, enable: bool) -> Result<()> {
        self.command(&RemoteOperation::new(enable))
    }

    /// Turn the load input on or off.
    pub fn enable_load(&mut self, enable: bool) -> Result<()> {
        self.command(&EnableLoad::new(enable))
    }

    /// Set whichever of the maximum voltage, current and power are given.
    pub fn set_limits(
        &mut self,
        volts: Option<f64>,
        amps: Option<f64>,
        watts: Option<f64>,
    ) -> Result<()> {
        if let Some(volts) = volts {
            self.command(&MaximumVoltage::new(volts))?;
        }
        if let Some(amps) = amps {
            self.command(&MaximumCurrent::new(amps))?;
        }
        if let Some(watts) = watts {
            self.command(&MaximumPower::new(watts))?;
        }
        Ok(())
    }

    pub fn set_mode(&mut self, mode: LimitMode) -> Result<()> {
        self.command(&Mode::new(mode))
    }

    /// Set the regulation level for `mode` (A, V, W or Ω).
    pub fn set_level(&mut self, mode: LimitMode, value: f64) -> Result<()> {
        match mode {
            LimitMode::CC => self.command(&CurrentLevel::new(value)),
            LimitMode::CV => self.command(&VoltageLevel::new(value)),
            LimitMode::CW => self.command(&PowerLevel::new(value)),
            LimitMode::CR => self.command(&ResistanceLevel::new(value)),
        }
    }

    /// Read back the selected regulation mode.
    pub fn mode(&mut self) -> Result<LimitMode> {
        Ok(self.query::<Mode>()?.mode)
    }

    /// Read back the level programmed for `mode`.
    pub fn level(&mut self, mode: LimitMode) -> Result<f64> {
        Ok(match mode {
            LimitMode::CC => self.query::<CurrentLevel>()?.amps,
            LimitMode::CV => self.query::<VoltageLevel>()?.volts,
            LimitMode::CW => self.query::<PowerLevel>()?.watts,
            LimitMode::CR => self.query::<ResistanceLevel>()?.ohms,
        })
    }

    pub fn trigger(&mut self) -> Result<()> {
        self.command(&Trigger)
    }

    /// Read voltage, current, power and the state words.
    pub fn measure(&mut self) -> Result<Measure> {
        self.query::<Measure>()
    }

    pub fn version(&mut self) -> Result<Version> {
        self.query::<Version>()
    }

    pub fn barcode(&mut self) -> Result<Barcode> {
        self.query::<Barcode>()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use bkload_catalog::{DemandState, OperationState, StatusCode};
    use bkload_frame::{decode_frame, PAYLOAD_LEN};
    use bkload_transport::{ScriptedTransport, TransportError};

    use super::*;

    fn status_frame(code: StatusCode) -> Vec<u8> {
        Status::new(code).encode_response(0).unwrap().to_vec()
    }

    fn device(responses: &[Vec<u8>]) -> Device<ScriptedTransport> {
        let mut transport = ScriptedTransport::new();
        for response in responses {
            transport.push_response(response.clone());
        }
        Device::new(transport, DeviceConfig::default())
    }

    #[test]
    fn command_writes_frame_and_accepts_success() {
        let mut device = device(&[status_frame(StatusCode::Success)]);
        device.enable_remote(true).unwrap();

        let written = device.transport_mut().written().to_vec();
        assert_eq!(written.len(), 1);
        assert_eq!(&written[0][..4], &[0xAA, 0x00, 0x20, 0x01]);
        assert_eq!(written[0][25], 0xCB);
    }

    #[test]
    fn command_surfaces_rejection() {
        let mut device = device(&[status_frame(StatusCode::IncorrectParameter)]);
        let err = device.set_level(LimitMode::CC, 2.0).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::IncorrectParameter));
        assert!(matches!(
            err,
            DeviceError::Status {
                command: "CurrentLevel",
                ..
            }
        ));
    }

    #[test]
    fn command_rejects_non_status_reply() {
        let reply = CurrentLevel::new(1.0).encode_response(0).unwrap().to_vec();
        let mut device = device(&[reply]);
        let err = device.trigger().unwrap_err();
        assert!(matches!(
            err,
            DeviceError::Frame(FrameError::UnexpectedId {
                expected: 0x12,
                actual: 0x2B
            })
        ));
    }

    #[test]
    fn command_rejects_corrupted_status() {
        let mut reply = status_frame(StatusCode::Success);
        reply[25] ^= 0xFF;
        let mut device = device(&[reply]);
        assert!(matches!(
            device.enable_load(true),
            Err(DeviceError::Frame(FrameError::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn silent_load_times_out() {
        let mut device = device(&[]);
        assert!(matches!(
            device.enable_load(false),
            Err(DeviceError::Transport(TransportError::Timeout(_)))
        ));
    }

    #[test]
    fn out_of_range_value_is_rejected_before_writing() {
        let mut device = device(&[]);
        assert!(matches!(
            device.set_level(LimitMode::CV, -3.0),
            Err(DeviceError::Encode(EncodeError::OutOfRange { .. }))
        ));
        assert!(device.transport_mut().written().is_empty());
    }

    #[test]
    fn measure_sends_request_and_decodes_reply() {
        let reading = Measure {
            volts: 12.5,
            amps: 0.75,
            watts: 9.375,
            operation: OperationState::from_bits(0b1100),
            demand: DemandState::from_bits(1 << 6),
        };
        let mut device = device(&[reading.encode_response(0).unwrap().to_vec()]);

        let measured = device.measure().unwrap();
        assert_eq!(measured, reading);

        let request = decode_frame(&device.transport_mut().written()[0], Some(0x5F)).unwrap();
        assert_eq!(request.payload, [0u8; PAYLOAD_LEN]);
    }

    #[test]
    fn query_refused_with_status() {
        let mut device = device(&[status_frame(StatusCode::InvalidCommand)]);
        let err = device.version().unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::InvalidCommand));
    }

    #[test]
    fn query_of_command_only_entry_fails_early() {
        let mut device = device(&[]);
        assert!(matches!(
            device.query::<Trigger>(),
            Err(DeviceError::Encode(EncodeError::NotQueryable("Trigger")))
        ));
    }

    #[test]
    fn set_confirmed_reads_back() {
        let mut device = device(&[
            status_frame(StatusCode::Success),
            Mode::new(LimitMode::CW).encode_response(0).unwrap().to_vec(),
        ]);
        let confirmed = device.set_confirmed(&Mode::new(LimitMode::CW)).unwrap();
        assert_eq!(confirmed.mode, LimitMode::CW);

        let written = device.transport_mut().written().to_vec();
        assert_eq!(written[0][2], 0x28);
        assert_eq!(written[1][2], 0x29);
    }

    #[test]
    fn level_reads_the_matching_register() {
        let mut device = device(&[
            VoltageLevel::new(24.5).encode_response(0).unwrap().to_vec(),
            Mode::new(LimitMode::CV).encode_response(0).unwrap().to_vec(),
        ]);
        assert_eq!(device.level(LimitMode::CV).unwrap(), 24.5);
        assert_eq!(device.mode().unwrap(), LimitMode::CV);

        let written = device.transport_mut().written().to_vec();
        assert_eq!(written[0][2], 0x2D);
        assert_eq!(written[1][2], 0x29);
    }

    #[test]
    fn set_limits_skips_missing_values() {
        let mut device = device(&[
            status_frame(StatusCode::Success),
            status_frame(StatusCode::Success),
        ]);
        device.set_limits(Some(60.0), None, Some(300.0)).unwrap();

        let ids: Vec<u8> = device
            .transport_mut()
            .written()
            .iter()
            .map(|frame| frame[2])
            .collect();
        assert_eq!(ids, vec![0x22, 0x26]);
    }

    #[test]
    fn address_is_applied_to_every_frame() {
        let mut transport = ScriptedTransport::new();
        transport.push_response(status_frame(StatusCode::Success));
        let mut device = Device::new(transport, DeviceConfig::default().with_address(7));
        device.set_mode(LimitMode::CR).unwrap();
        assert_eq!(device.into_inner().written()[0][1], 7);
    }

    #[test]
    fn shared_device_serializes_exchanges() {
        let responses: Vec<Vec<u8>> = (0..8).map(|_| status_frame(StatusCode::Success)).collect();
        let shared = Arc::new(Mutex::new(device(&responses)));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let mut device = shared.lock().unwrap();
                    device.enable_load(i % 2 == 0).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut device = shared.lock().unwrap();
        assert_eq!(device.transport_mut().written().len(), 8);
        assert_eq!(device.transport_mut().pending(), 0);
    }
}
