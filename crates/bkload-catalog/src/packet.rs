//! One Rust type per catalog entry.
//!
//! Each type names its [`CommandDef`] and converts to and from the generic
//! [`Value`] list; the frame and field codecs do the rest.

use std::fmt;

use bkload_frame::{
    text_lossy, DecodeError, DecodeOptions, EncodeError, Frame, Value, FRAME_LEN,
};
use serde::Serialize;

use crate::catalog;
use crate::definition::CommandDef;
use crate::enums::{Function, LimitMode, Partition, StatusCode, TransientOperation, TriggerSource};
use crate::error::PacketError;
use crate::flags::{DemandState, OperationState};

/// A typed catalog entry.
pub trait Packet: Sized {
    fn definition() -> &'static CommandDef;

    /// Field values in layout order.
    fn to_values(&self) -> Vec<Value>;

    fn from_values(values: &[Value]) -> Result<Self, DecodeError>;

    /// Command frame for this packet.
    fn encode(&self, address: u8) -> Result<[u8; FRAME_LEN], EncodeError> {
        Self::definition().encode(address, &self.to_values())
    }

    /// The frame a load would answer with for this value.
    fn encode_response(&self, address: u8) -> Result<[u8; FRAME_LEN], EncodeError> {
        Self::definition().encode_response(address, &self.to_values())
    }

    /// Validate and decode a response frame.
    fn decode(bytes: &[u8], options: DecodeOptions) -> Result<Addressed<Self>, PacketError> {
        let decoded = Self::definition().decode(bytes, options)?;
        let packet = Self::from_values(&decoded.values)?;
        Ok(Addressed {
            address: decoded.address,
            packet,
        })
    }

    /// Decode the payload of a frame already validated by the reader.
    fn from_frame(frame: &Frame, options: DecodeOptions) -> Result<Self, DecodeError> {
        let values = Self::definition().decode_payload(frame, options)?;
        Self::from_values(&values)
    }
}

/// A decoded packet with the address its frame carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Addressed<P> {
    pub address: u8,
    pub packet: P,
}

fn arity(def: &CommandDef, values: &[Value]) -> Result<(), DecodeError> {
    if values.len() != def.fields.len() {
        return Err(DecodeError::FieldCount {
            command: def.name,
            expected: def.fields.len(),
            actual: values.len(),
        });
    }
    Ok(())
}

fn mismatch(def: &CommandDef, index: usize, expected: &'static str) -> DecodeError {
    DecodeError::TypeMismatch {
        field: def.fields[index].name,
        expected,
    }
}

fn float(def: &CommandDef, values: &[Value], index: usize) -> Result<f64, DecodeError> {
    match values[index] {
        Value::Float(x) => Ok(x),
        Value::Int(v) => Ok(v as f64),
        _ => Err(mismatch(def, index, "a number")),
    }
}

fn boolean(def: &CommandDef, values: &[Value], index: usize) -> Result<bool, DecodeError> {
    match values[index] {
        Value::Bool(b) => Ok(b),
        _ => Err(mismatch(def, index, "a boolean")),
    }
}

fn int<T: TryFrom<u64>>(def: &CommandDef, values: &[Value], index: usize) -> Result<T, DecodeError> {
    match values[index] {
        Value::Int(v) => T::try_from(v).map_err(|_| mismatch(def, index, "a smaller integer")),
        _ => Err(mismatch(def, index, "an integer")),
    }
}

fn enumeration<E: TryFrom<u64, Error = u64>>(
    def: &CommandDef,
    values: &[Value],
    index: usize,
) -> Result<E, DecodeError> {
    match values[index] {
        Value::Enum(v) | Value::Int(v) => E::try_from(v).map_err(|value| {
            let domain = match def.fields[index].kind {
                bkload_frame::FieldKind::Enum(domain) => domain.name,
                _ => "enumeration",
            };
            DecodeError::InvalidEnumValue {
                field: def.fields[index].name,
                domain,
                value,
            }
        }),
        _ => Err(mismatch(def, index, "an enumeration value")),
    }
}

fn flags(def: &CommandDef, values: &[Value], index: usize) -> Result<u32, DecodeError> {
    match values[index] {
        Value::Flags(bits) => Ok(bits),
        _ => Err(mismatch(def, index, "a flag set")),
    }
}

fn text(def: &CommandDef, values: &[Value], index: usize) -> Result<String, DecodeError> {
    match &values[index] {
        Value::Text(bytes) => Ok(text_lossy(bytes)),
        _ => Err(mismatch(def, index, "text")),
    }
}

fn text_value(s: &str) -> Value {
    Value::Text(s.as_bytes().to_vec())
}

macro_rules! bool_packet {
    ($(#[$meta:meta])* $name:ident { $field:ident } => $def:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        pub struct $name {
            pub $field: bool,
        }

        impl $name {
            pub fn new($field: bool) -> Self {
                Self { $field }
            }
        }

        impl Packet for $name {
            fn definition() -> &'static CommandDef {
                &$def
            }

            fn to_values(&self) -> Vec<Value> {
                vec![Value::Bool(self.$field)]
            }

            fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
                arity(&$def, values)?;
                Ok(Self::new(boolean(&$def, values, 0)?))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.$field)
            }
        }
    };
}

macro_rules! scaled_packet {
    ($(#[$meta:meta])* $name:ident { $field:ident } => $def:path, $unit:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
        pub struct $name {
            pub $field: f64,
        }

        impl $name {
            pub fn new($field: f64) -> Self {
                Self { $field }
            }
        }

        impl Packet for $name {
            fn definition() -> &'static CommandDef {
                &$def
            }

            fn to_values(&self) -> Vec<Value> {
                vec![Value::Float(self.$field)]
            }

            fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
                arity(&$def, values)?;
                Ok(Self::new(float(&$def, values, 0)?))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({} {})", stringify!($name), self.$field, $unit)
            }
        }
    };
}

macro_rules! int_packet {
    ($(#[$meta:meta])* $name:ident { $field:ident: $ty:ty } => $def:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        pub struct $name {
            pub $field: $ty,
        }

        impl $name {
            pub fn new($field: $ty) -> Self {
                Self { $field }
            }
        }

        impl Packet for $name {
            fn definition() -> &'static CommandDef {
                &$def
            }

            fn to_values(&self) -> Vec<Value> {
                vec![Value::Int(u64::from(self.$field))]
            }

            fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
                arity(&$def, values)?;
                Ok(Self::new(int(&$def, values, 0)?))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.$field)
            }
        }
    };
}

macro_rules! enum_packet {
    ($(#[$meta:meta])* $name:ident { $field:ident: $ty:ty } => $def:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        pub struct $name {
            pub $field: $ty,
        }

        impl $name {
            pub fn new($field: $ty) -> Self {
                Self { $field }
            }
        }

        impl Packet for $name {
            fn definition() -> &'static CommandDef {
                &$def
            }

            fn to_values(&self) -> Vec<Value> {
                vec![Value::Enum(self.$field.value())]
            }

            fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
                arity(&$def, values)?;
                Ok(Self::new(enumeration(&$def, values, 0)?))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.$field)
            }
        }
    };
}

macro_rules! transient_packet {
    ($(#[$meta:meta])* $name:ident => $def:path, $unit:literal) => {
        $(#[$meta])*
        ///
        /// Alternates between level A for `time_a` seconds and level B for
        /// `time_b` seconds.
        #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
        pub struct $name {
            pub value_a: f64,
            pub time_a: f64,
            pub value_b: f64,
            pub time_b: f64,
            pub operation: TransientOperation,
        }

        impl Packet for $name {
            fn definition() -> &'static CommandDef {
                &$def
            }

            fn to_values(&self) -> Vec<Value> {
                vec![
                    Value::Float(self.value_a),
                    Value::Float(self.time_a),
                    Value::Float(self.value_b),
                    Value::Float(self.time_b),
                    Value::Enum(self.operation.value()),
                ]
            }

            fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
                arity(&$def, values)?;
                Ok(Self {
                    value_a: float(&$def, values, 0)?,
                    time_a: float(&$def, values, 1)?,
                    value_b: float(&$def, values, 2)?,
                    time_b: float(&$def, values, 3)?,
                    operation: enumeration(&$def, values, 4)?,
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "{}({} {u} for {} s, {} {u} for {} s, {})",
                    stringify!($name),
                    self.value_a,
                    self.time_a,
                    self.value_b,
                    self.time_b,
                    self.operation,
                    u = $unit,
                )
            }
        }
    };
}

macro_rules! step_packet {
    ($(#[$meta:meta])* $name:ident { $field:ident } => $def:path, $unit:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
        pub struct $name {
            pub step_num: u16,
            pub $field: f64,
            /// Dwell time.
            pub seconds: f64,
        }

        impl Packet for $name {
            fn definition() -> &'static CommandDef {
                &$def
            }

            fn to_values(&self) -> Vec<Value> {
                vec![
                    Value::Int(u64::from(self.step_num)),
                    Value::Float(self.$field),
                    Value::Float(self.seconds),
                ]
            }

            fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
                arity(&$def, values)?;
                Ok(Self {
                    step_num: int(&$def, values, 0)?,
                    $field: float(&$def, values, 1)?,
                    seconds: float(&$def, values, 2)?,
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "{}(#{}: {} {} for {} s)",
                    stringify!($name),
                    self.step_num,
                    self.$field,
                    $unit,
                    self.seconds
                )
            }
        }
    };
}

enum_packet! {
    /// Acknowledgement of a command.
    Status { code: StatusCode } => catalog::STATUS
}

impl Status {
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

bool_packet! {
    /// Switch between front-panel and remote control.
    RemoteOperation { enable_remote } => catalog::REMOTE_OPERATION
}

bool_packet! {
    /// Turn the load input on or off.
    EnableLoad { enable_load } => catalog::ENABLE_LOAD
}

scaled_packet! { MaximumVoltage { volts } => catalog::MAXIMUM_VOLTAGE, "V" }
scaled_packet! { MaximumCurrent { amps } => catalog::MAXIMUM_CURRENT, "A" }
scaled_packet! { MaximumPower { watts } => catalog::MAXIMUM_POWER, "W" }

enum_packet! {
    /// Regulation mode.
    Mode { mode: LimitMode } => catalog::MODE
}

scaled_packet! { CurrentLevel { amps } => catalog::CURRENT_LEVEL, "A" }
scaled_packet! { VoltageLevel { volts } => catalog::VOLTAGE_LEVEL, "V" }
scaled_packet! { PowerLevel { watts } => catalog::POWER_LEVEL, "W" }
scaled_packet! { ResistanceLevel { ohms } => catalog::RESISTANCE_LEVEL, "Ω" }

transient_packet! { /// Current transient. Levels in amps.
    CurrentTransient => catalog::CURRENT_TRANSIENT, "A" }
transient_packet! { /// Voltage transient. Levels in volts.
    VoltageTransient => catalog::VOLTAGE_TRANSIENT, "V" }
transient_packet! { /// Power transient. Levels in watts.
    PowerTransient => catalog::POWER_TRANSIENT, "W" }
transient_packet! { /// Resistance transient. Levels in ohms.
    ResistanceTransient => catalog::RESISTANCE_TRANSIENT, "Ω" }

enum_packet! { ListOperation { mode: TransientOperation } => catalog::LIST_OPERATION }

bool_packet! { ListRepeat { enable_repeat } => catalog::LIST_REPEAT }

int_packet! { ListSteps { num_steps: u16 } => catalog::LIST_STEPS }

step_packet! { StepCurrent { amps } => catalog::STEP_CURRENT, "A" }
step_packet! { StepVoltage { volts } => catalog::STEP_VOLTAGE, "V" }
step_packet! { StepPower { watts } => catalog::STEP_POWER, "W" }
step_packet! { StepResistance { ohms } => catalog::STEP_RESISTANCE, "Ω" }

/// Name of the list file being edited (at most 10 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListFilename {
    pub file_name: String,
}

impl Packet for ListFilename {
    fn definition() -> &'static CommandDef {
        &catalog::LIST_FILENAME
    }

    fn to_values(&self) -> Vec<Value> {
        vec![text_value(&self.file_name)]
    }

    fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
        arity(&catalog::LIST_FILENAME, values)?;
        Ok(Self {
            file_name: text(&catalog::LIST_FILENAME, values, 0)?,
        })
    }
}

impl fmt::Display for ListFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListFilename({:?})", self.file_name)
    }
}

enum_packet! { PartitionScheme { scheme: Partition } => catalog::PARTITION_SCHEME }

int_packet! { SaveListFile { location: u8 } => catalog::SAVE_LIST_FILE }
int_packet! { LoadListFile { location: u8 } => catalog::LOAD_LIST_FILE }

scaled_packet! { MinimumBatteryVoltage { volts } => catalog::MINIMUM_BATTERY_VOLTAGE, "V" }

int_packet! {
    /// Load-on timer duration.
    LoadOnTimer { seconds: u16 } => catalog::LOAD_ON_TIMER
}

bool_packet! { EnableLoadOnTimer { enable_timer } => catalog::ENABLE_LOAD_ON_TIMER }

int_packet! {
    /// Change the load's bus address.
    SetAddress { new_address: u16 } => catalog::SET_ADDRESS
}

bool_packet! { EnableLocalOverride { enable_override } => catalog::ENABLE_LOCAL_OVERRIDE }
bool_packet! { EnableRemoteSensing { enable_sensing } => catalog::ENABLE_REMOTE_SENSING }

enum_packet! { SelectTriggerSource { source: TriggerSource } => catalog::SELECT_TRIGGER_SOURCE }

/// Fire a bus trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Trigger;

impl Packet for Trigger {
    fn definition() -> &'static CommandDef {
        &catalog::TRIGGER
    }

    fn to_values(&self) -> Vec<Value> {
        Vec::new()
    }

    fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
        arity(&catalog::TRIGGER, values)?;
        Ok(Trigger)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Trigger")
    }
}

int_packet! { SaveSettings { register_num: u8 } => catalog::SAVE_SETTINGS }
int_packet! { LoadSettings { register_num: u8 } => catalog::LOAD_SETTINGS }

enum_packet! { SelectFunction { function: Function } => catalog::SELECT_FUNCTION }

/// Instantaneous readings plus state words.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measure {
    pub volts: f64,
    pub amps: f64,
    pub watts: f64,
    pub operation: OperationState,
    pub demand: DemandState,
}

impl Packet for Measure {
    fn definition() -> &'static CommandDef {
        &catalog::MEASURE
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Float(self.volts),
            Value::Float(self.amps),
            Value::Float(self.watts),
            Value::Flags(u32::from(self.operation.bits())),
            Value::Flags(u32::from(self.demand.bits())),
        ]
    }

    fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
        let def = &catalog::MEASURE;
        arity(def, values)?;
        Ok(Self {
            volts: float(def, values, 0)?,
            amps: float(def, values, 1)?,
            watts: float(def, values, 2)?,
            // Field decoding already masked to 8 and 10 bits.
            operation: OperationState::from_bits(flags(def, values, 3)? as u8),
            demand: DemandState::from_bits(flags(def, values, 4)? as u16),
        })
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} V, {:.4} A, {:.3} W [{}] [{}]",
            self.volts, self.amps, self.watts, self.operation, self.demand
        )
    }
}

/// Model, firmware and serial number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub model: String,
    pub firmware_major: u8,
    pub firmware_minor: u8,
    pub serial_number: String,
}

impl Packet for Version {
    fn definition() -> &'static CommandDef {
        &catalog::VERSION
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text_value(&self.model),
            Value::Int(u64::from(self.firmware_major)),
            Value::Int(u64::from(self.firmware_minor)),
            text_value(&self.serial_number),
        ]
    }

    fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
        let def = &catalog::VERSION;
        arity(def, values)?;
        Ok(Self {
            model: text(def, values, 0)?,
            firmware_major: int(def, values, 1)?,
            firmware_minor: int(def, values, 2)?,
            serial_number: text(def, values, 3)?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} firmware {}.{} serial {}",
            self.model, self.firmware_major, self.firmware_minor, self.serial_number
        )
    }
}

/// Product barcode, split into its printed segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Barcode {
    pub identity: String,
    pub sub: String,
    pub version: String,
    pub year: String,
}

impl Packet for Barcode {
    fn definition() -> &'static CommandDef {
        &catalog::BARCODE
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text_value(&self.identity),
            text_value(&self.sub),
            text_value(&self.version),
            text_value(&self.year),
        ]
    }

    fn from_values(values: &[Value]) -> Result<Self, DecodeError> {
        let def = &catalog::BARCODE;
        arity(def, values)?;
        Ok(Self {
            identity: text(def, values, 0)?,
            sub: text(def, values, 1)?,
            version: text(def, values, 2)?,
            year: text(def, values, 3)?,
        })
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.identity, self.sub, self.version, self.year)
    }
}

#[cfg(test)]
mod tests {
    use bkload_frame::{FrameError, CHECKSUM_OFFSET};

    use super::*;

    fn frame(prefix: &[u8], checksum: u8) -> [u8; FRAME_LEN] {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..prefix.len()].copy_from_slice(prefix);
        bytes[CHECKSUM_OFFSET] = checksum;
        bytes
    }

    #[test]
    fn remote_operation_on() {
        let bytes = RemoteOperation::new(true).encode(0).unwrap();
        assert_eq!(bytes, frame(&[0xAA, 0x00, 0x20, 0x01], 0xCB));
    }

    #[test]
    fn mode_constant_current() {
        let bytes = Mode::new(LimitMode::CC).encode(0).unwrap();
        assert_eq!(bytes, frame(&[0xAA, 0x00, 0x28], 0xD2));
    }

    #[test]
    fn enable_load_off() {
        let bytes = EnableLoad::new(false).encode(0).unwrap();
        assert_eq!(bytes, frame(&[0xAA, 0x00, 0x21], 0xCB));
    }

    #[test]
    fn current_level_twenty_milliamps() {
        let bytes = CurrentLevel::new(0.02).encode(0).unwrap();
        assert_eq!(bytes, frame(&[0xAA, 0x00, 0x2A, 0xC8], 0x9C));
    }

    #[test]
    fn encoding_is_idempotent() {
        let packet = CurrentTransient {
            value_a: 1.0,
            time_a: 0.5,
            value_b: 2.0,
            time_b: 0.25,
            operation: TransientOperation::Toggled,
        };
        assert_eq!(packet.encode(3).unwrap(), packet.encode(3).unwrap());
    }

    #[test]
    fn address_is_carried() {
        let bytes = CurrentLevel::new(1.0).encode(0x1F).unwrap();
        assert_eq!(bytes[1], 0x1F);
    }

    #[test]
    fn status_success_decodes() {
        let mut bytes = frame(&[0xAA, 0x00, 0x12, 0x80], 0);
        bytes[CHECKSUM_OFFSET] = bkload_frame::checksum(&bytes[..24]);
        let status = Status::decode(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(status.address, 0);
        assert!(status.packet.is_success());
    }

    #[test]
    fn status_outside_domain_is_rejected() {
        let mut bytes = frame(&[0xAA, 0x00, 0x12, 0x81], 0);
        bytes[CHECKSUM_OFFSET] = bkload_frame::checksum(&bytes[..24]);
        let err = Status::decode(&bytes, DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PacketError::Decode(DecodeError::InvalidEnumValue { value: 0x81, .. })
        ));
    }

    #[test]
    fn corrupted_measure_is_rejected() {
        let reading = Measure {
            volts: 12.0,
            amps: 1.5,
            watts: 18.0,
            operation: OperationState::from_bits(0b1100),
            demand: DemandState::from_bits(1 << 6),
        };
        let mut bytes = reading.encode_response(0).unwrap();
        bytes[5] ^= 0x01;
        assert!(matches!(
            Measure::decode(&bytes, DecodeOptions::default()),
            Err(PacketError::Frame(FrameError::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn measure_round_trip() {
        let reading = Measure {
            volts: 12.345,
            amps: 1.5,
            watts: 18.517,
            operation: OperationState::from_bits(0b1100),
            demand: DemandState::from_bits(1 << 6),
        };
        let bytes = reading.encode_response(2).unwrap();
        assert_eq!(&bytes[3..7], &12_345u32.to_le_bytes());
        let decoded = Measure::decode(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(decoded.address, 2);
        assert_eq!(decoded.packet, reading);
        assert_eq!(decoded.packet.demand.regulating(), Some(LimitMode::CC));
    }

    #[test]
    fn measure_is_response_only() {
        let reading = Measure {
            volts: 0.0,
            amps: 0.0,
            watts: 0.0,
            operation: OperationState::default(),
            demand: DemandState::default(),
        };
        assert_eq!(
            reading.encode(0).unwrap_err(),
            EncodeError::NotTransmittable("Measure")
        );
    }

    #[test]
    fn command_and_response_round_trips() {
        fn check<P: Packet + PartialEq + fmt::Debug>(packet: P) {
            let command = packet.encode(0).unwrap();
            assert_eq!(command[2], P::definition().command_id.unwrap());
            let response = packet.encode_response(0).unwrap();
            let decoded = P::decode(&response, DecodeOptions::default()).unwrap();
            assert_eq!(decoded.packet, packet);
        }

        check(MaximumVoltage::new(120.0));
        check(MaximumCurrent::new(30.0));
        check(MaximumPower::new(300.0));
        check(Mode::new(LimitMode::CR));
        check(VoltageLevel::new(5.0));
        check(PowerLevel::new(42.5));
        check(ResistanceLevel::new(1000.0));
        check(VoltageTransient {
            value_a: 3.3,
            time_a: 0.001,
            value_b: 5.0,
            time_b: 0.002,
            operation: TransientOperation::Pulse,
        });
        check(CurrentTransient {
            value_a: 1.25,
            time_a: 0.001,
            value_b: 2.5,
            time_b: 0.5,
            operation: TransientOperation::Toggled,
        });
        check(PowerTransient {
            value_a: 10.0,
            time_a: 0.25,
            value_b: 150.5,
            time_b: 1.0,
            operation: TransientOperation::Continuous,
        });
        check(ResistanceTransient {
            value_a: 4.7,
            time_a: 0.01,
            value_b: 220.0,
            time_b: 0.02,
            operation: TransientOperation::Pulse,
        });
        check(ListOperation::new(TransientOperation::Continuous));
        check(ListRepeat::new(true));
        check(ListSteps::new(250));
        check(StepVoltage {
            step_num: 7,
            volts: 12.0,
            seconds: 1.5,
        });
        check(StepCurrent {
            step_num: 0,
            amps: 3.75,
            seconds: 0.1,
        });
        check(StepPower {
            step_num: 999,
            watts: 75.0,
            seconds: 2.0,
        });
        check(StepResistance {
            step_num: 12,
            ohms: 33.3,
            seconds: 6.5,
        });
        check(ListFilename {
            file_name: "profile".to_string(),
        });
        check(PartitionScheme::new(Partition::File4Steps250));
        check(MinimumBatteryVoltage::new(10.5));
        check(LoadOnTimer::new(3600));
        check(SelectTriggerSource::new(TriggerSource::Bus));
        check(SelectFunction::new(Function::Battery));
    }

    #[test]
    fn version_text_fields() {
        let version = Version {
            model: "8500".to_string(),
            firmware_major: 2,
            firmware_minor: 17,
            serial_number: "SN0042".to_string(),
        };
        let bytes = version.encode_response(0).unwrap();
        assert_eq!(&bytes[3..8], b"8500\0");
        let decoded = Version::decode(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(decoded.packet, version);
        assert_eq!(decoded.packet.to_string(), "8500 firmware 2.17 serial SN0042");
    }

    #[test]
    fn barcode_concatenates() {
        let barcode = Barcode {
            identity: "BKP".to_string(),
            sub: "85".to_string(),
            version: "01".to_string(),
            year: "24".to_string(),
        };
        let bytes = barcode.encode_response(0).unwrap();
        let decoded = Barcode::decode(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(decoded.packet.to_string(), "BKP850124");
    }

    #[test]
    fn file_name_too_long_is_rejected() {
        let packet = ListFilename {
            file_name: "much-too-long".to_string(),
        };
        assert!(matches!(
            packet.encode(0),
            Err(EncodeError::OutOfRange { field: "file_name", .. })
        ));
    }

    #[test]
    fn negative_level_is_rejected() {
        assert!(matches!(
            CurrentLevel::new(-1.0).encode(0),
            Err(EncodeError::OutOfRange { field: "amps", .. })
        ));
    }

    #[test]
    fn trigger_has_empty_payload() {
        let bytes = Trigger.encode(0).unwrap();
        assert_eq!(&bytes[..3], &[0xAA, 0x00, 0x5A]);
        assert!(bytes[3..25].iter().all(|&b| b == 0));
        assert_eq!(bytes[25], 0x04);
    }

    #[test]
    fn set_address_overflowing_u16_is_a_type_mismatch() {
        let err = SetAddress::from_values(&[Value::Int(70_000)]).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { field: "new_address", .. }));
    }

    #[test]
    fn from_values_checks_arity() {
        assert_eq!(
            Mode::from_values(&[]).unwrap_err(),
            DecodeError::FieldCount {
                command: "Mode",
                expected: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn display_includes_units() {
        assert_eq!(CurrentLevel::new(2.0).to_string(), "CurrentLevel(2 A)");
        assert_eq!(Mode::new(LimitMode::CV).to_string(), "Mode(CV)");
    }
}
