//! The command table.
//!
//! One static per catalog entry. Scale factors: current and transient
//! times 10 000 (0.1 mA, 0.1 ms), voltage/power/resistance 1 000.

use bkload_frame::Field;

use crate::definition::CommandDef;
use crate::enums::{Function, LimitMode, Partition, StatusCode, TransientOperation, TriggerSource};
use crate::flags::{DEMAND_FLAGS, OPERATION_FLAGS};

const AMPS: f64 = 10_000.0;
const MILLI: f64 = 1_000.0;
const TIME: f64 = 10_000.0;

/// Identifier of the Status frame that acknowledges every command.
pub const STATUS_ID: u8 = 0x12;

pub static STATUS: CommandDef = CommandDef::response(
    "Status",
    STATUS_ID,
    &[Field::enumerated("status", 1, &StatusCode::DOMAIN)],
);

pub static REMOTE_OPERATION: CommandDef =
    CommandDef::command("RemoteOperation", 0x20, &[Field::boolean("enable_remote")]);

pub static ENABLE_LOAD: CommandDef =
    CommandDef::command("EnableLoad", 0x21, &[Field::boolean("enable_load")]);

pub static MAXIMUM_VOLTAGE: CommandDef = CommandDef::with_response(
    "MaximumVoltage",
    0x22,
    0x23,
    &[Field::scaled("volts", 4, MILLI)],
);

pub static MAXIMUM_CURRENT: CommandDef = CommandDef::with_response(
    "MaximumCurrent",
    0x24,
    0x25,
    &[Field::scaled("amps", 4, AMPS)],
);

pub static MAXIMUM_POWER: CommandDef = CommandDef::with_response(
    "MaximumPower",
    0x26,
    0x27,
    &[Field::scaled("watts", 4, MILLI)],
);

pub static MODE: CommandDef = CommandDef::with_response(
    "Mode",
    0x28,
    0x29,
    &[Field::enumerated("mode", 1, &LimitMode::DOMAIN)],
);

pub static CURRENT_LEVEL: CommandDef = CommandDef::with_response(
    "CurrentLevel",
    0x2A,
    0x2B,
    &[Field::scaled("amps", 4, AMPS)],
);

pub static VOLTAGE_LEVEL: CommandDef = CommandDef::with_response(
    "VoltageLevel",
    0x2C,
    0x2D,
    &[Field::scaled("volts", 4, MILLI)],
);

pub static POWER_LEVEL: CommandDef = CommandDef::with_response(
    "PowerLevel",
    0x2E,
    0x2F,
    &[Field::scaled("watts", 4, MILLI)],
);

pub static RESISTANCE_LEVEL: CommandDef = CommandDef::with_response(
    "ResistanceLevel",
    0x30,
    0x31,
    &[Field::scaled("ohms", 4, MILLI)],
);

pub static CURRENT_TRANSIENT: CommandDef = CommandDef::with_response(
    "CurrentTransient",
    0x32,
    0x33,
    &[
        Field::scaled("value_a", 4, AMPS),
        Field::scaled("time_a", 2, TIME),
        Field::scaled("value_b", 4, AMPS),
        Field::scaled("time_b", 2, TIME),
        Field::enumerated("operation", 1, &TransientOperation::DOMAIN),
    ],
);

pub static VOLTAGE_TRANSIENT: CommandDef = CommandDef::with_response(
    "VoltageTransient",
    0x34,
    0x35,
    &[
        Field::scaled("value_a", 4, MILLI),
        Field::scaled("time_a", 2, TIME),
        Field::scaled("value_b", 4, MILLI),
        Field::scaled("time_b", 2, TIME),
        Field::enumerated("operation", 1, &TransientOperation::DOMAIN),
    ],
);

pub static POWER_TRANSIENT: CommandDef = CommandDef::with_response(
    "PowerTransient",
    0x36,
    0x37,
    &[
        Field::scaled("value_a", 4, MILLI),
        Field::scaled("time_a", 2, TIME),
        Field::scaled("value_b", 4, MILLI),
        Field::scaled("time_b", 2, TIME),
        Field::enumerated("operation", 1, &TransientOperation::DOMAIN),
    ],
);

pub static RESISTANCE_TRANSIENT: CommandDef = CommandDef::with_response(
    "ResistanceTransient",
    0x38,
    0x39,
    &[
        Field::scaled("value_a", 4, MILLI),
        Field::scaled("time_a", 2, TIME),
        Field::scaled("value_b", 4, MILLI),
        Field::scaled("time_b", 2, TIME),
        Field::enumerated("operation", 1, &TransientOperation::DOMAIN),
    ],
);

pub static LIST_OPERATION: CommandDef = CommandDef::with_response(
    "ListOperation",
    0x3A,
    0x3B,
    &[Field::enumerated("mode", 1, &TransientOperation::DOMAIN)],
);

pub static LIST_REPEAT: CommandDef = CommandDef::with_response(
    "ListRepeat",
    0x3C,
    0x3D,
    &[Field::boolean("enable_repeat")],
);

pub static LIST_STEPS: CommandDef =
    CommandDef::with_response("ListSteps", 0x3E, 0x3F, &[Field::raw("num_steps", 2)]);

pub static STEP_CURRENT: CommandDef = CommandDef::with_response(
    "StepCurrent",
    0x40,
    0x41,
    &[
        Field::raw("step_num", 2),
        Field::scaled("amps", 4, AMPS),
        Field::scaled("seconds", 2, TIME),
    ],
);

pub static STEP_VOLTAGE: CommandDef = CommandDef::with_response(
    "StepVoltage",
    0x42,
    0x43,
    &[
        Field::raw("step_num", 2),
        Field::scaled("volts", 4, MILLI),
        Field::scaled("seconds", 2, TIME),
    ],
);

pub static STEP_POWER: CommandDef = CommandDef::with_response(
    "StepPower",
    0x44,
    0x45,
    &[
        Field::raw("step_num", 2),
        Field::scaled("watts", 4, MILLI),
        Field::scaled("seconds", 2, TIME),
    ],
);

pub static STEP_RESISTANCE: CommandDef = CommandDef::with_response(
    "StepResistance",
    0x46,
    0x47,
    &[
        Field::raw("step_num", 2),
        Field::scaled("ohms", 4, MILLI),
        Field::scaled("seconds", 2, TIME),
    ],
);

pub static LIST_FILENAME: CommandDef =
    CommandDef::with_response("ListFilename", 0x48, 0x49, &[Field::text("file_name", 10)]);

pub static PARTITION_SCHEME: CommandDef = CommandDef::with_response(
    "PartitionScheme",
    0x4A,
    0x4B,
    &[Field::enumerated("scheme", 1, &Partition::DOMAIN)],
);

pub static SAVE_LIST_FILE: CommandDef =
    CommandDef::command("SaveListFile", 0x4C, &[Field::raw("location", 1)]);

pub static LOAD_LIST_FILE: CommandDef =
    CommandDef::command("LoadListFile", 0x4D, &[Field::raw("location", 1)]);

pub static MINIMUM_BATTERY_VOLTAGE: CommandDef = CommandDef::with_response(
    "MinimumBatteryVoltage",
    0x4E,
    0x4F,
    &[Field::scaled("volts", 4, MILLI)],
);

pub static LOAD_ON_TIMER: CommandDef =
    CommandDef::with_response("LoadOnTimer", 0x50, 0x51, &[Field::raw("seconds", 2)]);

pub static ENABLE_LOAD_ON_TIMER: CommandDef =
    CommandDef::command("EnableLoadOnTimer", 0x52, &[Field::boolean("enable_timer")]);

pub static SET_ADDRESS: CommandDef =
    CommandDef::command("SetAddress", 0x54, &[Field::raw("new_address", 2)]);

pub static ENABLE_LOCAL_OVERRIDE: CommandDef = CommandDef::command(
    "EnableLocalOverride",
    0x55,
    &[Field::boolean("enable_override")],
);

pub static ENABLE_REMOTE_SENSING: CommandDef = CommandDef::command(
    "EnableRemoteSensing",
    0x56,
    &[Field::boolean("enable_sensing")],
);

pub static SELECT_TRIGGER_SOURCE: CommandDef = CommandDef::with_response(
    "SelectTriggerSource",
    0x58,
    0x59,
    &[Field::enumerated("source", 1, &TriggerSource::DOMAIN)],
);

pub static TRIGGER: CommandDef = CommandDef::command("Trigger", 0x5A, &[]);

pub static SAVE_SETTINGS: CommandDef =
    CommandDef::command("SaveSettings", 0x5B, &[Field::raw("register_num", 1)]);

pub static LOAD_SETTINGS: CommandDef =
    CommandDef::command("LoadSettings", 0x5C, &[Field::raw("register_num", 1)]);

pub static SELECT_FUNCTION: CommandDef = CommandDef::with_response(
    "SelectFunction",
    0x5D,
    0x5E,
    &[Field::enumerated("function", 1, &Function::DOMAIN)],
);

pub static MEASURE: CommandDef = CommandDef::response(
    "Measure",
    0x5F,
    &[
        Field::scaled("volts", 4, MILLI),
        Field::scaled("amps", 4, AMPS),
        Field::scaled("watts", 4, MILLI),
        Field::flags("operation", 1, &OPERATION_FLAGS),
        Field::flags("demand", 2, &DEMAND_FLAGS),
    ],
);

pub static VERSION: CommandDef = CommandDef::response(
    "Version",
    0x6A,
    &[
        Field::text("model", 5),
        Field::raw("firmware_major", 1),
        Field::raw("firmware_minor", 1),
        Field::text("serial_number", 10),
    ],
);

pub static BARCODE: CommandDef = CommandDef::response(
    "Barcode",
    0x6B,
    &[
        Field::text("identity", 3),
        Field::text("sub", 2),
        Field::text("version", 2),
        Field::text("year", 2),
    ],
);

/// Every entry, in identifier order.
pub static CATALOG: &[&CommandDef] = &[
    &STATUS,
    &REMOTE_OPERATION,
    &ENABLE_LOAD,
    &MAXIMUM_VOLTAGE,
    &MAXIMUM_CURRENT,
    &MAXIMUM_POWER,
    &MODE,
    &CURRENT_LEVEL,
    &VOLTAGE_LEVEL,
    &POWER_LEVEL,
    &RESISTANCE_LEVEL,
    &CURRENT_TRANSIENT,
    &VOLTAGE_TRANSIENT,
    &POWER_TRANSIENT,
    &RESISTANCE_TRANSIENT,
    &LIST_OPERATION,
    &LIST_REPEAT,
    &LIST_STEPS,
    &STEP_CURRENT,
    &STEP_VOLTAGE,
    &STEP_POWER,
    &STEP_RESISTANCE,
    &LIST_FILENAME,
    &PARTITION_SCHEME,
    &SAVE_LIST_FILE,
    &LOAD_LIST_FILE,
    &MINIMUM_BATTERY_VOLTAGE,
    &LOAD_ON_TIMER,
    &ENABLE_LOAD_ON_TIMER,
    &SET_ADDRESS,
    &ENABLE_LOCAL_OVERRIDE,
    &ENABLE_REMOTE_SENSING,
    &SELECT_TRIGGER_SOURCE,
    &TRIGGER,
    &SAVE_SETTINGS,
    &LOAD_SETTINGS,
    &SELECT_FUNCTION,
    &MEASURE,
    &VERSION,
    &BARCODE,
];

/// Which side of the exchange an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Command,
    Response,
}

/// Look up an entry by name. Case-insensitive; `current-level` and
/// `current_level` match `CurrentLevel`.
pub fn by_name(name: &str) -> Option<&'static CommandDef> {
    let wanted = normalize(name);
    CATALOG
        .iter()
        .copied()
        .find(|def| normalize(def.name) == wanted)
}

pub fn by_command_id(id: u8) -> Option<&'static CommandDef> {
    CATALOG
        .iter()
        .copied()
        .find(|def| def.command_id == Some(id))
}

pub fn by_response_id(id: u8) -> Option<&'static CommandDef> {
    CATALOG
        .iter()
        .copied()
        .find(|def| def.response_id == Some(id))
}

/// Resolve any identifier seen on the wire.
pub fn by_id(id: u8) -> Option<(&'static CommandDef, Direction)> {
    by_command_id(id)
        .map(|def| (def, Direction::Command))
        .or_else(|| by_response_id(id).map(|def| (def, Direction::Response)))
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
