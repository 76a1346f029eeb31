use std::path::PathBuf;
use std::time::Duration;

use bkload::catalog::LimitMode;
use bkload::device::{self, Device, DeviceConfig};
use bkload::transport::{SerialConfig, SerialTransport};
use clap::{Args, Subcommand};

use crate::exit::{device_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod catalog;
pub mod control;
pub mod decode;
pub mod encode;
pub mod info;
pub mod list;
pub mod measure;
pub mod sweep;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports on this host.
    List,
    /// Print the 26-byte frame for a catalog entry.
    Encode(EncodeArgs),
    /// Validate and decode a frame given as hex.
    Decode(DecodeArgs),
    /// Print the command catalog.
    Catalog,
    /// Read one measurement from the load.
    Measure,
    /// Read model, firmware, serial number and barcode.
    Info,
    /// Switch remote control on or off.
    Remote(SwitchArgs),
    /// Switch the load input on or off.
    Load(SwitchArgs),
    /// Select a regulation mode and set its level.
    Set(SetArgs),
    /// Step the level over a range and record measurements as CSV.
    Sweep(SweepArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Settings shared by every command, resolved from global flags.
#[derive(Debug, Clone)]
pub struct Context {
    pub format: OutputFormat,
    pub port: Option<String>,
    pub baud_rate: u32,
    pub timeout: Duration,
    pub device: DeviceConfig,
}

impl Context {
    pub fn serial_config(&self) -> CliResult<SerialConfig> {
        let port = self.port.clone().ok_or_else(|| {
            CliError::usage("no port selected; pass --port or set BKLOAD_PORT")
        })?;
        Ok(SerialConfig {
            port,
            baud_rate: self.baud_rate,
            timeout: self.timeout,
        })
    }

    /// Open the configured serial port.
    pub fn connect(&self) -> CliResult<Device<SerialTransport>> {
        let serial = self.serial_config()?;
        device::open(&serial, self.device).map_err(|err| device_error("connect failed", err))
    }
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::List => list::run(ctx),
        Command::Encode(args) => encode::run(args, ctx),
        Command::Decode(args) => decode::run(args, ctx),
        Command::Catalog => catalog::run(ctx),
        Command::Measure => measure::run(ctx),
        Command::Info => info::run(ctx),
        Command::Remote(args) => control::remote(args, ctx),
        Command::Load(args) => control::load(args, ctx),
        Command::Set(args) => control::set(args, ctx),
        Command::Sweep(args) => sweep::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Catalog entry name (e.g. current-level, CurrentLevel).
    pub name: String,
    /// Field values in layout order.
    #[arg(allow_hyphen_values = true)]
    pub values: Vec<String>,
    /// Encode as the load's response instead of a command.
    #[arg(long, conflicts_with = "request")]
    pub response: bool,
    /// Encode the read-back request (response identifier, empty payload).
    #[arg(long)]
    pub request: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex; spaces, colons and a 0x prefix are ignored.
    #[arg(required = true, num_args = 1..)]
    pub hex: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SwitchArgs {
    /// on or off.
    #[arg(value_parser = parse_switch, action = clap::ArgAction::Set)]
    pub state: bool,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// current, voltage, power or resistance.
    pub kind: LimitMode,
    /// Level in A, V, W or Ω.
    pub value: f64,
    /// Read mode and level back after setting them.
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// current, voltage, power or resistance.
    pub kind: LimitMode,
    /// First level (inclusive).
    #[arg(allow_hyphen_values = true)]
    pub start: f64,
    /// Last level (inclusive).
    #[arg(allow_hyphen_values = true)]
    pub stop: f64,
    /// Level increment; negative to sweep downward.
    #[arg(allow_hyphen_values = true)]
    pub step: f64,
    /// Seconds to wait at each level before measuring.
    pub delta_t: f64,
    /// Write CSV here instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Flush the output after every row.
    #[arg(long, short = 'f')]
    pub flush: bool,
    /// Show a progress bar on stderr.
    #[arg(long, short = 'p')]
    pub progress: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_switch(input: &str) -> Result<bool, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" | "enable" => Ok(true),
        "off" | "false" | "0" | "no" | "disable" => Ok(false),
        other => Err(format!("expected on or off, got {other:?}")),
    }
}

/// Parse `5s`, `150ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn switch_words() {
        assert_eq!(parse_switch("ON"), Ok(true));
        assert_eq!(parse_switch("off"), Ok(false));
        assert!(parse_switch("maybe").is_err());
    }

    #[test]
    fn missing_port_is_a_usage_error() {
        let ctx = Context {
            format: OutputFormat::Json,
            port: None,
            baud_rate: 9600,
            timeout: Duration::from_secs(1),
            device: DeviceConfig::default(),
        };
        assert_eq!(ctx.serial_config().unwrap_err().code, USAGE);
    }
}
