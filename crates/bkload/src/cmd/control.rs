use bkload::catalog::LimitMode;
use serde::Serialize;

use crate::cmd::{Context, SetArgs, SwitchArgs};
use crate::exit::{device_error, CliError, CliResult, DEVICE_REJECTED, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct SwitchReport {
    command: &'static str,
    enabled: bool,
}

#[derive(Serialize)]
struct SetReport {
    mode: LimitMode,
    level: f64,
    unit: &'static str,
    /// Level read back from the load, when `--confirm` was given.
    readback: Option<f64>,
}

/// Values closer than one count of the finest scale are equal.
const READBACK_TOLERANCE: f64 = 1e-4;

pub fn remote(args: SwitchArgs, ctx: &Context) -> CliResult<i32> {
    let mut device = ctx.connect()?;
    device
        .enable_remote(args.state)
        .map_err(|err| device_error("remote", err))?;
    print_switch("RemoteOperation", args.state, ctx.format);
    Ok(SUCCESS)
}

pub fn load(args: SwitchArgs, ctx: &Context) -> CliResult<i32> {
    let mut device = ctx.connect()?;
    device
        .enable_load(args.state)
        .map_err(|err| device_error("load", err))?;
    print_switch("EnableLoad", args.state, ctx.format);
    Ok(SUCCESS)
}

pub fn set(args: SetArgs, ctx: &Context) -> CliResult<i32> {
    let mut device = ctx.connect()?;
    device
        .set_mode(args.kind)
        .map_err(|err| device_error("set mode", err))?;
    device
        .set_level(args.kind, args.value)
        .map_err(|err| device_error("set level", err))?;

    let readback = if args.confirm {
        let mode = device
            .mode()
            .map_err(|err| device_error("read mode", err))?;
        if mode != args.kind {
            return Err(CliError::new(
                DEVICE_REJECTED,
                format!("load reports mode {mode}, expected {}", args.kind),
            ));
        }
        let level = device
            .level(args.kind)
            .map_err(|err| device_error("read level", err))?;
        if (level - args.value).abs() > READBACK_TOLERANCE {
            return Err(CliError::new(
                DEVICE_REJECTED,
                format!(
                    "load reports {level} {}, expected {}",
                    args.kind.unit(),
                    args.value
                ),
            ));
        }
        Some(level)
    } else {
        None
    };

    let report = SetReport {
        mode: args.kind,
        level: args.value,
        unit: args.kind.unit(),
        readback,
    };
    match ctx.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Table | OutputFormat::Pretty => {
            let confirmed = if report.readback.is_some() {
                " (confirmed)"
            } else {
                ""
            };
            println!(
                "{}: {} {}{}",
                report.mode, report.level, report.unit, confirmed
            );
        }
    }
    Ok(SUCCESS)
}

fn print_switch(command: &'static str, enabled: bool, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SwitchReport { command, enabled }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{command}: {}", if enabled { "on" } else { "off" });
        }
    }
}
