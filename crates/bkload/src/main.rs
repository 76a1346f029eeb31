mod cmd;
mod exit;
mod logging;
mod output;

use bkload::device::DeviceConfig;
use bkload::transport::DEFAULT_BAUD_RATE;
use clap::Parser;

use crate::cmd::{Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "bkload",
    version,
    about = "Drive BK Precision 85xx DC electronic loads"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Serial port the load is attached to.
    #[arg(long, short = 'd', env = "BKLOAD_PORT", global = true)]
    port: Option<String>,

    /// Serial baud rate; must match the load's front-panel setting.
    #[arg(long, env = "BKLOAD_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    baud: u32,

    /// Device address (0 when the load is not addressed).
    #[arg(long, default_value_t = 0, global = true)]
    address: u8,

    /// Per-read timeout (e.g. 500ms, 2s).
    #[arg(long, default_value = "1s", global = true)]
    timeout: String,

    /// Reject boolean bytes other than 0 and 1 in responses.
    #[arg(long, global = true)]
    strict_bool: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn context(&self) -> exit::CliResult<Context> {
        Ok(Context {
            format: self.format.unwrap_or_else(OutputFormat::default_for_stdout),
            port: self.port.clone(),
            baud_rate: self.baud,
            timeout: cmd::parse_duration(&self.timeout)?,
            device: DeviceConfig::default()
                .with_address(self.address)
                .with_strict_bool(self.strict_bool),
        })
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let result = cli
        .context()
        .and_then(|ctx| cmd::run(cli.command, &ctx));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_subcommand() {
        let cli = Cli::try_parse_from(["bkload", "set", "current", "1.5", "--confirm"])
            .expect("set args should parse");

        match cli.command {
            Command::Set(args) => {
                assert_eq!(args.kind, bkload::catalog::LimitMode::CC);
                assert_eq!(args.value, 1.5);
                assert!(args.confirm);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_sweep_with_negative_step() {
        let cli = Cli::try_parse_from([
            "bkload", "sweep", "voltage", "10", "2", "-0.5", "0.1", "--flush",
        ])
        .expect("sweep args should parse");
        match cli.command {
            Command::Sweep(args) => {
                assert_eq!(args.step, -0.5);
                assert!(args.flush);
                assert!(!args.progress);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_build_the_context() {
        let cli = Cli::try_parse_from([
            "bkload",
            "measure",
            "--port",
            "/dev/ttyUSB0",
            "--address",
            "3",
            "--timeout",
            "250ms",
            "--format",
            "json",
        ])
        .expect("measure args should parse");

        let ctx = cli.context().expect("context should build");
        assert_eq!(ctx.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(ctx.device.address, 3);
        assert_eq!(ctx.timeout, std::time::Duration::from_millis(250));
        assert_eq!(ctx.format, OutputFormat::Json);
    }

    #[test]
    fn parses_switch_states() {
        let cli = Cli::try_parse_from(["bkload", "load", "on"]).expect("load on should parse");
        match cli.command {
            Command::Load(args) => assert!(args.state),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["bkload", "remote", "off"]).expect("remote off should parse");
        match cli.command {
            Command::Remote(args) => assert!(!args.state),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn switch_state_is_required() {
        let err = Cli::try_parse_from(["bkload", "load"]).expect_err("missing state should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_unknown_switch_state() {
        let err = Cli::try_parse_from(["bkload", "load", "sideways"])
            .expect_err("bad switch should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn encode_and_request_conflict() {
        let err = Cli::try_parse_from([
            "bkload",
            "encode",
            "current-level",
            "--request",
            "--response",
        ])
        .expect_err("conflicting args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
