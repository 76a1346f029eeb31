use std::fs::File;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bkload::catalog::LimitMode;
use bkload::device::{Sample, Sweep};
use tracing::{info, warn};

use crate::cmd::{Context, SweepArgs};
use crate::exit::{
    device_error, io_error, CliError, CliResult, INTERNAL, INTERRUPTED, SUCCESS, USAGE,
};

const PROGRESS_WIDTH: usize = 20;

pub fn run(args: SweepArgs, ctx: &Context) -> CliResult<i32> {
    let dwell = Duration::try_from_secs_f64(args.delta_t).map_err(|_| {
        CliError::new(
            USAGE,
            format!("delta_t must be a non-negative number of seconds, got {}", args.delta_t),
        )
    })?;
    let sweep = Sweep::new(args.kind, args.start, args.stop, args.step, dwell)
        .map_err(|err| device_error("sweep", err))?;

    let out: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(
            File::create(path)
                .map_err(|err| io_error(&format!("create {}", path.display()), err))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(out);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    info!(port = ctx.port.as_deref().unwrap_or("-"), "connecting");
    let mut device = ctx.connect()?;

    writer
        .write_record(header(sweep.mode()))
        .map_err(csv_error)?;
    if args.flush {
        writer.flush().map_err(|err| io_error("flush", err))?;
    }

    let mut run = sweep
        .run(&mut device)
        .map_err(|err| device_error("prepare sweep", err))?;

    let mut failure: Option<CliError> = None;
    let mut interrupted = false;
    for sample in run.by_ref() {
        let sample = match sample {
            Ok(sample) => sample,
            Err(err) => {
                failure = Some(device_error("sweep", err));
                break;
            }
        };
        if args.progress {
            draw_progress(&sweep, sample.requested);
        }
        if let Err(err) = write_sample(&mut writer, &sample, args.flush) {
            failure = Some(err);
            break;
        }
        if !running.load(Ordering::SeqCst) {
            interrupted = true;
            break;
        }
    }
    if args.progress {
        eprintln!();
    }

    let max_watts = run.max_watts();
    let finished = run.finish();
    writer.flush().map_err(|err| io_error("flush", err))?;

    if let Some(err) = failure {
        if let Err(off) = finished {
            warn!(error = %off, "could not switch the load off");
        }
        return Err(err);
    }
    finished.map_err(|err| device_error("finish sweep", err))?;

    if let Some(watts) = max_watts {
        eprintln!("Max Power: {watts} W");
    }
    if interrupted {
        warn!("sweep interrupted; load switched off");
        return Ok(INTERRUPTED);
    }
    Ok(SUCCESS)
}

fn header(mode: LimitMode) -> [String; 4] {
    [
        format!("Requested {} ({})", mode.label(), mode.unit()),
        "voltage (V)".to_string(),
        "current (A)".to_string(),
        "power (W)".to_string(),
    ]
}

fn write_sample<W: Write>(
    writer: &mut csv::Writer<W>,
    sample: &Sample,
    flush: bool,
) -> CliResult<()> {
    writer
        .write_record([
            sample.requested.to_string(),
            sample.volts.to_string(),
            sample.amps.to_string(),
            sample.watts.to_string(),
        ])
        .map_err(csv_error)?;
    if flush {
        writer.flush().map_err(|err| io_error("flush", err))?;
    }
    Ok(())
}

fn csv_error(err: csv::Error) -> CliError {
    match err.into_kind() {
        csv::ErrorKind::Io(err) => io_error("write csv", err),
        other => CliError::new(INTERNAL, format!("write csv: {other:?}")),
    }
}

fn draw_progress(sweep: &Sweep, value: f64) {
    eprint!(
        "\r {value:8.3} {} [{}]",
        sweep.mode().unit(),
        progress_bar(sweep.start(), sweep.stop(), value, PROGRESS_WIDTH)
    );
    let _ = io::stderr().flush();
}

/// `===>    ` style bar for `value` between `start` and `stop`.
fn progress_bar(start: f64, stop: f64, value: f64, width: usize) -> String {
    let span = stop - start;
    let fraction = if span == 0.0 {
        1.0
    } else {
        ((value - start) / span).clamp(0.0, 1.0)
    };
    let slot = (fraction * width as f64) as usize;
    (0..width)
        .map(|i| match i.cmp(&slot) {
            std::cmp::Ordering::Less => '=',
            std::cmp::Ordering::Equal => '>',
            std::cmp::Ordering::Greater => ' ',
        })
        .collect()
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
