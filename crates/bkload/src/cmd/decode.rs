use bkload::catalog::{by_id, Direction};
use bkload::frame::decode_frame;
use tracing::debug;

use crate::cmd::{Context, DecodeArgs};
use crate::exit::{decode_error, frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, FrameReport};

pub fn run(args: DecodeArgs, ctx: &Context) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex.join(" "))?;
    let frame = decode_frame(&bytes, None).map_err(|err| frame_error("decode", err))?;

    let (def, direction) = by_id(frame.id).ok_or_else(|| {
        CliError::new(
            DATA_INVALID,
            format!("decode: unknown identifier 0x{:02X}", frame.id),
        )
    })?;
    debug!(command = def.name, ?direction, "identified frame");

    let values = def
        .decode_payload(&frame, ctx.device.decode_options())
        .map_err(|err| decode_error("decode", err))?;

    let direction = match direction {
        Direction::Command => "command",
        Direction::Response => "response",
    };
    let report = FrameReport::new(def, direction, &bytes, def.describe(&values));
    print_frame(&report, ctx.format);
    Ok(SUCCESS)
}

/// Hex digits to bytes. Whitespace, `:`, `,` and `0x` prefixes are skipped.
fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .map(|chunk| {
            chunk
                .strip_prefix("0x")
                .or_else(|| chunk.strip_prefix("0X"))
                .unwrap_or(chunk)
        })
        .collect();

    if digits.len() % 2 != 0 {
        return Err(CliError::usage("hex input has an odd number of digits"));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| CliError::usage(format!("invalid hex near offset {}", i / 2)))
        })
        .collect()
}
