use bkload::catalog::{by_name, CommandDef};
use bkload::frame::{Field, FieldKind, Value};
use tracing::debug;

use crate::cmd::{parse_switch, Context, EncodeArgs};
use crate::exit::{encode_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, FrameReport};

pub fn run(args: EncodeArgs, ctx: &Context) -> CliResult<i32> {
    let def = lookup(&args.name)?;
    let address = ctx.device.address;

    let (bytes, direction, values) = if args.request {
        if !args.values.is_empty() {
            return Err(CliError::usage(format!(
                "{} read-back requests carry no values",
                def.name
            )));
        }
        let bytes = def
            .request(address)
            .map_err(|err| encode_error("encode", err))?;
        (bytes, "request", Vec::new())
    } else {
        let values = parse_values(def, &args.values)?;
        let bytes = if args.response {
            def.encode_response(address, &values)
        } else {
            def.encode(address, &values)
        }
        .map_err(|err| encode_error("encode", err))?;
        let direction = if args.response { "response" } else { "command" };
        (bytes, direction, values)
    };

    debug!(command = def.name, direction, "encoded frame");
    let report = FrameReport::new(def, direction, &bytes, def.describe(&values));
    print_frame(&report, ctx.format);
    Ok(SUCCESS)
}

fn lookup(name: &str) -> CliResult<&'static CommandDef> {
    by_name(name).ok_or_else(|| {
        CliError::usage(format!(
            "unknown command {name:?}; run `bkload catalog` for the list"
        ))
    })
}

fn parse_values(def: &CommandDef, inputs: &[String]) -> CliResult<Vec<Value>> {
    if inputs.len() != def.fields.len() {
        let names: Vec<&str> = def.fields.iter().map(|f| f.name).collect();
        return Err(CliError::usage(format!(
            "{} takes {} value(s) ({}), got {}",
            def.name,
            def.fields.len(),
            names.join(", "),
            inputs.len()
        )));
    }
    def.fields
        .iter()
        .zip(inputs)
        .map(|(field, input)| parse_value(field, input))
        .collect()
}

/// Parse one command-line word according to the field's kind.
fn parse_value(field: &Field, input: &str) -> CliResult<Value> {
    let invalid = |expected: &str| {
        CliError::usage(format!(
            "invalid value {input:?} for {}: expected {expected}",
            field.name
        ))
    };

    match field.kind {
        FieldKind::Raw => parse_int(input)
            .map(Value::Int)
            .ok_or_else(|| invalid("an integer")),
        FieldKind::Bool => parse_switch(input)
            .map(Value::Bool)
            .map_err(|_| invalid("on or off")),
        FieldKind::Scaled(_) => input
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| invalid("a number")),
        FieldKind::Enum(domain) => domain
            .value_of(input.trim())
            .or_else(|| parse_int(input))
            .map(Value::Enum)
            .ok_or_else(|| {
                let names: Vec<&str> = domain.variants.iter().map(|&(n, _)| n).collect();
                invalid(&names.join(", "))
            }),
        FieldKind::Flags(set) => {
            if let Some(bits) = parse_int(input) {
                return u32::try_from(bits)
                    .map(Value::Flags)
                    .map_err(|_| invalid("a flag mask"));
            }
            let names = input
                .split(['|', ','])
                .map(str::trim)
                .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("none"));
            set.bits_of(names)
                .map(Value::Flags)
                .ok_or_else(|| invalid(&format!("flag names from {}", set.flags.join(", "))))
        }
        FieldKind::Text => Ok(Value::Text(input.as_bytes().to_vec())),
    }
}

/// Decimal, or hex with a `0x` prefix.
fn parse_int(input: &str) -> Option<u64> {
    let input = input.trim();
    match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => input.parse().ok(),
    }
}
