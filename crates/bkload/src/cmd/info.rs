use crate::cmd::Context;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_info, InfoReport};

pub fn run(ctx: &Context) -> CliResult<i32> {
    let mut device = ctx.connect()?;
    let version = device
        .version()
        .map_err(|err| device_error("read version", err))?;
    let barcode = device
        .barcode()
        .map_err(|err| device_error("read barcode", err))?;

    let report = InfoReport {
        address: device.address(),
        version,
        barcode,
    };
    print_info(&report, ctx.format);
    Ok(SUCCESS)
}
