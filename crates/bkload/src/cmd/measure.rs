use crate::cmd::Context;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::print_measure;

pub fn run(ctx: &Context) -> CliResult<i32> {
    let mut device = ctx.connect()?;
    let measure = device
        .measure()
        .map_err(|err| device_error("measure", err))?;
    print_measure(&measure, ctx.format);
    Ok(SUCCESS)
}
