use bkload::transport::available_ports;

use crate::cmd::Context;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::print_ports;

pub fn run(ctx: &Context) -> CliResult<i32> {
    let ports = available_ports().map_err(|err| transport_error("list ports", err))?;
    print_ports(&ports, ctx.format);
    Ok(SUCCESS)
}
