use bkload::catalog::CATALOG;

use crate::cmd::Context;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_catalog, CatalogEntry};

pub fn run(ctx: &Context) -> CliResult<i32> {
    let entries: Vec<CatalogEntry> = CATALOG.iter().map(|def| CatalogEntry::from(*def)).collect();
    print_catalog(&entries, ctx.format);
    Ok(SUCCESS)
}
