pub mod cmd;
pub mod logging;
pub mod select;
pub mod track;

use self::cmd::CliArgs;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

fn main() -> Result<()> {
	color_eyre::install().wrap_err("failed to install color eyre handler")?;
	logging::init()?;
	let args = CliArgs::parse();
	track::track(args)
}
