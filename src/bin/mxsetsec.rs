use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Command;

use npreal2_admin::console::Terminal;
use npreal2_admin::host::SystemHost;
use npreal2_admin::{Paths, logging, setsec};

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    Command::new("mxsetsec")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Edit per-port security settings of the npreal2 driver")
        .get_matches();

    let paths = Paths::from_env();
    let mut host = SystemHost::new(paths.clone());
    let mut console = Terminal;

    setsec::run(&paths, &mut host, &mut console).context("set security")?;
    Ok(())
}
