use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use tracing::debug;

use npreal2_admin::console::Terminal;
use npreal2_admin::delete;
use npreal2_admin::host::SystemHost;
use npreal2_admin::{Paths, logging};

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
    let matches = Command::new("mxdelsvr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Delete an NPort server from the npreal2 driver configuration")
        .arg(
            Arg::new("ip")
                .value_name("IP")
                .help("Server address to delete; omit to choose from a menu"),
        )
        .get_matches();

    let target = matches.get_one::<String>("ip").map(String::as_str);

    let paths = Paths::from_env();
    let mut host = SystemHost::new(paths.clone());
    let mut console = Terminal;

    let outcome = delete::run(&paths, &mut host, &mut console, target).context("delete server")?;
    debug!("{:?}", outcome);
    Ok(())
}
