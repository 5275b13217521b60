use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use tracing::warn;

use npreal2_admin::console::Terminal;
use npreal2_admin::host::SystemHost;
use npreal2_admin::loader::{self, LoadMode};
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
    let matches = Command::new("mxloadsvr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rebuild npreal2 device nodes and (re)start the daemon")
        .arg(
            Arg::new("mode")
                .value_name("MODE")
                .help(
                    "`module` also reloads the kernel module; `install` migrates the config first",
                ),
        )
        .get_matches();

    // Unknown modes fall back to a plain node rebuild.
    let mode = match matches.get_one::<String>("mode") {
        Some(arg) => LoadMode::from_arg(arg).unwrap_or_else(|| {
            println!("unrecognized option -> \"{}\"", arg);
            warn!("unrecognized mode `{}`", arg);
            LoadMode::default()
        }),
        None => LoadMode::default(),
    };

    let paths = Paths::from_env();
    let mut host = SystemHost::new(paths.clone());
    let mut console = Terminal;

    let report = loader::run(&paths, &mut host, &mut console, mode).context("load driver")?;
    if let Some(migration) = &report.migration {
        for dropped in &migration.dropped {
            warn!("dropped during migration: {}", dropped);
        }
    }
    Ok(())
}
