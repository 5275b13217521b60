//! Driver (re)load: optional module reload and config migration, device-node
//! rebuild, then the daemon decision.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;

use nix::sys::signal::Signal;
use tracing::{info, warn};

use crate::config::{ConfigFile, HeaderKind};
use crate::console::Console;
use crate::error::AdminError;
use crate::host::{Host, HostCommand, signal_daemons};
use crate::migrate::{self, Migration};
use crate::paths::Paths;
use crate::reload::DaemonAction;
use crate::workdir::WorkDir;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Rebuild device nodes and restart the daemon.
    #[default]
    Nodes,
    /// Also reload the kernel module.
    Module,
    /// Module reload preceded by config migration.
    Install,
}

impl LoadMode {
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "module" => Some(LoadMode::Module),
            "install" => Some(LoadMode::Install),
            _ => None,
        }
    }

    pub fn reloads_module(self) -> bool {
        matches!(self, LoadMode::Module | LoadMode::Install)
    }
}

#[derive(Debug)]
pub struct LoadReport {
    pub migration: Option<Migration>,
    pub nodes: usize,
    pub daemon: DaemonAction,
}

pub fn run(
    paths: &Paths,
    host: &mut dyn Host,
    console: &mut dyn Console,
    mode: LoadMode,
) -> Result<LoadReport, AdminError> {
    let work = WorkDir::create(&paths.temp_dir)?;

    let migration = match mode {
        LoadMode::Install => migrate::run(paths, &work)?,
        _ => None,
    };

    let config = ConfigFile::load(&paths.config_file())?;
    let tty_major = config.require_header(HeaderKind::TtyMajor)?;
    let callout_major = config.require_header(HeaderKind::CalloutMajor)?;

    let daemons = host.daemons()?;
    signal_daemons(host, &daemons, Signal::SIGTERM, true);

    if mode.reloads_module() {
        signal_daemons(host, &daemons, Signal::SIGKILL, true);
        console.show("\nLoading TTY Driver...");
        if let Err(e) = host.run(&HostCommand::UnloadModule) {
            warn!("{}", e);
        }
        host.run(&HostCommand::LoadModule {
            tty_major,
            callout_major,
        })?;
    }

    for record in config.records() {
        host.run(&HostCommand::RemoveNode(record.tty_name.clone()))?;
        host.run(&HostCommand::RemoveNode(record.callout_name.clone()))?;
    }
    let mut nodes = 0;
    for record in config.records() {
        host.run(&HostCommand::MakeNode {
            name: record.tty_name.clone(),
            major: tty_major,
            minor: record.index,
        })?;
        host.run(&HostCommand::MakeNode {
            name: record.callout_name.clone(),
            major: callout_major,
            minor: record.index,
        })?;
        nodes += 2;
    }

    set_autostart(paths, false)?;
    enable_service(host);

    host.run(&HostCommand::FormatConfig)?;
    let non_empty = ConfigFile::load(&paths.config_file())?.has_data_rows();
    let daemons = host.daemons()?;
    let daemon = DaemonAction::decide(!daemons.is_empty(), non_empty);
    info!("daemon action: {:?}", daemon);

    match daemon {
        DaemonAction::Restart => signal_daemons(host, &daemons, Signal::SIGTERM, true),
        DaemonAction::Kill => signal_daemons(host, &daemons, Signal::SIGKILL, true),
        DaemonAction::Start => {
            host.run(&HostCommand::StartDaemon { redundant: true })?;
            host.run(&HostCommand::StartDaemon { redundant: false })?;
        }
        DaemonAction::Idle => {}
    }

    set_autostart(paths, non_empty)?;
    if non_empty {
        enable_service(host);
    }

    console.show("Complete.\n");
    Ok(LoadReport {
        migration,
        nodes,
        daemon,
    })
}

/// Creates or removes the `state.start` marker the service unit checks at boot.
pub fn set_autostart(paths: &Paths, enabled: bool) -> Result<(), AdminError> {
    let marker = paths.autostart_marker();
    let result = if enabled {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&marker)
            .map(|_| ())
    } else {
        match fs::remove_file(&marker) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            other => other,
        }
    };
    result.map_err(|source| AdminError::FileWrite {
        path: marker,
        source,
    })
}

/// `systemctl daemon-reload` and `enable`; hosts without systemd just log it.
fn enable_service(host: &mut dyn Host) {
    for command in [HostCommand::ReloadUnits, HostCommand::EnableService] {
        if let Err(e) = host.run(&command) {
            warn!("{}", e);
        }
    }
}
