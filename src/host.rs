//! Operating-system collaborators.
//! Helper executables, the kernel module tools, systemd, and the running
//! `npreal2d` daemons sit behind the [`Host`] trait; the tools only decide
//! what to ask for. Exit statuses are logged, never acted upon.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::error::AdminError;
use crate::paths::Paths;

pub const DAEMON: &str = "npreal2d";
pub const REDUNDANT_DAEMON: &str = "npreal2d_redund";
const MODULE: &str = "npreal2";

/// A running daemon instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaemonProcess {
    pub pid: i32,
    pub name: String,
}

impl DaemonProcess {
    pub fn is_redundant(&self) -> bool {
        self.name == REDUNDANT_DAEMON
    }
}

/// External commands the tools request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCommand {
    /// `mxcfmat`: normalizes the config file layout in place.
    FormatConfig,
    RemoveNode(String),
    MakeNode { name: String, major: u32, minor: u32 },
    /// `mxloadsvr` with no arguments.
    RunLoader,
    UnloadModule,
    LoadModule { tty_major: u32, callout_major: u32 },
    ReloadUnits,
    EnableService,
    StartDaemon { redundant: bool },
}

impl HostCommand {
    /// Program and arguments for this command.
    pub fn argv(&self, paths: &Paths) -> (PathBuf, Vec<String>) {
        match self {
            HostCommand::FormatConfig => (paths.tool("mxcfmat"), vec![]),
            HostCommand::RemoveNode(name) => (paths.tool("mxrmnod"), vec![name.clone()]),
            HostCommand::MakeNode { name, major, minor } => (
                paths.tool("mxmknod"),
                vec![name.clone(), major.to_string(), minor.to_string()],
            ),
            HostCommand::RunLoader => (paths.tool("mxloadsvr"), vec![]),
            HostCommand::UnloadModule => ("rmmod".into(), vec![MODULE.to_string()]),
            HostCommand::LoadModule {
                tty_major,
                callout_major,
            } => (
                "modprobe".into(),
                vec![
                    MODULE.to_string(),
                    format!("ttymajor={tty_major}"),
                    format!("calloutmajor={callout_major}"),
                    "verbose=0".to_string(),
                ],
            ),
            HostCommand::ReloadUnits => ("systemctl".into(), vec!["daemon-reload".to_string()]),
            HostCommand::EnableService => {
                ("systemctl".into(), vec!["enable".to_string(), MODULE.to_string()])
            }
            HostCommand::StartDaemon { redundant } => {
                let name = if *redundant { REDUNDANT_DAEMON } else { DAEMON };
                (paths.tool(name), vec!["-t".to_string(), "1".to_string()])
            }
        }
    }
}

pub trait Host {
    /// Runs `command` to completion. Only a failure to launch is an error.
    fn run(&mut self, command: &HostCommand) -> Result<(), AdminError>;

    /// Currently running `npreal2d` / `npreal2d_redund` instances.
    fn daemons(&self) -> Result<Vec<DaemonProcess>, AdminError>;

    fn signal(&mut self, pid: i32, signal: Signal) -> Result<(), AdminError>;
}

/// Sends `sig` to each daemon, skipping the redundant one unless asked.
/// Processes that vanish in between are logged and skipped.
pub fn signal_daemons(
    host: &mut dyn Host,
    daemons: &[DaemonProcess],
    sig: Signal,
    include_redundant: bool,
) {
    for daemon in daemons {
        if daemon.is_redundant() && !include_redundant {
            continue;
        }
        debug!("sending {:?} to {} ({})", sig, daemon.name, daemon.pid);
        if let Err(e) = host.signal(daemon.pid, sig) {
            warn!("{}: {}", e, daemon.name);
        }
    }
}

/// Real host: spawns processes and scans `/proc`.
#[derive(Debug)]
pub struct SystemHost {
    paths: Paths,
    proc_root: PathBuf,
}

impl SystemHost {
    pub fn new(paths: Paths) -> Self {
        Self::with_proc_root(paths, "/proc")
    }

    pub fn with_proc_root(paths: Paths, proc_root: impl Into<PathBuf>) -> Self {
        Self {
            paths,
            proc_root: proc_root.into(),
        }
    }
}

impl Host for SystemHost {
    fn run(&mut self, command: &HostCommand) -> Result<(), AdminError> {
        let (program, args) = command.argv(&self.paths);
        debug!("running {} {}", program.display(), args.join(" "));
        let status = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| AdminError::Command {
                program: program.display().to_string(),
                source,
            })?;
        if !status.success() {
            debug!("{} exited with {}", program.display(), status);
        }
        Ok(())
    }

    fn daemons(&self) -> Result<Vec<DaemonProcess>, AdminError> {
        scan_proc(&self.proc_root)
    }

    fn signal(&mut self, pid: i32, sig: Signal) -> Result<(), AdminError> {
        signal::kill(Pid::from_raw(pid), sig).map_err(|source| AdminError::Signal { pid, source })
    }
}

fn scan_proc(root: &Path) -> Result<Vec<DaemonProcess>, AdminError> {
    let entries = fs::read_dir(root).map_err(|source| AdminError::FileOpen {
        path: root.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in entries.flatten() {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<i32>().ok()) else {
            continue;
        };
        // Processes can exit mid-scan.
        let Ok(comm) = fs::read_to_string(entry.path().join("comm")) else {
            continue;
        };
        let name = comm.trim();
        if name == DAEMON || name == REDUNDANT_DAEMON {
            found.push(DaemonProcess {
                pid,
                name: name.to_string(),
            });
        }
    }
    found.sort_by_key(|d| d.pid);
    Ok(found)
}
