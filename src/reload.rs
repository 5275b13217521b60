//! Deciding what to do with the daemon after the config changed.

use nix::sys::signal::Signal;
use tracing::info;

use crate::error::AdminError;
use crate::host::{Host, HostCommand, signal_daemons};

/// Follow-up after a config edit (`mxdelsvr`, `mxsetsec`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadAction {
    /// SIGUSR1 to the running `npreal2d` so it rereads the config.
    SignalReload,
    /// No daemon is up: run the loader to recreate nodes and start it.
    RunLoader,
    /// Nothing is configured any more: SIGKILL every daemon instance.
    ForceStop,
}

impl ReloadAction {
    pub fn decide(daemon_running: bool, config_non_empty: bool) -> Self {
        match (daemon_running, config_non_empty) {
            (_, false) => ReloadAction::ForceStop,
            (true, true) => ReloadAction::SignalReload,
            (false, true) => ReloadAction::RunLoader,
        }
    }
}

pub fn trigger(host: &mut dyn Host, config_non_empty: bool) -> Result<ReloadAction, AdminError> {
    let daemons = host.daemons()?;
    let action = ReloadAction::decide(!daemons.is_empty(), config_non_empty);
    info!("reload action: {:?}", action);

    match action {
        ReloadAction::SignalReload => signal_daemons(host, &daemons, Signal::SIGUSR1, false),
        ReloadAction::RunLoader => host.run(&HostCommand::RunLoader)?,
        ReloadAction::ForceStop => signal_daemons(host, &daemons, Signal::SIGKILL, true),
    }
    Ok(action)
}

/// Final daemon step of the loader, once nodes are rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DaemonAction {
    /// SIGTERM; the service supervisor brings it back with the new config.
    Restart,
    Kill,
    /// Launch `npreal2d_redund` and `npreal2d`.
    Start,
    Idle,
}

impl DaemonAction {
    pub fn decide(daemon_running: bool, config_non_empty: bool) -> Self {
        match (daemon_running, config_non_empty) {
            (true, true) => DaemonAction::Restart,
            (true, false) => DaemonAction::Kill,
            (false, true) => DaemonAction::Start,
            (false, false) => DaemonAction::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::RecordingHost;
    use crate::host::{DAEMON, REDUNDANT_DAEMON};

    #[test]
    fn test_decide_table() {
        assert_eq!(ReloadAction::decide(true, true), ReloadAction::SignalReload);
        assert_eq!(ReloadAction::decide(false, true), ReloadAction::RunLoader);
        assert_eq!(ReloadAction::decide(true, false), ReloadAction::ForceStop);
        assert_eq!(ReloadAction::decide(false, false), ReloadAction::ForceStop);
    }

    #[test]
    fn test_daemon_decide_table() {
        assert_eq!(DaemonAction::decide(true, true), DaemonAction::Restart);
        assert_eq!(DaemonAction::decide(true, false), DaemonAction::Kill);
        assert_eq!(DaemonAction::decide(false, true), DaemonAction::Start);
        assert_eq!(DaemonAction::decide(false, false), DaemonAction::Idle);
    }

    #[test]
    fn test_trigger_signals_running_daemon() {
        let mut host = RecordingHost::with_daemons(&[(40, DAEMON), (41, REDUNDANT_DAEMON)]);
        assert_eq!(trigger(&mut host, true).unwrap(), ReloadAction::SignalReload);
        assert_eq!(host.signals, vec![(40, Signal::SIGUSR1)]);
        assert!(host.commands.is_empty());
    }

    #[test]
    fn test_trigger_runs_loader_when_idle() {
        let mut host = RecordingHost::default();
        assert_eq!(trigger(&mut host, true).unwrap(), ReloadAction::RunLoader);
        assert_eq!(host.commands, vec![HostCommand::RunLoader]);
    }

    #[test]
    fn test_trigger_force_stops_on_empty_config() {
        let mut host = RecordingHost::with_daemons(&[(40, DAEMON), (41, REDUNDANT_DAEMON)]);
        assert_eq!(trigger(&mut host, false).unwrap(), ReloadAction::ForceStop);
        assert_eq!(host.signals, vec![(40, Signal::SIGKILL), (41, Signal::SIGKILL)]);
    }
}
