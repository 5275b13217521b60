//! Server deletion (`mxdelsvr`).

use tracing::info;

use crate::console::Console;
use crate::error::AdminError;
use crate::host::{Host, HostCommand};
use crate::loader::set_autostart;
use crate::menu::{ServerChoice, parse_server_choice, render_servers};
use crate::paths::Paths;
use crate::reload::{self, ReloadAction};
use crate::session::Session;
use crate::workdir::WorkDir;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted {
        address: String,
        ports: usize,
        action: ReloadAction,
    },
    /// The address given on the command line has no records.
    NotInstalled,
    NoServers,
    /// The user quit or picked an invalid entry.
    Aborted,
}

/// Deletes `target`, or asks which server to delete when it is `None`.
pub fn run(
    paths: &Paths,
    host: &mut dyn Host,
    console: &mut dyn Console,
    target: Option<&str>,
) -> Result<DeleteOutcome, AdminError> {
    console.show("\nDelete Server ...");
    let work = WorkDir::create(&paths.temp_dir)?;

    let (mut session, address) = match target {
        Some(address) => {
            let session = Session::load(paths)?;
            if !session.contains_server(address) {
                console.show("The specified ip is not installed.\n");
                return Ok(DeleteOutcome::NotInstalled);
            }
            (session, address.to_string())
        }
        None => {
            host.run(&HostCommand::FormatConfig)?;
            let session = Session::load(paths)?;
            let servers = session.servers();
            if servers.is_empty() {
                console.show("No NPort server is installed.\n");
                return Ok(DeleteOutcome::NoServers);
            }

            console.show(&render_servers(&servers, "Exit"));
            let answer = console.ask("\nSelect")?;
            match parse_server_choice(&answer, servers.len()) {
                ServerChoice::Server(i) => {
                    let address = servers[i].address.clone();
                    (session, address)
                }
                ServerChoice::Quit => return Ok(DeleteOutcome::Aborted),
                ServerChoice::Invalid => {
                    console.show("Please run mxdelsvr again!!\n");
                    return Ok(DeleteOutcome::Aborted);
                }
            }
        }
    };

    let removed = session.delete_server(&address);
    for record in &removed {
        host.run(&HostCommand::RemoveNode(record.tty_name.clone()))?;
        host.run(&HostCommand::RemoveNode(record.callout_name.clone()))?;
    }
    session.save(paths, &work)?;

    let remaining = session.config().has_data_rows();
    if !remaining {
        set_autostart(paths, false)?;
    }

    console.show(&format!("Deleting server: {}\n", address));
    let action = reload::trigger(host, remaining)?;
    info!("deleted {} ({} ports), {:?}", address, removed.len(), action);

    Ok(DeleteOutcome::Deleted {
        address,
        ports: removed.len(),
        action,
    })
}
