//! Per-port security editing (`mxsetsec`).
//! Model selection loops until `q`; each model opens a paged port menu.
//! The config is only rewritten when something changed.

use tracing::debug;

use crate::console::Console;
use crate::error::AdminError;
use crate::host::{Host, HostCommand};
use crate::menu::{
    PortCommand, ServerChoice, parse_port_command, parse_server_choice, render_port_page,
    render_servers,
};
use crate::paths::Paths;
use crate::reload::{self, ReloadAction};
use crate::session::{Session, page_count};
use crate::workdir::WorkDir;

const TITLE: &str = "Set Security Parameter ...";

/// Returns the reload action taken, or `None` when nothing was saved.
pub fn run(
    paths: &Paths,
    host: &mut dyn Host,
    console: &mut dyn Console,
) -> Result<Option<ReloadAction>, AdminError> {
    let work = WorkDir::create(&paths.temp_dir)?;

    host.run(&HostCommand::FormatConfig)?;
    let mut session = Session::load(paths)?;
    if session.servers().is_empty() {
        console.show("No NPort server is installed.\n");
        return Ok(None);
    }

    loop {
        let servers = session.servers();
        console.show(TITLE);
        console.show("<<Model Selection>>");
        console.show(&render_servers(&servers, "Exit"));
        let answer = console.ask("\nPlease select a model you want to set up")?;
        match parse_server_choice(&answer, servers.len()) {
            ServerChoice::Server(i) => edit_ports(&mut session, console, &servers[i].address)?,
            ServerChoice::Quit => break,
            ServerChoice::Invalid => debug!("ignoring model selection `{}`", answer),
        }
    }
    console.show("Exit!!\n");

    if !session.is_dirty() {
        return Ok(None);
    }
    session.save(paths, &work)?;
    let action = reload::trigger(host, session.config().has_data_rows())?;
    Ok(Some(action))
}

fn edit_ports(
    session: &mut Session,
    console: &mut dyn Console,
    address: &str,
) -> Result<(), AdminError> {
    let mut page = 0;
    loop {
        let ports = session.ports(address);
        let pages = page_count(ports.len());
        console.show(TITLE);
        console.show(&render_port_page(&ports, page));

        let answer = console.ask("\nPlease select a port you want to change security setting")?;
        match parse_port_command(&answer) {
            PortCommand::Back => return Ok(()),
            PortCommand::NextPage => {
                if page + 1 < pages {
                    page += 1;
                }
            }
            PortCommand::PrevPage => {
                page = page.saturating_sub(1);
            }
            PortCommand::Bulk(edit) => {
                session.apply_bulk(address, edit);
            }
            PortCommand::Toggle(n) => {
                if let Err(e) = session.toggle_port(address, n) {
                    debug!("{}", e);
                }
            }
            PortCommand::Invalid => debug!("ignoring port selection `{}`", answer),
        }
    }
}
