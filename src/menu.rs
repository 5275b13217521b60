//! Menu rendering and answer parsing for the interactive tools.

use std::fmt::Write as _;

use crate::record::ConfigRecord;
use crate::session::{BulkEdit, ServerGroup, page_count, page_range};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerChoice {
    /// Zero-based position in the server list.
    Server(usize),
    Quit,
    Invalid,
}

pub fn parse_server_choice(input: &str, servers: usize) -> ServerChoice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return ServerChoice::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=servers).contains(&n) => ServerChoice::Server(n - 1),
        _ => ServerChoice::Invalid,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortCommand {
    /// 1-based port number within the server.
    Toggle(usize),
    Bulk(BulkEdit),
    NextPage,
    PrevPage,
    Back,
    Invalid,
}

/// Letters are matched on their first character, case-insensitively.
pub fn parse_port_command(input: &str) -> PortCommand {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return if n > 0 { PortCommand::Toggle(n) } else { PortCommand::Invalid };
    }
    match input.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a') => PortCommand::Bulk(BulkEdit::DataOnly),
        Some('b') => PortCommand::Bulk(BulkEdit::DataAndCommand),
        Some('c') => PortCommand::Bulk(BulkEdit::Disable),
        Some('d') => PortCommand::Bulk(BulkEdit::EnableCert),
        Some('e') => PortCommand::Bulk(BulkEdit::DisableCert),
        Some('n') => PortCommand::NextPage,
        Some('p') => PortCommand::PrevPage,
        Some('q') => PortCommand::Back,
        _ => PortCommand::Invalid,
    }
}

/// Numbered server list with a trailing `(q)` entry labelled `quit_label`.
pub fn render_servers(servers: &[ServerGroup], quit_label: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n[ID]\t{:<40}\t[Port(s)]", "[Server IP]");
    for (i, server) in servers.iter().enumerate() {
        let _ = writeln!(out, "  ({})\t{:<40}\t  {}", i + 1, server.address, server.port_count());
    }
    let _ = write!(out, "  (q)\t{}", quit_label);
    out
}

/// One page of a server's ports plus the bulk and navigation entries.
pub fn render_port_page(ports: &[&ConfigRecord], page: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<<Port Selection>>");
    let _ = writeln!(out, "\n[ID]\t{:<40} [Port]\t{:<14}\t[Cert.]", "[Server IP]", "[Sec.]");
    for pos in page_range(page, ports.len()) {
        let record = ports[pos];
        let _ = writeln!(
            out,
            "({})\t{:<40} {}\t{:<14}\t{}",
            pos + 1,
            record.server_address,
            pos + 1,
            record.security.encryption_label(),
            record.security.cert_label()
        );
    }

    let _ = writeln!(out, "(a)\tAll port Data only encrypted (For model name without '-G2')");
    let _ = writeln!(out, "(b)\tAll port Data and Command encrypted (For model name with '-G2')");
    let _ = writeln!(out, "(c)\tDisable all port encrypted");
    let _ = writeln!(
        out,
        "(d)\tEnable all port Certificate Authentication (only active with secure enabled port)"
    );
    let _ = writeln!(out, "(e)\tDisable all port Certificate Authentication");

    let pages = page_count(ports.len());
    if page + 1 < pages {
        let _ = writeln!(out, "(n)\tnext page");
    }
    if page > 0 {
        let _ = writeln!(out, "(p)\tprevious page");
    }
    let _ = write!(out, "(q)\tback to model selection");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::SecurityLevel;

    fn record(index: u32, security: SecurityLevel) -> ConfigRecord {
        let fields = ["0", "10.0.0.1", "950", "966", "1", "0", "ttyr00", "cur00"];
        let mut rec = ConfigRecord::from_fields(1, &fields).unwrap();
        rec.index = index;
        rec.security = security;
        rec
    }

    #[test]
    fn test_server_choice() {
        assert_eq!(parse_server_choice("2", 3), ServerChoice::Server(1));
        assert_eq!(parse_server_choice(" Q ", 3), ServerChoice::Quit);
        assert_eq!(parse_server_choice("0", 3), ServerChoice::Invalid);
        assert_eq!(parse_server_choice("4", 3), ServerChoice::Invalid);
        assert_eq!(parse_server_choice("abc", 3), ServerChoice::Invalid);
    }

    #[test]
    fn test_port_command() {
        assert_eq!(parse_port_command("12"), PortCommand::Toggle(12));
        assert_eq!(parse_port_command("0"), PortCommand::Invalid);
        assert_eq!(parse_port_command("A"), PortCommand::Bulk(BulkEdit::DataOnly));
        assert_eq!(parse_port_command("b"), PortCommand::Bulk(BulkEdit::DataAndCommand));
        assert_eq!(parse_port_command("c"), PortCommand::Bulk(BulkEdit::Disable));
        assert_eq!(parse_port_command("D"), PortCommand::Bulk(BulkEdit::EnableCert));
        assert_eq!(parse_port_command("e"), PortCommand::Bulk(BulkEdit::DisableCert));
        assert_eq!(parse_port_command("next"), PortCommand::NextPage);
        assert_eq!(parse_port_command("P"), PortCommand::PrevPage);
        assert_eq!(parse_port_command("quit"), PortCommand::Back);
        assert_eq!(parse_port_command(""), PortCommand::Invalid);
        assert_eq!(parse_port_command("z"), PortCommand::Invalid);
    }

    #[test]
    fn test_render_servers() {
        let servers = vec![ServerGroup {
            address: "10.0.0.1".into(),
            indices: vec![0, 1],
        }];
        let text = render_servers(&servers, "Exit");
        assert!(text.contains("  (1)\t10.0.0.1"));
        assert!(text.trim_end().ends_with("  (q)\tExit"));
    }

    #[test]
    fn test_render_port_page_navigation() {
        let records: Vec<ConfigRecord> = (0..20)
            .map(|i| record(i, SecurityLevel::DataOnlyCert))
            .collect();
        let ports: Vec<&ConfigRecord> = records.iter().collect();

        let first = render_port_page(&ports, 0);
        assert!(first.contains("(16)\t"));
        assert!(!first.contains("(17)\t"));
        assert!(first.contains("(n)\tnext page"));
        assert!(!first.contains("(p)\tprevious page"));
        assert!(first.contains("Data only"));
        assert!(first.contains("Enable"));

        let second = render_port_page(&ports, 1);
        assert!(second.contains("(17)\t"));
        assert!(second.contains("(20)\t"));
        assert!(!second.contains("(n)\tnext page"));
        assert!(second.contains("(p)\tprevious page"));
    }
}
