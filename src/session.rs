//! Editing session over a loaded config.
//! Owns the [`ConfigFile`] and the dirty flag; servers are grouped by address
//! in first-seen order and ports are numbered 1.. within their server.

use std::ops::Range;

use tracing::info;

use crate::config::ConfigFile;
use crate::error::AdminError;
use crate::record::ConfigRecord;
use crate::paths::Paths;
use crate::security::SecurityLevel;
use crate::workdir::WorkDir;

pub const PORTS_PER_PAGE: usize = 16;

/// Records of one server, by record index, in file order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerGroup {
    pub address: String,
    pub indices: Vec<u32>,
}

impl ServerGroup {
    pub fn port_count(&self) -> usize {
        self.indices.len()
    }
}

/// Stable grouping: a server's position is where its address first appears.
pub fn aggregate_by_server<'a, I>(records: I) -> Vec<ServerGroup>
where
    I: IntoIterator<Item = &'a ConfigRecord>,
{
    let mut groups: Vec<ServerGroup> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|g| g.address == record.server_address) {
            Some(group) => group.indices.push(record.index),
            None => groups.push(ServerGroup {
                address: record.server_address.clone(),
                indices: vec![record.index],
            }),
        }
    }
    groups
}

/// Number of 16-port pages needed for `ports` (at least one).
pub fn page_count(ports: usize) -> usize {
    ports.div_ceil(PORTS_PER_PAGE).max(1)
}

/// Zero-based port positions shown on `page`.
pub fn page_range(page: usize, ports: usize) -> Range<usize> {
    let start = (page * PORTS_PER_PAGE).min(ports);
    let end = (start + PORTS_PER_PAGE).min(ports);
    start..end
}

/// Operations applied to every port of a server at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkEdit {
    DataOnly,
    DataAndCommand,
    Disable,
    EnableCert,
    DisableCert,
}

impl BulkEdit {
    pub fn apply(self, level: SecurityLevel) -> SecurityLevel {
        match self {
            BulkEdit::DataOnly => SecurityLevel::DataOnly,
            BulkEdit::DataAndCommand => SecurityLevel::DataAndCommand,
            BulkEdit::Disable => SecurityLevel::None,
            BulkEdit::EnableCert => level.with_cert(),
            BulkEdit::DisableCert => level.without_cert(),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    config: ConfigFile,
    dirty: bool,
}

impl Session {
    pub fn new(config: ConfigFile) -> Self {
        Self {
            config,
            dirty: false,
        }
    }

    pub fn load(paths: &Paths) -> Result<Self, AdminError> {
        Ok(Self::new(ConfigFile::load(&paths.config_file())?))
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn servers(&self) -> Vec<ServerGroup> {
        aggregate_by_server(self.config.records())
    }

    pub fn contains_server(&self, address: &str) -> bool {
        self.config.records().any(|r| r.server_address == address)
    }

    /// Ports of `address` in their 1-based display order.
    pub fn ports(&self, address: &str) -> Vec<&ConfigRecord> {
        self.config
            .records()
            .filter(|r| r.server_address == address)
            .collect()
    }

    /// Removes every record of `address`; returns them so their device nodes can go too.
    pub fn delete_server(&mut self, address: &str) -> Vec<ConfigRecord> {
        let removed = self.config.remove_records(|r| r.server_address == address);
        if !removed.is_empty() {
            info!("removed {} port(s) of {}", removed.len(), address);
            self.dirty = true;
        }
        removed
    }

    /// Advances the security level of port `ordinal` (1-based) of `address`.
    pub fn toggle_port(
        &mut self,
        address: &str,
        ordinal: usize,
    ) -> Result<SecurityLevel, AdminError> {
        let index = ordinal
            .checked_sub(1)
            .and_then(|pos| self.ports(address).get(pos).map(|r| r.index))
            .ok_or_else(|| AdminError::InvalidSelection(ordinal.to_string()))?;

        let record = self
            .config
            .record_mut(index)
            .ok_or_else(|| AdminError::InvalidSelection(ordinal.to_string()))?;
        record.security = record.security.next();
        self.dirty = true;
        Ok(record.security)
    }

    /// Applies `edit` to every port of `address`; returns how many ports it touched.
    pub fn apply_bulk(&mut self, address: &str, edit: BulkEdit) -> usize {
        let indices: Vec<u32> = self.ports(address).iter().map(|r| r.index).collect();
        for index in &indices {
            if let Some(record) = self.config.record_mut(*index) {
                record.security = edit.apply(record.security);
            }
        }
        if !indices.is_empty() {
            self.dirty = true;
        }
        indices.len()
    }

    pub fn save(&self, paths: &Paths, work: &WorkDir) -> Result<(), AdminError> {
        self.config.save(&paths.config_file(), work)
    }
}
