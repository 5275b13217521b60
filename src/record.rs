//! Config record model.
//! One `ConfigRecord` per configured port, parsed from a whitespace-delimited row:
//! `index server data cmd fifo security tty callout [scope] [mode] [server2]`.
//! Rows written before per-port security existed have 7 fields and no
//! security column; they load as `SecurityLevel::None`.

use crate::error::AdminError;
use crate::security::{Mode, SecurityLevel};

/// Device minor numbers run 0..=255.
pub const MAX_PORTS: u32 = 256;

/// Rows without the security column.
const PLAIN_FIELDS: usize = 7;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigRecord {
    pub index: u32,
    pub server_address: String,
    pub data_port: String,
    pub command_port: String,
    pub fifo_name: String,
    pub security: SecurityLevel,
    pub tty_name: String,
    pub callout_name: String,
    pub scope_id: Option<String>,
    pub mode: Mode,
    pub secondary_address: Option<String>,
}

impl ConfigRecord {
    /// Parses the positional fields of one data row. `line` is 1-based and only used in errors.
    pub fn from_fields(line: usize, fields: &[&str]) -> Result<Self, AdminError> {
        let malformed = |reason: String| AdminError::MalformedRow { line, reason };

        if fields.len() < PLAIN_FIELDS {
            return Err(malformed(format!(
                "expected at least {} fields, found {}",
                PLAIN_FIELDS,
                fields.len()
            )));
        }

        let index: u32 = fields[0]
            .parse()
            .map_err(|_| malformed(format!("invalid index `{}`", fields[0])))?;
        if index >= MAX_PORTS {
            return Err(AdminError::Capacity(index));
        }

        if fields.len() == PLAIN_FIELDS {
            return Ok(Self {
                index,
                server_address: fields[1].to_string(),
                data_port: fields[2].to_string(),
                command_port: fields[3].to_string(),
                fifo_name: fields[4].to_string(),
                security: SecurityLevel::None,
                tty_name: fields[5].to_string(),
                callout_name: fields[6].to_string(),
                scope_id: None,
                mode: Mode::RealCom,
                secondary_address: None,
            });
        }

        let security = fields[5]
            .parse::<u8>()
            .ok()
            .and_then(SecurityLevel::from_code)
            .ok_or_else(|| malformed(format!("invalid security level `{}`", fields[5])))?;

        let mode = match fields.get(9) {
            Some(raw) => raw
                .parse::<u8>()
                .ok()
                .and_then(Mode::from_code)
                .ok_or_else(|| malformed(format!("invalid mode `{}`", raw)))?,
            None => Mode::RealCom,
        };

        Ok(Self {
            index,
            server_address: fields[1].to_string(),
            data_port: fields[2].to_string(),
            command_port: fields[3].to_string(),
            fifo_name: fields[4].to_string(),
            security,
            tty_name: fields[6].to_string(),
            callout_name: fields[7].to_string(),
            scope_id: fields.get(8).map(|s| s.to_string()),
            mode,
            secondary_address: fields.get(10).map(|s| s.to_string()),
        })
    }

    /// Records without a server address are unused slots.
    pub fn is_active(&self) -> bool {
        !self.server_address.is_empty()
    }

    /// Tab-delimited row. Trailing optional fields are dropped when empty;
    /// a missing scope that precedes a written mode is emitted as `0`.
    pub fn to_line(&self) -> String {
        let mut fields = vec![
            self.index.to_string(),
            self.server_address.clone(),
            self.data_port.clone(),
            self.command_port.clone(),
            self.fifo_name.clone(),
            self.security.to_string(),
            self.tty_name.clone(),
            self.callout_name.clone(),
        ];

        let scope = || self.scope_id.clone().unwrap_or_else(|| "0".to_string());
        if let Some(secondary) = &self.secondary_address {
            fields.push(scope());
            fields.push(self.mode.to_string());
            fields.push(secondary.clone());
        } else if self.mode != Mode::RealCom {
            fields.push(scope());
            fields.push(self.mode.to_string());
        } else if let Some(scope_id) = &self.scope_id {
            fields.push(scope_id.clone());
        }

        fields.join("\t")
    }
}
