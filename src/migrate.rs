//! Upgrade of configs written by old driver releases.
//! Legacy rows carry 6 fields with a single base port; current rows carry at
//! least 7 with explicit data and command ports. Runs on `mxloadsvr install`.

use std::fs;

use tracing::{info, warn};

use crate::config::{LineKind, classify, replace_file};
use crate::error::AdminError;
use crate::paths::Paths;
use crate::workdir::WorkDir;

pub const DATA_PORT_OFFSET: u16 = 949;
pub const COMMAND_PORT_OFFSET: u16 = 965;

const LEGACY_FIELDS: usize = 6;
const CURRENT_MIN_FIELDS: usize = 7;

#[derive(Debug, Default)]
pub struct Migration {
    /// Data rows to append after the template, in source order.
    pub rows: Vec<String>,
    pub upgraded: usize,
    pub dropped: Vec<AdminError>,
}

/// Rewrites one data row into the current layout.
pub fn upgrade_row(line: usize, raw: &str) -> Result<String, AdminError> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() >= CURRENT_MIN_FIELDS {
        return Ok(raw.to_string());
    }
    if fields.len() != LEGACY_FIELDS {
        return Err(AdminError::MalformedRow {
            line,
            reason: format!("invalid config format ({} fields)", fields.len()),
        });
    }

    let invalid_port = || AdminError::MalformedRow {
        line,
        reason: format!("invalid base port `{}`", fields[2]),
    };
    let base: u16 = fields[2].parse().map_err(|_| invalid_port())?;
    let data_port = base.checked_add(DATA_PORT_OFFSET).ok_or_else(invalid_port)?;
    let command_port = base
        .checked_add(COMMAND_PORT_OFFSET)
        .ok_or_else(invalid_port)?;

    let mut out = vec![
        fields[0].to_string(),
        fields[1].to_string(),
        data_port.to_string(),
        command_port.to_string(),
    ];
    out.extend(fields[3..].iter().map(|f| f.to_string()));
    Ok(out.join("\t"))
}

/// Upgrades every data row of `text`; comments and headers are not carried over.
pub fn upgrade_rows(text: &str) -> Migration {
    let mut migration = Migration::default();
    for (i, raw) in text.lines().enumerate() {
        if classify(raw) != LineKind::Data {
            continue;
        }
        let before = raw.split_whitespace().count();
        match upgrade_row(i + 1, raw) {
            Ok(row) => {
                if before == LEGACY_FIELDS {
                    migration.upgraded += 1;
                }
                migration.rows.push(row);
            }
            Err(e) => {
                warn!("dropping config row: {}", e);
                migration.dropped.push(e);
            }
        }
    }
    migration
}

/// Replaces the active config with the template plus the upgraded rows.
/// A config without data rows is left alone and `None` is returned.
pub fn run(paths: &Paths, work: &WorkDir) -> Result<Option<Migration>, AdminError> {
    let config_path = paths.config_file();
    let current = fs::read_to_string(&config_path).map_err(|source| AdminError::FileOpen {
        path: config_path.clone(),
        source,
    })?;

    let migration = upgrade_rows(&current);
    let has_rows = current.lines().any(|l| classify(l) == LineKind::Data);
    if !has_rows {
        return Ok(None);
    }

    let template_path = paths.template_file();
    let mut contents = fs::read_to_string(&template_path).map_err(|source| AdminError::FileOpen {
        path: template_path.clone(),
        source,
    })?;
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    for row in &migration.rows {
        contents.push_str(row);
        contents.push('\n');
    }

    replace_file(work, &config_path, &contents)?;
    info!(
        "config migrated: {} rows kept, {} upgraded, {} dropped",
        migration.rows.len(),
        migration.upgraded,
        migration.dropped.len()
    );
    Ok(Some(migration))
}
