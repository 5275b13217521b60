//! Config module.
//! Reads and rewrites the driver config `npreal2d.cf`.
//! Comment lines (anything containing `#`), blank lines and the two header
//! directives (`ttymajor=`, `calloutmajor=`) are kept verbatim; every other line
//! is a data row parsed into a [`ConfigRecord`].
//! Rewrites stage the whole file in the work dir and copy it over the original.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::AdminError;
use crate::record::ConfigRecord;
use crate::workdir::WorkDir;

/// Scratch name used while staging a rewrite.
const STAGED_CONFIG: &str = "nprtmp_cf";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderKind {
    TtyMajor,
    CalloutMajor,
}

impl HeaderKind {
    pub fn key(self) -> &'static str {
        match self {
            HeaderKind::TtyMajor => "ttymajor",
            HeaderKind::CalloutMajor => "calloutmajor",
        }
    }
}

/// Coarse classification of a raw config line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Comment,
    Blank,
    Header(HeaderKind),
    Data,
}

pub fn classify(line: &str) -> LineKind {
    if line.contains('#') {
        return LineKind::Comment;
    }
    let Some(first) = line.split_whitespace().next() else {
        return LineKind::Blank;
    };
    if first.contains(HeaderKind::TtyMajor.key()) {
        LineKind::Header(HeaderKind::TtyMajor)
    } else if first.contains(HeaderKind::CalloutMajor.key()) {
        LineKind::Header(HeaderKind::CalloutMajor)
    } else {
        LineKind::Data
    }
}

#[derive(Clone, Debug)]
struct Entry {
    record: ConfigRecord,
    /// Source text, dropped once the record is edited.
    original: Option<String>,
}

#[derive(Clone, Debug)]
enum Line {
    Verbatim(String),
    Header {
        kind: HeaderKind,
        value: Option<u32>,
        text: String,
    },
    Record(Entry),
    /// Data row that failed to parse; kept as-is and never edited.
    Unparsed(String),
}

/// In-memory copy of the config file, in file order.
#[derive(Clone, Debug, Default)]
pub struct ConfigFile {
    lines: Vec<Line>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, AdminError> {
        let text = fs::read_to_string(path).map_err(|source| AdminError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text)?;
        debug!(
            "loaded {} records from {}",
            config.records().count(),
            path.display()
        );
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, AdminError> {
        let mut lines = Vec::new();
        let mut seen = HashSet::new();

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = match classify(raw) {
                LineKind::Comment | LineKind::Blank => Line::Verbatim(raw.to_string()),
                LineKind::Header(kind) => Line::Header {
                    kind,
                    value: header_value(raw),
                    text: raw.to_string(),
                },
                LineKind::Data => {
                    let fields: Vec<&str> = raw.split_whitespace().collect();
                    match ConfigRecord::from_fields(line_no, &fields) {
                        Ok(record) => {
                            if !seen.insert(record.index) {
                                return Err(AdminError::DuplicateIndex(record.index));
                            }
                            Line::Record(Entry {
                                record,
                                original: Some(raw.to_string()),
                            })
                        }
                        Err(e @ AdminError::MalformedRow { .. }) => {
                            warn!("keeping unparsed config row: {}", e);
                            Line::Unparsed(raw.to_string())
                        }
                        Err(e) => return Err(e),
                    }
                }
            };
            lines.push(line);
        }

        Ok(Self { lines })
    }

    /// Serialized file contents, one `\n`-terminated line per entry.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Verbatim(text) | Line::Header { text, .. } | Line::Unparsed(text) => {
                    out.push_str(text)
                }
                Line::Record(Entry {
                    original: Some(text),
                    ..
                }) => out.push_str(text),
                Line::Record(Entry {
                    record,
                    original: None,
                }) => {
                    if !record.is_active() {
                        continue;
                    }
                    out.push_str(&record.to_line())
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn save(&self, path: &Path, work: &WorkDir) -> Result<(), AdminError> {
        replace_file(work, path, &self.to_text())
    }

    pub fn header(&self, kind: HeaderKind) -> Option<u32> {
        self.lines.iter().find_map(|line| match line {
            Line::Header { kind: k, value, .. } if *k == kind => *value,
            _ => None,
        })
    }

    pub fn require_header(&self, kind: HeaderKind) -> Result<u32, AdminError> {
        self.header(kind).ok_or(AdminError::MissingHeader(kind.key()))
    }

    /// Active records in file order.
    pub fn records(&self) -> impl Iterator<Item = &ConfigRecord> {
        self.lines.iter().filter_map(|line| match line {
            Line::Record(entry) if entry.record.is_active() => Some(&entry.record),
            _ => None,
        })
    }

    /// Mutable access by index. The record is re-serialized on save.
    pub fn record_mut(&mut self, index: u32) -> Option<&mut ConfigRecord> {
        self.lines.iter_mut().find_map(|line| match line {
            Line::Record(entry) if entry.record.index == index => {
                entry.original = None;
                Some(&mut entry.record)
            }
            _ => None,
        })
    }

    /// Drops every record matching `pred` and returns them in file order.
    pub fn remove_records<F>(&mut self, mut pred: F) -> Vec<ConfigRecord>
    where
        F: FnMut(&ConfigRecord) -> bool,
    {
        let mut removed = Vec::new();
        self.lines.retain(|line| match line {
            Line::Record(entry) if pred(&entry.record) => {
                removed.push(entry.record.clone());
                false
            }
            _ => true,
        });
        removed
    }

    /// True when any data row remains, parsed or not.
    pub fn has_data_rows(&self) -> bool {
        self.lines.iter().any(|line| match line {
            Line::Record(entry) => entry.record.is_active(),
            Line::Unparsed(_) => true,
            _ => false,
        })
    }
}

fn header_value(line: &str) -> Option<u32> {
    let first = line.split_whitespace().next()?;
    let (_, value) = first.split_once('=')?;
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Writes `contents` to a scratch file in `work`, then copies it over `target`.
/// The target is untouched unless the scratch file was written completely.
pub fn replace_file(work: &WorkDir, target: &Path, contents: &str) -> Result<(), AdminError> {
    let staged = work.file(STAGED_CONFIG);
    fs::write(&staged, contents).map_err(|source| AdminError::FileWrite {
        path: staged.clone(),
        source,
    })?;
    fs::copy(&staged, target).map_err(|source| AdminError::FileWrite {
        path: target.to_path_buf(),
        source,
    })?;
    if let Err(e) = fs::remove_file(&staged) {
        debug!("could not remove {}: {}", staged.display(), e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::SecurityLevel;

    const SAMPLE: &str = "\
# npreal2d.cf
ttymajor=33
calloutmajor=38
# [Minor] [ServerIP] [Data] [Cmd] [FIFO] [Sec.] [ttyName] [coutName] [Interface] [Mode] [RedundantIP]
0\t192.168.1.10\t950\t966\t1\t0\tttyr00\tcur00\t0\t0\t
1\t192.168.1.10\t951\t967\t1\t1\tttyr01\tcur01\t0\t0\t
2\t192.168.1.20\t950\t966\t1\t3\tttyr02\tcur02\t0\t0\t
3\t192.168.1.10\t952\t968\t1\t0\tttyr03\tcur03\t0\t0\t
";

    #[test]
    fn test_classify() {
        assert_eq!(classify("# comment"), LineKind::Comment);
        assert_eq!(classify("0 1.2.3.4 # trailing"), LineKind::Comment);
        assert_eq!(classify("   "), LineKind::Blank);
        assert_eq!(classify("ttymajor=33"), LineKind::Header(HeaderKind::TtyMajor));
        assert_eq!(classify("calloutmajor=38"), LineKind::Header(HeaderKind::CalloutMajor));
        assert_eq!(classify("0\t10.0.0.1"), LineKind::Data);
    }

    #[test]
    fn test_headers_captured() {
        let cfg = ConfigFile::parse(SAMPLE).unwrap();
        assert_eq!(cfg.header(HeaderKind::TtyMajor), Some(33));
        assert_eq!(cfg.require_header(HeaderKind::CalloutMajor).unwrap(), 38);
    }

    #[test]
    fn test_missing_header() {
        let cfg = ConfigFile::parse("ttymajor=33\n").unwrap();
        let err = cfg.require_header(HeaderKind::CalloutMajor).unwrap_err();
        assert!(matches!(err, AdminError::MissingHeader("calloutmajor")));
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let cfg = ConfigFile::parse(SAMPLE).unwrap();
        assert_eq!(cfg.to_text(), SAMPLE);
    }

    #[test]
    fn test_round_trip_normalizes_line_endings() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        let cfg = ConfigFile::parse(&crlf).unwrap();
        assert_eq!(cfg.to_text(), SAMPLE);
    }

    #[test]
    fn test_records_in_file_order() {
        let cfg = ConfigFile::parse(SAMPLE).unwrap();
        let indices: Vec<u32> = cfg.records().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let text = "0 10.0.0.1 950 966 1 0 a b\n0 10.0.0.2 950 966 1 0 c d\n";
        assert!(matches!(
            ConfigFile::parse(text).unwrap_err(),
            AdminError::DuplicateIndex(0)
        ));
    }

    #[test]
    fn test_unparsed_row_is_preserved() {
        let text = "ttymajor=33\nthis is not a record\n";
        let cfg = ConfigFile::parse(text).unwrap();
        assert_eq!(cfg.records().count(), 0);
        assert!(cfg.has_data_rows());
        assert_eq!(cfg.to_text(), text);
    }

    #[test]
    fn test_edit_reserializes_only_that_row() {
        let mut cfg = ConfigFile::parse(SAMPLE).unwrap();
        cfg.record_mut(1).unwrap().security = SecurityLevel::DataOnlyCert;
        let text = cfg.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[5], "1\t192.168.1.10\t951\t967\t1\t2\tttyr01\tcur01\t0");
        assert_eq!(lines[4], "0\t192.168.1.10\t950\t966\t1\t0\tttyr00\tcur00\t0\t0\t");
    }

    #[test]
    fn test_remove_records_keeps_everything_else() {
        let mut cfg = ConfigFile::parse(SAMPLE).unwrap();
        let removed = cfg.remove_records(|r| r.server_address == "192.168.1.10");
        assert_eq!(removed.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1, 3]);

        let text = cfg.to_text();
        let expected: String = SAMPLE
            .lines()
            .filter(|l| !l.contains("192.168.1.10") || l.contains('#'))
            .map(|l| format!("{l}\n"))
            .collect();
        assert_eq!(text, expected);
    }

    #[test]
    fn test_has_data_rows() {
        let mut cfg = ConfigFile::parse(SAMPLE).unwrap();
        assert!(cfg.has_data_rows());
        cfg.remove_records(|_| true);
        assert!(!cfg.has_data_rows());
    }

    #[test]
    fn test_load_missing_file_is_file_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigFile::load(&dir.path().join("npreal2d.cf")).unwrap_err();
        assert!(err.is_file_open());
    }

    #[test]
    fn test_save_replaces_target_and_cleans_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("npreal2d.cf");
        fs::write(&target, SAMPLE).unwrap();
        let work = WorkDir::create(dir.path().join("tmp")).unwrap();

        let mut cfg = ConfigFile::load(&target).unwrap();
        cfg.remove_records(|r| r.index == 2);
        cfg.save(&target, &work).unwrap();

        let saved = fs::read_to_string(&target).unwrap();
        assert!(!saved.contains("192.168.1.20"));
        assert!(saved.starts_with("# npreal2d.cf\nttymajor=33\ncalloutmajor=38\n"));
        assert!(!work.file(STAGED_CONFIG).exists());
    }

    #[test]
    fn test_failed_staging_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("npreal2d.cf");
        fs::write(&target, SAMPLE).unwrap();
        let work = WorkDir::create(dir.path().join("tmp")).unwrap();
        // a directory in the way of the scratch file makes the staged write fail
        fs::create_dir(work.file(STAGED_CONFIG)).unwrap();

        let err =
            replace_file(&work, &target, "0\t10.9.9.9\t950\t966\t1\t0\ta\tb\n").unwrap_err();
        assert!(matches!(
            err,
            AdminError::FileWrite { ref path, .. } if *path == work.file(STAGED_CONFIG)
        ));
        assert_eq!(fs::read_to_string(&target).unwrap(), SAMPLE);
    }
}
