//! Error taxonomy shared by the three tools.
//! Library code returns `AdminError`; the binaries wrap it with `anyhow` context.

use std::path::PathBuf;

use thiserror::Error;

use crate::record::MAX_PORTS;

#[derive(Debug, Error)]
pub enum AdminError {
    /// The config file, template, or a temp file could not be opened or read.
    #[error("file open error: {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Menu input outside the offered choices.
    #[error("invalid selection `{0}`")]
    InvalidSelection(String),

    #[error("line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("duplicate record index {0}")]
    DuplicateIndex(u32),

    #[error("record index {0} exceeds the {MAX_PORTS}-port capacity")]
    Capacity(u32),

    #[error("missing `{0}` header in config file")]
    MissingHeader(&'static str),

    #[error("failed to run `{program}`")]
    Command {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to signal process {pid}")]
    Signal {
        pid: i32,
        #[source]
        source: nix::Error,
    },

    #[error("failed to read console input")]
    Console(#[from] dialoguer::Error),
}

impl AdminError {
    /// True for the open/read failures the tools report as "file open error".
    pub fn is_file_open(&self) -> bool {
        matches!(self, AdminError::FileOpen { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_names_the_limit() {
        let err = AdminError::Capacity(300);
        assert_eq!(err.to_string(), "record index 300 exceeds the 256-port capacity");
    }

    #[test]
    fn test_file_open_is_classified() {
        let err = AdminError::FileOpen {
            path: PathBuf::from("/nope"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.is_file_open());
        assert!(!AdminError::InvalidSelection("x".into()).is_file_open());
    }
}
