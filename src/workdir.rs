//! Scoped temp working directory.
//! Created when a tool starts; removed with everything in it when the guard drops,
//! so every early return cleans up.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::AdminError;

#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, AdminError> {
        let path = path.into();
        fs::create_dir_all(&path).map_err(|source| AdminError::FileWrite {
            path: path.clone(),
            source,
        })?;
        debug!("created work dir {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a scratch file inside the work dir.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove work dir {}: {}", self.path.display(), e);
            }
        }
    }
}
