//! Installation layout.
//! The driver lives in a fixed directory; `NPREAL2_DRIVER_DIR` and
//! `NPREAL2_TMP_DIR` override the defaults (used for staging and tests).

use std::env;
use std::path::PathBuf;

pub const DEFAULT_DRIVER_DIR: &str = "/usr/lib/npreal2/driver";
pub const DEFAULT_TEMP_DIR: &str = "/usr/lib/npreal2/tmp";

const CONFIG_FILE: &str = "npreal2d.cf";
const TEMPLATE_FILE: &str = "config";
const AUTOSTART_MARKER: &str = "state.start";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    pub driver_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl Paths {
    pub fn new(driver_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            driver_dir: driver_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn from_env() -> Self {
        let driver_dir = env::var_os("NPREAL2_DRIVER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DRIVER_DIR));
        let temp_dir = env::var_os("NPREAL2_TMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_DIR));
        Self::new(driver_dir, temp_dir)
    }

    /// The active driver config, `npreal2d.cf`.
    pub fn config_file(&self) -> PathBuf {
        self.driver_dir.join(CONFIG_FILE)
    }

    /// Pristine config shipped with the driver (headers and comments only).
    pub fn template_file(&self) -> PathBuf {
        self.driver_dir.join(TEMPLATE_FILE)
    }

    /// Present while the service should start the daemon at boot.
    pub fn autostart_marker(&self) -> PathBuf {
        self.driver_dir.join(AUTOSTART_MARKER)
    }

    /// Helper executable shipped in the driver directory.
    pub fn tool(&self, name: &str) -> PathBuf {
        self.driver_dir.join(name)
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new(DEFAULT_DRIVER_DIR, DEFAULT_TEMP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let paths = Paths::default();
        assert_eq!(paths.config_file(), PathBuf::from("/usr/lib/npreal2/driver/npreal2d.cf"));
        assert_eq!(paths.template_file(), PathBuf::from("/usr/lib/npreal2/driver/config"));
        assert_eq!(paths.autostart_marker(), PathBuf::from("/usr/lib/npreal2/driver/state.start"));
        assert_eq!(paths.tool("mxmknod"), PathBuf::from("/usr/lib/npreal2/driver/mxmknod"));
    }

    #[test]
    fn test_custom_layout() {
        let paths = Paths::new("/opt/drv", "/tmp/np");
        assert_eq!(paths.config_file(), PathBuf::from("/opt/drv/npreal2d.cf"));
    }
}
