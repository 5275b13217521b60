//! Administration tools for the npreal2 serial device-server driver:
//! deleting servers, loading the driver and editing per-port security.

pub mod config;
pub mod console;
pub mod delete;
pub mod error;
pub mod host;
pub mod loader;
pub mod logging;
pub mod menu;
pub mod migrate;
pub mod paths;
pub mod record;
pub mod reload;
pub mod security;
pub mod session;
pub mod setsec;
pub mod workdir;

pub use error::AdminError;
pub use paths::Paths;
