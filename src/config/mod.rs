//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`CONSOLE_PAGE_URL`, `CONSOLE_BASE_PATH`,
//!    `CONSOLE_ORG_ID`, `CONSOLE_CSRF_TOKEN`, ...)
//! 2. TOML file specified via --config CLI flag
//! 3. ./console.toml in the current directory
//! 4. $XDG_CONFIG_HOME/console-api/console.toml (or
//!    ~/.config/console-api/console.toml)
//! 5. Built-in defaults

use std::path::PathBuf;

mod defaults;
mod env;
mod loader;
mod sources;
mod types;

pub use defaults::DEFAULT_CONSOLE_CONFIG_TEMPLATE;
pub use loader::{load_config, load_config_with_diagnostics};
pub use types::{
    AuthConfig, ConfigDiagnostics, ConsoleConfig, LoadedConfig, NetworkConfig, RetryConfig,
    ServerConfig,
};

/// Root directory for per-user config files.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}
