//! Default configuration constants.
//!
//! Keeping defaults in one module lets the types, the env layer and tests
//! share the same literals.

/// Embedded default `console.toml`, also the documented reference config.
pub const DEFAULT_CONSOLE_CONFIG_TEMPLATE: &str = include_str!("../templates/console.toml");
/// File name searched in the working directory and the global config dir.
pub(super) const CONFIG_FILE_NAME: &str = "console.toml";
/// Directory under the config root holding the global config file.
pub(super) const CONFIG_DIR_NAME: &str = "console-api";
/// Page location assumed when none is configured.
pub(super) const DEFAULT_PAGE_URL: &str = "http://localhost:8889/app/index.html";
/// Default request timeout.
pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Retries after the first attempt.
pub(super) const DEFAULT_MAX_RETRIES: u32 = 3;
/// Upper bound accepted for `retry.max_retries`.
pub(super) const MAX_RETRIES_LIMIT: u32 = 16;
/// Backoff unit; retry `n` waits `2^n` units plus jitter.
pub(super) const DEFAULT_BASE_DELAY_MS: u64 = 1000;
/// Maximum jitter as a fraction of the backoff.
pub(super) const DEFAULT_JITTER_RATIO: f64 = 0.2;
