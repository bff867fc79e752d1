//! Compile-time build metadata for `console-api --version`.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("CONSOLE_API_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("CONSOLE_API_BUILD_TIMESTAMP");

/// Render the multi-line version block.
pub fn cli_version_text() -> String {
    format!("console-api {VERSION}\ncommit: {GIT_COMMIT}\nbuilt: {BUILD_TIMESTAMP}")
}
