//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use url::Url;

use crate::auth::UNRESOLVED_TEMPLATE_SENTINEL;
use crate::error::ConfigError;

use super::defaults::MAX_RETRIES_LIMIT;
use super::env::apply_runtime_env_overrides;
use super::sources::read_config_text_with_sources;
use super::{config_root_dir, ConfigDiagnostics, ConsoleConfig, LoadedConfig};

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<ConsoleConfig, ConfigError> {
    Ok(load_config_with_diagnostics(path_override)?.config)
}

/// Load configuration and return non-fatal diagnostics.
pub fn load_config_with_diagnostics(
    path_override: Option<&str>,
) -> Result<LoadedConfig, ConfigError> {
    load_config_with_diagnostics_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_with_diagnostics_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    tracing::debug!(?source, "loading console config");
    let mut config: ConsoleConfig = toml::from_str(&config_text)?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;

    let mut diagnostics = ConfigDiagnostics::default();
    collect_unrendered_warnings(&config, &mut diagnostics);

    Ok(LoadedConfig {
        config,
        diagnostics,
    })
}

fn validate(config: &ConsoleConfig) -> Result<(), ConfigError> {
    let page = Url::parse(&config.server.page_url).map_err(|err| {
        ConfigError::Invalid(format!(
            "server.page_url `{}` is not an absolute URL: {err}",
            config.server.page_url
        ))
    })?;
    if page.cannot_be_a_base() {
        return Err(ConfigError::Invalid(format!(
            "server.page_url `{}` cannot serve as a base for API paths",
            config.server.page_url
        )));
    }
    if config.retry.max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::Invalid(format!(
            "retry.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
            config.retry.max_retries
        )));
    }
    // The last backoff, doubled to cover jitter, must fit in u64 milliseconds.
    let longest_backoff = 1u64
        .checked_shl(config.retry.max_retries)
        .and_then(|factor| config.retry.base_delay_ms.checked_mul(factor))
        .and_then(|ms| ms.checked_mul(2));
    if longest_backoff.is_none() {
        return Err(ConfigError::Invalid(format!(
            "retry.base_delay_ms {} is too large for {} retries",
            config.retry.base_delay_ms, config.retry.max_retries
        )));
    }
    if !(0.0..=1.0).contains(&config.retry.jitter_ratio) {
        return Err(ConfigError::Invalid(format!(
            "retry.jitter_ratio must be within 0.0..=1.0, got {}",
            config.retry.jitter_ratio
        )));
    }
    Ok(())
}

/// Values still holding a template placeholder silently fall back at runtime;
/// surface that so a broken page render is noticed.
fn collect_unrendered_warnings(config: &ConsoleConfig, diagnostics: &mut ConfigDiagnostics) {
    if config.auth.org_id.starts_with(UNRESOLVED_TEMPLATE_SENTINEL) {
        diagnostics.warnings.push(format!(
            "auth.org_id `{}` is an unrendered template; requests will use `root`.",
            config.auth.org_id
        ));
    }
    if config.auth.csrf_token.starts_with(UNRESOLVED_TEMPLATE_SENTINEL) {
        diagnostics.warnings.push(
            "auth.csrf_token is an unrendered template; the first request is sent without X-CSRF-Token."
                .to_string(),
        );
    }
}
