//! Environment variable overrides.
//!
//! `CONSOLE_*` variables win over every config file so deployment scripts can
//! inject the values the server would otherwise render into the page.

use crate::error::ConfigError;

use super::ConsoleConfig;

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut ConsoleConfig,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = env_lookup("CONSOLE_PAGE_URL") {
        config.server.page_url = url;
    }
    if let Some(base) = env_lookup("CONSOLE_BASE_PATH") {
        config.server.base_path = base;
    }
    if let Some(flag) = env_lookup("CONSOLE_DEVELOPMENT") {
        config.server.development = parse_bool("CONSOLE_DEVELOPMENT", &flag)?;
    }
    if let Some(org) = env_lookup("CONSOLE_ORG_ID") {
        config.auth.org_id = org;
    }
    if let Some(token) = env_lookup("CONSOLE_CSRF_TOKEN") {
        config.auth.csrf_token = token;
    }
    if let Some(template) = env_lookup("CONSOLE_AUTH_REDIRECT_TEMPLATE") {
        config.auth.redirect_template = template;
    }
    if let Some(timeout) = env_lookup("CONSOLE_TIMEOUT_SECS") {
        let parsed = timeout.trim().parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid CONSOLE_TIMEOUT_SECS value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        // A zero timeout is clamped to one second.
        config.network.timeout_secs = parsed.max(1);
    }
    Ok(())
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid(format!(
            "invalid {name} value `{raw}`: expected true/false"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = ConsoleConfig::default();
        apply_runtime_env_overrides(
            &mut config,
            &env(&[
                ("CONSOLE_PAGE_URL", "https://vr.example.com/vr/app/index.html"),
                ("CONSOLE_ORG_ID", "O42"),
                ("CONSOLE_DEVELOPMENT", "yes"),
                ("CONSOLE_TIMEOUT_SECS", "0"),
            ]),
        )
        .unwrap();
        assert_eq!(config.server.page_url, "https://vr.example.com/vr/app/index.html");
        assert_eq!(config.auth.org_id, "O42");
        assert!(config.server.development);
        assert_eq!(config.network.timeout_secs, 1);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let mut config = ConsoleConfig::default();
        let err = apply_runtime_env_overrides(&mut config, &env(&[("CONSOLE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("CONSOLE_TIMEOUT_SECS"), "{err}");

        let err = apply_runtime_env_overrides(&mut config, &env(&[("CONSOLE_DEVELOPMENT", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("CONSOLE_DEVELOPMENT"), "{err}");
    }
}
