//! Session-wide collaborators shared by every dispatcher call.
//!
//! Built once at startup and handed to [`crate::api::ApiClient`] by `Arc`,
//! replacing page-global state with an explicit dependency.

use std::sync::Arc;

use url::Url;

use crate::auth::AuthContext;
use crate::config::ConsoleConfig;
use crate::error::ConfigError;
use crate::hooks::NotificationHooks;
use crate::links::{encode_uri_component, HrefOptions, HrefTarget, UrlResolver};
use crate::types::Params;

/// Placeholder in the login redirect template replaced by the page URL.
pub const LOCATION_PLACEHOLDER: &str = "%LOCATION%";

/// Receives the login redirect when a session expires.
pub trait Navigator: Send + Sync {
    fn assign(&self, url: &str);
}

/// Headless navigator: there is no page to move, so the target is logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn assign(&self, url: &str) {
        tracing::warn!(%url, "session expired; sign in again at this address");
    }
}

/// Auth state, link resolution, hooks and the session-expiry template.
#[derive(Debug)]
pub struct AppContext {
    pub auth: Arc<AuthContext>,
    pub links: UrlResolver,
    pub hooks: NotificationHooks,
    auth_redirect_template: String,
}

impl AppContext {
    pub fn new(
        auth: Arc<AuthContext>,
        links: UrlResolver,
        hooks: NotificationHooks,
        auth_redirect_template: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            links,
            hooks,
            auth_redirect_template: auth_redirect_template.into(),
        }
    }

    /// Build the context described by `config`.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ConfigError> {
        let location = Url::parse(&config.server.page_url).map_err(|err| {
            ConfigError::Invalid(format!(
                "server.page_url `{}` is not an absolute URL: {err}",
                config.server.page_url
            ))
        })?;
        let auth = Arc::new(AuthContext::new(
            config.auth.csrf_token.clone(),
            config.auth.org_id.clone(),
        ));
        let links = UrlResolver::new(
            location,
            config.server.base_path.clone(),
            config.server.development,
            Arc::clone(&auth),
        );
        Ok(Self::new(
            auth,
            links,
            NotificationHooks::new(),
            config.auth.redirect_template.clone(),
        ))
    }

    /// Link builder exposed to view code.
    pub fn href(
        &self,
        target: impl Into<HrefTarget>,
        extra_params: &Params,
        options: HrefOptions,
    ) -> String {
        self.links.build_absolute_href(target, extra_params, options)
    }

    /// Login URL for an expired session, if a template is configured.
    pub fn session_redirect_url(&self) -> Option<String> {
        if self.auth_redirect_template.trim().is_empty() {
            return None;
        }
        let here = encode_uri_component(&self.links.current_href());
        Some(
            self.auth_redirect_template
                .replace(LOCATION_PLACEHOLDER, &here),
        )
    }
}
