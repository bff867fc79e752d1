//! Mount-path discovery and link building.
//!
//! The console may be served from any prefix behind a reverse proxy. Every
//! API call, asset and clickable link is resolved against the *base path*,
//! the part of the page location in front of `/app`.

pub mod query;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::types::Params;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use url::Url;

/// First path segments served by the console backend itself.
pub const INTERNAL_ROUTES: &[&str] = &[
    "api",
    "app",
    "notebooks",
    "downloads",
    "hunts",
    "clients",
    "auth",
];

/// Query parameter carrying the organization on links.
pub const ORG_ID_PARAM: &str = "org_id";

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode one URL component.
pub fn encode_uri_component(component: &str) -> String {
    utf8_percent_encode(component, URI_COMPONENT).to_string()
}

/// Percent-encode every `/`-separated component of `path`, keeping slashes.
pub fn encode_url_path(path: &str) -> String {
    path.split('/')
        .map(encode_uri_component)
        .collect::<Vec<_>>()
        .join("/")
}

/// Link target: a raw string or an already parsed URL.
#[derive(Debug, Clone)]
pub enum HrefTarget {
    Raw(String),
    Parsed(Url),
}

impl From<&str> for HrefTarget {
    fn from(value: &str) -> Self {
        Self::Raw(value.to_string())
    }
}

impl From<String> for HrefTarget {
    fn from(value: String) -> Self {
        Self::Raw(value)
    }
}

impl From<Url> for HrefTarget {
    fn from(value: Url) -> Self {
        Self::Parsed(value)
    }
}

/// Options for [`UrlResolver::build_absolute_href`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HrefOptions {
    /// Treat the target as an in-app link even if it is not root-relative.
    pub internal: bool,
}

impl HrefOptions {
    pub fn internal() -> Self {
        Self { internal: true }
    }
}

/// Resolves API endpoints, assets and links against the page location.
#[derive(Debug)]
pub struct UrlResolver {
    location: RwLock<Url>,
    base_path_override: String,
    development: bool,
    auth: Arc<AuthContext>,
}

impl UrlResolver {
    pub fn new(
        location: Url,
        base_path_override: impl Into<String>,
        development: bool,
        auth: Arc<AuthContext>,
    ) -> Self {
        Self {
            location: RwLock::new(location),
            base_path_override: base_path_override.into(),
            development,
            auth,
        }
    }

    /// Current page location.
    pub fn location(&self) -> Url {
        match self.location.read() {
            Ok(location) => location.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Record an in-page navigation.
    pub fn set_location(&self, location: Url) {
        if let Ok(mut current) = self.location.write() {
            *current = location;
        }
    }

    pub fn current_href(&self) -> String {
        self.location().to_string()
    }

    /// Prefix under which the application is mounted.
    pub fn base_path(&self) -> String {
        if self.development {
            return String::new();
        }
        if !self.base_path_override.is_empty() {
            return self.base_path_override.clone();
        }
        let location = self.location();
        let path = location.path();
        match path.find("/app") {
            Some(index) => path[..index].to_string(),
            None => path.to_string(),
        }
    }

    /// Absolute address of API endpoint `path` (e.g. `v1/GetFoo`).
    pub fn api_url(&self, path: &str) -> Result<Url, ApiError> {
        let location = self.location();
        let base = self.base_path();
        let relative = format!(
            "{}/api/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        location
            .join(&relative)
            .map_err(|err| ApiError::InvalidRequest(format!("bad API path `{path}`: {err}")))
    }

    /// Prefix a static asset path with the base path.
    ///
    /// Embedded `data:` URIs and already prefixed paths are returned as is.
    pub fn resolve_static_asset(&self, path: &str) -> String {
        if path.starts_with("data") {
            return path.to_string();
        }
        let base = self.base_path();
        let base = base.trim_end_matches('/');
        if base.is_empty() || path == base || path.starts_with(&format!("{base}/")) {
            return path.to_string();
        }
        format!("{base}/{}", path.trim_start_matches('/'))
    }

    /// Build a clickable link for `target`.
    ///
    /// Root-relative and `internal` targets get the active `org_id`, are
    /// re-rooted under the base path, and fall back to the loaded page when
    /// they do not name a known route. Anything else is returned unchanged.
    pub fn build_absolute_href(
        &self,
        target: impl Into<HrefTarget>,
        extra_params: &Params,
        options: HrefOptions,
    ) -> String {
        let location = self.location();
        let (url, fragment, root_relative) = match target.into() {
            HrefTarget::Parsed(url) => {
                let fragment = url.fragment().map(str::to_string);
                (url, fragment, false)
            }
            HrefTarget::Raw(raw) => {
                if raw.trim().is_empty() {
                    return location.to_string();
                }
                let root_relative = raw.starts_with('/') && !raw.starts_with("//");
                if !root_relative && !options.internal {
                    return raw;
                }
                let (before_fragment, fragment) = match raw.split_once('#') {
                    Some((head, tail)) => (head, Some(tail.to_string())),
                    None => (raw.as_str(), None),
                };
                match location.join(before_fragment) {
                    Ok(url) => (url, fragment, root_relative),
                    Err(err) => {
                        tracing::debug!("leaving unparseable link `{raw}` unchanged: {err}");
                        return raw;
                    }
                }
            }
        };
        if !root_relative && !options.internal {
            return url.to_string();
        }

        let mut pairs: Vec<(String, Value)> = url
            .query()
            .map(query::parse)
            .unwrap_or_default()
            .into_iter()
            .filter(|(key, _)| !extra_params.contains_key(key))
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        pairs.extend(
            extra_params
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        if !pairs.iter().any(|(key, _)| key == ORG_ID_PARAM) {
            pairs.push((
                ORG_ID_PARAM.to_string(),
                Value::String(self.auth.current_org_id()),
            ));
        }

        let path = self.rewrite_internal_path(url.path(), &location);
        let query = query::serialize(pairs.iter().map(|(key, value)| (key.as_str(), value)));

        let mut href = format!("{}{}", url.origin().ascii_serialization(), path);
        if !query.is_empty() {
            href.push('?');
            href.push_str(&query);
        }
        if let Some(fragment) = fragment {
            href.push('#');
            href.push_str(&fragment);
        }
        href
    }

    fn rewrite_internal_path(&self, path: &str, location: &Url) -> String {
        let base = self.base_path();
        let base = base.trim_end_matches('/');
        let rest = if !base.is_empty() && (path == base || path.starts_with(&format!("{base}/"))) {
            &path[base.len()..]
        } else {
            path
        };
        let rerooted = format!("/{}", rest.trim_start_matches('/'));
        let route = rerooted[1..].split('/').next().unwrap_or_default();

        if !INTERNAL_ROUTES.contains(&route) {
            return location.path().to_string();
        }
        // `/app` is the single-page entry point; keep the page that is
        // already loaded so the fragment router resumes in place.
        if route == "app" && location.path().starts_with(&format!("{base}/app")) {
            return location.path().to_string();
        }
        format!("{base}{rerooted}")
    }
}
