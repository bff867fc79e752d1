//! Anti-forgery token and organization scoping shared by every request.
//!
//! One [`AuthContext`] lives for the lifetime of the console session. Every
//! outgoing request reads it and every response may rotate its token.
//!
//! Concurrent calls race on the token: a call that started before a rotation
//! still presents the previous token, and the last response to arrive wins.
//! The backend tolerates this, so rotations are not serialized.

use std::sync::RwLock;

/// Organization used when none is configured.
pub const DEFAULT_ORG_ID: &str = "root";

/// Prefix of a server-side template placeholder that was never rendered.
pub const UNRESOLVED_TEMPLATE_SENTINEL: &str = "{{";

#[derive(Debug, Default)]
struct AuthState {
    csrf_token: String,
    org_id: String,
}

/// Process-wide auth state: current CSRF token and active organization.
#[derive(Debug, Default)]
pub struct AuthContext {
    state: RwLock<AuthState>,
}

impl AuthContext {
    pub fn new(csrf_token: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(AuthState {
                csrf_token: csrf_token.into(),
                org_id: org_id.into(),
            }),
        }
    }

    /// Active organization, falling back to `root` when unset or unrendered.
    pub fn current_org_id(&self) -> String {
        self.state
            .read()
            .ok()
            .map(|state| state.org_id.trim().to_string())
            .filter(|org| !org.is_empty() && !is_unresolved(org))
            .unwrap_or_else(|| DEFAULT_ORG_ID.to_string())
    }

    /// Token to present, or `None` when there is nothing valid to send.
    pub fn current_csrf_token(&self) -> Option<String> {
        self.state
            .read()
            .ok()
            .map(|state| state.csrf_token.clone())
            .filter(|token| !token.is_empty() && !is_unresolved(token))
    }

    /// Replace the stored token with one returned by the server.
    ///
    /// Empty or absent tokens leave the current one in place.
    pub fn rotate_csrf_token(&self, new_token: Option<&str>) -> bool {
        let Some(token) = new_token.filter(|token| !token.is_empty()) else {
            return false;
        };
        match self.state.write() {
            Ok(mut state) => {
                if state.csrf_token != token {
                    tracing::debug!("rotated anti-forgery token");
                }
                state.csrf_token = token.to_string();
                true
            }
            Err(_) => false,
        }
    }

    /// Switch the organization used by later requests and links.
    pub fn set_org_id(&self, org_id: impl Into<String>) {
        if let Ok(mut state) = self.state.write() {
            state.org_id = org_id.into();
        }
    }
}

fn is_unresolved(value: &str) -> bool {
    value.starts_with(UNRESOLVED_TEMPLATE_SENTINEL)
}
