//! Session headers attached to every outgoing request.
//!
//! Headers are materialized per attempt so a retry presents the newest token.

use crate::auth::AuthContext;

/// Request header naming the active organization.
pub const ORG_ID_HEADER: &str = "Grpc-Metadata-OrgId";
/// Request header carrying the anti-forgery token.
pub const CSRF_REQUEST_HEADER: &str = "X-CSRF-Token";

/// Organization header always; CSRF header only when a usable token exists.
pub(super) fn session_headers(auth: &AuthContext) -> Vec<(&'static str, String)> {
    let mut headers = vec![(ORG_ID_HEADER, auth.current_org_id())];
    if let Some(token) = auth.current_csrf_token() {
        headers.push((CSRF_REQUEST_HEADER, token));
    }
    headers
}
