//! Request authentication extractor.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but malformed
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.native.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    Err(_) => {
                        // Invalid/expired token, keep checking other cookies.
                        // Expired tokens are expected, so the error isn't propagated.
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        if !state.config.auth.native.enabled {
            trace!("Native authentication is disabled");
            return Err(Error::Unauthenticated { message: None });
        }

        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found JWT session authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("JWT session authentication failed: {:?}", e);
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No authentication credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

impl CurrentUser {
    /// Check that this user may act on resources owned by `owner_id`.
    /// Admins may act on anything; everyone else only on their own resources.
    pub fn require_owner(
        &self,
        owner_id: crate::types::UserId,
        action: crate::types::Operation,
        resource: &str,
    ) -> Result<()> {
        if self.is_admin || self.id == owner_id {
            Ok(())
        } else {
            Err(Error::InsufficientPermissions {
                required: crate::types::Permission::Allow(crate::types::Resource::Plants, action),
                action,
                resource: resource.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Operation;
    use uuid::Uuid;

    fn user(is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            name: "User".to_string(),
            is_admin,
        }
    }

    #[test]
    fn test_cookie_parsing_finds_session_among_others() {
        let config = crate::config::Config {
            secret_key: Some("test-secret".to_string()),
            ..Default::default()
        };
        let current = user(false);
        let token = session::create_session_token(&current, &config).unwrap();

        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(
                axum::http::header::COOKIE,
                format!("other=1; {}={}; theme=dark", config.auth.native.session.cookie_name, token),
            )
            .body(())
            .unwrap();
        let (parts, _body) = request.into_parts();

        let extracted = try_jwt_session_auth(&parts, &config).unwrap().unwrap();
        assert_eq!(extracted.id, current.id);
    }

    #[test]
    fn test_missing_cookie_is_none() {
        let config = crate::config::Config::default();
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (parts, _body) = request.into_parts();

        assert!(try_jwt_session_auth(&parts, &config).is_none());
    }

    #[test]
    fn test_require_owner() {
        let owner = user(false);
        assert!(owner.require_owner(owner.id, Operation::UpdateOwn, "plant").is_ok());

        let other = Uuid::new_v4();
        let err = owner.require_owner(other, Operation::UpdateOwn, "plant").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);

        let admin = user(true);
        assert!(admin.require_owner(other, Operation::DeleteOwn, "plant").is_ok());
    }
}
