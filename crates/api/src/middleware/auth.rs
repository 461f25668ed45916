//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bookline_core::error::CoreError;
use bookline_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     user.require("appointments:read")?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Abilities granted to this token, split from the `scope` claim.
    pub abilities: Vec<String>,
}

impl AuthUser {
    /// Whether this token carries the given ability.
    pub fn can(&self, ability: &str) -> bool {
        self.abilities.iter().any(|a| a == ability)
    }

    /// Fail with 403 unless the token carries the given ability.
    pub fn require(&self, ability: &str) -> Result<(), AppError> {
        if self.can(ability) {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(format!(
                "Token is missing the required ability: {ability}"
            ))))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            abilities: claims.scope.split_whitespace().map(String::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(scope: &str) -> AuthUser {
        AuthUser {
            user_id: 1,
            abilities: scope.split_whitespace().map(String::from).collect(),
        }
    }

    #[test]
    fn can_matches_exact_ability() {
        let user = user_with("appointments:read appointments:write");
        assert!(user.can("appointments:read"));
        assert!(user.can("appointments:write"));
        assert!(!user.can("profile:read"));
    }

    #[test]
    fn require_rejects_missing_ability() {
        let user = user_with("profile:read");
        assert!(user.require("profile:read").is_ok());
        assert!(user.require("appointments:write").is_err());
    }

    #[test]
    fn ability_names_do_not_prefix_match() {
        let user = user_with("appointments:read");
        assert!(!user.can("appointments"));
        assert!(!user.can("appointments:readonly"));
    }
}
