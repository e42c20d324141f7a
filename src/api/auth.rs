use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    admin: bool,
    #[allow(dead_code)]
    exp: usize,
}

/// Authenticated caller, decoded from the bearer JWT. Token issuance lives
/// in the identity service; this backend only verifies.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub admin: bool,
}

/// Same as [`AuthUser`] but rejects non-admin callers with 403.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("expected bearer token".to_string()))?;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::Unauthorized(format!("invalid token: {}", e)))?;

        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| ApiError::Unauthorized("invalid subject claim".to_string()))?;

        Ok(AuthUser {
            id,
            admin: data.claims.admin,
        })
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.admin {
            return Err(ApiError::Forbidden("admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}
