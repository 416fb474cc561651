use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{app::AppState, error::AppError, utils::verify_token};

pub const AUTH_COOKIE: &str = "auth_token";

/// The authenticated caller, taken from `Authorization: Bearer <jwt>` or the
/// `auth_token` cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or(AppError::Unauthorized)?;

        let claims = verify_token(&token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized)?;

        let id = claims.user_id().ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            id,
            email: claims.email,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let cookies = parts.extensions.get::<Cookies>()?;
    cookies.get(AUTH_COOKIE).map(|cookie| cookie.value().to_string())
}
