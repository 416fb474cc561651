use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use log::info;
use tower_cookies::{Cookie, Cookies};
use validator::Validate;

use crate::{
    app::AppState,
    error::AppError,
    middleware::{CurrentUser, AUTH_COOKIE},
    models::{CreateUser, LoginRequest, TokenResponse, User, UserResponse},
    utils::{create_token, hash_password, verify_password},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(form) = payload?;
    form.validate()?;

    let password_hash = hash_password(&form.password, state.config.bcrypt_cost)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .users
        .create_user(form.name.trim(), form.email.trim(), &password_hash)
        .await?;

    info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(form) = payload?;
    form.validate()?;

    let user = authenticate_user(&state, form.email.trim(), &form.password).await?;

    let token = create_token(
        user.id,
        user.email.clone(),
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    // Set HTTP-only cookie so the server-rendered dashboard can authenticate too
    let cookie = Cookie::build((AUTH_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(state.config.token_ttl_hours))
        .build();
    cookies.add(cookie);

    Ok(Json(TokenResponse { token }))
}

pub async fn logout(cookies: Cookies) -> StatusCode {
    cookies.remove(Cookie::build((AUTH_COOKIE, "")).path("/").build());
    StatusCode::NO_CONTENT
}

pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find_user(current_user.id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}

async fn authenticate_user(state: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    let user = state
        .users
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

    if verify_password(password, &user.password_hash).unwrap_or(false) {
        Ok(user)
    } else {
        Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()))
    }
}
