use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, ProfileResponse, SigninRequest, SignupRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    users::repo::User,
    validate::{is_valid_email, required},
};

/// Single message for every failed credential check. Unknown email and wrong
/// password must be indistinguishable to the caller.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/profile", get(get_profile))
}

/// Splits a display name into first and last parts on the first whitespace.
fn split_name(name: &str) -> (String, Option<String>) {
    let mut parts = name.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    (first, last)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (name, email, password, confirm) = match (
        required(payload.name),
        required(payload.email),
        payload.password.filter(|p| !p.is_empty()),
        payload.confirm_password.filter(|p| !p.is_empty()),
    ) {
        (Some(n), Some(e), Some(p), Some(c)) => (n, e, p, c),
        _ => {
            warn!("signup rejected: missing fields");
            return Err(ApiError::Validation("All fields are mandatory.".into()));
        }
    };

    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "signup rejected: invalid email");
        return Err(ApiError::Validation("Valid email is required".into()));
    }
    if password.len() < 6 {
        warn!("signup rejected: password too short");
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    if password != confirm {
        warn!("signup rejected: password mismatch");
        return Err(ApiError::Validation("Passwords do not match".into()));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "signup rejected: email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&password)?;
    let (first_name, last_name) = split_name(&name);
    let user = User::create(&state.db, &email, &first_name, last_name.as_deref(), &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Account created successfully.".into(),
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password) = match (
        required(payload.email),
        payload.password.filter(|p| !p.is_empty()),
    ) {
        (Some(e), Some(p)) => (e, p),
        _ => {
            warn!("signin rejected: missing fields");
            return Err(ApiError::Validation("All fields are mandatory.".into()));
        }
    };

    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "signin rejected: invalid email");
        return Err(ApiError::Validation("Valid email is required".into()));
    }

    // Both failure branches share INVALID_CREDENTIALS so the response does
    // not reveal which check failed.
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "signin unknown email");
            return Err(ApiError::Auth(INVALID_CREDENTIALS.into()));
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "signin invalid password");
        return Err(ApiError::Auth(INVALID_CREDENTIALS.into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user signed in");
    Ok(Json(AuthResponse {
        success: true,
        message: "Signed in successfully.".into(),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: user.into(),
    }))
}
