use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiMessage},
    state::AppState,
    users::{
        dto::{CountResponse, UpdateProfileRequest},
        repo::User,
    },
    validate::required,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/updateProfile", post(update_profile))
        .route("/stats/loggedInUsersCount", get(logged_in_users_count))
}

/// The token gates access AND names the record being mutated: the row is
/// selected by the verified subject claim, not by the email in the body.
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiMessage>, ApiError> {
    let fields = (
        required(payload.first_name),
        required(payload.last_name),
        required(payload.email),
        required(payload.address),
        required(payload.bio),
        required(payload.dob),
        required(payload.mobile),
    );
    let (first_name, last_name, email, address, bio, dob, mobile) = match fields {
        (Some(f), Some(l), Some(e), Some(a), Some(b), Some(d), Some(m)) => {
            (f, l, e, a, b, d, m)
        }
        _ => {
            warn!(user_id = %claims.sub, "profile update rejected: missing fields");
            return Err(ApiError::Validation("All fields are mandatory.".into()));
        }
    };

    let email = email.trim().to_lowercase();
    let updated = User::update_profile(
        &state.db, claims.sub, &first_name, &last_name, &email, &address, &bio, &dob, &mobile,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(ApiMessage::ok("Profile updated successfully.")))
}

#[instrument(skip(state))]
pub async fn logged_in_users_count(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = User::count(&state.db).await?;
    Ok(Json(CountResponse {
        success: true,
        count,
    }))
}
