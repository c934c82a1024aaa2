use axum::{extract::State, routing::post, Json, Router};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    error::{ApiError, ApiMessage},
    feedback::{
        dto::FeedbackRequest,
        mirror::{mirror_timestamp, MirrorRow},
        repo::FeedbackEntry,
    },
    state::AppState,
    validate::validate_feedback,
};

pub fn feedback_routes() -> Router<AppState> {
    Router::new().route("/feedback", post(submit_feedback))
}

fn rating_as_number(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Records one feedback submission in both targets. The database insert is
/// the primary write; the spreadsheet row is enqueued to the mirror writer
/// only after the insert succeeds, and the response does not wait for it.
#[instrument(skip(state, payload))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<ApiMessage>, ApiError> {
    let rating_value = payload.rating.as_ref().and_then(rating_as_number);
    let errors = validate_feedback(
        payload.name.as_deref(),
        payload.email.as_deref(),
        rating_value,
        payload.message.as_deref(),
    );
    if !errors.is_empty() {
        warn!(violations = errors.len(), "feedback rejected");
        return Err(ApiError::Validation(errors.join(", ")));
    }

    // The validator guaranteed presence; these defaults are unreachable.
    let name = payload.name.unwrap_or_default().trim().to_string();
    let email = payload.email.unwrap_or_default().trim().to_string();
    let message = payload.message.unwrap_or_default().trim().to_string();
    let rating = rating_value.unwrap_or_default() as i32;

    let entry = FeedbackEntry::create(&state.db, &name, &email, rating, &message).await?;

    let row = MirrorRow {
        name,
        email,
        rating: rating as i64,
        message,
        date: mirror_timestamp(OffsetDateTime::now_utc()),
    };
    if let Err(e) = state.mirror.enqueue(row) {
        // The entry is already in the database; only the sheet is behind.
        error!(error = %e, id = %entry.id, "could not enqueue mirror row");
    }

    info!(id = %entry.id, email = %entry.email, "feedback recorded");
    Ok(Json(ApiMessage::ok(
        "Thank you! Your feedback has been saved successfully.",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(
        name: Option<&str>,
        email: Option<&str>,
        rating: serde_json::Value,
        message: Option<&str>,
    ) -> FeedbackRequest {
        FeedbackRequest {
            name: name.map(String::from),
            email: email.map(String::from),
            rating: Some(rating),
            message: message.map(String::from),
        }
    }

    #[tokio::test]
    async fn rejects_out_of_range_rating_before_any_write() {
        let state = AppState::fake();
        let mirror_path = state.config.mirror_path.clone();
        let payload = body(Some("A"), Some("a@b.com"), serde_json::json!(6), Some("hello"));

        let err = submit_feedback(State(state), Json(payload)).await.unwrap_err();
        let ApiError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("Rating must be between 1 and 5"));
        // Nothing reached the mirror either.
        assert!(!mirror_path.exists());
    }

    #[tokio::test]
    async fn aggregates_all_violations_into_one_message() {
        let state = AppState::fake();
        let payload = body(Some("A"), Some("nope"), serde_json::json!(0), Some("hi"));

        let err = submit_feedback(State(state), Json(payload)).await.unwrap_err();
        let ApiError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            message,
            "Name must be at least 2 characters, Valid email is required, \
             Rating must be between 1 and 5, Message must be at least 5 characters"
        );
    }

    #[test]
    fn rating_coerces_numeric_strings() {
        assert_eq!(rating_as_number(&serde_json::json!(4)), Some(4.0));
        assert_eq!(rating_as_number(&serde_json::json!("4")), Some(4.0));
        assert_eq!(rating_as_number(&serde_json::json!(" 3 ")), Some(3.0));
        assert_eq!(rating_as_number(&serde_json::json!("four")), None);
        assert_eq!(rating_as_number(&serde_json::json!(null)), None);
    }
}
