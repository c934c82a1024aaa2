use serde::Deserialize;

/// Request body for a feedback submission. Everything is optional here so a
/// missing field becomes a collected validation message, and rating stays a
/// raw JSON value because clients send it both as a number and as a string.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub rating: Option<serde_json::Value>,
    pub message: Option<String>,
}
