use serde::{Deserialize, Serialize};

/// Request body for profile updates. All seven fields are mandatory; the
/// email is stored as a field on the authenticated record and is never used
/// to select which record gets mutated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub dob: Option<String>,
    pub mobile: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub success: bool,
    pub count: i64,
}
