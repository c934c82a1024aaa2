use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub message: String,
    pub submitted_at: OffsetDateTime,
}

impl FeedbackEntry {
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        rating: i32,
        message: &str,
    ) -> Result<FeedbackEntry, sqlx::Error> {
        sqlx::query_as::<_, FeedbackEntry>(
            r#"
            INSERT INTO feedback (name, email, rating, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, rating, message, submitted_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(rating)
        .bind(message)
        .fetch_one(db)
        .await
    }
}
