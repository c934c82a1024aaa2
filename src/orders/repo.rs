use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// An order is stored verbatim: whatever JSON the storefront sends becomes
/// the payload, with no field-level validation on this side.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub payload: serde_json::Value,
    pub created_at: OffsetDateTime,
}

impl Order {
    pub async fn create(db: &PgPool, payload: &serde_json::Value) -> Result<Order, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (payload)
            VALUES ($1)
            RETURNING id, payload, created_at
            "#,
        )
        .bind(payload)
        .fetch_one(db)
        .await
    }
}
