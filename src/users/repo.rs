use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Profile updates select their row by id alone. The email is one of the
/// values being written, never part of the WHERE clause.
const UPDATE_PROFILE_SQL: &str = r#"
    UPDATE users
    SET first_name = $2, last_name = $3, email = $4, address = $5,
        bio = $6, dob = $7, mobile = $8, updated_at = now()
    WHERE id = $1
    RETURNING id, email, first_name, last_name, password_hash,
              mobile, dob, bio, address, created_at, updated_at
"#;

/// Credential record. The password hash never leaves the process: it is
/// skipped on serialization and the public projection drops it entirely.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub mobile: Option<String>,
    pub dob: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, password_hash,
                   mobile, dob, bio, address, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, password_hash,
                   mobile, dob, bio, address, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        first_name: &str,
        last_name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, first_name, last_name, password_hash,
                      mobile, dob, bio, address, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Overwrites the profile fields of the record named by `id`. The caller
    /// derives `id` from the verified token subject; the email here is just
    /// another field being stored, never the row selector.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
        address: &str,
        bio: &str,
        dob: &str,
        mobile: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(UPDATE_PROFILE_SQL)
            .bind(id)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(address)
            .bind(bio)
            .bind(dob)
            .bind(mobile)
            .fetch_optional(db)
            .await
    }

    pub async fn count(db: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await
    }
}
