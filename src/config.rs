use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Path of the spreadsheet file mirroring the feedback table.
    pub mirror_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "portal".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "portal-users".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let mirror_path = std::env::var("FEEDBACK_MIRROR_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("feedback.xlsx"));
        Ok(Self {
            database_url,
            jwt,
            mirror_path,
        })
    }
}
