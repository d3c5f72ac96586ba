//! Server-side settings store (a single row holding a JSON object).

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::Settings;

#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current settings; empty when nothing was ever saved.
    pub async fn get(&self) -> Result<Settings, AppError> {
        let row = sqlx::query("SELECT data FROM settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: String = row.get("data");
                serde_json::from_str(&data).map_err(|e| {
                    tracing::error!("Stored settings are unreadable: {}", e);
                    AppError::Internal("stored settings could not be decoded".to_string())
                })
            }
            None => Ok(Settings::default()),
        }
    }

    /// Replace the stored settings.
    pub async fn update(&self, settings: &Settings) -> Result<(), AppError> {
        let data = serde_json::to_string(settings)
            .map_err(|_| AppError::Internal("settings could not be encoded".to_string()))?;

        sqlx::query(
            r#"INSERT INTO settings (id, data, updated_at) VALUES (1, ?, ?)
               ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at"#,
        )
        .bind(&data)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_until_written_then_replaced() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("settings.sqlite")).await.unwrap();
        let repo = SettingsRepository::new(pool);

        assert!(repo.get().await.unwrap().is_empty());

        let mut first = Settings::default();
        first.insert("companyName", json!("Acme Garage"));
        first.insert("currency", json!("USD"));
        repo.update(&first).await.unwrap();
        assert_eq!(repo.get().await.unwrap(), first);

        let mut second = Settings::default();
        second.insert("companyName", json!("Acme Motors"));
        repo.update(&second).await.unwrap();

        let stored = repo.get().await.unwrap();
        assert_eq!(stored, second);
        assert!(stored.get("currency").is_none());
    }
}
