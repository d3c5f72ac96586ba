//! Generic CRUD repository shared by every business entity.
//!
//! One `Repository<T>` per entity kind; the record body is stored as JSON in
//! the entity's own table while the id and timestamps are store-owned columns.

use std::marker::PhantomData;

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Entity, Record};

/// CRUD access to the table backing entity `T`.
pub struct Repository<T> {
    pool: SqlitePool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn table() -> &'static str {
        T::RESOURCE.as_str()
    }

    /// List every record in insertion order.
    pub async fn get_all(&self) -> Result<Vec<Record<T>>, AppError> {
        let sql = format!(
            "SELECT id, data, created_at, updated_at FROM {} ORDER BY rowid",
            Self::table()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(record_from_row::<T>).collect()
    }

    /// Get a record by ID; a miss is `None`, never an error.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Record<T>>, AppError> {
        let sql = format!(
            "SELECT id, data, created_at, updated_at FROM {} WHERE id = ?",
            Self::table()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(record_from_row::<T>).transpose()
    }

    /// Persist a new record, assigning its id and timestamps.
    pub async fn create(&self, fields: T) -> Result<Record<T>, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let data = encode(&fields)?;

        let sql = format!(
            "INSERT INTO {} (id, data, created_at, updated_at) VALUES (?, ?, ?, ?)",
            Self::table()
        );
        sqlx::query(&sql)
            .bind(&id)
            .bind(&data)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        tracing::debug!(entity = Self::table(), %id, "Record created");

        Ok(Record {
            id,
            fields,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Replace every mutable field of an existing record.
    pub async fn update(&self, id: &str, fields: T) -> Result<Record<T>, AppError> {
        let now = Utc::now().to_rfc3339();
        let data = encode(&fields)?;

        let sql = format!(
            "UPDATE {} SET data = ?, updated_at = ? WHERE id = ? RETURNING created_at",
            Self::table()
        );
        let row = sqlx::query(&sql)
            .bind(&data)
            .bind(&now)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AppError::NotFound(format!("{} not found", T::LABEL)));
        };

        Ok(Record {
            id: id.to_string(),
            fields,
            created_at: row.get("created_at"),
            updated_at: now,
        })
    }

    /// Delete a record. Returns whether a row was actually removed.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", Self::table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}

fn encode<T: Entity>(fields: &T) -> Result<String, AppError> {
    serde_json::to_string(fields).map_err(|e| {
        tracing::error!("Failed to encode {} record: {}", T::noun(), e);
        AppError::Internal("record could not be encoded".to_string())
    })
}

fn record_from_row<T: Entity>(row: &SqliteRow) -> Result<Record<T>, AppError> {
    let id: String = row.get("id");
    let data: String = row.get("data");
    let fields = serde_json::from_str(&data).map_err(|e| {
        tracing::error!("Stored {} record {} is unreadable: {}", T::noun(), id, e);
        AppError::Internal("stored record could not be decoded".to_string())
    })?;

    Ok(Record {
        id,
        fields,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
