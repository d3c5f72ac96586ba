//! User and session persistence.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tokio::sync::Mutex;

use crate::auth::{hash_pin, verify_pin, Role};
use crate::errors::AppError;
use crate::models::User;

/// A login session bound to one user.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: String,
    pub expires_at: DateTime<Utc>,
}

/// Users, their PIN hashes and their sessions.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    // Serializes the duplicate-PIN check with the insert.
    create_lock: Arc<Mutex<()>>,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            create_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("total"))
    }

    /// List all users ordered by name.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, role, created_at, updated_at FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, name, role, created_at, updated_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Create a user with a PIN code.
    ///
    /// A PIN alone identifies its user, so a PIN that already verifies against
    /// any stored hash is refused. The error does not say whose it is.
    pub async fn create_user(
        &self,
        name: &str,
        role: Role,
        pin: &str,
        pepper: &str,
    ) -> Result<User, AppError> {
        let _guard = self.create_lock.lock().await;

        if !self.matching_users(pin, pepper).await?.is_empty() {
            tracing::info!("Rejected user creation: PIN code collides with an existing user");
            return Err(AppError::Conflict(
                "PIN code cannot be used, choose a different one".to_string(),
            ));
        }

        let pin_hash = {
            let (pin, pepper) = (pin.to_string(), pepper.to_string());
            tokio::task::spawn_blocking(move || hash_pin(&pin, &pepper))
                .await
                .map_err(|e| AppError::Internal(format!("PIN hashing task failed: {}", e)))??
        };

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, name, role, pin_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(role.as_str())
        .bind(&pin_hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %id, role = role.as_str(), "User created");

        Ok(User {
            id,
            name: name.to_string(),
            role,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Delete a user and, through the foreign key, their sessions.
    pub async fn delete_user(&self, id: &str) -> Result<bool, AppError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find the single user a PIN code belongs to.
    ///
    /// More than one match is treated as no match.
    pub async fn find_by_pin(&self, pin: &str, pepper: &str) -> Result<Option<User>, AppError> {
        let mut matched = self.matching_users(pin, pepper).await?;

        if matched.len() > 1 {
            tracing::warn!("PIN code matches {} users; refusing login", matched.len());
            return Ok(None);
        }
        Ok(matched.pop())
    }

    // Every stored hash is verified, without stopping at the first match, so
    // timing does not reveal which user matched.
    async fn matching_users(&self, pin: &str, pepper: &str) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query("SELECT id, name, role, pin_hash, created_at, updated_at FROM users")
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(|row| Ok((user_from_row(row)?, row.get::<String, _>("pin_hash"))))
            .collect::<Result<Vec<_>, AppError>>()?;

        let (pin, pepper) = (pin.to_string(), pepper.to_string());
        tokio::task::spawn_blocking(move || {
            candidates
                .into_iter()
                .filter(|(_, stored)| verify_pin(&pin, &pepper, stored))
                .map(|(user, _)| user)
                .collect()
        })
        .await
        .map_err(|e| AppError::Internal(format!("PIN verification task failed: {}", e)))
    }

    // ==================== SESSION OPERATIONS ====================

    /// Issue a new session for `user_id`, valid for `ttl_secs`.
    pub async fn create_session(&self, user_id: &str, ttl_secs: i64) -> Result<Session, AppError> {
        let token = format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        );
        let now = Utc::now();
        let expires_at = now + Duration::seconds(ttl_secs);
        let created_at = now.to_rfc3339();

        sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(&created_at)
            .bind(expires_at.timestamp())
            .execute(&self.pool)
            .await?;

        Ok(Session {
            token,
            user_id: user_id.to_string(),
            created_at,
            expires_at,
        })
    }

    /// Resolve an unexpired session token to its session and user.
    pub async fn find_session(&self, token: &str) -> Result<Option<(Session, User)>, AppError> {
        let row = sqlx::query(
            r#"SELECT s.token, s.user_id, s.created_at AS session_created_at, s.expires_at,
                      u.id, u.name, u.role, u.created_at, u.updated_at
               FROM sessions s JOIN users u ON u.id = s.user_id
               WHERE s.token = ? AND s.expires_at > ?"#,
        )
        .bind(token)
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: i64 = row.get("expires_at");
        let session = Session {
            token: row.get("token"),
            user_id: row.get("user_id"),
            created_at: row.get("session_created_at"),
            expires_at: Utc
                .timestamp_opt(expires_at, 0)
                .single()
                .ok_or_else(|| AppError::Internal("session expiry is out of range".to_string()))?,
        };

        Ok(Some((session, user_from_row(&row)?)))
    }

    pub async fn revoke_session(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clean up expired sessions.
    pub async fn purge_expired_sessions(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, AppError> {
    let role: String = row.get("role");
    let role = Role::parse(&role)
        .ok_or_else(|| AppError::Internal(format!("unknown role {:?} in user table", role)))?;

    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        role,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn repo() -> (UserRepository, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("users.sqlite")).await.unwrap();
        (UserRepository::new(pool), dir)
    }

    #[tokio::test]
    async fn test_find_by_pin() {
        let (repo, _dir) = repo().await;
        let alice = repo
            .create_user("Alice", Role::Manager, "1111", "")
            .await
            .unwrap();
        repo.create_user("Bob", Role::Staff, "2222", "")
            .await
            .unwrap();

        let found = repo.find_by_pin("1111", "").await.unwrap();
        assert_eq!(found, Some(alice));
        assert!(repo.find_by_pin("9999", "").await.unwrap().is_none());
        assert!(repo.find_by_pin("1111", "other-pepper").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pins_are_stored_salted() {
        let (repo, _dir) = repo().await;
        repo.create_user("Alice", Role::Admin, "1111", "")
            .await
            .unwrap();

        let stored: String = sqlx::query("SELECT pin_hash FROM users")
            .fetch_one(&repo.pool)
            .await
            .unwrap()
            .get("pin_hash");
        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("1111"));
    }

    #[tokio::test]
    async fn test_duplicate_pin_is_conflict_without_naming_owner() {
        let (repo, _dir) = repo().await;
        repo.create_user("Alice", Role::Admin, "1111", "")
            .await
            .unwrap();
        let err = repo
            .create_user("Mallory", Role::Staff, "1111", "")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(!err.message().contains("Alice"));
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_pin_admit_one() {
        let (repo, _dir) = repo().await;

        let first = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.create_user("Alice", Role::Staff, "4242", "").await })
        };
        let second = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.create_user("Bob", Role::Staff, "4242", "").await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (repo, _dir) = repo().await;
        let user = repo
            .create_user("Alice", Role::Admin, "1111", "")
            .await
            .unwrap();

        let session = repo.create_session(&user.id, 60).await.unwrap();
        assert_eq!(session.token.len(), 64);

        let (resolved, owner) = repo.find_session(&session.token).await.unwrap().unwrap();
        assert_eq!(resolved.user_id, user.id);
        assert_eq!(owner.id, user.id);

        assert!(repo.revoke_session(&session.token).await.unwrap());
        assert!(repo.find_session(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_ignored_and_purged() {
        let (repo, _dir) = repo().await;
        let user = repo
            .create_user("Alice", Role::Admin, "1111", "")
            .await
            .unwrap();

        let expired = repo.create_session(&user.id, -10).await.unwrap();
        assert!(repo.find_session(&expired.token).await.unwrap().is_none());
        assert_eq!(repo.purge_expired_sessions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_user_drops_sessions() {
        let (repo, _dir) = repo().await;
        let user = repo
            .create_user("Alice", Role::Staff, "1111", "")
            .await
            .unwrap();
        let session = repo.create_session(&user.id, 60).await.unwrap();

        assert!(repo.delete_user(&user.id).await.unwrap());
        assert!(repo.find_session(&session.token).await.unwrap().is_none());
        assert_eq!(repo.count_users().await.unwrap(), 0);
    }
}
