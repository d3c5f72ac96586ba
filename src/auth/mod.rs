//! PIN-code authentication, bearer sessions and the permission gate.
//!
//! PINs are stored only as salted argon2id hashes (PHC strings). A short
//! numeric PIN has little entropy, so every stored hash carries its own salt
//! and a memory-hard cost.

mod permissions;

pub use permissions::*;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::Config;
use crate::db::{Session, UserRepository};
use crate::errors::AppError;
use crate::models::User;
use crate::AppState;

/// Hash a PIN code for storage with a fresh random salt.
///
/// CPU and memory heavy; call it from a blocking task.
pub fn hash_pin(pin: &str, pepper: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(peppered(pin, pepper).as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash PIN code: {}", e)))
}

/// Check a PIN code against a stored hash. Malformed hashes never match.
pub fn verify_pin(pin: &str, pepper: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(peppered(pin, pepper).as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Ignoring malformed PIN hash: {}", e);
            false
        }
    }
}

fn peppered(pin: &str, pepper: &str) -> String {
    format!("{}:{}", pepper, pin)
}

/// Reject blank PINs before they reach the store.
pub fn require_pin(pin: Option<&str>) -> Result<&str, AppError> {
    pin.map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("PIN code is required".to_string()))
}

/// Find the user a PIN belongs to.
///
/// Blank input is a validation error; a PIN matching nobody is `None`.
pub async fn verify_pin_code(
    users: &UserRepository,
    pepper: &str,
    pin: Option<&str>,
) -> Result<Option<User>, AppError> {
    let pin = require_pin(pin)?;
    users.find_by_pin(pin, pepper).await
}

/// Create the bootstrap admin from the configured PIN while no user exists.
pub async fn seed_admin(users: &UserRepository, config: &Config) -> Result<Option<User>, AppError> {
    let Some(pin) = config.admin_pin.as_deref() else {
        return Ok(None);
    };
    if users.count_users().await? > 0 {
        return Ok(None);
    }

    let pin = require_pin(Some(pin))?;
    let user = users
        .create_user("Administrator", Role::Admin, pin, &config.pin_pepper)
        .await?;
    Ok(Some(user))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Who is making the request, resolved from the bearer token (if any).
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub user: Option<User>,
    pub session: Option<Session>,
}

impl Caller {
    /// Check the permission table for this caller.
    ///
    /// A no-op when enforcement is disabled in the config.
    pub fn require(&self, config: &Config, resource: Resource, action: Action) -> Result<(), AppError> {
        if !config.enforce_permissions {
            return Ok(());
        }

        let Some(user) = &self.user else {
            return Err(AppError::Unauthorized("Authentication required".to_string()));
        };

        if allows(user.role, resource, action) {
            Ok(())
        } else {
            tracing::info!(
                user_id = %user.id,
                role = user.role.as_str(),
                resource = resource.as_str(),
                action = action.as_str(),
                "Permission denied"
            );
            Err(AppError::Forbidden(format!(
                "Role {} may not {} {}",
                user.role.as_str(),
                action.as_str(),
                resource.as_str()
            )))
        }
    }

    /// The signed-in user and session, or 401.
    pub fn signed_in(&self) -> Result<(&User, &Session), AppError> {
        match (&self.user, &self.session) {
            (Some(user), Some(session)) => Ok((user, session)),
            _ => Err(AppError::Unauthorized("Session expired or invalid".to_string())),
        }
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Caller::default());
        };

        match state.users.find_session(token).await? {
            Some((session, user)) => Ok(Caller {
                user: Some(user),
                session: Some(session),
            }),
            None => {
                tracing::debug!("Unknown or expired session token presented");
                Ok(Caller::default())
            }
        }
    }
}
