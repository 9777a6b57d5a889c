//! Credential checks and session lifecycle.
//!
//! A session is a row keyed by an opaque token. Logging in always rotates: the
//! user's previous sessions are dropped before the new one is stored, so at most
//! one token per user resolves at a time.

use chrono::Utc;
use uuid::Uuid;

use super::{hash_password, issue_token, verify_password, LoginRequest, RegisterRequest};
use crate::config::AuthSettings;
use crate::error::AppError;
use crate::models::{AuthenticatedUser, NewUser, Role, Session, User};
use crate::store::{Store, DUPLICATE_EMAIL};

const UNAUTHENTICATED: &str = "Unauthorized";

async fn start_session(
    store: &dyn Store,
    settings: &AuthSettings,
    user_id: Uuid,
) -> Result<String, AppError> {
    let session = Session::new(issue_token(), user_id, settings.session_ttl);
    store.insert_session(&session).await?;
    Ok(session.token)
}

/// Creates a member account and signs it in.
pub async fn register(
    store: &dyn Store,
    settings: &AuthSettings,
    request: RegisterRequest,
) -> Result<(User, String), AppError> {
    if store.find_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_EMAIL.into()));
    }

    let password_hash = hash_password(&request.password, settings.bcrypt_cost)?;
    let user = store
        .insert_user(NewUser {
            full_name: request.full_name,
            email: request.email,
            password_hash,
            role: Role::Member,
        })
        .await?;

    let token = start_session(store, settings, user.id).await?;
    log::info!("registered user {}", user.id);
    Ok((user, token))
}

/// Checks credentials and issues a fresh token, revoking any earlier one.
pub async fn login(
    store: &dyn Store,
    settings: &AuthSettings,
    request: LoginRequest,
) -> Result<String, AppError> {
    let user = match store.find_user_by_email(&request.email).await? {
        Some(user) if !user.deleted => user,
        _ => return Err(AppError::BadRequest("User not found".into())),
    };

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid password".into()));
    }

    let revoked = store.delete_user_sessions(user.id).await?;
    if revoked > 0 {
        log::debug!("rotated {} session(s) for user {}", revoked, user.id);
    }
    start_session(store, settings, user.id).await
}

/// Binds a bearer token to the identity it was issued for.
pub async fn resolve(store: &dyn Store, token: &str) -> Result<AuthenticatedUser, AppError> {
    let session = store
        .find_session(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized(UNAUTHENTICATED.into()))?;

    if session.is_expired(Utc::now()) {
        store.delete_session(token).await?;
        return Err(AppError::Unauthorized("Session expired".into()));
    }

    match store.find_user(session.user_id).await? {
        Some(user) if !user.deleted => Ok(user.into()),
        _ => Err(AppError::Unauthorized(UNAUTHENTICATED.into())),
    }
}

/// Drops every session of the user; the old token stops resolving immediately.
pub async fn logout(store: &dyn Store, user_id: Uuid) -> Result<(), AppError> {
    store.delete_user_sessions(user_id).await?;
    Ok(())
}
