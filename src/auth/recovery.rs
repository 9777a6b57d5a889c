//! Password recovery: `forgot_password` -> `verify_otp` -> `reset_password`.
//!
//! A recovery record starts with a one-time code and a short expiry. Verifying the
//! code attaches a reset token and moves the expiry to the reset window. Resetting
//! deletes the record, so each token works once.

use chrono::Utc;

use super::{generate_otp, hash_password, issue_token};
use crate::config::AuthSettings;
use crate::error::AppError;
use crate::mail::Mailer;
use crate::models::PasswordRecovery;
use crate::store::Store;

const INVALID_OTP: &str = "OTP is invalid";
const INVALID_TOKEN: &str = "Invalid or expired token";

fn otp_mail_body(otp: &str, minutes: i64) -> String {
    format!(
        "<p>Your password reset code is <b>{}</b>.</p><p>It expires in {} minutes.</p>",
        otp, minutes
    )
}

/// Issues a recovery code for `email` and mails it.
///
/// A failed send is logged and not rolled back: the stored code stays valid.
pub async fn forgot_password(
    store: &dyn Store,
    mailer: &dyn Mailer,
    settings: &AuthSettings,
    email: &str,
) -> Result<(), AppError> {
    match store.find_user_by_email(email).await? {
        Some(user) if !user.deleted => {}
        _ => return Err(AppError::BadRequest("User not found".into())),
    }

    let otp = generate_otp();
    let recovery = PasswordRecovery::new(email.to_string(), otp.clone(), settings.otp_ttl);
    store.replace_recovery(&recovery).await?;

    let body = otp_mail_body(&otp, settings.otp_ttl.num_minutes());
    if let Err(e) = mailer.send(email, "Password reset code", &body).await {
        log::warn!("could not deliver recovery code to {}: {}", email, e);
    }
    Ok(())
}

/// Trades a valid, unexpired code for a reset token.
pub async fn verify_otp(
    store: &dyn Store,
    settings: &AuthSettings,
    email: &str,
    otp: &str,
) -> Result<String, AppError> {
    let recovery = match store.find_recovery_by_otp(email, otp).await? {
        Some(recovery) if !recovery.is_expired(Utc::now()) => recovery,
        _ => return Err(AppError::BadRequest(INVALID_OTP.into())),
    };

    let token = issue_token();
    let expires_at = Utc::now() + settings.reset_token_ttl;
    if !store
        .set_reset_token(recovery.id, &token, expires_at)
        .await?
    {
        // Another request exchanged the same code first.
        return Err(AppError::BadRequest(INVALID_OTP.into()));
    }
    Ok(token)
}

/// Sets a new password for the account the reset token was issued to, consumes
/// the token and signs the account out everywhere.
pub async fn reset_password(
    store: &dyn Store,
    settings: &AuthSettings,
    token: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let recovery = match store.find_recovery_by_token(token).await? {
        Some(recovery) if !recovery.is_expired(Utc::now()) => recovery,
        _ => return Err(AppError::BadRequest(INVALID_TOKEN.into())),
    };
    let password_hash = hash_password(new_password, settings.bcrypt_cost)?;

    // Whoever redeems the token owns the reset.
    let user_id = store
        .redeem_reset_token(&recovery.email, token, &password_hash)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN.into()))?;
    log::info!("password reset for user {}", user_id);
    Ok(())
}
