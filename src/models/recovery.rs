use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One password-recovery attempt.
///
/// The record moves through two phases: while `reset_token` is `None` it is waiting
/// for its one-time code; once the code is verified it carries a reset token and
/// `expires_at` is pushed out to the reset window. The record is deleted when the
/// password is reset, which is what makes the token single-use.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PasswordRecovery {
    pub id: Uuid,
    pub email: String,
    pub otp: String,
    pub reset_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordRecovery {
    pub fn new(email: String, otp: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            otp,
            reset_token: None,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
