//! Persistence boundary.
//!
//! Every read and write goes straight to a [`Store`]; nothing is cached in process.
//! Each method is a single store-level operation, atomic per record, and concurrent
//! writers to the same record resolve last-writer-wins.
//!
//! Two implementations exist: [`PgStore`] backed by Postgres through `sqlx`, and
//! [`MemoryStore`] used by tests and by the server when no database is configured.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    BulkUpdateResult, Comment, CommentWithAuthor, NewUser, Notification, PasswordRecovery, Role,
    Session, Task, TaskQuery, User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn Store>;

pub(crate) const DUPLICATE_EMAIL: &str = "User already exists";

#[async_trait]
pub trait Store: Send + Sync {
    // Users

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    /// Fails with `BadRequest("User already exists")` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<bool, AppError>;

    // Sessions

    async fn insert_session(&self, session: &Session) -> Result<(), AppError>;
    async fn find_session(&self, token: &str) -> Result<Option<Session>, AppError>;
    async fn delete_session(&self, token: &str) -> Result<bool, AppError>;
    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64, AppError>;

    // Tasks

    /// Tasks matching the query, newest first.
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, AppError>;
    /// Looks up a task by id, including soft-deleted ones.
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;
    async fn insert_task(&self, task: &Task) -> Result<(), AppError>;
    /// Overwrites the mutable fields of a live task. Returns `false` when the task
    /// is missing or soft-deleted.
    async fn save_task(&self, task: &Task) -> Result<bool, AppError>;
    async fn update_task_status(&self, id: Uuid, status: &str) -> Result<Option<Task>, AppError>;
    /// Sets `status` on every live task whose id is in `ids`; unknown ids are skipped.
    async fn update_status_many(
        &self,
        ids: &[Uuid],
        status: &str,
    ) -> Result<BulkUpdateResult, AppError>;
    async fn soft_delete_task(&self, id: Uuid) -> Result<bool, AppError>;

    // Comments

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError>;
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, AppError>;
    /// Comments on a task, oldest first.
    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<CommentWithAuthor>, AppError>;
    async fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<Comment>, AppError>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool, AppError>;

    // Notifications

    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError>;
    /// A user's notifications, newest first.
    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError>;
    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, AppError>;
    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, AppError>;

    // Password recovery

    /// Stores a fresh recovery record, dropping any earlier one for the same email.
    async fn replace_recovery(&self, recovery: &PasswordRecovery) -> Result<(), AppError>;
    /// The pending (not yet exchanged) record carrying this code.
    async fn find_recovery_by_otp(
        &self,
        email: &str,
        otp: &str,
    ) -> Result<Option<PasswordRecovery>, AppError>;
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
    async fn find_recovery_by_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordRecovery>, AppError>;
    /// Consumes the record for `email` carrying `token` in one step: the account
    /// gets the new password, the record is removed and every session of the
    /// account is dropped. Returns `None` with nothing changed when the record or
    /// the account is gone.
    async fn redeem_reset_token(
        &self,
        email: &str,
        token: &str,
        password_hash: &str,
    ) -> Result<Option<Uuid>, AppError>;
}
