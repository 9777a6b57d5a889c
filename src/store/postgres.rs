use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::models::{
    BulkUpdateResult, Comment, CommentWithAuthor, NewUser, Notification, PasswordRecovery, Role,
    Session, Task, TaskQuery, User, UserSummary,
};

const USER_COLUMNS: &str =
    "id, full_name, email, password_hash, role, deleted, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, content, status, created_by, participants, parent_id, deleted, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, content, task_id, author_id, created_at, updated_at";
const NOTIFICATION_COLUMNS: &str = "id, user_id, message, link, is_read, created_at";
const RECOVERY_COLUMNS: &str = "id, email, otp, reset_token, expires_at, created_at";

/// `ILIKE` pattern matching `search` as a literal substring.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `Store` over a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and applies the bundled migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
        Ok(Self::new(pool))
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    content: String,
    task_id: Uuid,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_full_name: Option<String>,
    author_email: Option<String>,
}

impl From<CommentRow> for CommentWithAuthor {
    fn from(row: CommentRow) -> Self {
        let author = match (row.author_full_name, row.author_email) {
            (Some(full_name), Some(email)) => Some(UserSummary {
                id: row.author_id,
                full_name,
                email,
            }),
            _ => None,
        };
        Self {
            comment: Comment {
                id: row.id,
                content: row.content,
                task_id: row.task_id,
                author_id: row.author_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            author,
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, full_name, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );
        // A unique violation on users_email_key surfaces as the duplicate-email error.
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2")
            .bind(role)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_session(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, issued_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        Ok(sqlx::query_as::<_, Session>(
            "SELECT token, user_id, issued_at, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_session(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        // Conditions are appended in the same order the values are bound below.
        let mut sql = format!("SELECT {} FROM tasks WHERE TRUE", TASK_COLUMNS);
        let mut param_count = 1;

        if !query.include_deleted {
            sql.push_str(" AND deleted = FALSE");
        }
        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${}", param_count));
            param_count += 1;
        }
        if query.parent_id.is_some() {
            sql.push_str(&format!(" AND parent_id = ${}", param_count));
            param_count += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${0} OR content ILIKE ${0})",
                param_count
            ));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query_builder = sqlx::query_as::<_, Task>(&sql);
        if let Some(status) = &query.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(parent_id) = query.parent_id {
            query_builder = query_builder.bind(parent_id);
        }
        if let Some(search) = &query.search {
            query_builder = query_builder.bind(like_pattern(search));
        }

        Ok(query_builder.fetch_all(&self.pool).await?)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO tasks (id, title, content, status, created_by, participants, parent_id, deleted, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.content)
        .bind(&task.status)
        .bind(task.created_by)
        .bind(&task.participants)
        .bind(task.parent_id)
        .bind(task.deleted)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_task(&self, task: &Task) -> Result<bool, AppError> {
        // created_by is immutable.
        let result = sqlx::query(
            "UPDATE tasks
             SET title = $1, content = $2, status = $3, participants = $4, parent_id = $5, updated_at = $6
             WHERE id = $7 AND deleted = FALSE",
        )
        .bind(&task.title)
        .bind(&task.content)
        .bind(&task.status)
        .bind(&task.participants)
        .bind(task.parent_id)
        .bind(task.updated_at)
        .bind(task.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_task_status(&self, id: Uuid, status: &str) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks SET status = $1, updated_at = NOW()
             WHERE id = $2 AND deleted = FALSE
             RETURNING {}",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_status_many(
        &self,
        ids: &[Uuid],
        status: &str,
    ) -> Result<BulkUpdateResult, AppError> {
        let (matched, modified) = sqlx::query_as::<_, (i64, i64)>(
            "WITH matched AS (
                 SELECT id, status FROM tasks WHERE id = ANY($1) AND deleted = FALSE FOR UPDATE
             ), updated AS (
                 UPDATE tasks t SET status = $2, updated_at = NOW()
                 FROM matched m
                 WHERE t.id = m.id AND m.status <> $2
                 RETURNING t.id
             )
             SELECT (SELECT COUNT(*) FROM matched), (SELECT COUNT(*) FROM updated)",
        )
        .bind(ids.to_vec())
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(BulkUpdateResult {
            matched: matched as u64,
            modified: modified as u64,
        })
    }

    async fn soft_delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE tasks SET deleted = TRUE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO comments (id, content, task_id, author_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(comment.id)
        .bind(&comment.content)
        .bind(comment.task_id)
        .bind(comment.author_id)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, AppError> {
        let sql = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<CommentWithAuthor>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.content, c.task_id, c.author_id, c.created_at, c.updated_at,
                    u.full_name AS author_full_name, u.email AS author_email
             FROM comments c
             LEFT JOIN users u ON u.id = c.author_id
             WHERE c.task_id = $1
             ORDER BY c.created_at ASC",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CommentWithAuthor::from).collect())
    }

    async fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<Comment>, AppError> {
        let sql = format!(
            "UPDATE comments SET content = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            COMMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(content)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, message, link, is_read, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.message)
        .bind(&notification.link)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let sql = format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, AppError> {
        let sql = format!(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTIFICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn replace_recovery(&self, recovery: &PasswordRecovery) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM password_recoveries WHERE email = $1")
            .bind(&recovery.email)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO password_recoveries (id, email, otp, reset_token, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(recovery.id)
        .bind(&recovery.email)
        .bind(&recovery.otp)
        .bind(&recovery.reset_token)
        .bind(recovery.expires_at)
        .bind(recovery.created_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_recovery_by_otp(
        &self,
        email: &str,
        otp: &str,
    ) -> Result<Option<PasswordRecovery>, AppError> {
        let sql = format!(
            "SELECT {} FROM password_recoveries
             WHERE email = $1 AND otp = $2 AND reset_token IS NULL",
            RECOVERY_COLUMNS
        );
        Ok(sqlx::query_as::<_, PasswordRecovery>(&sql)
            .bind(email)
            .bind(otp)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE password_recoveries SET reset_token = $1, expires_at = $2
             WHERE id = $3 AND reset_token IS NULL",
        )
        .bind(token)
        .bind(expires_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_recovery_by_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordRecovery>, AppError> {
        let sql = format!(
            "SELECT {} FROM password_recoveries WHERE reset_token = $1",
            RECOVERY_COLUMNS
        );
        Ok(sqlx::query_as::<_, PasswordRecovery>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn redeem_reset_token(
        &self,
        email: &str,
        token: &str,
        password_hash: &str,
    ) -> Result<Option<Uuid>, AppError> {
        let mut tx = self.pool.begin().await?;
        let consumed = sqlx::query(
            "DELETE FROM password_recoveries WHERE email = $1 AND reset_token = $2",
        )
        .bind(email)
        .bind(token)
        .execute(&mut *tx)
        .await?;
        if consumed.rows_affected() == 0 {
            return Ok(None);
        }
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "UPDATE users SET password_hash = $1, updated_at = NOW()
             WHERE email = $2 RETURNING id",
        )
        .bind(password_hash)
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;
        // Dropping the transaction without commit keeps the record.
        let user_id = match user_id {
            Some(id) => id,
            None => return Ok(None),
        };
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(user_id))
    }
}
