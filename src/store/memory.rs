use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, DUPLICATE_EMAIL};
use crate::error::AppError;
use crate::models::{
    BulkUpdateResult, Comment, CommentWithAuthor, NewUser, Notification, PasswordRecovery, Role,
    Session, Task, TaskQuery, User, UserSummary,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, Session>,
    tasks: HashMap<Uuid, Task>,
    comments: HashMap<Uuid, Comment>,
    notifications: Vec<Notification>,
    recoveries: Vec<PasswordRecovery>,
}

/// In-process `Store`. Each method takes the lock once, so every operation is
/// atomic with respect to the others, matching the per-row atomicity of Postgres.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL.into()));
        }
        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.role = role;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn insert_session(&self, session: &Session) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables
            .sessions
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        Ok(self.tables.read().await.sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<bool, AppError> {
        Ok(self.tables.write().await.sessions.remove(token).is_some())
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .tasks
            .insert(task.id, task.clone());
        Ok(())
    }

    async fn save_task(&self, task: &Task) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.tasks.get_mut(&task.id) {
            Some(stored) if !stored.deleted => {
                stored.title = task.title.clone();
                stored.content = task.content.clone();
                stored.status = task.status.clone();
                stored.participants = task.participants.clone();
                stored.parent_id = task.parent_id;
                stored.updated_at = task.updated_at;
                true
            }
            _ => false,
        })
    }

    async fn update_task_status(&self, id: Uuid, status: &str) -> Result<Option<Task>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.tasks.get_mut(&id) {
            Some(task) if !task.deleted => {
                task.status = status.to_string();
                task.updated_at = Utc::now();
                Some(task.clone())
            }
            _ => None,
        })
    }

    async fn update_status_many(
        &self,
        ids: &[Uuid],
        status: &str,
    ) -> Result<BulkUpdateResult, AppError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut result = BulkUpdateResult {
            matched: 0,
            modified: 0,
        };
        for task in tables.tasks.values_mut() {
            if task.deleted || !ids.contains(&task.id) {
                continue;
            }
            result.matched += 1;
            if task.status != status {
                task.status = status.to_string();
                task.updated_at = now;
                result.modified += 1;
            }
        }
        Ok(result)
    }

    async fn soft_delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.tasks.get_mut(&id) {
            Some(task) => {
                task.deleted = true;
                task.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .comments
            .insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, AppError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<CommentWithAuthor>, AppError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<CommentWithAuthor> = tables
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .map(|c| CommentWithAuthor {
                comment: c.clone(),
                author: tables.users.get(&c.author_id).map(|u| UserSummary {
                    id: u.id,
                    full_name: u.full_name.clone(),
                    email: u.email.clone(),
                }),
            })
            .collect();
        comments.sort_by(|a, b| a.comment.created_at.cmp(&b.comment.created_at));
        Ok(comments)
    }

    async fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<Comment>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.get_mut(&id).map(|comment| {
            comment.content = content.to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let tables = self.tables.read().await;
        // Insertion order breaks ties between equal timestamps.
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let mut count = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            count += 1;
        }
        Ok(count)
    }

    async fn replace_recovery(&self, recovery: &PasswordRecovery) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.recoveries.retain(|r| r.email != recovery.email);
        tables.recoveries.push(recovery.clone());
        Ok(())
    }

    async fn find_recovery_by_otp(
        &self,
        email: &str,
        otp: &str,
    ) -> Result<Option<PasswordRecovery>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recoveries
            .iter()
            .find(|r| r.email == email && r.otp == otp && r.reset_token.is_none())
            .cloned())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(
            match tables
                .recoveries
                .iter_mut()
                .find(|r| r.id == id && r.reset_token.is_none())
            {
                Some(record) => {
                    record.reset_token = Some(token.to_string());
                    record.expires_at = expires_at;
                    true
                }
                None => false,
            },
        )
    }

    async fn find_recovery_by_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordRecovery>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recoveries
            .iter()
            .find(|r| r.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn redeem_reset_token(
        &self,
        email: &str,
        token: &str,
        password_hash: &str,
    ) -> Result<Option<Uuid>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables
            .recoveries
            .iter()
            .any(|r| r.email == email && r.reset_token.as_deref() == Some(token))
        {
            return Ok(None);
        }
        let user_id = match tables.users.values_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                user.id
            }
            None => return Ok(None),
        };
        tables.recoveries.retain(|r| r.email != email);
        tables.sessions.retain(|_, s| s.user_id != user_id);
        Ok(Some(user_id))
    }
}
