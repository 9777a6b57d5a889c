use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Status given to tasks created without one.
pub const DEFAULT_STATUS: &str = "initial";

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,

    /// Free-form status; defaults to `"initial"`.
    #[validate(length(min = 1, max = 50))]
    pub status: Option<String>,

    #[serde(default)]
    pub participants: Vec<Uuid>,

    /// Makes the new task a subtask of an existing one.
    pub parent_id: Option<Uuid>,
}

/// Partial update of a task. Absent fields are left untouched; the creator
/// cannot be changed.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub status: Option<String>,
    pub participants: Option<Vec<Uuid>>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct StatusUpdateRequest {
    #[validate(length(min = 1, max = 50))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BulkStatusUpdateRequest {
    pub ids: Vec<Uuid>,
    #[validate(length(min = 1, max = 50))]
    pub status: String,
}

/// Raw outcome of a bulk status update: how many ids matched a live task and how
/// many of those actually changed. Unmatched ids are not reported individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateResult {
    pub matched: u64,
    pub modified: u64,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: String,
    /// Identifier of the user who created the task. Never changes.
    pub created_by: Uuid,
    pub participants: Vec<Uuid>,
    pub parent_id: Option<Uuid>,
    /// Soft-delete flag; deleted tasks stay readable by id.
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents query parameters for filtering tasks when listing them.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TaskQuery {
    pub status: Option<String>,
    /// Case-insensitive match against title or content.
    pub search: Option<String>,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        if task.deleted && !self.include_deleted {
            return false;
        }
        if let Some(status) = &self.status {
            if &task.status != status {
                return false;
            }
        }
        if let Some(parent_id) = self.parent_id {
            if task.parent_id != Some(parent_id) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !task.title.to_lowercase().contains(&needle)
                && !task.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

fn dedup_preserving_order(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

impl Task {
    /// Creates a new `Task` owned by `created_by`.
    pub fn new(input: CreateTaskRequest, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            status: input.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            created_by,
            participants: dedup_preserving_order(input.participants),
            parent_id: input.parent_id,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges a partial update into the task and returns the participant ids that
    /// were not present before the merge.
    pub fn merge(&mut self, patch: UpdateTaskRequest) -> Vec<Uuid> {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = Some(parent_id);
        }

        let mut added = Vec::new();
        if let Some(participants) = patch.participants {
            let participants = dedup_preserving_order(participants);
            added = participants
                .iter()
                .filter(|id| !self.participants.contains(id))
                .copied()
                .collect();
            self.participants = participants;
        }

        self.updated_at = Utc::now();
        added
    }
}
