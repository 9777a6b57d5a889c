use uuid::Uuid;

use crate::models::{AuthenticatedUser, Task};

/// Where a notification about a task points.
pub fn task_link(task_id: Uuid) -> String {
    format!("/api/v1/task/detail/{}", task_id)
}

/// A committed mutation that others should hear about.
///
/// Handlers collect these after their primary write succeeds and pass them to
/// [`dispatch`](super::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
    CommentCreated {
        task_id: Uuid,
        task_title: String,
        task_owner: Uuid,
        commenter_id: Uuid,
        commenter_name: String,
    },
    ParticipantsAdded {
        task_id: Uuid,
        task_title: String,
        actor_name: String,
        added: Vec<Uuid>,
    },
}

impl MutationEvent {
    pub fn comment_created(task: &Task, commenter: &AuthenticatedUser) -> Self {
        MutationEvent::CommentCreated {
            task_id: task.id,
            task_title: task.title.clone(),
            task_owner: task.created_by,
            commenter_id: commenter.id,
            commenter_name: commenter.full_name.clone(),
        }
    }

    /// `None` when the update added nobody.
    pub fn participants_added(
        task: &Task,
        actor: &AuthenticatedUser,
        added: Vec<Uuid>,
    ) -> Option<Self> {
        if added.is_empty() {
            return None;
        }
        Some(MutationEvent::ParticipantsAdded {
            task_id: task.id,
            task_title: task.title.clone(),
            actor_name: actor.full_name.clone(),
            added,
        })
    }

    /// Users who get a notification. The task owner is not told about their own comments.
    pub fn recipients(&self) -> Vec<Uuid> {
        match self {
            MutationEvent::CommentCreated {
                task_owner,
                commenter_id,
                ..
            } => {
                if task_owner == commenter_id {
                    Vec::new()
                } else {
                    vec![*task_owner]
                }
            }
            MutationEvent::ParticipantsAdded { added, .. } => added.clone(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            MutationEvent::CommentCreated {
                task_title,
                commenter_name,
                ..
            } => format!(
                "{} has commented on your task \"{}\"",
                commenter_name, task_title
            ),
            MutationEvent::ParticipantsAdded {
                task_title,
                actor_name,
                ..
            } => format!("{} added you to the task \"{}\"", actor_name, task_title),
        }
    }

    pub fn link(&self) -> String {
        match self {
            MutationEvent::CommentCreated { task_id, .. }
            | MutationEvent::ParticipantsAdded { task_id, .. } => task_link(*task_id),
        }
    }
}
