pub mod comment;
pub mod notification;
pub mod recovery;
pub mod session;
pub mod task;
pub mod user;

pub use comment::{Comment, CommentRequest, CommentWithAuthor};
pub use notification::Notification;
pub use recovery::PasswordRecovery;
pub use session::Session;
pub use task::{
    BulkStatusUpdateRequest, BulkUpdateResult, CreateTaskRequest, StatusUpdateRequest, Task,
    TaskQuery, UpdateTaskRequest,
};
pub use user::{AuthenticatedUser, NewUser, Role, User, UserSummary};
