//! Comment entity and error kinds. Grounded on the source's
//! `domain/comment.go` and `domain/errors.go`.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub sku: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("comment {0} does not exist")]
    CommentNotFound(i64),
    #[error("can only edit your own comment")]
    NotMyComment,
    #[error("edit window has already elapsed")]
    EditTimeoutExceeded,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
