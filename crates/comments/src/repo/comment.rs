use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

use crate::domain::Comment;

struct CommentRow {
    id: i64,
    user_id: i64,
    sku: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            user_id: row.user_id,
            sku: row.sku,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// Mints an id that encodes `bucket` in its low bits (`id % bucket_count ==
/// bucket`), per the explicit-column fallback spec.md §9 documents.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    bucket_count: i64,
    bucket: i64,
    user_id: i64,
    sku: i64,
    content: &str,
    created_at: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar!(
        "INSERT INTO comments (id, user_id, sku, content, created_at)
         VALUES (nextval('comments_id_seq') * $1::bigint + $2::bigint, $3, $4, $5, $6)
         RETURNING id",
        bucket_count,
        bucket,
        user_id,
        sku,
        content,
        created_at,
    )
    .fetch_one(executor)
    .await
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: i64,
) -> Result<Option<Comment>, sqlx::Error> {
    let row = sqlx::query_as!(
        CommentRow,
        "SELECT id, user_id, sku, content, created_at FROM comments WHERE id = $1",
        id
    )
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn get_by_id_for_update(
    conn: &mut PgConnection,
    id: i64,
) -> Result<Option<Comment>, sqlx::Error> {
    let row = sqlx::query_as!(
        CommentRow,
        "SELECT id, user_id, sku, content, created_at FROM comments WHERE id = $1 FOR UPDATE",
        id
    )
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn update_content(
    conn: &mut PgConnection,
    id: i64,
    content: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query!("UPDATE comments SET content = $1 WHERE id = $2", content, id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Keyset pagination ordered by `(created_at desc, user_id asc)`: with no
/// cursor, returns the first page; otherwise returns rows strictly after
/// `(last_created_at, last_user_id)` in that order.
pub async fn get_list_by_sku<'e>(
    executor: impl PgExecutor<'e>,
    sku: i64,
    last_created_at: Option<DateTime<Utc>>,
    last_user_id: Option<i64>,
    limit: i64,
) -> Result<Vec<Comment>, sqlx::Error> {
    let rows = sqlx::query_as!(
        CommentRow,
        "SELECT id, user_id, sku, content, created_at FROM comments
         WHERE sku = $1
           AND (
             $2::timestamptz IS NULL
             OR created_at < $2::timestamptz
             OR (created_at = $2::timestamptz AND user_id > $3::bigint)
           )
         ORDER BY created_at DESC, user_id ASC
         LIMIT $4",
        sku,
        last_created_at,
        last_user_id,
        limit,
    )
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn get_list_by_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: i64,
) -> Result<Vec<Comment>, sqlx::Error> {
    let rows = sqlx::query_as!(
        CommentRow,
        "SELECT id, user_id, sku, content, created_at FROM comments WHERE user_id = $1",
        user_id
    )
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
