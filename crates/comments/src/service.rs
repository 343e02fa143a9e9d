//! Comment service: sharded insert/lookup/edit plus a scatter-gather list
//! by user. Grounded on the source's `comment_service.go`.

use std::cmp::Ordering;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shard::ShardRing;
use sqlx::PgPool;
use storage::{with_tx, Isolation};

use crate::domain::{Comment, Error};
use crate::repo::comment as repo;

pub struct CommentService {
    ring: ShardRing<PgPool>,
    edit_interval: Duration,
    limit_rows_by_sku: u32,
}

impl CommentService {
    pub fn new(ring: ShardRing<PgPool>, edit_interval: Duration, limit_rows_by_sku: u32) -> Self {
        Self {
            ring,
            edit_interval,
            limit_rows_by_sku,
        }
    }

    pub async fn add(&self, user_id: i64, sku: i64, content: String) -> Result<i64, Error> {
        let bucket = self.ring.bucket_for_key(sku) as i64;
        let pool = self.ring.route_by_key(sku);
        let id = repo::insert(
            pool,
            self.ring.bucket_count() as i64,
            bucket,
            user_id,
            sku,
            &content,
            Utc::now(),
        )
        .await?;
        Ok(id)
    }

    pub async fn get_info_by_id(&self, id: i64) -> Result<Comment, Error> {
        let pool = self.ring.route_by_entity_id(id);
        repo::get_by_id(pool, id)
            .await?
            .ok_or(Error::CommentNotFound(id))
    }

    /// Loads the row for update on its owning shard, checks ownership and
    /// the edit window, then updates `content` — all in one transaction so
    /// a concurrent edit can't slip between the check and the write.
    pub async fn edit(&self, id: i64, user_id: i64, content: String) -> Result<(), Error> {
        let pool = self.ring.route_by_entity_id(id);
        let edit_interval = self.edit_interval;

        with_tx(pool, Isolation::Default, |tx| {
            Box::pin(async move {
                let existing = repo::get_by_id_for_update(tx, id)
                    .await?
                    .ok_or(Error::CommentNotFound(id))?;

                if existing.user_id != user_id {
                    return Err(Error::NotMyComment);
                }

                let elapsed = Utc::now().signed_duration_since(existing.created_at);
                if elapsed
                    >= chrono::Duration::from_std(edit_interval).unwrap_or(chrono::Duration::MAX)
                {
                    return Err(Error::EditTimeoutExceeded);
                }

                repo::update_content(tx, id, &content).await?;
                Ok(())
            })
        })
        .await
    }

    pub async fn get_list_by_sku(
        &self,
        sku: i64,
        last_created_at: Option<DateTime<Utc>>,
        last_user_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<Comment>, Error> {
        let pool = self.ring.route_by_key(sku);
        let limit = if limit == 0 {
            self.limit_rows_by_sku
        } else {
            limit
        };
        let comments =
            repo::get_list_by_sku(pool, sku, last_created_at, last_user_id, limit as i64).await?;
        Ok(comments)
    }

    /// Scatter-gather: queries every shard concurrently, then sorts the
    /// aggregate by `(created_at desc, user_id asc)`.
    pub async fn get_list_by_user(&self, user_id: i64) -> Result<Vec<Comment>, Error> {
        let futures = self
            .ring
            .all_pools()
            .map(|pool| repo::get_list_by_user(pool, user_id));
        let per_shard = futures::future::try_join_all(futures).await?;

        let mut comments: Vec<Comment> = per_shard.into_iter().flatten().collect();
        comments.sort_by(|a, b| match b.created_at.cmp(&a.created_at) {
            Ordering::Equal => a.user_id.cmp(&b.user_id),
            other => other,
        });
        Ok(comments)
    }
}
