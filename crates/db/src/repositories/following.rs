//! Following repository.

use std::sync::Arc;

use crate::entities::{Following, following};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
};

/// Following repository for database operations.
#[derive(Clone)]
pub struct FollowingRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowingRepository {
    /// Create a new following repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the follow edge from follower to followee.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<Option<following::Model>> {
        Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::FolloweeId.eq(followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether follower follows followee.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, followee_id).await?.is_some())
    }

    /// Create a follow edge.
    pub async fn create(&self, model: following::ActiveModel) -> AppResult<following::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the follow edge from follower to followee, returning rows removed.
    ///
    /// Idempotent: unfollowing when not following returns 0.
    pub async fn delete_by_pair(&self, follower_id: &str, followee_id: &str) -> AppResult<u64> {
        let result = Following::delete_many()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::FolloweeId.eq(followee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// IDs of users who follow `user_id`.
    pub async fn find_follower_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        Following::find()
            .filter(following::Column::FolloweeId.eq(user_id))
            .select_only()
            .column(following::Column::FollowerId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of users `user_id` follows.
    pub async fn find_following_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        Following::find()
            .filter(following::Column::FollowerId.eq(user_id))
            .select_only()
            .column(following::Column::FolloweeId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
