//! Following service: the follower graph.

use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::{following, user},
    repositories::{FollowingRepository, UserRepository},
};
use sea_orm::Set;

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub fn new(following_repo: FollowingRepository, user_repo: UserRepository) -> Self {
        Self {
            following_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    ///
    /// Idempotent: following someone already followed is a no-op. Following
    /// yourself is an error. Returns `true` when a new edge was created.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        if follower_id == followee_id {
            return Err(AppError::BadRequest("cannot follow yourself".to_string()));
        }

        self.user_repo.get_by_id(followee_id).await?;

        if self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Ok(false);
        }

        self.following_repo
            .create(following::ActiveModel {
                id: Set(self.id_gen.generate()),
                follower_id: Set(follower_id.to_owned()),
                followee_id: Set(followee_id.to_owned()),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await?;

        tracing::debug!(follower = %follower_id, followee = %followee_id, "follow created");
        Ok(true)
    }

    /// Unfollow a user.
    ///
    /// Idempotent: unfollowing someone not followed is a no-op. Returns
    /// `true` when an edge was actually removed.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.user_repo.get_by_id(followee_id).await?;

        let removed = self
            .following_repo
            .delete_by_pair(follower_id, followee_id)
            .await?;
        Ok(removed > 0)
    }

    /// Whether follower follows followee.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// The users who follow `user_id`.
    pub async fn followers(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        let ids = self.following_repo.find_follower_ids(user_id).await?;
        self.user_repo.find_by_ids(&ids).await
    }

    /// The users `user_id` follows.
    pub async fn following(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        let ids = self.following_repo.find_following_ids(user_id).await?;
        self.user_repo.find_by_ids(&ids).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn mock_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            email_lower: format!("{id}@example.com"),
            token: None,
            first_name: None,
            last_name: None,
            is_staff: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_follow_self_is_rejected() {
        let service = FollowingService::new(
            FollowingRepository::new(mock_db()),
            UserRepository::new(mock_db()),
        );

        let result = service.follow("user1", "user1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_follow_unknown_followee() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = FollowingService::new(
            FollowingRepository::new(mock_db()),
            UserRepository::new(user_db),
        );

        let result = service.follow("user1", "ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_follow_already_following_is_noop() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user2")]])
                .into_connection(),
        );
        let following_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[following::Model {
                    id: "f1".to_string(),
                    follower_id: "user1".to_string(),
                    followee_id: "user2".to_string(),
                    created_at: Utc::now().into(),
                }]])
                .into_connection(),
        );

        let service = FollowingService::new(
            FollowingRepository::new(following_db),
            UserRepository::new(user_db),
        );

        let created = service.follow("user1", "user2").await.unwrap();

        assert!(!created);
    }
}
