//! Reaction service.
//!
//! Likes are polymorphic: a single store covers posts and comments, keyed by
//! [`LikeTarget`]. The target's existence is verified against its own table
//! before any reaction row is touched.

use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::reaction::LikeTarget,
    repositories::{
        CommentRepository, PostRepository, ReactionRepository, UserProfileRepository,
        UserRepository,
    },
};
use serde::Serialize;
use std::collections::HashMap;

/// A user who liked a target, in presentation form.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Fan {
    pub username: String,
    pub full_name: String,
}

/// Like state of a target as seen by a viewer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LikeSummary {
    /// Live count, computed per read
    pub total_likes: u64,
    /// Always false for anonymous viewers
    pub is_fan: bool,
}

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    reaction_repo: ReactionRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub fn new(
        reaction_repo: ReactionRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
    ) -> Self {
        Self {
            reaction_repo,
            post_repo,
            comment_repo,
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Verify the target row exists in its own table.
    async fn ensure_target_exists(&self, target: LikeTarget<'_>) -> AppResult<()> {
        match target {
            LikeTarget::Post(id) => {
                self.post_repo.get_by_id(id).await?;
            }
            LikeTarget::Comment(id) => {
                self.comment_repo.get_by_id(id).await?;
            }
        }
        Ok(())
    }

    /// Like a target on behalf of a user.
    ///
    /// Idempotent: liking something already liked is a no-op, not an error.
    /// Returns `true` when a new like was recorded.
    pub async fn add_like(&self, user_id: &str, target: LikeTarget<'_>) -> AppResult<bool> {
        self.ensure_target_exists(target).await?;

        let (_, created) = self
            .reaction_repo
            .insert_if_absent(&self.id_gen.generate(), user_id, target)
            .await?;

        if created {
            tracing::debug!(user_id = %user_id, kind = %target.kind_str(), target_id = %target.id(), "like added");
        }

        Ok(created)
    }

    /// Remove a user's like from a target.
    ///
    /// Idempotent: unliking something never liked is a no-op, not an error.
    /// Returns `true` when a like was actually removed.
    pub async fn remove_like(&self, user_id: &str, target: LikeTarget<'_>) -> AppResult<bool> {
        self.ensure_target_exists(target).await?;

        let removed = self.reaction_repo.delete(user_id, target).await?;
        Ok(removed > 0)
    }

    /// Whether the viewer has liked the target. Anonymous viewers never have.
    pub async fn is_fan(
        &self,
        viewer_id: Option<&str>,
        target: LikeTarget<'_>,
    ) -> AppResult<bool> {
        match viewer_id {
            Some(user_id) => self.reaction_repo.exists(user_id, target).await,
            None => Ok(false),
        }
    }

    /// Live like count for a target.
    pub async fn count_likes(&self, target: LikeTarget<'_>) -> AppResult<u64> {
        self.reaction_repo.count_for(target).await
    }

    /// Like count and viewer membership in one call.
    pub async fn summary(
        &self,
        viewer_id: Option<&str>,
        target: LikeTarget<'_>,
    ) -> AppResult<LikeSummary> {
        let total_likes = self.count_likes(target).await?;
        let is_fan = self.is_fan(viewer_id, target).await?;
        Ok(LikeSummary {
            total_likes,
            is_fan,
        })
    }

    /// The users who liked a target, projected for display.
    ///
    /// A fan's username comes from their profile; users without one fall back
    /// to the local part of their email.
    pub async fn get_fans(&self, target: LikeTarget<'_>) -> AppResult<Vec<Fan>> {
        self.ensure_target_exists(target).await?;

        let user_ids = self.reaction_repo.list_user_ids_for(target).await?;
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.user_repo.find_by_ids(&user_ids).await?;
        let profiles = self.profile_repo.find_by_user_ids(&user_ids).await?;
        let mut usernames: HashMap<String, String> = profiles
            .into_iter()
            .map(|p| (p.user_id, p.username))
            .collect();

        let fans = users
            .into_iter()
            .map(|user| {
                let username = usernames
                    .remove(&user.id)
                    .unwrap_or_else(|| email_local_part(&user.email));
                Fan {
                    username,
                    full_name: user.full_name(),
                }
            })
            .collect();

        Ok(fans)
    }

    /// Drop every like on a target. Called when the target itself is deleted.
    pub async fn delete_all_for(&self, target: LikeTarget<'_>) -> AppResult<u64> {
        self.reaction_repo.delete_all_for(target).await
    }

    /// Drop every like a user made. Called when the account is deleted.
    pub async fn delete_all_by(&self, user_id: &str) -> AppResult<u64> {
        self.reaction_repo.delete_all_by(user_id).await
    }

    /// Drop every like involving a user: the likes they made, plus all likes
    /// on their posts and comments, whose rows are about to die via foreign
    /// key cascade and would otherwise leave dangling targets.
    pub async fn delete_all_involving(&self, user_id: &str) -> AppResult<u64> {
        let mut removed = self.reaction_repo.delete_all_by(user_id).await?;

        for post in self.post_repo.find_by_author(user_id).await? {
            for comment_id in self.comment_repo.list_ids_by_post(&post.id).await? {
                removed += self
                    .reaction_repo
                    .delete_all_for(LikeTarget::Comment(&comment_id))
                    .await?;
            }
            removed += self
                .reaction_repo
                .delete_all_for(LikeTarget::Post(&post.id))
                .await?;
        }

        // The user's comments on other people's posts; their comments on
        // their own posts were already swept above, a second pass is a no-op
        for comment_id in self.comment_repo.list_ids_by_author(user_id).await? {
            removed += self
                .reaction_repo
                .delete_all_for(LikeTarget::Comment(&comment_id))
                .await?;
        }

        Ok(removed)
    }
}

fn email_local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ripple_db::entities::{comment, post, reaction, user, user_profile};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn mock_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn user_id_row(id: &str) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("user_id", sea_orm::Value::from(id))])
    }

    fn id_row(id: &str) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("id", sea_orm::Value::from(id))])
    }

    fn exec_result(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn create_test_post(id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: "author1".to_string(),
            title: "title".to_string(),
            content: "content".to_string(),
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_comment(id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: "post1".to_string(),
            author_id: "author1".to_string(),
            content: "a comment".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_user(id: &str, email: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: email.to_string(),
            email_lower: email.to_lowercase(),
            token: None,
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            is_staff: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_profile(user_id: &str, username: &str) -> user_profile::Model {
        user_profile::Model {
            id: format!("p-{user_id}"),
            user_id: user_id.to_string(),
            username: username.to_string(),
            password: None,
            bio: None,
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn build_service(
        reaction_db: Arc<sea_orm::DatabaseConnection>,
        post_db: Arc<sea_orm::DatabaseConnection>,
        comment_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
        profile_db: Arc<sea_orm::DatabaseConnection>,
    ) -> ReactionService {
        ReactionService::new(
            ReactionRepository::new(reaction_db),
            PostRepository::new(post_db),
            CommentRepository::new(comment_db),
            UserRepository::new(user_db),
            UserProfileRepository::new(profile_db),
        )
    }

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("ada@example.com"), "ada");
        assert_eq!(email_local_part("no-at-sign"), "no-at-sign");
    }

    #[tokio::test]
    async fn test_add_like_post_not_found() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let service = build_service(mock_db(), post_db, mock_db(), mock_db(), mock_db());
        let result = service
            .add_like("user1", LikeTarget::Post("missing"))
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_like_comment_not_found() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let service = build_service(mock_db(), mock_db(), comment_db, mock_db(), mock_db());
        let result = service
            .add_like("user1", LikeTarget::Comment("missing"))
            .await;

        assert!(matches!(result, Err(AppError::CommentNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_like_already_liked_is_noop() {
        let existing = reaction::Model {
            id: "r1".to_string(),
            user_id: "user1".to_string(),
            target_kind: LikeTarget::Post("post1").kind(),
            target_id: "post1".to_string(),
            created_at: Utc::now().into(),
        };

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("post1")]])
                .into_connection(),
        );
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = build_service(reaction_db, post_db, mock_db(), mock_db(), mock_db());
        let created = service
            .add_like("user1", LikeTarget::Post("post1"))
            .await
            .unwrap();

        assert!(!created);
    }

    #[tokio::test]
    async fn test_remove_like_never_liked_is_noop() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("post1")]])
                .into_connection(),
        );
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let service = build_service(reaction_db, post_db, mock_db(), mock_db(), mock_db());
        let removed = service
            .remove_like("user1", LikeTarget::Post("post1"))
            .await
            .unwrap();

        assert!(!removed);
    }

    #[tokio::test]
    async fn test_is_fan_anonymous_viewer() {
        let service = build_service(mock_db(), mock_db(), mock_db(), mock_db(), mock_db());
        let is_fan = service
            .is_fan(None, LikeTarget::Comment("c1"))
            .await
            .unwrap();

        assert!(!is_fan);
    }

    #[tokio::test]
    async fn test_summary_anonymous_viewer() {
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[BTreeMap::from([(
                    "num_items",
                    sea_orm::Value::from(3i64),
                )])]])
                .into_connection(),
        );

        let service = build_service(reaction_db, mock_db(), mock_db(), mock_db(), mock_db());
        let summary = service
            .summary(None, LikeTarget::Post("post1"))
            .await
            .unwrap();

        assert_eq!(summary.total_likes, 3);
        assert!(!summary.is_fan);
    }

    #[tokio::test]
    async fn test_get_fans_username_falls_back_to_email() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("post1")]])
                .into_connection(),
        );
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user_id_row("user1"), user_id_row("user2")]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_user("user1", "ada@example.com"),
                    create_test_user("user2", "grace@example.com"),
                ]])
                .into_connection(),
        );
        // Only user2 has a profile
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("user2", "grace")]])
                .into_connection(),
        );

        let service = build_service(reaction_db, post_db, mock_db(), user_db, profile_db);
        let fans = service.get_fans(LikeTarget::Post("post1")).await.unwrap();

        assert_eq!(fans.len(), 2);
        assert!(fans.contains(&Fan {
            username: "ada".to_string(),
            full_name: "Ada Lovelace".to_string(),
        }));
        assert!(fans.contains(&Fan {
            username: "grace".to_string(),
            full_name: "Ada Lovelace".to_string(),
        }));
    }

    #[tokio::test]
    async fn test_delete_all_involving_sweeps_target_likes() {
        // author1 owns post p1 (carrying comment c1 by someone else) and
        // wrote comment c9 on another post
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1")]])
                .into_connection(),
        );
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![id_row("c1")], vec![id_row("c9")]])
                .into_connection(),
        );
        // delete_all_by, then targets: comment c1, post p1, comment c9
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    exec_result(1),
                    exec_result(2),
                    exec_result(3),
                    exec_result(1),
                ])
                .into_connection(),
        );

        let service = build_service(reaction_db, post_db, comment_db, mock_db(), mock_db());
        let removed = service.delete_all_involving("author1").await.unwrap();

        assert_eq!(removed, 7);
    }

    #[tokio::test]
    async fn test_get_fans_empty() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1")]])
                .into_connection(),
        );
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<BTreeMap<&str, sea_orm::Value>>::new()])
                .into_connection(),
        );

        let service = build_service(reaction_db, mock_db(), comment_db, mock_db(), mock_db());
        let fans = service.get_fans(LikeTarget::Comment("c1")).await.unwrap();

        assert!(fans.is_empty());
    }
}
