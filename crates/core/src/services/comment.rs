//! Comment service.

use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::{comment, reaction::LikeTarget, user},
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::reaction::ReactionService;

/// Input for creating a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 500))]
    pub content: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    reaction_service: ReactionService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        reaction_service: ReactionService,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            reaction_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a comment by ID.
    pub async fn get(&self, id: &str) -> AppResult<comment::Model> {
        self.comment_repo.get_by_id(id).await
    }

    /// List a post's comments, newest first.
    pub async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.find_by_post(post_id).await
    }

    /// IDs of a post's comments.
    pub async fn list_ids(&self, post_id: &str) -> AppResult<Vec<String>> {
        self.comment_repo.list_ids_by_post(post_id).await
    }

    /// Count a post's comments.
    pub async fn count_for_post(&self, post_id: &str) -> AppResult<u64> {
        self.comment_repo.count_by_post(post_id).await
    }

    /// Create a comment on a post.
    pub async fn create(
        &self,
        author_id: &str,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        self.post_repo.get_by_id(post_id).await?;

        let created = self
            .comment_repo
            .create(comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_owned()),
                author_id: Set(author_id.to_owned()),
                content: Set(input.content),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await?;

        tracing::debug!(comment_id = %created.id, post_id = %post_id, "comment created");
        Ok(created)
    }

    /// Delete a comment. Only the author or a staff account may do so.
    ///
    /// The comment's likes live in the polymorphic store with no key to
    /// cascade through, so they are cleared explicitly first.
    pub async fn delete(&self, actor: &user::Model, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.author_id != actor.id && !actor.is_staff {
            return Err(AppError::Forbidden(
                "only the author may delete this comment".to_string(),
            ));
        }

        self.reaction_service
            .delete_all_for(LikeTarget::Comment(comment_id))
            .await?;
        self.comment_repo.delete(comment_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ripple_db::entities::post;
    use ripple_db::repositories::{ReactionRepository, UserProfileRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn mock_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn build_service(
        comment_db: Arc<sea_orm::DatabaseConnection>,
        post_db: Arc<sea_orm::DatabaseConnection>,
    ) -> CommentService {
        let reaction_service = ReactionService::new(
            ReactionRepository::new(mock_db()),
            PostRepository::new(mock_db()),
            CommentRepository::new(mock_db()),
            UserRepository::new(mock_db()),
            UserProfileRepository::new(mock_db()),
        );
        CommentService::new(
            CommentRepository::new(comment_db),
            PostRepository::new(post_db),
            reaction_service,
        )
    }

    fn create_test_actor(id: &str, is_staff: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            email_lower: format!("{id}@example.com"),
            token: None,
            first_name: None,
            last_name: None,
            is_staff,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_comment(id: &str, author_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: "post1".to_string(),
            author_id: author_id.to_string(),
            content: "a comment".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_create_input_rejects_long_content() {
        let input = CreateCommentInput {
            content: "x".repeat(501),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_input_rejects_empty_content() {
        let input = CreateCommentInput {
            content: String::new(),
        };
        assert!(input.validate().is_err());
    }

    #[tokio::test]
    async fn test_create_on_missing_post() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let service = build_service(mock_db(), post_db);
        let result = service
            .create(
                "user1",
                "missing",
                CreateCommentInput {
                    content: "hello".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_authorship() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author1")]])
                .into_connection(),
        );

        let service = build_service(comment_db, mock_db());
        let result = service
            .delete(&create_test_actor("intruder", false), "c1")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_staff_may_delete_any_comment() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "author1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
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

        let reaction_service = ReactionService::new(
            ReactionRepository::new(reaction_db),
            PostRepository::new(mock_db()),
            CommentRepository::new(mock_db()),
            UserRepository::new(mock_db()),
            UserProfileRepository::new(mock_db()),
        );
        let service = CommentService::new(
            CommentRepository::new(comment_db),
            PostRepository::new(mock_db()),
            reaction_service,
        );

        let result = service.delete(&create_test_actor("admin", true), "c1").await;

        assert!(result.is_ok());
    }
}
