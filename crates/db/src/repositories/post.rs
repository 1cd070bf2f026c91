//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

/// Filters for listing posts.
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    /// Title fragment
    pub title_contains: Option<String>,
    /// Restrict to these authors
    pub author_ids: Option<Vec<String>>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, erroring when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// List posts newest first, with optional filters.
    pub async fn list(&self, filter: &PostFilter) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().order_by_desc(post::Column::CreatedAt);

        if let Some(fragment) = &filter.title_contains {
            query = query.filter(post::Column::Title.contains(fragment));
        }

        if let Some(author_ids) = &filter.author_ids {
            if author_ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(post::Column::AuthorId.is_in(author_ids.iter().map(String::as_str)));
        }

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.offset(offset);
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a user's posts, newest first.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, mut model: post::ActiveModel) -> AppResult<post::Model> {
        model.updated_at = Set(Some(chrono::Utc::now().into()));
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Comments go with it via foreign key cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_post(id: &str, author_id: &str, title: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: title.to_string(),
            content: "content".to_string(),
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_with_empty_author_filter_returns_nothing() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = PostRepository::new(db);
        let filter = PostFilter {
            author_ids: Some(Vec::new()),
            ..Default::default()
        };
        let posts = repo.list(&filter).await.unwrap();

        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_author() {
        let post = create_test_post("post1", "user1", "hello");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let posts = repo.find_by_author("user1").await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "hello");
    }
}
