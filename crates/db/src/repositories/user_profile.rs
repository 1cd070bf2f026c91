//! User profile repository.

use std::sync::Arc;

use crate::entities::{UserProfile, user_profile};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// User profile repository for database operations.
#[derive(Clone)]
pub struct UserProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl UserProfileRepository {
    /// Create a new user profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user_profile::Model>> {
        UserProfile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a profile by ID, erroring when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user_profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("profile not found".to_string()))
    }

    /// Find the profile owned by a user (1:1).
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<user_profile::Model>> {
        UserProfile::find()
            .filter(user_profile::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find profiles owned by a set of users.
    pub async fn find_by_user_ids(&self, user_ids: &[String]) -> AppResult<Vec<user_profile::Model>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        UserProfile::find()
            .filter(user_profile::Column::UserId.is_in(user_ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by username (exact).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user_profile::Model>> {
        UserProfile::find()
            .filter(user_profile::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search profiles whose username contains a fragment.
    pub async fn search_by_username(&self, fragment: &str) -> AppResult<Vec<user_profile::Model>> {
        UserProfile::find()
            .filter(user_profile::Column::Username.contains(fragment))
            .order_by_asc(user_profile::Column::Username)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all profiles ordered by username.
    pub async fn list(&self) -> AppResult<Vec<user_profile::Model>> {
        UserProfile::find()
            .order_by_asc(user_profile::Column::Username)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a profile.
    pub async fn create(&self, model: user_profile::ActiveModel) -> AppResult<user_profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a profile.
    pub async fn update(&self, mut model: user_profile::ActiveModel) -> AppResult<user_profile::Model> {
        model.updated_at = Set(Some(chrono::Utc::now().into()));
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a profile.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        UserProfile::delete_by_id(id)
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

    fn create_test_profile(id: &str, user_id: &str, username: &str) -> user_profile::Model {
        user_profile::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            username: username.to_string(),
            password: None,
            bio: None,
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_username_found() {
        let profile = create_test_profile("p1", "user1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let found = repo.find_by_username("alice").await.unwrap();

        assert!(found.is_some());
        assert_eq!(found.unwrap().user_id, "user1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_profile::Model>::new()])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_user_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserProfileRepository::new(db);
        let found = repo.find_by_user_ids(&[]).await.unwrap();

        assert!(found.is_empty());
    }
}
