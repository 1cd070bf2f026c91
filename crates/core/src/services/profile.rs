//! Profile service: public personas and their search surface.

use ripple_common::{AppError, AppResult, IdGenerator, upload_path};
use ripple_db::{
    entities::{user, user_profile},
    repositories::{UserProfileRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a profile.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProfileInput {
    #[validate(length(min = 1, max = 63))]
    pub username: String,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    /// Original filename of an uploaded image, if any
    pub image_name: Option<String>,
}

/// Input for updating a profile. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 63))]
    pub username: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub image_name: Option<String>,
}

/// Search filters for listing profiles. Both may apply at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchProfilesInput {
    /// Case-insensitive fragment of the owning user's email (`?user=`)
    #[serde(rename = "user")]
    pub user_email: Option<String>,
    /// Fragment of the username
    pub username: Option<String>,
}

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: UserProfileRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub fn new(profile_repo: UserProfileRepository, user_repo: UserRepository) -> Self {
        Self {
            profile_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a profile by ID.
    pub async fn get(&self, id: &str) -> AppResult<user_profile::Model> {
        self.profile_repo.get_by_id(id).await
    }

    /// Get the profile owned by a user.
    pub async fn get_by_user(&self, user_id: &str) -> AppResult<user_profile::Model> {
        self.profile_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("profile not found".to_string()))
    }

    /// List profiles, optionally filtered by email or username fragment.
    ///
    /// When both filters are present a profile must match both.
    pub async fn list(&self, filter: &SearchProfilesInput) -> AppResult<Vec<user_profile::Model>> {
        let mut profiles = match &filter.username {
            Some(fragment) => self.profile_repo.search_by_username(fragment).await?,
            None => self.profile_repo.list().await?,
        };

        if let Some(email_fragment) = &filter.user_email {
            let users = self.user_repo.search_by_email(email_fragment).await?;
            let user_ids: std::collections::HashSet<String> =
                users.into_iter().map(|u| u.id).collect();
            profiles.retain(|p| user_ids.contains(&p.user_id));
        }

        Ok(profiles)
    }

    /// Create a profile for a user who does not have one yet.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateProfileInput,
    ) -> AppResult<user_profile::Model> {
        input.validate()?;

        self.user_repo.get_by_id(user_id).await?;
        if self.profile_repo.find_by_user_id(user_id).await?.is_some() {
            return Err(AppError::Conflict("profile already exists".to_string()));
        }
        if self
            .profile_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("username already taken".to_string()));
        }

        let image_url = input
            .image_name
            .as_deref()
            .map(|name| image_url_for(&input.username, name));

        self.profile_repo
            .create(user_profile::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_owned()),
                username: Set(input.username),
                password: Set(None),
                bio: Set(input.bio),
                image_url: Set(image_url),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            })
            .await
    }

    /// Update a profile. Only the owning user or a staff account may do so.
    pub async fn update(
        &self,
        actor: &user::Model,
        profile_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user_profile::Model> {
        input.validate()?;

        let profile = self.profile_repo.get_by_id(profile_id).await?;
        if profile.user_id != actor.id && !actor.is_staff {
            return Err(AppError::Forbidden(
                "only the owner may modify this profile".to_string(),
            ));
        }

        if let Some(username) = &input.username {
            if username != &profile.username
                && self.profile_repo.find_by_username(username).await?.is_some()
            {
                return Err(AppError::Conflict("username already taken".to_string()));
            }
        }

        let username_for_path = input
            .username
            .clone()
            .unwrap_or_else(|| profile.username.clone());
        let image_url = input
            .image_name
            .as_deref()
            .map(|name| image_url_for(&username_for_path, name));

        let mut model: user_profile::ActiveModel = profile.into();
        if let Some(username) = input.username {
            model.username = Set(username);
        }
        if let Some(bio) = input.bio {
            model.bio = Set(Some(bio));
        }
        if let Some(url) = image_url {
            model.image_url = Set(Some(url));
        }

        self.profile_repo.update(model).await
    }

    /// Delete a profile. Only the owning user or a staff account may do so.
    pub async fn delete(&self, actor: &user::Model, profile_id: &str) -> AppResult<()> {
        let profile = self.profile_repo.get_by_id(profile_id).await?;
        if profile.user_id != actor.id && !actor.is_staff {
            return Err(AppError::Forbidden(
                "only the owner may delete this profile".to_string(),
            ));
        }

        self.profile_repo.delete(profile_id).await
    }
}

/// Storage path for a profile image, under the singular `user` kind.
fn image_url_for(username: &str, original_name: &str) -> String {
    upload_path("user", username, original_name)
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

    #[test]
    fn test_image_url_uses_singular_kind() {
        let path = image_url_for("ada", "avatar.png");
        assert!(path.starts_with("uploads/user/ada-"));
        assert!(path.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("p1", "owner", "ada")]])
                .into_connection(),
        );

        let service = ProfileService::new(
            UserProfileRepository::new(profile_db),
            UserRepository::new(mock_db()),
        );

        let result = service
            .update(
                &create_test_actor("intruder", false),
                "p1",
                UpdateProfileInput::default(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_staff_may_modify_any_profile() {
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    [create_test_profile("p1", "owner", "ada")],
                    [create_test_profile("p1", "owner", "ada")],
                ])
                .into_connection(),
        );

        let service = ProfileService::new(
            UserProfileRepository::new(profile_db),
            UserRepository::new(mock_db()),
        );

        let result = service
            .update(
                &create_test_actor("admin", true),
                "p1",
                UpdateProfileInput::default(),
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("p1", "owner", "ada")]])
                .into_connection(),
        );

        let service = ProfileService::new(
            UserProfileRepository::new(profile_db),
            UserRepository::new(mock_db()),
        );

        let result = service
            .delete(&create_test_actor("intruder", false), "p1")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_profile::Model>::new()])
                .into_connection(),
        );

        let service = ProfileService::new(
            UserProfileRepository::new(profile_db),
            UserRepository::new(mock_db()),
        );

        assert!(matches!(
            service.get("missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
