//! User service: registration, authentication, account lifecycle.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::{user, user_profile},
    repositories::{UserProfileRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::reaction::ReactionService;

/// Input for registering a new account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 63))]
    pub username: String,
    #[validate(length(max = 63))]
    pub first_name: Option<String>,
    #[validate(length(max = 63))]
    pub last_name: Option<String>,
}

/// Input for signing in.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SigninInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Input for updating account fields. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 63))]
    pub first_name: Option<String>,
    #[validate(length(max = 63))]
    pub last_name: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    reaction_service: ReactionService,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
        reaction_service: ReactionService,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            reaction_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account with its profile.
    ///
    /// The email is unique case-insensitively; the password hash lives on the
    /// profile. A fresh access token is issued immediately.
    pub async fn register(&self, input: RegisterInput) -> AppResult<(user::Model, String)> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".to_string()));
        }
        if self
            .profile_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("username already taken".to_string()));
        }

        let token = self.id_gen.generate_token();
        let user = self
            .user_repo
            .create(user::ActiveModel {
                id: Set(self.id_gen.generate()),
                email: Set(input.email.clone()),
                email_lower: Set(input.email.to_lowercase()),
                token: Set(Some(token.clone())),
                first_name: Set(input.first_name),
                last_name: Set(input.last_name),
                is_staff: Set(false),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            })
            .await?;

        let password_hash = hash_password(&input.password)?;
        self.profile_repo
            .create(user_profile::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id.clone()),
                username: Set(input.username),
                password: Set(Some(password_hash)),
                bio: Set(None),
                image_url: Set(None),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            })
            .await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok((user, token))
    }

    /// Authenticate by email and password, rotating the access token.
    pub async fn signin(&self, input: SigninInput) -> AppResult<(user::Model, String)> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let profile = self
            .profile_repo
            .find_by_user_id(&user.id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let hash = profile.password.as_deref().ok_or(AppError::Unauthorized)?;
        if !verify_password(&input.password, hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let user = self
            .user_repo
            .set_token(&user.id, Some(token.clone()))
            .await?;

        Ok((user, token))
    }

    /// Resolve a bearer token to its account.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Invalidate the current access token.
    pub async fn signout(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.set_token(user_id, None).await?;
        Ok(())
    }

    /// Issue a fresh access token, invalidating the previous one.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let token = self.id_gen.generate_token();
        self.user_repo
            .set_token(user_id, Some(token.clone()))
            .await?;
        Ok(token)
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Update account fields. A new password re-hashes onto the profile.
    pub async fn update(&self, user_id: &str, input: UpdateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;

        if let Some(email) = &input.email
            && let Some(other) = self.user_repo.find_by_email(email).await?
            && other.id != user.id
        {
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        if let Some(password) = &input.password {
            let profile = self
                .profile_repo
                .find_by_user_id(&user.id)
                .await?
                .ok_or_else(|| AppError::NotFound("profile not found".to_string()))?;
            let mut profile_model: user_profile::ActiveModel = profile.into();
            profile_model.password = Set(Some(hash_password(password)?));
            self.profile_repo.update(profile_model).await?;
        }

        let mut model: user::ActiveModel = user.into();
        if let Some(email) = input.email {
            model.email_lower = Set(email.to_lowercase());
            model.email = Set(email);
        }
        if let Some(first_name) = input.first_name {
            model.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = input.last_name {
            model.last_name = Set(Some(last_name));
        }

        self.user_repo.update(model).await
    }

    /// Delete an account.
    ///
    /// Foreign keys cascade the user's posts, comments and follow edges; the
    /// polymorphic reactions are cleared explicitly since no key reaches
    /// them. The sweep covers both the likes the user made and the likes
    /// other users left on the user's posts and comments.
    pub async fn delete(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.get_by_id(user_id).await?;

        self.reaction_service.delete_all_involving(user_id).await?;
        self.user_repo.delete(user_id).await?;

        tracing::info!(user_id = %user_id, "user deleted");
        Ok(())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
