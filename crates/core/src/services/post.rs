//! Post service.

use ripple_common::{AppError, AppResult, IdGenerator, upload_path};
use ripple_db::{
    entities::{post, reaction::LikeTarget, user},
    repositories::{PostFilter, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::comment::CommentService;
use crate::services::reaction::ReactionService;

/// Input for creating a post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 63))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    /// Original filename of an uploaded image, if any
    pub image_name: Option<String>,
}

/// Input for updating a post. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 63))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub image_name: Option<String>,
}

/// Listing filters: title search, author restriction, paging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsInput {
    pub title: Option<String>,
    /// Restrict to posts authored by these users
    pub author_ids: Option<Vec<String>>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    comment_service: CommentService,
    reaction_service: ReactionService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        comment_service: CommentService,
        reaction_service: ReactionService,
    ) -> Self {
        Self {
            post_repo,
            comment_service,
            reaction_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// List posts newest first.
    pub async fn list(&self, input: &ListPostsInput) -> AppResult<Vec<post::Model>> {
        let filter = PostFilter {
            title_contains: input.title.clone(),
            author_ids: input.author_ids.clone(),
            limit: input.limit,
            offset: input.offset,
        };
        self.post_repo.list(&filter).await
    }

    /// List a user's posts, newest first.
    pub async fn list_by_author(&self, author_id: &str) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_author(author_id).await
    }

    /// Create a post.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let image_url = input
            .image_name
            .as_deref()
            .map(|name| image_url_for(&input.title, name));

        let created = self
            .post_repo
            .create(post::ActiveModel {
                id: Set(self.id_gen.generate()),
                author_id: Set(author_id.to_owned()),
                title: Set(input.title),
                content: Set(input.content),
                image_url: Set(image_url),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            })
            .await?;

        tracing::debug!(post_id = %created.id, author = %author_id, "post created");
        Ok(created)
    }

    /// Update a post. Only the author or a staff account may do so.
    pub async fn update(
        &self,
        actor: &user::Model,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != actor.id && !actor.is_staff {
            return Err(AppError::Forbidden(
                "only the author may modify this post".to_string(),
            ));
        }

        let title_for_path = input.title.clone().unwrap_or_else(|| post.title.clone());
        let image_url = input
            .image_name
            .as_deref()
            .map(|name| image_url_for(&title_for_path, name));

        let mut model: post::ActiveModel = post.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(content) = input.content {
            model.content = Set(content);
        }
        if let Some(url) = image_url {
            model.image_url = Set(Some(url));
        }

        self.post_repo.update(model).await
    }

    /// Delete a post. Only the author or a staff account may do so.
    ///
    /// Comments cascade via foreign key, but their likes (and the post's own)
    /// live in the polymorphic store with no key to cascade through, so they
    /// are cleared explicitly first.
    pub async fn delete(&self, actor: &user::Model, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != actor.id && !actor.is_staff {
            return Err(AppError::Forbidden(
                "only the author may delete this post".to_string(),
            ));
        }

        for comment_id in self.comment_service.list_ids(post_id).await? {
            self.reaction_service
                .delete_all_for(LikeTarget::Comment(&comment_id))
                .await?;
        }
        self.reaction_service
            .delete_all_for(LikeTarget::Post(post_id))
            .await?;

        self.post_repo.delete(post_id).await?;

        tracing::debug!(post_id = %post_id, "post deleted");
        Ok(())
    }
}

/// Storage path for a post image, under the singular `post` kind.
fn image_url_for(title: &str, original_name: &str) -> String {
    upload_path("post", title, original_name)
}
