//! Reaction repository.
//!
//! Behaves as a set of `(user, target)` rows: the unique index on
//! `(user_id, target_kind, target_id)` is the atomic guard, so concurrent
//! duplicate inserts resolve at the database without application locking.

use std::sync::Arc;

use crate::entities::{
    Reaction,
    reaction::{self, LikeTarget},
};
use ripple_common::{AppError, AppResult};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    Set,
};

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a reaction by user and target.
    pub async fn find_by_user_and_target(
        &self,
        user_id: &str,
        target: LikeTarget<'_>,
    ) -> AppResult<Option<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::TargetKind.eq(target.kind()))
            .filter(reaction::Column::TargetId.eq(target.id()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked a target.
    pub async fn exists(&self, user_id: &str, target: LikeTarget<'_>) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_target(user_id, target)
            .await?
            .is_some())
    }

    /// Insert a reaction unless one already exists for `(user, target)`.
    ///
    /// Idempotent: returns the existing row and `false` when the pair is
    /// already present. A concurrent duplicate insert loses to the unique
    /// index (`ON CONFLICT DO NOTHING`), in which case the winning row is
    /// fetched and returned with `false`.
    pub async fn insert_if_absent(
        &self,
        id: &str,
        user_id: &str,
        target: LikeTarget<'_>,
    ) -> AppResult<(reaction::Model, bool)> {
        if let Some(existing) = self.find_by_user_and_target(user_id, target).await? {
            return Ok((existing, false));
        }

        let model = reaction::ActiveModel {
            id: Set(id.to_owned()),
            user_id: Set(user_id.to_owned()),
            target_kind: Set(target.kind()),
            target_id: Set(target.id().to_owned()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let result = Reaction::insert(model)
            .on_conflict(
                OnConflict::columns([
                    reaction::Column::UserId,
                    reaction::Column::TargetKind,
                    reaction::Column::TargetId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await;

        match result {
            Ok(created) => Ok((created, true)),
            // Lost the race against a concurrent insert for the same pair
            Err(DbErr::RecordNotInserted) => {
                let existing = self
                    .find_by_user_and_target(user_id, target)
                    .await?
                    .ok_or_else(|| {
                        AppError::Database("reaction missing after insert conflict".to_string())
                    })?;
                Ok((existing, false))
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Delete the reaction for `(user, target)`, returning the rows removed.
    ///
    /// Idempotent: deleting a reaction that does not exist returns 0.
    pub async fn delete(&self, user_id: &str, target: LikeTarget<'_>) -> AppResult<u64> {
        let result = Reaction::delete_many()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::TargetKind.eq(target.kind()))
            .filter(reaction::Column::TargetId.eq(target.id()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count likes on a target.
    pub async fn count_for(&self, target: LikeTarget<'_>) -> AppResult<u64> {
        Reaction::find()
            .filter(reaction::Column::TargetKind.eq(target.kind()))
            .filter(reaction::Column::TargetId.eq(target.id()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the IDs of users who liked a target.
    ///
    /// Distinct by construction: the unique index allows one row per
    /// (user, target) pair.
    pub async fn list_user_ids_for(&self, target: LikeTarget<'_>) -> AppResult<Vec<String>> {
        Reaction::find()
            .filter(reaction::Column::TargetKind.eq(target.kind()))
            .filter(reaction::Column::TargetId.eq(target.id()))
            .select_only()
            .column(reaction::Column::UserId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all reactions on a target (cascade hook for target deletion).
    pub async fn delete_all_for(&self, target: LikeTarget<'_>) -> AppResult<u64> {
        let result = Reaction::delete_many()
            .filter(reaction::Column::TargetKind.eq(target.kind()))
            .filter(reaction::Column::TargetId.eq(target.id()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete all reactions authored by a user (cascade hook for account deletion).
    pub async fn delete_all_by(&self, user_id: &str) -> AppResult<u64> {
        let result = Reaction::delete_many()
            .filter(reaction::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::reaction::TargetKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_reaction(id: &str, user_id: &str, target: LikeTarget<'_>) -> reaction::Model {
        reaction::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            target_kind: target.kind(),
            target_id: target.id().to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_target_found() {
        let reaction = create_test_reaction("r1", "user1", LikeTarget::Post("post1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reaction.clone()]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo
            .find_by_user_and_target("user1", LikeTarget::Post("post1"))
            .await
            .unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.id, "r1");
        assert_eq!(found.target_kind, TargetKind::Post);
    }

    #[tokio::test]
    async fn test_exists_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<reaction::Model>::new()])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo
            .exists("user1", LikeTarget::Comment("c1"))
            .await
            .unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_insert_if_absent_returns_existing() {
        let existing = create_test_reaction("r1", "user1", LikeTarget::Post("post1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let (model, was_created) = repo
            .insert_if_absent("r2", "user1", LikeTarget::Post("post1"))
            .await
            .unwrap();

        assert!(!was_created);
        assert_eq!(model.id, "r1");
    }

    #[tokio::test]
    async fn test_delete_missing_reaction_is_not_an_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let deleted = repo
            .delete("user1", LikeTarget::Post("never-liked"))
            .await
            .unwrap();

        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_delete_returns_rows_removed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let deleted = repo
            .delete("user1", LikeTarget::Post("post1"))
            .await
            .unwrap();

        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn test_delete_all_for_target() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let deleted = repo.delete_all_for(LikeTarget::Post("post1")).await.unwrap();

        assert_eq!(deleted, 3);
    }
}
