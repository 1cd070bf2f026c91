//! Create user profile table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserProfile::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserProfile::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(UserProfile::Username).string_len(50).not_null())
                    .col(ColumnDef::new(UserProfile::Password).string_len(256))
                    .col(ColumnDef::new(UserProfile::Bio).text())
                    .col(ColumnDef::new(UserProfile::ImageUrl).string_len(1024))
                    .col(
                        ColumnDef::new(UserProfile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(UserProfile::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_profile_user")
                            .from(UserProfile::Table, UserProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: user_id (1:1 with user)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_profile_user_id")
                    .table(UserProfile::Table)
                    .col(UserProfile::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: username
        manager
            .create_index(
                Index::create()
                    .name("idx_user_profile_username")
                    .table(UserProfile::Table)
                    .col(UserProfile::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserProfile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserProfile {
    Table,
    Id,
    UserId,
    Username,
    Password,
    Bio,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
