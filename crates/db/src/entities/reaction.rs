//! Reaction entity (likes on posts and comments).
//!
//! A reaction addresses its target through a `(target_kind, target_id)` pair
//! rather than a foreign key, so one table serves every likable entity. The
//! set of likable kinds is closed at compile time: adding one means adding a
//! [`TargetKind`] variant and a [`LikeTarget`] constructor.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Discriminator naming which entity type a reaction references.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TargetKind {
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "comment")]
    Comment,
}

/// A likable entity reference: the closed union of reaction targets.
///
/// Resolves to a stable `(TargetKind, id)` addressing key. Two targets are
/// equal iff kind and id both match, so a post and a comment sharing an id
/// never collide.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LikeTarget<'a> {
    /// A post, by ID.
    Post(&'a str),
    /// A comment, by ID.
    Comment(&'a str),
}

impl<'a> LikeTarget<'a> {
    /// The discriminator for this target.
    #[must_use]
    pub const fn kind(self) -> TargetKind {
        match self {
            Self::Post(_) => TargetKind::Post,
            Self::Comment(_) => TargetKind::Comment,
        }
    }

    /// The target's own identifier within its kind.
    #[must_use]
    pub const fn id(self) -> &'a str {
        match self {
            Self::Post(id) | Self::Comment(id) => id,
        }
    }

    /// The discriminator as its wire string, for logging.
    #[must_use]
    pub const fn kind_str(self) -> &'static str {
        match self {
            Self::Post(_) => "post",
            Self::Comment(_) => "comment",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who liked
    pub user_id: String,

    /// Which entity type is referenced
    pub target_kind: TargetKind,

    /// The referenced entity's ID within its kind
    pub target_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
