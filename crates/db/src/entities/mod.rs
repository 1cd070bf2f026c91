//! Database entities.

pub mod comment;
pub mod following;
pub mod post;
pub mod reaction;
pub mod user;
pub mod user_profile;

pub use comment::Entity as Comment;
pub use following::Entity as Following;
pub use post::Entity as Post;
pub use reaction::Entity as Reaction;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
