//! Database repositories.

mod comment;
mod following;
mod post;
mod reaction;
mod user;
mod user_profile;

pub use comment::CommentRepository;
pub use following::FollowingRepository;
pub use post::{PostFilter, PostRepository};
pub use reaction::ReactionRepository;
pub use user::UserRepository;
pub use user_profile::UserProfileRepository;
