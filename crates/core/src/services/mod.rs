//! Business logic services.

pub mod comment;
pub mod following;
pub mod post;
pub mod profile;
pub mod reaction;
pub mod user;

pub use comment::{CommentService, CreateCommentInput};
pub use following::FollowingService;
pub use post::{CreatePostInput, ListPostsInput, PostService, UpdatePostInput};
pub use profile::{CreateProfileInput, ProfileService, SearchProfilesInput, UpdateProfileInput};
pub use reaction::{Fan, LikeSummary, ReactionService};
pub use user::{RegisterInput, SigninInput, UpdateUserInput, UserService};
