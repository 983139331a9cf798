pub mod logs;
pub use logs::{LogService, log_error};

pub mod media;
pub use media::{MediaError, MediaKind, MediaService, ObjectStore, S3ObjectStore, UploadTicket};

pub mod username;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, Registration};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{
    PrivateUser, ProfileUpdate, PublicProfile, UserError, UserService, UserSummary,
};
pub use user_service_impl::SeaOrmUserService;

pub mod social_service;
pub mod social_service_impl;
pub use social_service::{FollowState, SocialError, SocialService};
pub use social_service_impl::SeaOrmSocialService;

pub mod post_service;
pub mod post_service_impl;
pub use post_service::{
    CommentService, CommentView, LikeState, PostError, PostService, PostView,
};
pub use post_service_impl::SeaOrmPostService;

pub mod comment_service_impl;
pub use comment_service_impl::SeaOrmCommentService;
