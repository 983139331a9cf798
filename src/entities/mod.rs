pub mod prelude;

pub mod accounts;
pub mod comments;
pub mod follows;
pub mod post_likes;
pub mod posts;
pub mod system_logs;
pub mod users;
